use thiserror::Error;

pub const NO_FILE_MESSAGE: &str = "Please select an image to upload.";
pub const CAPTION_FALLBACK_MESSAGE: &str = "Failed to generate caption.";
pub const PREVIEW_FAILED_MESSAGE: &str = "Could not read the selected image.";

/// Everything that can end a submission cycle without a caption.
///
/// `Display` is the exact text shown in the status line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CaptionError {
    #[error("{}", NO_FILE_MESSAGE)]
    NoFileSelected,

    #[error("{message}")]
    Server { status: u16, message: String },

    #[error("{0}")]
    Transport(String),

    #[error("{0}")]
    MalformedResponse(String),
}

impl CaptionError {
    /// Builds the server variant, falling back to the generic message when the
    /// body carried no usable `error` field.
    pub fn server(status: u16, message: Option<String>) -> Self {
        let message = message
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| CAPTION_FALLBACK_MESSAGE.to_string());
        CaptionError::Server { status, message }
    }
}

impl From<reqwest::Error> for CaptionError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            CaptionError::MalformedResponse(err.to_string())
        } else {
            CaptionError::Transport(err.to_string())
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PreviewError {
    #[error("selected file is empty")]
    Empty,

    #[error("selected file is not a recognised image")]
    UnrecognizedImage,

    #[error("preview worker failed: {0}")]
    Worker(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_error_uses_body_message() {
        let err = CaptionError::server(500, Some("model unavailable".into()));
        assert_eq!(err.to_string(), "model unavailable");
    }

    #[test]
    fn server_error_falls_back_when_message_missing_or_blank() {
        assert_eq!(
            CaptionError::server(500, None).to_string(),
            "Failed to generate caption."
        );
        assert_eq!(
            CaptionError::server(502, Some("  ".into())).to_string(),
            "Failed to generate caption."
        );
    }

    #[test]
    fn no_file_message_is_literal() {
        assert_eq!(
            CaptionError::NoFileSelected.to_string(),
            "Please select an image to upload."
        );
    }
}
