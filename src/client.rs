use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;

use crate::error::CaptionError;
use crate::state::SelectedFile;

/// Multipart field the caption endpoint reads the image from.
pub const IMAGE_FIELD: &str = "image";

#[async_trait]
pub trait CaptionService: Send + Sync {
    async fn caption(&self, file: &SelectedFile) -> Result<String, CaptionError>;
}

#[derive(Debug, Deserialize)]
struct CaptionReply {
    caption: Option<String>,
    error: Option<String>,
}

#[derive(Clone)]
pub struct HttpCaptionClient {
    http: reqwest::Client,
    endpoint: String,
}

impl HttpCaptionClient {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), endpoint)
    }

    pub fn with_client(http: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self {
            http,
            endpoint: endpoint.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn form_for(file: &SelectedFile) -> Result<Form, CaptionError> {
        let content_type = file
            .content_type
            .as_deref()
            .and_then(|ct| ct.parse::<mime::Mime>().ok())
            .unwrap_or(mime::APPLICATION_OCTET_STREAM);
        let part = Part::bytes(file.bytes.to_vec())
            .file_name(file.name.clone())
            .mime_str(content_type.as_ref())?;
        Ok(Form::new().part(IMAGE_FIELD, part))
    }
}

#[async_trait]
impl CaptionService for HttpCaptionClient {
    async fn caption(&self, file: &SelectedFile) -> Result<String, CaptionError> {
        let form = Self::form_for(file)?;

        tracing::info!(
            endpoint = %self.endpoint,
            file = %file.name,
            bytes = file.bytes.len(),
            "sending caption request"
        );

        let response = self.http.post(&self.endpoint).multipart(form).send().await?;
        let status = response.status();

        // The body is decoded before the status is looked at, so an HTML error
        // page from a proxy surfaces as a decoding failure.
        let reply: CaptionReply = response.json().await?;

        if !status.is_success() {
            return Err(CaptionError::server(status.as_u16(), reply.error));
        }

        reply.caption.ok_or_else(|| {
            CaptionError::MalformedResponse("response did not include a caption".to_string())
        })
    }
}
