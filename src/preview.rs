use base64::{engine::general_purpose, Engine as _};
use image::ImageFormat;

use crate::error::PreviewError;
use crate::state::SelectedFile;

/// Reads the selected file into a `data:` URL the page can use as an `<img>`
/// source. Encoding runs on the blocking pool.
pub async fn read_data_url(file: &SelectedFile) -> Result<String, PreviewError> {
    let bytes = file.bytes.clone();
    let declared = file.content_type.clone();

    tokio::task::spawn_blocking(move || encode_data_url(&bytes, declared.as_deref()))
        .await
        .map_err(|e| PreviewError::Worker(e.to_string()))?
}

fn encode_data_url(bytes: &[u8], declared: Option<&str>) -> Result<String, PreviewError> {
    if bytes.is_empty() {
        return Err(PreviewError::Empty);
    }

    let mime = match declared.filter(|ct| ct.starts_with("image/")) {
        Some(ct) => ct.to_string(),
        None => {
            let format = image::guess_format(bytes).map_err(|_| PreviewError::UnrecognizedImage)?;
            mime_for(format)
                .ok_or(PreviewError::UnrecognizedImage)?
                .to_string()
        }
    };

    Ok(format!(
        "data:{};base64,{}",
        mime,
        general_purpose::STANDARD.encode(bytes)
    ))
}

/// Splits a `data:<mime>;base64,<payload>` URL back into its mime type and
/// bytes. Anything else yields `None`.
pub fn decode_data_url(url: &str) -> Option<(String, Vec<u8>)> {
    let (meta, payload) = url.strip_prefix("data:")?.split_once(',')?;
    let mime = meta.strip_suffix(";base64")?;
    let bytes = general_purpose::STANDARD.decode(payload).ok()?;
    Some((mime.to_string(), bytes))
}

fn mime_for(format: ImageFormat) -> Option<&'static str> {
    let mime = match format {
        ImageFormat::Png => "image/png",
        ImageFormat::Jpeg => "image/jpeg",
        ImageFormat::Gif => "image/gif",
        ImageFormat::WebP => "image/webp",
        ImageFormat::Bmp => "image/bmp",
        ImageFormat::Tiff => "image/tiff",
        ImageFormat::Ico => "image/x-icon",
        ImageFormat::Avif => "image/avif",
        _ => return None,
    };
    Some(mime)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_MAGIC: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";

    #[tokio::test]
    async fn declared_image_type_is_used() {
        let file = SelectedFile::new("a.jpg", Some("image/jpeg".into()), vec![1u8, 2, 3]);
        let url = read_data_url(&file).await.unwrap();
        assert_eq!(url, "data:image/jpeg;base64,AQID");
    }

    #[tokio::test]
    async fn format_is_sniffed_when_type_is_missing() {
        let file = SelectedFile::new("upload", None, PNG_MAGIC.to_vec());
        let url = read_data_url(&file).await.unwrap();
        assert!(url.starts_with("data:image/png;base64,"), "{url}");
    }

    #[tokio::test]
    async fn non_image_type_falls_back_to_sniffing() {
        let file = SelectedFile::new(
            "upload",
            Some("application/octet-stream".into()),
            PNG_MAGIC.to_vec(),
        );
        let url = read_data_url(&file).await.unwrap();
        assert!(url.starts_with("data:image/png;base64,"));
    }

    #[tokio::test]
    async fn unknown_bytes_are_rejected() {
        let file = SelectedFile::new("notes.txt", Some("text/plain".into()), b"hello".to_vec());
        assert_eq!(
            read_data_url(&file).await,
            Err(PreviewError::UnrecognizedImage)
        );
    }

    #[tokio::test]
    async fn data_url_decodes_back_to_file() {
        let file = SelectedFile::new("a.jpg", Some("image/jpeg".into()), vec![1u8, 2, 3]);
        let url = read_data_url(&file).await.unwrap();

        let (mime, bytes) = decode_data_url(&url).expect("decodable");
        assert_eq!(mime, "image/jpeg");
        assert_eq!(bytes, vec![1u8, 2, 3]);
        assert!(decode_data_url("https://example.com/a.png").is_none());
    }

    #[tokio::test]
    async fn empty_file_is_rejected() {
        let file = SelectedFile::new("empty.png", Some("image/png".into()), Vec::<u8>::new());
        assert_eq!(read_data_url(&file).await, Err(PreviewError::Empty));
    }
}
