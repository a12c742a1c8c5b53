//! Image attachments, carried to the endpoint as `data:` URIs.

use base64::{engine::general_purpose, Engine as _};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ImageError {
    UnsupportedType { message: String },
    Empty { message: String },
}

impl std::fmt::Display for ImageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnsupportedType { message } => write!(f, "UnsupportedType: {}", message),
            Self::Empty { message } => write!(f, "Empty: {}", message),
        }
    }
}

impl std::error::Error for ImageError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageAttachment {
    data_url: String,
}

impl ImageAttachment {
    /// Encode raw file bytes. Only `image/*` MIME types are accepted.
    pub fn from_bytes(mime: &str, bytes: &[u8]) -> Result<Self, ImageError> {
        let mime = mime.trim().to_ascii_lowercase();
        if !is_image_mime(&mime) {
            return Err(ImageError::UnsupportedType {
                message: format!("Not an image file: {}", mime),
            });
        }
        if bytes.is_empty() {
            return Err(ImageError::Empty {
                message: "Image file is empty".to_string(),
            });
        }
        let encoded = general_purpose::STANDARD.encode(bytes);
        Ok(Self {
            data_url: format!("data:{};base64,{}", mime, encoded),
        })
    }

    /// Accept an already-encoded `data:image/...` URI.
    pub fn from_data_url(data_url: impl Into<String>) -> Result<Self, ImageError> {
        let data_url = data_url.into();
        let Some(rest) = data_url.strip_prefix("data:") else {
            return Err(ImageError::UnsupportedType {
                message: "Image must be a data: URI".to_string(),
            });
        };
        let mime = rest.split([';', ',']).next().unwrap_or("");
        if !is_image_mime(&mime.to_ascii_lowercase()) {
            return Err(ImageError::UnsupportedType {
                message: format!("Not an image data URI: {}", mime),
            });
        }
        let payload = rest.split_once(',').map(|(_, p)| p).unwrap_or("");
        if payload.is_empty() {
            return Err(ImageError::Empty {
                message: "Image data URI has no payload".to_string(),
            });
        }
        Ok(Self { data_url })
    }

    pub fn data_url(&self) -> &str {
        &self.data_url
    }

    pub fn into_data_url(self) -> String {
        self.data_url
    }
}

fn is_image_mime(mime: &str) -> bool {
    mime.strip_prefix("image/")
        .map(|subtype| !subtype.is_empty())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_bytes_builds_data_url() {
        let image = ImageAttachment::from_bytes("image/png", b"\x89PNG").unwrap();
        assert_eq!(image.data_url(), "data:image/png;base64,iVBORw==");
    }

    #[test]
    fn test_rejects_non_images() {
        assert!(matches!(
            ImageAttachment::from_bytes("text/plain", b"hi"),
            Err(ImageError::UnsupportedType { .. })
        ));
        assert!(matches!(
            ImageAttachment::from_bytes("image/", b"hi"),
            Err(ImageError::UnsupportedType { .. })
        ));
        assert!(matches!(
            ImageAttachment::from_bytes("image/jpeg", b""),
            Err(ImageError::Empty { .. })
        ));
    }

    #[test]
    fn test_from_data_url() {
        assert!(ImageAttachment::from_data_url("data:image/jpeg;base64,AAAA").is_ok());
        assert!(ImageAttachment::from_data_url("https://x.dev/a.png").is_err());
        assert!(ImageAttachment::from_data_url("data:text/html;base64,AAAA").is_err());
        assert!(ImageAttachment::from_data_url("data:image/png;base64,").is_err());
    }
}
