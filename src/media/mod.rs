//! Media codec
//!
//! Normalizes every image source the stylist accepts (local files, camera
//! frames, remotely hosted product photos) into a [`MediaPart`] that either
//! provider can carry.

pub mod camera;
pub mod mime;
pub mod remote;

pub use camera::{capture_room_photo, Camera, CameraSession, CameraStream};
pub use remote::RemoteImageEncoder;

use crate::{Error, Result};
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One unit of multimodal content: text, or base64 inline bytes.
///
/// Serializes to the `{"text": ...}` / `{"inlineData": {...}}` part shape.
/// Variant order matters for `#[serde(untagged)]` decoding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MediaPart {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
}

/// Base64 payload with its MIME type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    pub mime_type: String,
    pub data: String,
}

impl MediaPart {
    pub fn text(text: impl Into<String>) -> Self {
        MediaPart::Text { text: text.into() }
    }

    /// Encode an in-memory buffer (camera frame, download, upload).
    pub fn from_bytes(bytes: &[u8], mime_type: impl Into<String>) -> Self {
        MediaPart::InlineData {
            inline_data: InlineData {
                mime_type: mime_type.into(),
                data: base64::engine::general_purpose::STANDARD.encode(bytes),
            },
        }
    }

    pub fn inline_data(&self) -> Option<&InlineData> {
        match self {
            MediaPart::InlineData { inline_data } if !inline_data.data.is_empty() => {
                Some(inline_data)
            }
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            MediaPart::Text { text } => Some(text),
            MediaPart::InlineData { .. } => None,
        }
    }

    /// Recover the raw bytes of an inline part.
    pub fn decode_inline(&self) -> Result<Vec<u8>> {
        let inline = self
            .inline_data()
            .ok_or_else(|| Error::MissingInput("Media part carries no inline data".to_string()))?;
        inline.decode()
    }

    /// Render as a `data:` URL, the form URL-based providers accept.
    pub fn to_data_url(&self) -> Option<String> {
        self.inline_data()
            .map(|inline| format!("data:{};base64,{}", inline.mime_type, inline.data))
    }
}

impl InlineData {
    pub fn decode(&self) -> Result<Vec<u8>> {
        base64::engine::general_purpose::STANDARD
            .decode(&self.data)
            .map_err(|e| Error::MediaFetch(format!("Inline data is not valid base64: {}", e)))
    }

    /// Parse a `data:<mime>;base64,<payload>` URL.
    pub fn from_data_url(url: &str) -> Option<Self> {
        let rest = url.strip_prefix("data:")?;
        let (header, data) = rest.split_once(',')?;
        let mime_type = header.strip_suffix(";base64")?;
        if mime_type.is_empty() || data.is_empty() {
            return None;
        }
        Some(Self {
            mime_type: mime_type.to_string(),
            data: data.to_string(),
        })
    }
}

/// Read a local file into an inline-data part.
pub async fn encode_file(path: impl AsRef<Path>) -> Result<MediaPart> {
    let path = path.as_ref();
    let bytes = tokio::fs::read(path).await.map_err(|e| {
        tracing::error!("Failed to read {}: {}", path.display(), e);
        Error::MediaFetch(format!("Failed to read file {}: {}", path.display(), e))
    })?;

    if bytes.is_empty() {
        return Err(Error::MediaFetch(format!(
            "File {} is empty",
            path.display()
        )));
    }

    let mime_type = mime::detect_file_mime(path, &bytes);
    tracing::debug!(
        "Encoded {} ({} bytes, {})",
        path.display(),
        bytes.len(),
        mime_type
    );
    Ok(MediaPart::from_bytes(&bytes, mime_type))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_text_part_serializes_as_text_object() {
        let json = serde_json::to_value(MediaPart::text("hello")).unwrap();
        assert_eq!(json, serde_json::json!({ "text": "hello" }));
    }

    #[test]
    fn test_inline_part_serializes_camel_case() {
        let json = serde_json::to_value(MediaPart::from_bytes(&[1, 2, 3], "image/png")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "inlineData": { "mimeType": "image/png", "data": "AQID" } })
        );
    }

    #[test]
    fn test_inline_part_deserializes() {
        let part: MediaPart = serde_json::from_value(serde_json::json!({
            "inlineData": { "mimeType": "image/jpeg", "data": "AQID" }
        }))
        .unwrap();
        assert_eq!(part.decode_inline().unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn test_bytes_survive_one_encode_pass() {
        let bytes: Vec<u8> = (0..=255).collect();
        let part = MediaPart::from_bytes(&bytes, "image/jpeg");
        assert_eq!(part.decode_inline().unwrap(), bytes);
        assert_eq!(part.inline_data().unwrap().mime_type, "image/jpeg");
    }

    #[test]
    fn test_text_part_has_no_inline_data() {
        let err = MediaPart::text("hi").decode_inline().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingInput);
    }

    #[test]
    fn test_empty_inline_payload_counts_as_missing() {
        let part = MediaPart::InlineData {
            inline_data: InlineData {
                mime_type: "image/png".to_string(),
                data: String::new(),
            },
        };
        assert!(part.inline_data().is_none());
    }

    #[test]
    fn test_data_url_round_trip() {
        let part = MediaPart::from_bytes(&[9, 8, 7], "image/webp");
        let url = part.to_data_url().unwrap();
        assert!(url.starts_with("data:image/webp;base64,"));
        let inline = InlineData::from_data_url(&url).unwrap();
        assert_eq!(inline.decode().unwrap(), vec![9, 8, 7]);
    }

    #[test]
    fn test_from_data_url_rejects_non_base64() {
        assert!(InlineData::from_data_url("data:text/plain,hello").is_none());
        assert!(InlineData::from_data_url("https://x.test/a.png").is_none());
    }

    #[tokio::test]
    async fn test_encode_file_reads_bytes_and_mime() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("room.jpg");
        let bytes = vec![0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10];
        std::fs::write(&path, &bytes).unwrap();

        let part = encode_file(&path).await.unwrap();
        assert_eq!(part.inline_data().unwrap().mime_type, "image/jpeg");
        assert_eq!(part.decode_inline().unwrap(), bytes);
    }

    #[tokio::test]
    async fn test_encode_file_missing_is_media_fetch_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = encode_file(dir.path().join("nope.png")).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MediaFetch);
    }

    #[tokio::test]
    async fn test_encode_file_empty_is_media_fetch_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.png");
        std::fs::write(&path, []).unwrap();
        let err = encode_file(&path).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MediaFetch);
    }
}
