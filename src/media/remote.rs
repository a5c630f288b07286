use super::MediaPart;
use crate::{Error, Result};
use image::{DynamicImage, ImageFormat};
use reqwest::Client;
use std::io::Cursor;
use std::time::Duration;

/// Re-encodes remotely hosted images as inline data.
///
/// Product photos live on another origin and their raw bytes are not
/// always usable as-is, so the image is decoded into pixels and rendered
/// again in the requested format instead of being forwarded verbatim.
pub struct RemoteImageEncoder {
    client: Client,
    timeout: Duration,
}

impl RemoteImageEncoder {
    pub fn new() -> Self {
        Self::new_with_client(Client::new())
    }

    pub fn new_with_client(client: Client) -> Self {
        Self {
            client,
            timeout: Duration::from_secs(30),
        }
    }

    pub async fn encode(&self, url: &str, mime_type: &str) -> Result<MediaPart> {
        tracing::debug!("Fetching remote image {} as {}", url, mime_type);

        let load_error = || {
            Error::MediaFetch(format!(
                "Failed to load image from URL: {}. The resource may be private or unavailable.",
                url
            ))
        };

        let response = self
            .client
            .get(url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to fetch image {}: {}", url, e);
                load_error()
            })?;

        if !response.status().is_success() {
            tracing::error!(
                "Image fetch for {} returned status {}",
                url,
                response.status()
            );
            return Err(load_error());
        }

        let bytes = response.bytes().await.map_err(|e| {
            tracing::error!("Failed to read image body from {}: {}", url, e);
            load_error()
        })?;

        let target = mime_type.to_string();
        let rendered = tokio::task::spawn_blocking(move || render(&bytes, &target))
            .await
            .map_err(|e| Error::MediaFetch(format!("Image rendering task failed: {}", e)))?
            .map_err(|e| Error::MediaFetch(format!("Failed to extract image data from {}: {}", url, e)))?;

        Ok(MediaPart::from_bytes(&rendered, mime_type))
    }
}

impl Default for RemoteImageEncoder {
    fn default() -> Self {
        Self::new()
    }
}

/// Decode `bytes` to pixels and draw them out again as `mime_type`.
fn render(bytes: &[u8], mime_type: &str) -> std::result::Result<Vec<u8>, String> {
    let format = ImageFormat::from_mime_type(mime_type)
        .ok_or_else(|| format!("unsupported target type {}", mime_type))?;
    let decoded = image::load_from_memory(bytes).map_err(|e| e.to_string())?;

    let surface = match format {
        ImageFormat::Jpeg => DynamicImage::ImageRgb8(decoded.to_rgb8()),
        _ => DynamicImage::ImageRgba8(decoded.to_rgba8()),
    };

    let mut out = Cursor::new(Vec::new());
    surface
        .write_to(&mut out, format)
        .map_err(|e| e.to_string())?;
    Ok(out.into_inner())
}
