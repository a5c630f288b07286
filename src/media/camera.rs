//! Camera capture with scoped stream ownership.
//!
//! A [`CameraSession`] owns the acquired stream and stops it exactly once,
//! whether a frame is captured, the session is closed, or it is dropped on an
//! error path.

use super::MediaPart;
use crate::{Error, Result};

/// A capture device that can hand out a live stream.
pub trait Camera: Send + Sync {
    fn start(&self) -> Result<Box<dyn CameraStream>>;
}

/// A live stream. Frames are JPEG-encoded.
pub trait CameraStream: Send {
    fn grab_frame(&mut self) -> Result<Vec<u8>>;
    fn stop(&mut self);
}

pub struct CameraSession {
    stream: Option<Box<dyn CameraStream>>,
}

impl CameraSession {
    pub fn open(camera: &dyn Camera) -> Result<Self> {
        let stream = camera.start().map_err(|e| {
            tracing::error!("Camera access failed: {}", e);
            Error::MediaFetch(
                "Camera access was denied. Please enable it in your camera settings.".to_string(),
            )
        })?;
        tracing::debug!("Camera stream acquired");
        Ok(Self {
            stream: Some(stream),
        })
    }

    pub fn is_active(&self) -> bool {
        self.stream.is_some()
    }

    /// Grab one frame and release the stream.
    pub fn capture(mut self) -> Result<MediaPart> {
        let stream = self
            .stream
            .as_mut()
            .ok_or_else(|| Error::MediaFetch("Camera stream already released".to_string()))?;
        let frame = stream.grab_frame();
        self.release();

        let frame = frame?;
        if frame.is_empty() {
            return Err(Error::MediaFetch("Camera returned an empty frame".to_string()));
        }
        Ok(MediaPart::from_bytes(&frame, "image/jpeg"))
    }

    /// Dismiss without capturing.
    pub fn close(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            stream.stop();
            tracing::debug!("Camera stream released");
        }
    }
}

impl Drop for CameraSession {
    fn drop(&mut self) {
        self.release();
    }
}

/// Acquire the camera, take one room photo, and release it.
pub fn capture_room_photo(camera: &dyn Camera) -> Result<MediaPart> {
    CameraSession::open(camera)?.capture()
}
