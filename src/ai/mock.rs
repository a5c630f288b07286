use super::{ChatService, CompositionService, VideoService};
use crate::media::MediaPart;
use crate::models::{ConversationTurn, ImageRef, VideoHandle};
use crate::{Error, Result};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tokio_util::sync::CancellationToken;

/// Chat fake: replays queued outcomes and records every request it sees.
#[derive(Clone, Default)]
pub struct MockChatClient {
    responses: Arc<Mutex<VecDeque<Result<String>>>>,
    requests: Arc<Mutex<Vec<(Vec<ConversationTurn>, Vec<MediaPart>)>>>,
}

impl MockChatClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_reply(self, reply: impl Into<String>) -> Self {
        self.responses.lock().unwrap().push_back(Ok(reply.into()));
        self
    }

    pub fn with_failure(self, error: Error) -> Self {
        self.responses.lock().unwrap().push_back(Err(error));
        self
    }

    pub fn get_call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// Snapshot of `(history, new_turn)` for each call, in order.
    pub fn get_requests(&self) -> Vec<(Vec<ConversationTurn>, Vec<MediaPart>)> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatService for MockChatClient {
    async fn send_chat_turn(
        &self,
        history: &[ConversationTurn],
        new_turn: &[MediaPart],
    ) -> Result<String> {
        self.requests
            .lock()
            .unwrap()
            .push((history.to_vec(), new_turn.to_vec()));

        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(format!("Mock stylist reply #{}", history.len() / 2 + 1)))
    }
}

/// Composition fake returning a fixed URL unless a failure is queued.
#[derive(Clone)]
pub struct MockCompositionClient {
    result: ImageRef,
    failures: Arc<Mutex<VecDeque<Error>>>,
    instructions: Arc<Mutex<Vec<String>>>,
}

impl MockCompositionClient {
    pub fn new() -> Self {
        Self {
            result: ImageRef::Url("https://mock-images.example.com/composed.png".to_string()),
            failures: Arc::new(Mutex::new(VecDeque::new())),
            instructions: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_result(mut self, result: ImageRef) -> Self {
        self.result = result;
        self
    }

    pub fn with_failure(self, error: Error) -> Self {
        self.failures.lock().unwrap().push_back(error);
        self
    }

    pub fn get_instructions(&self) -> Vec<String> {
        self.instructions.lock().unwrap().clone()
    }
}

impl Default for MockCompositionClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CompositionService for MockCompositionClient {
    async fn compose_image_in_room(
        &self,
        room_image: &MediaPart,
        product_image: &MediaPart,
        instruction: &str,
    ) -> Result<ImageRef> {
        self.instructions
            .lock()
            .unwrap()
            .push(instruction.to_string());

        if room_image.inline_data().is_none() || product_image.inline_data().is_none() {
            return Err(Error::MissingInput(
                "Both the room image and the product image must carry image data.".to_string(),
            ));
        }

        if let Some(error) = self.failures.lock().unwrap().pop_front() {
            return Err(error);
        }
        Ok(self.result.clone())
    }
}

/// Video fake that "finishes" immediately, honouring cancellation.
#[derive(Clone)]
pub struct MockVideoClient {
    path: PathBuf,
    calls: Arc<Mutex<Vec<(usize, String, String)>>>,
}

impl MockVideoClient {
    pub fn new() -> Self {
        Self {
            path: PathBuf::from("output/mock-video.mp4"),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// `(image byte length, mime type, aspect ratio)` per call.
    pub fn get_calls(&self) -> Vec<(usize, String, String)> {
        self.calls.lock().unwrap().clone()
    }
}

impl Default for MockVideoClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VideoService for MockVideoClient {
    async fn synthesize_video(
        &self,
        still_image: &[u8],
        mime_type: &str,
        aspect_ratio: &str,
        cancel: &CancellationToken,
    ) -> Result<VideoHandle> {
        self.calls.lock().unwrap().push((
            still_image.len(),
            mime_type.to_string(),
            aspect_ratio.to_string(),
        ));

        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }

        Ok(VideoHandle {
            path: self.path.clone(),
            content_type: "video/mp4".to_string(),
            size: 0,
        })
    }
}
