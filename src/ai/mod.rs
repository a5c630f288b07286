//! AI provider adapters
//!
//! Three independent operations, each behind its own trait so callers can be
//! wired with real providers or fakes:
//! - chat turns against Gemini,
//! - room composition against an OpenRouter image model,
//! - still-to-video synthesis against Veo.

pub mod gemini;
pub mod mock;
pub mod openrouter;

pub use gemini::{GeminiChatClient, GeminiVideoClient};
pub use mock::{MockChatClient, MockCompositionClient, MockVideoClient};
pub use openrouter::OpenRouterCompositionClient;

use crate::media::MediaPart;
use crate::models::{ConversationTurn, ImageRef, VideoHandle};
use crate::Result;
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

#[async_trait]
pub trait ChatService: Send + Sync {
    /// Send `new_turn` after `history` and return the model's reply text.
    ///
    /// `history` must alternate user/model starting with the user; it is
    /// read, never modified.
    async fn send_chat_turn(
        &self,
        history: &[ConversationTurn],
        new_turn: &[MediaPart],
    ) -> Result<String>;
}

#[async_trait]
pub trait CompositionService: Send + Sync {
    async fn compose_image_in_room(
        &self,
        room_image: &MediaPart,
        product_image: &MediaPart,
        instruction: &str,
    ) -> Result<ImageRef>;
}

#[async_trait]
pub trait VideoService: Send + Sync {
    async fn synthesize_video(
        &self,
        still_image: &[u8],
        mime_type: &str,
        aspect_ratio: &str,
        cancel: &CancellationToken,
    ) -> Result<VideoHandle>;
}
