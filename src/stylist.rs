//! Orchestration facade wiring the media codec to the three adapters.

use crate::ai::{
    ChatService, CompositionService, GeminiChatClient, GeminiVideoClient,
    OpenRouterCompositionClient, VideoService,
};
use crate::media::{MediaPart, RemoteImageEncoder};
use crate::models::{Config, ImageRef, Product, VideoHandle};
use crate::session::ChatSession;
use crate::{prompts, Error, Result};
use chrono::Local;
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;
use tracing::info;
use uuid::Uuid;

/// MIME type product photos are re-rendered into before upload.
const PRODUCT_IMAGE_MIME: &str = "image/jpeg";

/// One instance per process; every operation borrows it immutably.
pub struct Stylist {
    chat: Box<dyn ChatService>,
    composer: Box<dyn CompositionService>,
    video: Box<dyn VideoService>,
    images: RemoteImageEncoder,
}

/// Injectable service bundle used to construct [`Stylist`] in tests/harnesses.
pub struct StylistServices {
    pub chat: Box<dyn ChatService>,
    pub composer: Box<dyn CompositionService>,
    pub video: Box<dyn VideoService>,
    pub images: RemoteImageEncoder,
}

impl Stylist {
    pub fn with_services(services: StylistServices) -> Self {
        Self {
            chat: services.chat,
            composer: services.composer,
            video: services.video,
            images: services.images,
        }
    }

    /// Build real provider clients from configuration.
    pub fn new(config: &Config) -> Self {
        // Reuse one HTTP connection pool across provider clients.
        let http_client = reqwest::Client::new();

        info!("Chat provider: Gemini (model: {})", config.chat_model);
        let chat = GeminiChatClient::new_with_client(
            config.gemini_api_key.clone(),
            config.chat_model.clone(),
            http_client.clone(),
        );

        info!("Composition provider: OpenRouter (model: {})", config.composition_model);
        let composer = OpenRouterCompositionClient::new_with_client(
            config.openrouter_api_key.clone(),
            config.composition_model.clone(),
            http_client.clone(),
        );

        info!("Video provider: Gemini (model: {})", config.video_model);
        let video = GeminiVideoClient::new_with_client(
            config.gemini_api_key.clone(),
            config.video_model.clone(),
            config.output_dir.clone(),
            http_client.clone(),
        )
        .with_poll_policy(config.poll_policy);

        Self::with_services(StylistServices {
            chat: Box::new(chat),
            composer: Box::new(composer),
            video: Box::new(video),
            images: RemoteImageEncoder::new_with_client(http_client),
        })
    }

    /// Start a fresh conversation with empty history.
    pub fn chat_session(&self) -> ChatSession {
        ChatSession::new()
    }

    /// Send one chat message within `session`.
    pub async fn chat(
        &self,
        session: &mut ChatSession,
        text: &str,
        image: Option<MediaPart>,
    ) -> Result<String> {
        session.send(&*self.chat, text, image).await
    }

    /// Composite `product` into the user's room photo.
    pub async fn try_in_room(&self, room: &MediaPart, product: &Product) -> Result<ImageRef> {
        if room.inline_data().is_none() {
            return Err(Error::MissingInput(
                "Please provide an image of your room.".to_string(),
            ));
        }

        info!("Placing '{}' into room photo", product.name);
        let product_image = self
            .images
            .encode(&product.image_url, PRODUCT_IMAGE_MIME)
            .await?;
        let instruction =
            prompts::render(prompts::ROOM_PLACEMENT, &[("product_name", &product.name)]);

        self.composer
            .compose_image_in_room(room, &product_image, &instruction)
            .await
    }

    /// Animate the product photo into a short parallax clip.
    pub async fn visualize_in_3d(
        &self,
        product: &Product,
        aspect_ratio: &str,
        cancel: &CancellationToken,
    ) -> Result<VideoHandle> {
        info!("Generating {} parallax video for '{}'", aspect_ratio, product.name);
        let part = self
            .images
            .encode(&product.image_url, PRODUCT_IMAGE_MIME)
            .await?;
        let inline = part
            .inline_data()
            .ok_or_else(|| Error::MissingInput("Failed to process product image.".to_string()))?;
        let bytes = inline.decode()?;

        self.video
            .synthesize_video(&bytes, &inline.mime_type, aspect_ratio, cancel)
            .await
    }
}

/// Make an image reference viewable: URLs pass through, inline data is
/// written under `output_dir` and its path returned.
pub async fn persist_image(image: &ImageRef, output_dir: &Path) -> Result<String> {
    match image {
        ImageRef::Url(url) => Ok(url.clone()),
        ImageRef::Inline(inline) => {
            let bytes = inline.decode()?;
            let extension = match inline.mime_type.as_str() {
                "image/jpeg" => "jpg",
                "image/webp" => "webp",
                _ => "png",
            };
            let path: PathBuf = output_dir.join(format!(
                "room_{}_{}.{}",
                Local::now().format("%Y-%m-%d"),
                Uuid::new_v4(),
                extension
            ));

            let io_error = |e: std::io::Error| {
                Error::MediaFetch(format!("Failed to save generated image: {}", e))
            };
            tokio::fs::create_dir_all(output_dir).await.map_err(io_error)?;
            tokio::fs::write(&path, &bytes).await.map_err(io_error)?;
            info!("Saved composed image to {}", path.display());
            Ok(path.display().to_string())
        }
    }
}
