use super::client::OpenRouterHttpClient;
use super::types::{ChatCompletionRequest, ChatMessage, ContentItem, ImageUrl};
use crate::ai::CompositionService;
use crate::media::{InlineData, MediaPart};
use crate::models::ImageRef;
use crate::normalize::{classify, ErrorBody, Operation, ProviderError};
use crate::{prompts, Error, Result};
use async_trait::async_trait;
use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;
use std::time::Duration;

/// Interprets a response under one assumed schema, or declines.
pub type ShapeMatcher = fn(&Value) -> Option<ImageRef>;

/// Tried in order; the first match wins.
pub const SHAPE_MATCHERS: &[(&str, ShapeMatcher)] = &[
    ("images field", match_images_field),
    ("markdown link", match_markdown_link),
    ("bare url", match_bare_url),
];

fn image_ref_from_url(url: &str) -> ImageRef {
    match InlineData::from_data_url(url) {
        Some(inline) => ImageRef::Inline(inline),
        None => ImageRef::Url(url.to_string()),
    }
}

/// `choices[0].message.images[0].image_url.url`, the first candidate only.
pub fn match_images_field(raw: &Value) -> Option<ImageRef> {
    raw.pointer("/choices/0/message/images/0/image_url/url")
        .and_then(Value::as_str)
        .filter(|url| !url.trim().is_empty())
        .map(image_ref_from_url)
}

/// Message content as text; multipart content contributes its text items.
fn message_content(raw: &Value) -> Option<String> {
    match raw.pointer("/choices/0/message/content")? {
        Value::String(text) => Some(text.clone()),
        Value::Array(items) => {
            let text: Vec<&str> = items
                .iter()
                .filter_map(|item| item.get("text").and_then(Value::as_str))
                .collect();
            (!text.is_empty()).then(|| text.join("\n"))
        }
        _ => None,
    }
}

fn markdown_image_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\((https?://.*?\.(?:png|jpg|jpeg|webp).*?)\)")
            .expect("markdown image pattern is valid")
    })
}

/// A parenthesised link to a png/jpg/jpeg/webp file inside the content.
pub fn match_markdown_link(raw: &Value) -> Option<ImageRef> {
    let content = message_content(raw)?;
    markdown_image_pattern()
        .captures(&content)
        .and_then(|captures| captures.get(1))
        .map(|m| ImageRef::Url(m.as_str().to_string()))
}

/// Content that is nothing but a URL.
pub fn match_bare_url(raw: &Value) -> Option<ImageRef> {
    let content = message_content(raw)?;
    let trimmed = content.trim();
    trimmed
        .starts_with("http")
        .then(|| ImageRef::Url(trimmed.to_string()))
}

/// Run the shape-matchers in priority order.
pub fn parse_composition_response(raw: &Value) -> Option<ImageRef> {
    SHAPE_MATCHERS.iter().find_map(|(name, matcher)| {
        let matched = matcher(raw);
        if matched.is_some() {
            tracing::debug!("Composition response matched shape: {}", name);
        }
        matched
    })
}

pub struct OpenRouterCompositionClient {
    http: OpenRouterHttpClient,
    model: String,
}

impl OpenRouterCompositionClient {
    pub fn new(api_key: String, model: String) -> Self {
        Self::new_with_client(api_key, model, reqwest::Client::new())
    }

    pub fn new_with_client(api_key: String, model: String, client: reqwest::Client) -> Self {
        Self {
            http: OpenRouterHttpClient::new_with_client(api_key, Duration::from_secs(120), client),
            model,
        }
    }

    #[cfg(test)]
    fn with_base_url(mut self, base_url: String) -> Self {
        self.http = self.http.with_base_url(base_url);
        self
    }

    fn build_request(
        &self,
        room_url: String,
        product_url: String,
        instruction: &str,
    ) -> ChatCompletionRequest {
        let prompt = prompts::render(prompts::COMPOSITION_WRAPPER, &[("instruction", instruction)]);

        ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: vec![
                    ContentItem::Text { text: prompt },
                    ContentItem::ImageUrl {
                        image_url: ImageUrl { url: room_url },
                    },
                    ContentItem::ImageUrl {
                        image_url: ImageUrl { url: product_url },
                    },
                ],
            }],
        }
    }
}

#[async_trait]
impl CompositionService for OpenRouterCompositionClient {
    async fn compose_image_in_room(
        &self,
        room_image: &MediaPart,
        product_image: &MediaPart,
        instruction: &str,
    ) -> Result<ImageRef> {
        let (room_url, product_url) = room_image
            .to_data_url()
            .zip(product_image.to_data_url())
            .ok_or_else(|| {
                Error::MissingInput(
                    "Both the room image and the product image must carry image data.".to_string(),
                )
            })?;

        let request = self.build_request(room_url, product_url, instruction);
        let raw: Value = self.http.chat_completion(&request).await?;

        if let Some(result) = parse_composition_response(&raw) {
            return Ok(result);
        }

        // Some upstreams report failures inside a 200 body.
        if let Some(error) = raw
            .get("error")
            .and_then(|e| serde_json::from_value::<ErrorBody>(e.clone()).ok())
        {
            return Err(classify(ProviderError::Status(error), Operation::Composition));
        }

        let raw_text = raw.to_string();
        tracing::error!("Unrecognized composition response format: {}", raw_text);
        Err(Error::UnrecognizedResponse {
            message: "AI did not return a valid image URL.".to_string(),
            raw: raw_text,
        })
    }
}
