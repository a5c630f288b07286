//! OpenRouter request payloads (OpenAI-compatible chat completions).
//!
//! Responses are parsed as `serde_json::Value` because image-capable models
//! do not agree on where they put the result.

use serde::Serialize;

/// Request body for OpenRouter chat completions.
#[derive(Debug, Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
}

/// Chat message object.
#[derive(Debug, Serialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: Vec<ContentItem>,
}

/// One typed content segment in a multipart message.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentItem {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

/// Image source: an `https://` URL or a `data:` URL with base64 payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageUrl {
    pub url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_items_serialize_with_type_tag() {
        let message = ChatMessage {
            role: "user".to_string(),
            content: vec![
                ContentItem::Text {
                    text: "hi".to_string(),
                },
                ContentItem::ImageUrl {
                    image_url: ImageUrl {
                        url: "data:image/png;base64,AQID".to_string(),
                    },
                },
            ],
        };

        let json = serde_json::to_value(&message).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "role": "user",
                "content": [
                    { "type": "text", "text": "hi" },
                    { "type": "image_url", "image_url": { "url": "data:image/png;base64,AQID" } }
                ]
            })
        );
    }
}
