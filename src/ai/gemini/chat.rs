use super::client::GeminiHttpClient;
use super::types::{Content, GenerateContentResponse};
use crate::ai::ChatService;
use crate::media::MediaPart;
use crate::models::{ConversationTurn, Role};
use crate::{Error, Result};
use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;

#[derive(Debug, Serialize)]
struct ChatRequest {
    contents: Vec<Content>,
}

pub struct GeminiChatClient {
    http: GeminiHttpClient,
}

impl GeminiChatClient {
    pub fn new(api_key: String, model: String) -> Self {
        Self::new_with_client(api_key, model, reqwest::Client::new())
    }

    pub fn new_with_client(api_key: String, model: String, client: reqwest::Client) -> Self {
        Self {
            http: GeminiHttpClient::new_with_client(
                api_key,
                model,
                Duration::from_secs(60),
                client,
            ),
        }
    }

    /// Rebuild the provider session from `history` and append `new_turn` as
    /// the next user message. Roles come from position parity only.
    fn build_request(history: &[ConversationTurn], new_turn: &[MediaPart]) -> ChatRequest {
        let mut contents: Vec<Content> = history
            .iter()
            .enumerate()
            .map(|(i, turn)| Content {
                role: Some(Role::for_turn(i).as_str().to_string()),
                parts: turn.clone(),
            })
            .collect();

        contents.push(Content {
            role: Some(Role::User.as_str().to_string()),
            parts: new_turn.to_vec(),
        });

        ChatRequest { contents }
    }
}

#[cfg(test)]
super::impl_with_gemini_base_url!(GeminiChatClient);

#[async_trait]
impl ChatService for GeminiChatClient {
    async fn send_chat_turn(
        &self,
        history: &[ConversationTurn],
        new_turn: &[MediaPart],
    ) -> Result<String> {
        tracing::debug!(
            "Sending chat turn ({} prior turns, {} parts) to {}",
            history.len(),
            new_turn.len(),
            self.http.model()
        );

        let request = Self::build_request(history, new_turn);
        let response: GenerateContentResponse = self.http.generate_content(&request).await?;

        response
            .text()
            .ok_or_else(|| Error::EmptyResponse("No text response from AI.".to_string()))
    }
}
