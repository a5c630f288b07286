//! Caller-side conversation state for the stylist chat.

use crate::ai::ChatService;
use crate::media::MediaPart;
use crate::models::{ConversationHistory, ConversationTurn};
use crate::{prompts, Error, Result};

/// Owns the conversation history and grows it only after a successful reply,
/// keeping strict user/model alternation.
#[derive(Debug, Clone, Default)]
pub struct ChatSession {
    history: ConversationHistory,
}

impl ChatSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opening line shown before the first user message.
    pub fn greeting(&self) -> String {
        prompts::render(prompts::CHAT_GREETING, &[])
    }

    pub fn history(&self) -> &[ConversationTurn] {
        &self.history
    }

    pub fn reset(&mut self) {
        self.history.clear();
    }

    /// Assemble a user turn: optional image first, then the text.
    ///
    /// An image without text gets a default request for design advice.
    pub fn build_turn(text: &str, image: Option<MediaPart>) -> Result<ConversationTurn> {
        let text = text.trim();
        if text.is_empty() && image.is_none() {
            return Err(Error::MissingInput(
                "Type a message or attach a photo first.".to_string(),
            ));
        }

        let mut turn = Vec::with_capacity(2);
        if let Some(image) = image {
            if image.inline_data().is_none() {
                return Err(Error::MissingInput(
                    "The attached image has no data.".to_string(),
                ));
            }
            turn.push(image);
        }

        let text = if text.is_empty() {
            prompts::render(prompts::CHAT_IMAGE_ONLY, &[])
        } else {
            text.to_string()
        };
        turn.push(MediaPart::text(text));
        Ok(turn)
    }

    /// Send one message. On failure the history is left untouched, so the
    /// same message can simply be sent again.
    pub async fn send(
        &mut self,
        chat: &dyn ChatService,
        text: &str,
        image: Option<MediaPart>,
    ) -> Result<String> {
        let turn = Self::build_turn(text, image)?;
        let reply = chat.send_chat_turn(&self.history, &turn).await?;

        self.history.push(turn);
        self.history.push(vec![MediaPart::text(reply.clone())]);
        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::MockChatClient;
    use crate::models::Role;
    use crate::ErrorKind;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_build_turn_puts_image_first() {
        let image = MediaPart::from_bytes(&[1], "image/png");
        let turn = ChatSession::build_turn("what rug?", Some(image.clone())).unwrap();
        assert_eq!(turn, vec![image, MediaPart::text("what rug?")]);
    }

    #[test]
    fn test_image_only_gets_default_prompt() {
        let image = MediaPart::from_bytes(&[1], "image/png");
        let turn = ChatSession::build_turn("  ", Some(image)).unwrap();
        assert_eq!(
            turn[1].as_text(),
            Some("Please analyze this image and give me design advice.")
        );
    }

    #[test]
    fn test_empty_turn_is_rejected() {
        let err = ChatSession::build_turn("", None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingInput);
    }

    #[test]
    fn test_greeting_is_trimmed() {
        assert!(ChatSession::new().greeting().ends_with("design!"));
    }

    #[tokio::test]
    async fn test_history_alternates_after_successful_turns() {
        let chat = MockChatClient::new().with_reply("one").with_reply("two");
        let mut session = ChatSession::new();

        session.send(&chat, "hi", None).await.unwrap();
        session.send(&chat, "more", None).await.unwrap();

        let history = session.history();
        assert_eq!(history.len(), 4);
        for (i, turn) in history.iter().enumerate() {
            let expected = if i % 2 == 0 { Role::User } else { Role::Model };
            assert_eq!(Role::for_turn(i), expected);
            assert!(!turn.is_empty());
        }
        assert_eq!(history[3], vec![MediaPart::text("two")]);

        // The second call saw exactly the first exchange as history.
        let requests = chat.get_requests();
        assert_eq!(requests[1].0.len(), 2);
        assert_eq!(requests[1].1, vec![MediaPart::text("more")]);
    }

    #[tokio::test]
    async fn test_failed_turn_leaves_history_untouched() {
        let chat = MockChatClient::new()
            .with_reply("first")
            .with_failure(Error::RateLimit("busy".to_string()))
            .with_reply("retried");
        let mut session = ChatSession::new();

        session.send(&chat, "hello", None).await.unwrap();
        let err = session.send(&chat, "again", None).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RateLimit);
        assert_eq!(session.history().len(), 2);

        session.send(&chat, "again", None).await.unwrap();
        assert_eq!(session.history().len(), 4);
    }

    #[tokio::test]
    async fn test_reset_clears_history() {
        let chat = MockChatClient::new();
        let mut session = ChatSession::new();
        session.send(&chat, "hi", None).await.unwrap();
        session.reset();
        assert!(session.history().is_empty());
    }
}
