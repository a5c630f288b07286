//! Data models and configuration
//!
//! Defines conversation, generation-result and storefront types shared by the
//! adapters, and the environment-driven [`Config`].

use crate::media::{InlineData, MediaPart};
use std::path::PathBuf;
use std::time::Duration;

/// One speaker's turn: an ordered list of parts.
pub type ConversationTurn = Vec<MediaPart>;

/// Alternating user/model turns, starting with the user.
///
/// The speaker is implied by position, see [`Role::for_turn`].
pub type ConversationHistory = Vec<ConversationTurn>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Model,
}

impl Role {
    /// Even positions are user turns, odd positions model turns.
    pub fn for_turn(index: usize) -> Self {
        if index % 2 == 0 {
            Role::User
        } else {
            Role::Model
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Model => "model",
        }
    }
}

/// Result of an image composition: a remote URL or inline bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageRef {
    Url(String),
    Inline(InlineData),
}

/// A downloaded video asset stored on local disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoHandle {
    pub path: PathBuf,
    pub content_type: String,
    pub size: u64,
}

/// Storefront product record supplied by the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Product {
    pub name: String,
    pub image_url: String,
}

/// Poll-loop bounds for long-running video jobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval: Duration,
    /// `None` polls until the job finishes.
    pub max_wait: Option<Duration>,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5),
            max_wait: Some(Duration::from_secs(600)),
        }
    }
}

// Configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub gemini_api_key: String,
    pub openrouter_api_key: String,
    pub chat_model: String,
    pub composition_model: String,
    pub video_model: String,
    pub poll_policy: PollPolicy,
    pub output_dir: PathBuf,
}

impl Config {
    pub fn from_env() -> crate::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup; `from_env` passes the process env.
    pub fn from_lookup<F>(lookup: F) -> crate::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let gemini_api_key = non_empty("GEMINI_API_KEY")
            .or_else(|| non_empty("API_KEY"))
            .ok_or_else(|| crate::Error::Config("GEMINI_API_KEY not set".to_string()))?;
        let openrouter_api_key = non_empty("OPENROUTER_API_KEY")
            .ok_or_else(|| crate::Error::Config("OPENROUTER_API_KEY not set".to_string()))?;

        let secs = |key: &str, default: u64| -> crate::Result<u64> {
            match non_empty(key) {
                Some(raw) => raw.trim().parse().map_err(|_| {
                    crate::Error::Config(format!("{} must be a whole number of seconds", key))
                }),
                None => Ok(default),
            }
        };

        let interval = secs("VIDEO_POLL_INTERVAL_SECS", 5)?;
        let max_wait = secs("VIDEO_MAX_WAIT_SECS", 600)?;

        Ok(Self {
            gemini_api_key,
            openrouter_api_key,
            chat_model: non_empty("CHAT_MODEL").unwrap_or_else(|| "gemini-2.5-flash".to_string()),
            composition_model: non_empty("COMPOSITION_MODEL")
                .unwrap_or_else(|| "black-forest-labs/flux.2-klein-4b".to_string()),
            video_model: non_empty("VIDEO_MODEL")
                .unwrap_or_else(|| "veo-2.0-generate-001".to_string()),
            poll_policy: PollPolicy {
                interval: Duration::from_secs(interval),
                max_wait: (max_wait > 0).then(|| Duration::from_secs(max_wait)),
            },
            output_dir: PathBuf::from(
                non_empty("OUTPUT_DIR").unwrap_or_else(|| "output".to_string()),
            ),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_role_follows_parity() {
        assert_eq!(Role::for_turn(0), Role::User);
        assert_eq!(Role::for_turn(1), Role::Model);
        assert_eq!(Role::for_turn(4).as_str(), "user");
        assert_eq!(Role::for_turn(7).as_str(), "model");
    }

    #[test]
    fn test_config_defaults() {
        let config = Config::from_lookup(lookup(&[
            ("GEMINI_API_KEY", "g-key"),
            ("OPENROUTER_API_KEY", "or-key"),
        ]))
        .unwrap();

        assert_eq!(config.chat_model, "gemini-2.5-flash");
        assert_eq!(config.video_model, "veo-2.0-generate-001");
        assert_eq!(config.poll_policy, PollPolicy::default());
        assert_eq!(config.output_dir, PathBuf::from("output"));
    }

    #[test]
    fn test_config_accepts_legacy_api_key() {
        let config = Config::from_lookup(lookup(&[
            ("API_KEY", "legacy"),
            ("OPENROUTER_API_KEY", "or-key"),
        ]))
        .unwrap();
        assert_eq!(config.gemini_api_key, "legacy");
    }

    #[test]
    fn test_config_missing_credential_is_config_error() {
        let err = Config::from_lookup(lookup(&[("GEMINI_API_KEY", "g-key")])).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
        assert!(err.message().contains("OPENROUTER_API_KEY"));

        let err = Config::from_lookup(lookup(&[
            ("GEMINI_API_KEY", "  "),
            ("OPENROUTER_API_KEY", "or-key"),
        ]))
        .unwrap_err();
        assert!(err.message().contains("GEMINI_API_KEY"));
    }

    #[test]
    fn test_config_zero_max_wait_disables_ceiling() {
        let config = Config::from_lookup(lookup(&[
            ("GEMINI_API_KEY", "g"),
            ("OPENROUTER_API_KEY", "o"),
            ("VIDEO_POLL_INTERVAL_SECS", "2"),
            ("VIDEO_MAX_WAIT_SECS", "0"),
        ]))
        .unwrap();
        assert_eq!(config.poll_policy.interval, Duration::from_secs(2));
        assert_eq!(config.poll_policy.max_wait, None);
    }

    #[test]
    fn test_config_rejects_malformed_seconds() {
        let err = Config::from_lookup(lookup(&[
            ("GEMINI_API_KEY", "g"),
            ("OPENROUTER_API_KEY", "o"),
            ("VIDEO_MAX_WAIT_SECS", "ten"),
        ]))
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
    }
}
