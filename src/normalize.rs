//! Provider error classification
//!
//! Raw failures from either provider are reduced to an [`Error`] with a
//! user-facing message. Classification prefers structured data: the HTTP
//! status first, then a JSON error body, then JSON embedded somewhere inside a
//! free-form message. Substring matching is the last resort and is only applied
//! when no structured error could be recovered.
//!
//! Gemini returns `{"error":{"code","message","status"}}` bodies and sometimes
//! wraps them in a one-element array. OpenRouter returns
//! `{"error":{"message","code"}}`. Long-running video operations report the
//! same object under the operation's `error` field with a 200 status.

use crate::Error;
use serde::Deserialize;
use serde_json::Value;

const RESOURCE_EXHAUSTED: &str = "RESOURCE_EXHAUSTED";

pub const CHAT_RATE_LIMIT_MESSAGE: &str =
    "I'm currently overloaded with requests. Please try again in a minute.";
pub const COMPOSITION_RATE_LIMIT_MESSAGE: &str =
    "The image service is busy right now. Please try again shortly.";
pub const VIDEO_RATE_LIMIT_MESSAGE: &str =
    "You've exceeded your API quota. Please check your plan and billing details.";

/// The adapter that observed the failure; selects the user-facing wording.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Chat,
    Composition,
    Video,
}

/// A provider failure before classification.
#[derive(Debug)]
pub enum ProviderError {
    /// Non-success HTTP response with its body text.
    Http { status: u16, body: String },
    /// Structured error object delivered inside a successful payload.
    Status(ErrorBody),
    /// Free-form error text that may embed a JSON fragment.
    Message(String),
    /// The request never produced a response.
    Transport(reqwest::Error),
}

impl From<reqwest::Error> for ProviderError {
    fn from(e: reqwest::Error) -> Self {
        ProviderError::Transport(e)
    }
}

/// Common shape of provider error objects.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub code: Option<Value>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl ErrorBody {
    fn code(&self) -> Option<i64> {
        match self.code.as_ref()? {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    fn is_rate_limit(&self) -> bool {
        self.code() == Some(429)
            || self
                .status
                .as_deref()
                .is_some_and(|s| s.eq_ignore_ascii_case(RESOURCE_EXHAUSTED))
    }
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

fn envelope_from_value(value: Value) -> Option<ErrorBody> {
    let value = match value {
        Value::Array(mut items) if !items.is_empty() => items.swap_remove(0),
        other => other,
    };
    serde_json::from_value::<ErrorEnvelope>(value)
        .ok()
        .map(|envelope| envelope.error)
}

/// Locate and parse an `{"error": {...}}` object inside arbitrary text.
pub fn extract_error_body(text: &str) -> Option<ErrorBody> {
    let trimmed = text.trim();
    if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
        return envelope_from_value(value);
    }

    [('{', '}'), ('[', ']')]
        .into_iter()
        .find_map(|(open, close)| {
            let tail = &trimmed[trimmed.find(open)?..];
            // Trailing prose after the fragment is cut at the last closer.
            let end = tail.rfind(close)?;
            serde_json::from_str::<Value>(tail)
                .or_else(|_| serde_json::from_str::<Value>(&tail[..=end]))
                .ok()
        })
        .and_then(envelope_from_value)
}

fn mentions_rate_limit(text: &str) -> bool {
    text.contains("429")
        || text.contains("Quota exceeded")
        || text.to_uppercase().contains(RESOURCE_EXHAUSTED)
}

struct Diagnosis {
    rate_limited: bool,
    provider_message: Option<String>,
    fallback: String,
}

fn diagnose(error: &ProviderError) -> Diagnosis {
    match error {
        ProviderError::Http { status, body } => {
            let parsed = extract_error_body(body);
            let rate_limited = *status == 429
                || parsed.as_ref().is_some_and(ErrorBody::is_rate_limit)
                || mentions_rate_limit(body);
            let fallback = if body.trim().is_empty() {
                reqwest::StatusCode::from_u16(*status)
                    .ok()
                    .and_then(|s| s.canonical_reason().map(str::to_string))
                    .unwrap_or_else(|| format!("HTTP status {}", status))
            } else {
                body.clone()
            };
            Diagnosis {
                rate_limited,
                provider_message: parsed.and_then(|b| b.message),
                fallback,
            }
        }
        ProviderError::Status(body) => Diagnosis {
            rate_limited: body.is_rate_limit(),
            provider_message: body.message.clone(),
            fallback: "Unknown error".to_string(),
        },
        ProviderError::Message(text) => {
            let parsed = extract_error_body(text);
            let rate_limited = match &parsed {
                Some(body) => body.is_rate_limit() || mentions_rate_limit(text),
                None => mentions_rate_limit(text),
            };
            Diagnosis {
                rate_limited,
                provider_message: parsed.and_then(|b| b.message),
                fallback: text.clone(),
            }
        }
        ProviderError::Transport(e) => Diagnosis {
            rate_limited: false,
            provider_message: None,
            fallback: format!("Network error: {}", e),
        },
    }
}

/// Classify a raw provider failure observed by `operation`.
pub fn classify(error: ProviderError, operation: Operation) -> Error {
    tracing::warn!("Classifying {:?} provider failure: {:?}", operation, error);

    if let ProviderError::Transport(e) = &error {
        if e.is_timeout() {
            return Error::Timeout(format!("The request timed out: {}", e));
        }
    }

    let diagnosis = diagnose(&error);

    if diagnosis.rate_limited {
        let message = match operation {
            Operation::Chat => CHAT_RATE_LIMIT_MESSAGE,
            Operation::Composition => COMPOSITION_RATE_LIMIT_MESSAGE,
            Operation::Video => VIDEO_RATE_LIMIT_MESSAGE,
        };
        return Error::RateLimit(message.to_string());
    }

    let message = match (operation, diagnosis.provider_message) {
        (Operation::Chat, Some(message)) => message,
        (Operation::Composition, Some(message)) => format!("OpenRouter Error: {}", message),
        (Operation::Video, Some(message)) => format!("API Error: {}", message),
        (Operation::Composition, None) => format!("OpenRouter Error: {}", diagnosis.fallback),
        (_, None) => diagnosis.fallback,
    };

    Error::Transport(message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    fn http(status: u16, body: &str) -> ProviderError {
        ProviderError::Http {
            status,
            body: body.to_string(),
        }
    }

    #[test]
    fn test_http_429_is_rate_limit_for_every_operation() {
        for op in [Operation::Chat, Operation::Composition, Operation::Video] {
            let err = classify(http(429, "slow down"), op);
            assert_eq!(err.kind(), ErrorKind::RateLimit);
        }
    }

    #[test]
    fn test_json_status_field_is_rate_limit() {
        let body = r#"{"error":{"code":400,"message":"quota","status":"RESOURCE_EXHAUSTED"}}"#;
        let err = classify(http(400, body), Operation::Chat);
        assert_eq!(err.kind(), ErrorKind::RateLimit);
        assert_eq!(err.message(), CHAT_RATE_LIMIT_MESSAGE);
    }

    #[test]
    fn test_json_code_field_is_rate_limit() {
        let body = r#"[{"error":{"code":429,"message":"Resource has been exhausted"}}]"#;
        let err = classify(http(500, body), Operation::Video);
        assert_eq!(err.kind(), ErrorKind::RateLimit);
        assert_eq!(err.message(), VIDEO_RATE_LIMIT_MESSAGE);
    }

    #[test]
    fn test_string_code_field_is_rate_limit() {
        let body = r#"{"error":{"code":"429","message":"Rate limit exceeded"}}"#;
        let err = classify(http(400, body), Operation::Composition);
        assert_eq!(err.kind(), ErrorKind::RateLimit);
        assert_eq!(err.message(), COMPOSITION_RATE_LIMIT_MESSAGE);
    }

    #[test]
    fn test_marker_in_http_body_message_is_rate_limit() {
        let body = r#"{"error":{"code":400,"message":"RESOURCE_EXHAUSTED: quota for project"}}"#;
        let err = classify(http(400, body), Operation::Chat);
        assert_eq!(err.kind(), ErrorKind::RateLimit);
        assert_eq!(err.message(), CHAT_RATE_LIMIT_MESSAGE);
    }

    #[test]
    fn test_quota_exceeded_in_http_body_message_is_rate_limit() {
        let body = r#"{"error":{"code":500,"message":"Quota exceeded for quota metric"}}"#;
        let err = classify(http(500, body), Operation::Composition);
        assert_eq!(err.kind(), ErrorKind::RateLimit);
        assert_eq!(err.message(), COMPOSITION_RATE_LIMIT_MESSAGE);
    }

    #[test]
    fn test_marker_kind_is_independent_of_carrier() {
        let text = "Quota exceeded for quota metric";
        let body = format!(r#"{{"error":{{"code":503,"message":"{}"}}}}"#, text);
        let via_http = classify(http(503, &body), Operation::Video);
        let via_message = classify(ProviderError::Message(text.to_string()), Operation::Video);
        assert_eq!(via_http.kind(), via_message.kind());
        assert_eq!(via_http.kind(), ErrorKind::RateLimit);
    }

    #[test]
    fn test_embedded_json_in_message_is_recovered() {
        let text = r#"got status 400 Bad Request. {"error":{"code":429,"message":"quota","status":"RESOURCE_EXHAUSTED"}}"#;
        let err = classify(ProviderError::Message(text.to_string()), Operation::Chat);
        assert_eq!(err.kind(), ErrorKind::RateLimit);
    }

    #[test]
    fn test_substring_fallback_detects_rate_limit() {
        for text in [
            "upstream said 429 Too Many Requests",
            "Quota exceeded for metric",
            "status: resource_exhausted",
        ] {
            let err = classify(ProviderError::Message(text.to_string()), Operation::Chat);
            assert_eq!(err.kind(), ErrorKind::RateLimit, "text: {}", text);
        }
    }

    #[test]
    fn test_chat_surfaces_provider_message_verbatim() {
        let body = r#"{"error":{"code":400,"message":"API key not valid","status":"INVALID_ARGUMENT"}}"#;
        let err = classify(http(400, body), Operation::Chat);
        assert_eq!(err.kind(), ErrorKind::Transport);
        assert_eq!(err.message(), "API key not valid");
    }

    #[test]
    fn test_video_prefixes_provider_message() {
        let err = classify(
            ProviderError::Status(ErrorBody {
                code: Some(Value::from(13)),
                status: Some("INTERNAL".to_string()),
                message: Some("backend exploded".to_string()),
            }),
            Operation::Video,
        );
        assert_eq!(err.message(), "API Error: backend exploded");
    }

    #[test]
    fn test_composition_prefixes_provider_message() {
        let body = r#"{"error":{"message":"No endpoints found","code":404}}"#;
        let err = classify(http(404, body), Operation::Composition);
        assert_eq!(err.message(), "OpenRouter Error: No endpoints found");
    }

    #[test]
    fn test_empty_body_falls_back_to_status_reason() {
        let err = classify(http(503, ""), Operation::Composition);
        assert_eq!(err.message(), "OpenRouter Error: Service Unavailable");
    }

    #[test]
    fn test_plain_message_passes_through() {
        let err = classify(
            ProviderError::Message("something odd".to_string()),
            Operation::Video,
        );
        assert_eq!(err.kind(), ErrorKind::Transport);
        assert_eq!(err.message(), "something odd");
    }

    #[test]
    fn test_extract_error_body_ignores_trailing_text() {
        let body = extract_error_body(r#"prefix {"error":{"message":"m"}} trailing"#).unwrap();
        assert_eq!(body.message.as_deref(), Some("m"));
    }

    #[test]
    fn test_extract_error_body_none_for_prose() {
        assert!(extract_error_body("no json here").is_none());
    }
}
