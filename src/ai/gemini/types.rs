//! Shared Gemini payload types used across chat and video modules.

use crate::media::MediaPart;
use crate::normalize::ErrorBody;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Gemini content container used in requests.
#[derive(Debug, Clone, Serialize)]
pub struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    pub parts: Vec<MediaPart>,
}

/// Top-level `generateContent` response envelope.
#[derive(Debug, Deserialize)]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

/// Candidate completion item returned by Gemini.
#[derive(Debug, Deserialize)]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<ResponseContent>,
}

/// Response-side content. Parts are decoded leniently so non-text parts
/// (function calls, inline media) never fail the whole response.
#[derive(Debug, Deserialize)]
pub struct ResponseContent {
    #[serde(default)]
    pub parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
pub struct ResponsePart {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub thought: Option<bool>,
}

impl GenerateContentResponse {
    /// Concatenated text of the first candidate, excluding thought parts.
    pub fn text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let text: String = content
            .parts
            .iter()
            .filter(|p| p.thought != Some(true))
            .filter_map(|p| p.text.as_deref())
            .collect();
        (!text.trim().is_empty()).then_some(text)
    }
}

/// Request body for `predictLongRunning` video jobs.
#[derive(Debug, Serialize)]
pub struct PredictRequest {
    pub instances: Vec<VideoInstance>,
    pub parameters: VideoParameters,
}

#[derive(Debug, Serialize)]
pub struct VideoInstance {
    pub prompt: String,
    pub image: StillImage,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StillImage {
    pub bytes_base64_encoded: String,
    pub mime_type: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoParameters {
    pub aspect_ratio: String,
    pub sample_count: u32,
}

/// An in-flight video job: the provider handle plus its completion flag.
#[derive(Debug, Deserialize)]
pub struct VideoOperation {
    pub name: String,
    #[serde(default)]
    pub done: bool,
    #[serde(default)]
    pub error: Option<ErrorBody>,
    #[serde(default)]
    pub response: Option<Value>,
}

/// Locations a finished operation may report its asset under, in priority order.
const VIDEO_URI_POINTERS: &[&str] = &[
    "/generateVideoResponse/generatedSamples/0/video/uri",
    "/generatedVideos/0/video/uri",
];

impl VideoOperation {
    /// The playable-asset locator of a finished operation, if any.
    pub fn video_uri(&self) -> Option<&str> {
        let response = self.response.as_ref()?;
        VIDEO_URI_POINTERS
            .iter()
            .find_map(|pointer| response.pointer(pointer).and_then(Value::as_str))
            .filter(|uri| !uri.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_concatenates_parts_and_skips_thoughts() {
        let response: GenerateContentResponse = serde_json::from_value(serde_json::json!({
            "candidates": [{
                "content": {
                    "role": "model",
                    "parts": [
                        { "text": "thinking...", "thought": true },
                        { "text": "A walnut " },
                        { "functionCall": { "name": "noop" } },
                        { "text": "sideboard." }
                    ]
                }
            }]
        }))
        .unwrap();
        assert_eq!(response.text().as_deref(), Some("A walnut sideboard."));
    }

    #[test]
    fn test_text_none_without_candidates() {
        let response: GenerateContentResponse =
            serde_json::from_value(serde_json::json!({ "promptFeedback": {} })).unwrap();
        assert!(response.text().is_none());
    }

    #[test]
    fn test_video_uri_from_rest_shape() {
        let op: VideoOperation = serde_json::from_value(serde_json::json!({
            "name": "models/veo/operations/1",
            "done": true,
            "response": {
                "generateVideoResponse": {
                    "generatedSamples": [{ "video": { "uri": "https://files.test/v:download?alt=media" } }]
                }
            }
        }))
        .unwrap();
        assert_eq!(
            op.video_uri(),
            Some("https://files.test/v:download?alt=media")
        );
    }

    #[test]
    fn test_video_uri_from_sdk_shape() {
        let op: VideoOperation = serde_json::from_value(serde_json::json!({
            "name": "n",
            "done": true,
            "response": { "generatedVideos": [{ "video": { "uri": "https://files.test/x" } }] }
        }))
        .unwrap();
        assert_eq!(op.video_uri(), Some("https://files.test/x"));
    }

    #[test]
    fn test_video_uri_missing() {
        let op: VideoOperation =
            serde_json::from_value(serde_json::json!({ "name": "n", "done": true })).unwrap();
        assert!(op.video_uri().is_none());
    }

    #[test]
    fn test_predict_request_wire_shape() {
        let request = PredictRequest {
            instances: vec![VideoInstance {
                prompt: "p".to_string(),
                image: StillImage {
                    bytes_base64_encoded: "AQID".to_string(),
                    mime_type: "image/jpeg".to_string(),
                },
            }],
            parameters: VideoParameters {
                aspect_ratio: "16:9".to_string(),
                sample_count: 1,
            },
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["instances"][0]["image"]["bytesBase64Encoded"], "AQID");
        assert_eq!(json["parameters"]["aspectRatio"], "16:9");
        assert_eq!(json["parameters"]["sampleCount"], 1);
    }
}
