use crate::normalize::{classify, Operation, ProviderError};
use crate::{Error, Result};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Lightweight Gemini REST client used by the chat and video adapters.
pub struct GeminiHttpClient {
    pub(crate) client: Client,
    pub(crate) api_key: String,
    model: String,
    pub(crate) base_url: String,
    timeout: Duration,
}

impl GeminiHttpClient {
    /// Construct a Gemini client.
    ///
    /// `model` should be the bare model ID (for example `gemini-2.5-flash`),
    /// not a `models/...`-prefixed path segment.
    pub fn new(api_key: String, model: String, timeout: Duration) -> Self {
        Self::new_with_client(api_key, model, timeout, Client::new())
    }

    pub fn new_with_client(
        api_key: String,
        model: String,
        timeout: Duration,
        client: Client,
    ) -> Self {
        let model = model.strip_prefix("models/").unwrap_or(&model).to_string();

        Self {
            client,
            api_key,
            model,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout,
        }
    }

    #[cfg(test)]
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    /// Returns the configured model ID without the `models/` prefix.
    pub fn model(&self) -> &str {
        &self.model
    }

    fn decode<Resp: DeserializeOwned>(body: String) -> Result<Resp> {
        serde_json::from_str(&body).map_err(|e| {
            tracing::error!("Failed to parse Gemini response: {}\nBody: {}", e, body);
            Error::UnrecognizedResponse {
                message: format!("Failed to parse Gemini response: {}", e),
                raw: body,
            }
        })
    }

    async fn read_body(response: reqwest::Response, operation: Operation) -> Result<String> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| classify(ProviderError::Transport(e), operation))?;

        if !status.is_success() {
            tracing::error!("Gemini API error (status {}): {}", status, body);
            return Err(classify(
                ProviderError::Http {
                    status: status.as_u16(),
                    body,
                },
                operation,
            ));
        }

        Ok(body)
    }

    async fn post_to_url<Req: Serialize, Resp: DeserializeOwned>(
        &self,
        url: String,
        request: &Req,
        operation: Operation,
    ) -> Result<Resp> {
        tracing::debug!("POST {}", url);

        let response = self
            .client
            .post(&url)
            .timeout(self.timeout)
            .header("x-goog-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to send request to Gemini: {}", e);
                classify(ProviderError::Transport(e), operation)
            })?;

        Self::decode(Self::read_body(response, operation).await?)
    }

    /// Calls Gemini's `generateContent` endpoint for chat requests.
    pub async fn generate_content<Req: Serialize, Resp: DeserializeOwned>(
        &self,
        request: &Req,
    ) -> Result<Resp> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );
        self.post_to_url(url, request, Operation::Chat).await
    }

    /// Submits a long-running job via `predictLongRunning`.
    pub async fn predict_long_running<Req: Serialize, Resp: DeserializeOwned>(
        &self,
        request: &Req,
    ) -> Result<Resp> {
        let url = format!(
            "{}/v1beta/models/{}:predictLongRunning",
            self.base_url, self.model
        );
        self.post_to_url(url, request, Operation::Video).await
    }

    /// Fetches the current state of a long-running operation by name.
    pub async fn get_operation<Resp: DeserializeOwned>(&self, name: &str) -> Result<Resp> {
        let url = format!("{}/v1beta/{}", self.base_url, name.trim_start_matches('/'));
        tracing::debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .timeout(self.timeout)
            .header("x-goog-api-key", &self.api_key)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to poll Gemini operation {}: {}", name, e);
                classify(ProviderError::Transport(e), Operation::Video)
            })?;

        Self::decode(Self::read_body(response, Operation::Video).await?)
    }
}
