use super::types::ChatCompletionRequest;
use crate::normalize::{classify, Operation, ProviderError};
use crate::{Error, Result};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://openrouter.ai";

pub struct OpenRouterHttpClient {
    pub(crate) client: Client,
    pub(crate) api_key: String,
    pub(crate) base_url: String,
    timeout: Duration,
}

impl OpenRouterHttpClient {
    pub fn new(api_key: String, timeout: Duration) -> Self {
        Self::new_with_client(api_key, timeout, Client::new())
    }

    pub fn new_with_client(api_key: String, timeout: Duration, client: Client) -> Self {
        Self {
            client,
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout,
        }
    }

    #[cfg(test)]
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    pub async fn post<Req: Serialize, Resp: DeserializeOwned>(
        &self,
        path: &str,
        request: &Req,
    ) -> Result<Resp> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!("POST {}", url);

        let response = self
            .client
            .post(&url)
            .timeout(self.timeout)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to send request to OpenRouter: {}", e);
                classify(ProviderError::Transport(e), Operation::Composition)
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| classify(ProviderError::Transport(e), Operation::Composition))?;

        if !status.is_success() {
            tracing::error!("OpenRouter API error (status {}): {}", status, body);
            return Err(classify(
                ProviderError::Http {
                    status: status.as_u16(),
                    body,
                },
                Operation::Composition,
            ));
        }

        serde_json::from_str(&body).map_err(|e| {
            tracing::error!("Failed to parse OpenRouter response: {}\nBody: {}", e, body);
            Error::UnrecognizedResponse {
                message: format!("Failed to parse OpenRouter response: {}", e),
                raw: body,
            }
        })
    }

    pub async fn chat_completion<Resp: DeserializeOwned>(
        &self,
        request: &ChatCompletionRequest,
    ) -> Result<Resp> {
        self.post("/api/v1/chat/completions", request).await
    }
}
