//! Veo still-to-video synthesis.
//!
//! A job moves `Submitted -> Polling -> Done`, or ends in `Failed` from either
//! of the first two states. The poll loop is bounded by [`PollPolicy::max_wait`]
//! and observes a [`CancellationToken`] between polls.

use super::client::GeminiHttpClient;
use super::types::{PredictRequest, StillImage, VideoInstance, VideoOperation, VideoParameters};
use crate::ai::VideoService;
use crate::models::{PollPolicy, VideoHandle};
use crate::normalize::{classify, Operation, ProviderError};
use crate::{prompts, Error, Result};
use async_trait::async_trait;
use base64::Engine as _;
use chrono::Local;
use std::path::PathBuf;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// Upper bound on fetching the finished clip, body included.
const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(300);

pub struct GeminiVideoClient {
    http: GeminiHttpClient,
    policy: PollPolicy,
    download_timeout: Duration,
    output_dir: PathBuf,
}

impl GeminiVideoClient {
    pub fn new(api_key: String, model: String, output_dir: PathBuf) -> Self {
        Self::new_with_client(api_key, model, output_dir, reqwest::Client::new())
    }

    pub fn new_with_client(
        api_key: String,
        model: String,
        output_dir: PathBuf,
        client: reqwest::Client,
    ) -> Self {
        Self {
            http: GeminiHttpClient::new_with_client(
                api_key,
                model,
                Duration::from_secs(60),
                client,
            ),
            policy: PollPolicy::default(),
            download_timeout: DOWNLOAD_TIMEOUT,
            output_dir,
        }
    }

    pub fn with_poll_policy(mut self, policy: PollPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_download_timeout(mut self, timeout: Duration) -> Self {
        self.download_timeout = timeout;
        self
    }

    fn build_request(still_image: &[u8], mime_type: &str, aspect_ratio: &str) -> PredictRequest {
        PredictRequest {
            instances: vec![VideoInstance {
                prompt: prompts::render(prompts::VIDEO_PARALLAX, &[("aspect_ratio", aspect_ratio)]),
                image: StillImage {
                    bytes_base64_encoded: base64::engine::general_purpose::STANDARD
                        .encode(still_image),
                    mime_type: mime_type.to_string(),
                },
            }],
            parameters: VideoParameters {
                aspect_ratio: aspect_ratio.to_string(),
                sample_count: 1,
            },
        }
    }

    /// Poll until the operation is done and return its asset locator.
    async fn await_completion(
        &self,
        mut operation: VideoOperation,
        cancel: &CancellationToken,
    ) -> Result<String> {
        let started = Instant::now();
        let mut polls = 0u32;

        while !operation.done {
            if let Some(max_wait) = self.policy.max_wait {
                if started.elapsed() >= max_wait {
                    tracing::error!(
                        "Video operation {} still running after {} polls; giving up",
                        operation.name,
                        polls
                    );
                    return Err(Error::Timeout(format!(
                        "Video generation did not finish within {}s.",
                        max_wait.as_secs()
                    )));
                }
            }

            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(Error::Cancelled),
                _ = tokio::time::sleep(self.policy.interval) => {}
            }

            polls += 1;
            let refreshed = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(Error::Cancelled),
                refreshed = self.http.get_operation::<VideoOperation>(&operation.name) => refreshed?,
            };
            operation = refreshed;
            tracing::debug!(
                "Poll {} of {}: done={}",
                polls,
                operation.name,
                operation.done
            );
        }

        tracing::info!("Video operation {} finished after {} polls", operation.name, polls);

        if let Some(error) = operation.error.take() {
            return Err(classify(ProviderError::Status(error), Operation::Video));
        }

        operation.video_uri().map(str::to_string).ok_or_else(|| {
            Error::NoAsset("Video generation completed, but no download link was found.".to_string())
        })
    }

    fn download_url(&self, locator: &str) -> Result<url::Url> {
        let mut url = url::Url::parse(locator).map_err(|e| {
            Error::Download(format!("Invalid video download link {}: {}", locator, e))
        })?;
        url.query_pairs_mut().append_pair("key", &self.http.api_key);
        Ok(url)
    }

    /// Fetch the asset body and its content type.
    async fn fetch_asset(&self, url: url::Url) -> Result<(String, Vec<u8>)> {
        let transfer_error = |e: reqwest::Error| {
            tracing::error!("Failed to download video: {}", e);
            if e.is_timeout() {
                Error::Timeout(format!(
                    "Video download did not finish within {}s.",
                    self.download_timeout.as_secs()
                ))
            } else {
                Error::Download(format!("Failed to download the generated video: {}", e))
            }
        };

        let response = self
            .http
            .client
            .get(url)
            .timeout(self.download_timeout)
            .send()
            .await
            .map_err(transfer_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!("Failed to download video. Status: {} {}", status, body);
            return Err(Error::Download(format!(
                "Failed to download the generated video. Server responded with: {}",
                status.canonical_reason().unwrap_or(status.as_str())
            )));
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .filter(|v| v.starts_with("video/"))
            .unwrap_or("video/mp4")
            .to_string();

        let bytes = response.bytes().await.map_err(transfer_error)?;
        Ok((content_type, bytes.to_vec()))
    }

    async fn download(&self, locator: &str, cancel: &CancellationToken) -> Result<VideoHandle> {
        let url = self.download_url(locator)?;
        tracing::info!("Downloading video from {}", locator);

        let (content_type, bytes) = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tracing::info!("Video download cancelled");
                return Err(Error::Cancelled);
            }
            fetched = self.fetch_asset(url) => fetched?,
        };

        let io_error = |e: std::io::Error| {
            Error::Download(format!("Failed to store the generated video: {}", e))
        };
        tokio::fs::create_dir_all(&self.output_dir)
            .await
            .map_err(io_error)?;
        let path = self.output_dir.join(format!(
            "video_{}_{}.mp4",
            Local::now().format("%Y-%m-%d"),
            Uuid::new_v4()
        ));
        tokio::fs::write(&path, &bytes).await.map_err(io_error)?;
        tracing::info!("Saved video ({} bytes) to {}", bytes.len(), path.display());

        Ok(VideoHandle {
            path,
            content_type,
            size: bytes.len() as u64,
        })
    }
}

#[cfg(test)]
super::impl_with_gemini_base_url!(GeminiVideoClient);

#[async_trait]
impl VideoService for GeminiVideoClient {
    async fn synthesize_video(
        &self,
        still_image: &[u8],
        mime_type: &str,
        aspect_ratio: &str,
        cancel: &CancellationToken,
    ) -> Result<VideoHandle> {
        if still_image.is_empty() {
            return Err(Error::MissingInput(
                "Failed to process product image.".to_string(),
            ));
        }

        let request = Self::build_request(still_image, mime_type, aspect_ratio);
        let operation: VideoOperation = self.http.predict_long_running(&request).await?;
        tracing::info!(
            "Submitted video job {} ({}, aspect ratio {})",
            operation.name,
            self.http.model(),
            aspect_ratio
        );

        let locator = self.await_completion(operation, cancel).await?;
        self.download(&locator, cancel).await
    }
}
