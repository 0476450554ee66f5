use reqwest::Client;
use reqwest::multipart::{Form, Part};
use anyhow::{Result, anyhow};

use crate::config::ServerDefaults;
use crate::sample::{FrameOutcome, ProcessResponse};

/// HTTP client for the pose-estimation backend.
#[derive(Clone)]
pub struct PostureClient {
    client: Client,
    base_url: String,
}

impl PostureClient {
    pub fn new(base_url: &str) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    /// Use a preconfigured `reqwest` client (timeouts, proxy settings).
    pub fn with_client(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `GET /api/config`: the backend's default angle ranges.
    pub async fn fetch_defaults(&self) -> Result<ServerDefaults> {
        let url = format!("{}/api/config", self.base_url);

        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            return Err(anyhow!("Fetching default config failed with status: {}", response.status()));
        }

        let defaults: ServerDefaults = response.json().await?;
        Ok(defaults)
    }

    /// `POST /api/process-image` with the JPEG frame in the multipart field `file`.
    pub async fn process_image(&self, jpeg: Vec<u8>) -> Result<FrameOutcome> {
        let url = format!("{}/api/process-image", self.base_url);

        let part = Part::bytes(jpeg)
            .file_name("frame.jpg")
            .mime_str("image/jpeg")?;
        let form = Form::new().part("file", part);

        let response = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "Frame submission failed with status: {}. Is the posture backend running at {}?",
                response.status(),
                self.base_url
            ));
        }

        let body: ProcessResponse = response.json().await?;
        body.into_outcome()
    }
}
