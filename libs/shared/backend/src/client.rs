use std::time::Duration;

use anyhow::{anyhow, Result};
use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, error};

use shared_config::AppConfig;

/// Outcome of a collaborator call that distinguishes "no content" from a
/// real payload. The history endpoint answers 204 for patients without a
/// record, and callers must not treat that as a failure.
#[derive(Debug)]
pub enum BackendResponse<T> {
    Ok(T),
    NoContent,
}

/// Thin JSON client for the clinic's collaborator REST services. All calls
/// are bounded by the configured timeout; a timeout is reported the same way
/// as any other network failure.
pub struct BackendClient {
    client: Client,
    base_url: String,
}

impl BackendClient {
    pub fn new(config: &AppConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            base_url: config.backend_url.clone(),
        }
    }

    pub async fn request<T>(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<BackendResponse<T>>
    where
        T: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);
        debug!("Making request to {}", url);

        let mut req = self.client.request(method, &url);
        if let Some(body_data) = body {
            req = req.json(&body_data);
        }

        let response = req
            .send()
            .await
            .map_err(|e| anyhow!("Network error calling {}: {}", url, e))?;

        let status = response.status();
        if status == StatusCode::NO_CONTENT {
            return Ok(BackendResponse::NoContent);
        }

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!("Backend error ({}): {}", status, error_text);
            // The wire contract carries a plain error string, not a code.
            return Err(anyhow!("{}", error_text));
        }

        let data = response.json::<T>().await?;
        Ok(BackendResponse::Ok(data))
    }
}
