use crate::domain::ports::EvidenceStorage;
use crate::error::AppError;
use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::error;

/// Uploads evidence blobs to the configured media service and returns the
/// stable URL it assigns. The client timeout bounds the whole submit path:
/// uploads run before any ledger mutation, so a timeout aborts cleanly.
pub struct HttpMediaStorage {
    client: Client,
    api_url: String,
    api_key: String,
}

impl HttpMediaStorage {
    pub fn new(api_url: String, api_key: String, timeout_secs: u64) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .expect("Failed to build media HTTP client");

        Self { client, api_url, api_key }
    }
}

#[derive(Serialize)]
struct UploadPayload {
    folder: String,
    content_base64: String,
}

#[derive(Deserialize)]
struct UploadResponse {
    secure_url: String,
}

#[async_trait]
impl EvidenceStorage for HttpMediaStorage {
    async fn store(&self, data: &[u8], category: &str) -> Result<String, AppError> {
        let payload = UploadPayload {
            folder: format!("verification/{}", category),
            content_base64: general_purpose::STANDARD.encode(data),
        };

        let res = self.client.post(&self.api_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                let msg = format!("Media service connection error: {}", e);
                error!("{}", msg);
                AppError::UploadFailed(msg)
            })?;

        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_default();
            let msg = format!("Media service failed. Status: {}, Body: {}", status, text);
            error!("{}", msg);
            return Err(AppError::UploadFailed(msg));
        }

        let body: UploadResponse = res.json().await
            .map_err(|e| AppError::UploadFailed(format!("Invalid media service response: {}", e)))?;

        Ok(body.secure_url)
    }
}
