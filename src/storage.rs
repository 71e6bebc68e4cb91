// Object-storage client for thumbnail/ad-image uploads.
//
// Talks to a Supabase-style storage REST API: an authenticated upsert PUT
// of the object body, then a deterministic public URL. Only the admin
// upload handler reaches this.

use anyhow::Context;
use reqwest::Client;

use crate::error::{AppError, Result};

#[derive(Clone)]
pub struct ObjectStorage {
    client: Client,
    base_url: String,
    bucket: String,
    service_key: String,
}

impl ObjectStorage {
    pub fn new(base_url: impl Into<String>, bucket: impl Into<String>, service_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            bucket: bucket.into(),
            service_key: service_key.into(),
        }
    }

    /// Upload bytes under `path` and return the public URL.
    pub async fn upload(&self, path: &str, bytes: Vec<u8>, content_type: &str) -> Result<String> {
        let path = path.trim_start_matches('/');
        if path.is_empty() {
            return Err(AppError::validation("upload path is required"));
        }

        let url = format!(
            "{}/storage/v1/object/{}/{}",
            self.base_url, self.bucket, path
        );
        let resp = self
            .client
            .put(&url)
            .bearer_auth(&self.service_key)
            .header("Content-Type", content_type)
            .header("x-upsert", "true")
            .body(bytes)
            .send()
            .await
            .context("storage request failed")
            .map_err(|e| AppError::Storage(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            tracing::warn!(%status, %body, "object upload rejected");
            return Err(AppError::Storage(format!("upload failed with {status}")));
        }

        Ok(self.public_url(path))
    }

    pub fn public_url(&self, path: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.base_url,
            self.bucket,
            path.trim_start_matches('/')
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_url_is_stable() {
        let storage = ObjectStorage::new("https://media.example.com/", "tucheki", "key");
        assert_eq!(
            storage.public_url("/thumbs/safari.jpg"),
            "https://media.example.com/storage/v1/object/public/tucheki/thumbs/safari.jpg"
        );
    }
}
