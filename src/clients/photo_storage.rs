use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum PhotoStorageError {
    #[error("photo storage request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("photo storage rejected the request: {0}")]
    Rejected(String),
}

#[derive(Debug, Serialize)]
struct DeleteObjectRequest<'a> {
    photo_id: Uuid,
    storage_path: &'a str,
}

/// Client for the external service that owns photo bytes. Uploads happen
/// directly against that service; this client only asks it to drop an
/// object when the matching record is removed here.
#[derive(Clone)]
pub struct PhotoStorageClient {
    client: reqwest::Client,
    base_url: String,
}

impl PhotoStorageClient {
    pub fn new(base_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub async fn delete_object(
        &self,
        photo_id: Uuid,
        storage_path: &str,
    ) -> Result<(), PhotoStorageError> {
        let url = format!("{}/photos/delete", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&DeleteObjectRequest {
                photo_id,
                storage_path,
            })
            .send()
            .await?;

        if !response.status().is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(PhotoStorageError::Rejected(text));
        }

        Ok(())
    }
}
