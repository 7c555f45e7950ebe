use crate::domain::model::MovieRecord;
use crate::domain::ports::Storage;
use crate::utils::error::{EtlError, Result};
use chrono::{DateTime, Utc};

pub const NDJSON_CONTENT_TYPE: &str = "application/x-ndjson";

/// `raw/movies/<YYYY-MM-DD>/movies_<HH-MM-SS>.json`, both parts from the same instant.
pub fn object_key(at: DateTime<Utc>) -> String {
    format!(
        "raw/movies/{}/movies_{}.json",
        at.format("%Y-%m-%d"),
        at.format("%H-%M-%S")
    )
}

/// 每筆一行 JSON，不包陣列、結尾不加換行
pub fn to_ndjson(records: &[MovieRecord]) -> Result<String> {
    let lines = records
        .iter()
        .map(serde_json::to_string)
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(lines.join("\n"))
}

pub struct BatchUploader<S: Storage> {
    storage: S,
    bucket: String,
}

impl<S: Storage> BatchUploader<S> {
    pub fn new(storage: S, bucket: impl Into<String>) -> Self {
        Self {
            storage,
            bucket: bucket.into(),
        }
    }

    pub async fn upload(&self, records: Vec<MovieRecord>) -> Result<String> {
        self.upload_at(records, Utc::now()).await
    }

    pub async fn upload_at(&self, records: Vec<MovieRecord>, at: DateTime<Utc>) -> Result<String> {
        let key = object_key(at);
        let payload = to_ndjson(&records)?;

        tracing::debug!(
            "Writing {} bytes to {}/{}",
            payload.len(),
            self.bucket,
            key
        );

        if let Err(e) = self
            .storage
            .write_object(&key, payload.as_bytes(), NDJSON_CONTENT_TYPE)
            .await
        {
            tracing::error!("❌ Upload to s3://{}/{} failed: {}", self.bucket, key, e);
            return Err(match e {
                EtlError::StorageError { .. } => e,
                other => EtlError::StorageError {
                    key,
                    message: other.to_string(),
                },
            });
        }

        tracing::info!(
            "☁️ Uploaded {} movies to s3://{}/{}",
            records.len(),
            self.bucket,
            key
        );
        Ok(key)
    }
}
