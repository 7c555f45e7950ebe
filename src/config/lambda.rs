use super::{validate_settings, DEFAULT_BASE_URL, DEFAULT_BUCKET, DEFAULT_LANGUAGE, DEFAULT_PAGES};
use crate::core::fetcher::{DEFAULT_MAX_ATTEMPTS, DEFAULT_REQUEST_TIMEOUT};
use crate::core::walker::DEFAULT_RATE_LIMIT_DELAY;
use crate::core::ConfigProvider;
use crate::utils::error::{EtlError, Result};
use crate::utils::validation::Validate;
use std::env;
use std::str::FromStr;
use std::time::Duration;

#[cfg(feature = "s3")]
use crate::core::Storage;
#[cfg(feature = "s3")]
use aws_config::BehaviorVersion;
#[cfg(feature = "s3")]
use aws_sdk_s3::config::Region;
#[cfg(feature = "s3")]
use aws_sdk_s3::error::DisplayErrorContext;
#[cfg(feature = "s3")]
use aws_sdk_s3::primitives::ByteStream;
#[cfg(feature = "s3")]
use aws_sdk_s3::Client as S3Client;

/// Settings read from the process environment (Lambda, containers).
#[derive(Clone)]
pub struct LambdaConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub language: String,
    pub s3_bucket: String,
    pub s3_region: Option<String>,
    pub pages: u32,
    pub max_attempts: u32,
    pub request_timeout: Duration,
    pub rate_limit_delay: Duration,
}

impl LambdaConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            api_key: env::var("TMDB_API_KEY").ok(),
            base_url: env::var("TMDB_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
            language: env::var("TMDB_LANGUAGE").unwrap_or_else(|_| DEFAULT_LANGUAGE.to_string()),
            s3_bucket: env::var("S3_BUCKET").unwrap_or_else(|_| DEFAULT_BUCKET.to_string()),
            s3_region: env::var("S3_REGION").ok(),
            pages: parse_env("NUM_PAGES", DEFAULT_PAGES)?,
            max_attempts: parse_env("MAX_ATTEMPTS", DEFAULT_MAX_ATTEMPTS)?,
            request_timeout: Duration::from_secs(parse_env(
                "REQUEST_TIMEOUT_SECS",
                DEFAULT_REQUEST_TIMEOUT.as_secs(),
            )?),
            rate_limit_delay: Duration::from_millis(parse_env(
                "RATE_LIMIT_MS",
                DEFAULT_RATE_LIMIT_DELAY.as_millis() as u64,
            )?),
        })
    }
}

/// 有設定但不是數字就報錯，不要默默用預設值
fn parse_env<T: FromStr>(name: &str, default: T) -> Result<T> {
    parse_optional(name, env::var(name).ok(), default)
}

fn parse_optional<T: FromStr>(name: &str, raw: Option<String>, default: T) -> Result<T> {
    match raw {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| EtlError::InvalidConfigValueError {
                field: name.to_string(),
                value: raw.clone(),
                reason: "expected an integer".to_string(),
            }),
    }
}

impl ConfigProvider for LambdaConfig {
    fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    fn api_base_url(&self) -> &str {
        &self.base_url
    }

    fn language(&self) -> &str {
        &self.language
    }

    fn pages(&self) -> u32 {
        self.pages
    }

    fn bucket(&self) -> &str {
        &self.s3_bucket
    }

    fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    fn rate_limit_delay(&self) -> Duration {
        self.rate_limit_delay
    }
}

impl Validate for LambdaConfig {
    fn validate(&self) -> Result<()> {
        validate_settings(self, true)
    }
}

#[cfg(feature = "s3")]
#[derive(Debug, Clone)]
pub struct S3Storage {
    client: S3Client,
    bucket: String,
}

#[cfg(feature = "s3")]
impl S3Storage {
    pub fn new(client: S3Client, bucket: String) -> Self {
        Self { client, bucket }
    }

    /// Builds a client from the default AWS credential chain.
    pub async fn connect(bucket: &str, region: Option<&str>) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(region) = region {
            loader = loader.region(Region::new(region.to_string()));
        }
        let config = loader.load().await;
        Self::new(S3Client::new(&config), bucket.to_string())
    }
}

#[cfg(feature = "s3")]
impl Storage for S3Storage {
    async fn write_object(&self, key: &str, data: &[u8], content_type: &str) -> Result<()> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(data.to_vec()))
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| EtlError::StorageError {
                key: key.to_string(),
                message: DisplayErrorContext(&e).to_string(),
            })?;

        Ok(())
    }
}
