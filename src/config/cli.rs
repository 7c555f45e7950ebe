use super::{
    default_max_attempts, default_rate_limit_ms, default_timeout_secs, validate_settings,
    DEFAULT_BASE_URL, DEFAULT_BUCKET, DEFAULT_LANGUAGE, DEFAULT_PAGES,
};
use crate::core::{ConfigProvider, Storage};
use crate::utils::error::Result;
use crate::utils::validation::Validate;
use clap::Parser;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Clone, Parser)]
#[command(name = "tmdb-ingest")]
#[command(about = "Ingest popular TMDB movies with financial data into S3 as NDJSON")]
pub struct CliConfig {
    #[arg(long, env = "TMDB_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    #[arg(long, env = "S3_BUCKET", default_value = DEFAULT_BUCKET)]
    pub bucket: String,

    #[arg(long, env = "S3_REGION")]
    pub s3_region: Option<String>,

    #[arg(long, env = "NUM_PAGES", default_value_t = DEFAULT_PAGES)]
    pub pages: u32,

    #[arg(long, env = "TMDB_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    #[arg(long, default_value = DEFAULT_LANGUAGE)]
    pub language: String,

    #[arg(long, default_value_t = default_max_attempts())]
    pub max_attempts: u32,

    #[arg(long, default_value_t = default_timeout_secs())]
    pub timeout_secs: u64,

    #[arg(long, default_value_t = default_rate_limit_ms())]
    pub rate_limit_ms: u64,

    #[arg(long, help = "Write to a local directory instead of S3")]
    pub output_path: Option<String>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,
}

// 不要把 api_key 印進 log
impl fmt::Debug for CliConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CliConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "***"))
            .field("bucket", &self.bucket)
            .field("s3_region", &self.s3_region)
            .field("pages", &self.pages)
            .field("base_url", &self.base_url)
            .field("language", &self.language)
            .field("max_attempts", &self.max_attempts)
            .field("timeout_secs", &self.timeout_secs)
            .field("rate_limit_ms", &self.rate_limit_ms)
            .field("output_path", &self.output_path)
            .field("verbose", &self.verbose)
            .finish()
    }
}

impl ConfigProvider for CliConfig {
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
        &self.bucket
    }

    fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    fn rate_limit_delay(&self) -> Duration {
        Duration::from_millis(self.rate_limit_ms)
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_settings(self, self.output_path.is_none())
    }
}

/// Writes objects under a local directory, mirroring the S3 key layout.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
}

impl LocalStorage {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }
}

impl Storage for LocalStorage {
    async fn write_object(&self, key: &str, data: &[u8], _content_type: &str) -> Result<()> {
        let full_path = self.base_path.join(key);

        if let Some(parent) = full_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        tokio::fs::write(&full_path, data).await?;
        tracing::debug!("Wrote {} bytes to {}", data.len(), full_path.display());
        Ok(())
    }
}
