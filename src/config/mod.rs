#[cfg(feature = "cli")]
pub mod cli;
pub mod lambda;

use crate::core::fetcher::{DEFAULT_MAX_ATTEMPTS, DEFAULT_REQUEST_TIMEOUT};
use crate::core::walker::DEFAULT_RATE_LIMIT_DELAY;
use crate::utils::error::Result;
use crate::utils::validation::{
    validate_bucket_name, validate_non_empty_string, validate_range, validate_required_field,
    validate_url,
};

pub const DEFAULT_BUCKET: &str = "vshah-tmdb-pipeline";
pub const DEFAULT_PAGES: u32 = 5;
/// TMDB 的 popular 列表最多 500 頁
pub const MAX_PAGES: u32 = 500;

pub use crate::core::tmdb::{DEFAULT_BASE_URL, DEFAULT_LANGUAGE};

#[cfg(feature = "cli")]
pub use cli::CliConfig;

/// Checks shared by every configuration source.
pub(crate) fn validate_settings<C: crate::core::ConfigProvider>(
    config: &C,
    check_bucket: bool,
) -> Result<()> {
    let api_key = config.api_key().map(str::to_string);
    let api_key = validate_required_field("TMDB_API_KEY", &api_key)?;
    validate_non_empty_string("TMDB_API_KEY", api_key).map_err(|_| {
        crate::utils::error::EtlError::MissingConfigError {
            field: "TMDB_API_KEY".to_string(),
        }
    })?;

    validate_url("base_url", config.api_base_url())?;
    validate_non_empty_string("language", config.language())?;
    validate_range("pages", config.pages(), 1, MAX_PAGES)?;
    validate_range("max_attempts", config.max_attempts(), 1, 10)?;
    validate_range("timeout_secs", config.request_timeout().as_secs(), 1, 300)?;

    if check_bucket {
        validate_bucket_name("bucket", config.bucket())?;
    }

    tracing::debug!("✅ Configuration validation passed");
    Ok(())
}

pub(crate) fn default_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT.as_secs()
}

pub(crate) fn default_rate_limit_ms() -> u64 {
    DEFAULT_RATE_LIMIT_DELAY.as_millis() as u64
}

pub(crate) fn default_max_attempts() -> u32 {
    DEFAULT_MAX_ATTEMPTS
}
