pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::cli::{CliConfig, LocalStorage};

pub use config::lambda::LambdaConfig;
#[cfg(feature = "s3")]
pub use config::lambda::S3Storage;

pub use core::{
    etl::{EtlEngine, RunOutcome},
    pipeline::MovieIngestPipeline,
};
pub use utils::error::{EtlError, Result};
