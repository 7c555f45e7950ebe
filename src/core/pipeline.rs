use crate::core::sleeper::TokioSleeper;
use crate::core::tmdb::TmdbClient;
use crate::core::uploader::BatchUploader;
use crate::core::walker::PaginationWalker;
use crate::domain::model::MovieRecord;
use crate::domain::ports::{ConfigProvider, Pipeline, Sleeper, Storage};
use crate::utils::error::Result;

/// 熱門電影 -> 明細 -> 過濾 -> NDJSON 上傳
pub struct MovieIngestPipeline<S: Storage, Z: Sleeper = TokioSleeper> {
    walker: PaginationWalker<Z>,
    uploader: BatchUploader<S>,
    pages: u32,
}

impl<S: Storage> MovieIngestPipeline<S, TokioSleeper> {
    pub fn new<C: ConfigProvider>(storage: S, config: &C) -> Result<Self> {
        Self::with_sleeper(storage, config, TokioSleeper)
    }
}

impl<S: Storage, Z: Sleeper> MovieIngestPipeline<S, Z> {
    /// Fails with `MissingConfigError` when no API key is configured.
    pub fn with_sleeper<C: ConfigProvider>(storage: S, config: &C, sleeper: Z) -> Result<Self> {
        let client = TmdbClient::from_config(config, sleeper)?;
        Ok(Self {
            walker: PaginationWalker::new(client, config.rate_limit_delay()),
            uploader: BatchUploader::new(storage, config.bucket()),
            pages: config.pages(),
        })
    }
}

#[async_trait::async_trait]
impl<S: Storage, Z: Sleeper> Pipeline for MovieIngestPipeline<S, Z> {
    async fn extract(&self) -> Result<Vec<MovieRecord>> {
        self.walker.walk(self.pages).await
    }

    async fn load(&self, records: Vec<MovieRecord>) -> Result<String> {
        self.uploader.upload(records).await
    }
}
