use crate::core::Pipeline;
use crate::utils::error::Result;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    Uploaded { key: String, records: usize },
    /// Nothing survived the filter; no object was written.
    Empty,
}

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    pub async fn run(&self) -> Result<RunOutcome> {
        tracing::info!("🚀 Starting TMDB ingestion");

        let records = self.pipeline.extract().await?;
        tracing::info!("Total movies with financial data: {}", records.len());

        if records.is_empty() {
            tracing::warn!("⚠️ No movies fetched, skipping upload. Check the API key and filters");
            return Ok(RunOutcome::Empty);
        }

        let count = records.len();
        let key = self.pipeline.load(records).await?;
        tracing::info!("🎉 Ingestion complete. Object key: {}", key);

        Ok(RunOutcome::Uploaded {
            key,
            records: count,
        })
    }
}
