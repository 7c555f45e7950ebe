use crate::domain::model::MovieRecord;
use crate::utils::error::Result;
use async_trait::async_trait;
use std::time::Duration;

pub trait Storage: Send + Sync {
    fn write_object(
        &self,
        key: &str,
        data: &[u8],
        content_type: &str,
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn api_key(&self) -> Option<&str>;
    fn api_base_url(&self) -> &str;
    fn language(&self) -> &str;
    fn pages(&self) -> u32;
    fn bucket(&self) -> &str;
    fn max_attempts(&self) -> u32;
    fn request_timeout(&self) -> Duration;
    fn rate_limit_delay(&self) -> Duration;
}

/// Sleeping is a port so backoff and throttling can be observed in tests.
pub trait Sleeper: Send + Sync {
    fn sleep(&self, duration: Duration) -> impl std::future::Future<Output = ()> + Send;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Vec<MovieRecord>>;
    async fn load(&self, records: Vec<MovieRecord>) -> Result<String>;
}
