use crate::domain::ports::{ConfigProvider, Sleeper};
use crate::utils::error::{EtlError, Result};
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::future::Future;
use std::time::Duration;

pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub request_timeout: Duration,
    pub base_delay: Duration,
    pub delay_offset: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            base_delay: Duration::from_secs(1),
            delay_offset: Duration::from_millis(250),
        }
    }
}

impl RetryPolicy {
    pub fn from_config<C: ConfigProvider>(config: &C) -> Self {
        Self {
            max_attempts: config.max_attempts(),
            request_timeout: config.request_timeout(),
            ..Self::default()
        }
    }

    /// Wait before the retry that follows the 0-indexed `attempt`.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        backoff_delay(attempt, self.base_delay, self.delay_offset)
    }
}

/// `base * 2^attempt + offset`, saturating instead of overflowing.
pub fn backoff_delay(attempt: u32, base: Duration, offset: Duration) -> Duration {
    base.saturating_mul(2_u32.saturating_pow(attempt))
        .saturating_add(offset)
}

/// 重試 `op` 直到成功、遇到不可重試的錯誤，或用完次數
pub async fn retry_with_backoff<T, F, Fut, Z>(
    policy: &RetryPolicy,
    sleeper: &Z,
    label: &str,
    mut op: F,
) -> Result<T>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T>>,
    Z: Sleeper,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 0;

    loop {
        let err = match op(attempt).await {
            Ok(value) => return Ok(value),
            Err(e) => e,
        };

        if !err.is_retryable() {
            tracing::warn!(
                attempt = attempt + 1,
                "⛔ Non-retryable error for {}: {}",
                label,
                err
            );
            return Err(err);
        }

        if attempt + 1 >= max_attempts {
            tracing::error!(
                attempt = attempt + 1,
                max_attempts,
                "❌ Giving up on {} after {} attempt(s): {}",
                label,
                attempt + 1,
                err
            );
            return Err(EtlError::TransientError {
                attempts: attempt + 1,
                message: err.to_string(),
            });
        }

        let wait = policy.delay_for(attempt);
        tracing::warn!(
            attempt = attempt + 1,
            max_attempts,
            wait_secs = wait.as_secs_f64(),
            "🔄 Transient error for {}: {}. Retrying in {:.2}s",
            label,
            err,
            wait.as_secs_f64()
        );
        sleeper.sleep(wait).await;
        attempt += 1;
    }
}

/// GET + JSON decode with bounded exponential backoff.
pub struct BackoffFetcher<Z: Sleeper> {
    client: Client,
    policy: RetryPolicy,
    sleeper: Z,
}

impl<Z: Sleeper> BackoffFetcher<Z> {
    pub fn new(policy: RetryPolicy, sleeper: Z) -> Result<Self> {
        let client = Client::builder().timeout(policy.request_timeout).build()?;
        Ok(Self {
            client,
            policy,
            sleeper,
        })
    }

    pub fn sleeper(&self) -> &Z {
        &self.sleeper
    }

    pub async fn fetch<T: DeserializeOwned>(&self, url: &str, query: &[(&str, String)]) -> Result<T> {
        retry_with_backoff(&self.policy, &self.sleeper, url, move |attempt| {
            self.fetch_once(url, query, attempt)
        })
        .await
    }

    async fn fetch_once<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
        attempt: u32,
    ) -> Result<T> {
        // query 內含 api_key，只記錄路徑
        tracing::debug!("GET {} (attempt {})", url, attempt + 1);

        // reqwest 的錯誤訊息會帶完整 URL（含 api_key），先拿掉
        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| EtlError::ApiError(e.without_url()))?;
        let status = response.status();
        tracing::debug!("Response status for {}: {}", url, status);

        if status.is_client_error() {
            return Err(EtlError::ClientError {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        if !status.is_success() {
            return Err(EtlError::ServerError {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| EtlError::ApiError(e.without_url()))?;
        serde_json::from_slice(&body).map_err(|e| EtlError::DecodeError {
            url: url.to_string(),
            message: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::sleeper::testing::RecordingSleeper;
    use httpmock::prelude::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn assert_close(actual: Duration, expected_secs: f64) {
        assert!(
            (actual.as_secs_f64() - expected_secs).abs() < 1e-9,
            "expected {}s, got {:?}",
            expected_secs,
            actual
        );
    }

    #[test]
    fn test_backoff_delay_sequence() {
        let policy = RetryPolicy::default();

        assert_close(policy.delay_for(0), 1.25);
        assert_close(policy.delay_for(1), 2.25);
        assert_close(policy.delay_for(2), 4.25);
    }

    #[test]
    fn test_backoff_delay_saturates() {
        let delay = backoff_delay(64, Duration::from_secs(1), Duration::from_millis(250));
        assert!(delay > Duration::from_secs(1_000_000));
    }

    #[tokio::test]
    async fn test_two_server_errors_then_success() {
        let sleeper = RecordingSleeper::new();
        let calls = AtomicU32::new(0);

        let result = retry_with_backoff(&RetryPolicy::default(), &sleeper, "flaky", |_| {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n < 2 {
                    Err(EtlError::ServerError {
                        status: 503,
                        url: "http://test/flaky".to_string(),
                    })
                } else {
                    Ok("third time lucky")
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), "third time lucky");
        assert_eq!(calls.load(Ordering::SeqCst), 3);

        let sleeps = sleeper.calls();
        assert_eq!(sleeps.len(), 2);
        assert_close(sleeps[0], 1.25);
        assert_close(sleeps[1], 2.25);
    }

    #[tokio::test]
    async fn test_client_error_short_circuits() {
        let sleeper = RecordingSleeper::new();
        let calls = AtomicU32::new(0);

        let result: Result<()> = retry_with_backoff(&RetryPolicy::default(), &sleeper, "missing", |_| {
            calls.fetch_add(1, Ordering::SeqCst);
            async {
                Err(EtlError::ClientError {
                    status: 404,
                    url: "http://test/missing".to_string(),
                })
            }
        })
        .await;

        assert!(matches!(result, Err(EtlError::ClientError { status: 404, .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(sleeper.calls().is_empty());
    }

    #[tokio::test]
    async fn test_fetch_returns_parsed_body() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(GET)
                .path("/movie/550")
                .query_param("api_key", "secret");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!({"id": 550, "title": "Fight Club"}));
        });

        let fetcher = BackoffFetcher::new(RetryPolicy::default(), RecordingSleeper::new()).unwrap();
        let body: serde_json::Value = fetcher
            .fetch(&server.url("/movie/550"), &[("api_key", "secret".to_string())])
            .await
            .unwrap();

        api_mock.assert();
        assert_eq!(body["title"], "Fight Club");
        assert!(fetcher.sleeper().calls().is_empty());
    }

    #[tokio::test]
    async fn test_fetch_404_is_not_retried() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(GET).path("/movie/1");
            then.status(404);
        });

        let fetcher = BackoffFetcher::new(RetryPolicy::default(), RecordingSleeper::new()).unwrap();
        let result: Result<serde_json::Value> = fetcher.fetch(&server.url("/movie/1"), &[]).await;

        api_mock.assert_hits(1);
        assert!(matches!(result, Err(EtlError::ClientError { status: 404, .. })));
        assert!(fetcher.sleeper().calls().is_empty());
    }

    #[tokio::test]
    async fn test_fetch_500_exhausts_attempts() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(GET).path("/movie/popular");
            then.status(500);
        });

        let fetcher = BackoffFetcher::new(RetryPolicy::default(), RecordingSleeper::new()).unwrap();
        let result: Result<serde_json::Value> =
            fetcher.fetch(&server.url("/movie/popular"), &[]).await;

        api_mock.assert_hits(3);
        assert!(matches!(result, Err(EtlError::TransientError { attempts: 3, .. })));

        let sleeps = fetcher.sleeper().calls();
        assert_eq!(sleeps.len(), 2);
        assert_close(sleeps[0], 1.25);
        assert_close(sleeps[1], 2.25);
    }

    #[tokio::test]
    async fn test_fetch_connection_refused_is_transient() {
        let policy = RetryPolicy {
            max_attempts: 2,
            request_timeout: Duration::from_secs(2),
            ..RetryPolicy::default()
        };
        let fetcher = BackoffFetcher::new(policy, RecordingSleeper::new()).unwrap();

        // 埠號 1 通常沒有服務在聽
        let result: Result<serde_json::Value> = fetcher.fetch("http://127.0.0.1:1/", &[]).await;

        assert!(matches!(result, Err(EtlError::TransientError { attempts: 2, .. })));
        assert_eq!(fetcher.sleeper().calls().len(), 1);
    }

    #[tokio::test]
    async fn test_transport_error_text_omits_api_key() {
        let policy = RetryPolicy {
            max_attempts: 2,
            request_timeout: Duration::from_secs(2),
            ..RetryPolicy::default()
        };
        let fetcher = BackoffFetcher::new(policy, RecordingSleeper::new()).unwrap();

        let result: Result<serde_json::Value> = fetcher
            .fetch(
                "http://127.0.0.1:1/movie/5",
                &[("api_key", "SUPERSECRETKEY".to_string())],
            )
            .await;

        let err = result.unwrap_err();
        let text = format!("{} {:?}", err, err);
        assert!(matches!(err, EtlError::TransientError { .. }));
        assert!(!text.contains("SUPERSECRETKEY"), "key leaked: {}", text);
    }

    #[tokio::test]
    async fn test_fetch_malformed_body_is_decode_error() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(GET).path("/movie/2");
            then.status(200).body("<html>not json</html>");
        });

        let fetcher = BackoffFetcher::new(RetryPolicy::default(), RecordingSleeper::new()).unwrap();
        let result: Result<serde_json::Value> = fetcher.fetch(&server.url("/movie/2"), &[]).await;

        api_mock.assert_hits(1);
        assert!(matches!(result, Err(EtlError::DecodeError { .. })));
    }
}
