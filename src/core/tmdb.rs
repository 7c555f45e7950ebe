use crate::core::fetcher::{BackoffFetcher, RetryPolicy};
use crate::domain::model::{ListPage, MovieDetail};
use crate::domain::ports::{ConfigProvider, Sleeper};
use crate::utils::error::{EtlError, Result};

pub const DEFAULT_BASE_URL: &str = "https://api.themoviedb.org/3";
pub const DEFAULT_LANGUAGE: &str = "en-US";

/// Thin wrapper over the two TMDB endpoints the ingestion needs.
pub struct TmdbClient<Z: Sleeper> {
    fetcher: BackoffFetcher<Z>,
    base_url: String,
    api_key: String,
    language: String,
}

impl<Z: Sleeper> TmdbClient<Z> {
    pub fn new(fetcher: BackoffFetcher<Z>, base_url: &str, api_key: &str, language: &str) -> Self {
        Self {
            fetcher,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            language: language.to_string(),
        }
    }

    /// 沒有 API key 就直接失敗，不發任何請求
    pub fn from_config<C: ConfigProvider>(config: &C, sleeper: Z) -> Result<Self> {
        let api_key = config
            .api_key()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| EtlError::MissingConfigError {
                field: "TMDB_API_KEY".to_string(),
            })?;

        let fetcher = BackoffFetcher::new(RetryPolicy::from_config(config), sleeper)?;
        Ok(Self::new(
            fetcher,
            config.api_base_url(),
            api_key,
            config.language(),
        ))
    }

    pub fn sleeper(&self) -> &Z {
        self.fetcher.sleeper()
    }

    pub async fn popular_movies(&self, page: u32) -> Result<ListPage> {
        let url = format!("{}/movie/popular", self.base_url);
        let mut query = self.base_query();
        query.push(("page", page.to_string()));
        self.fetcher.fetch(&url, &query).await
    }

    pub async fn movie_details(&self, movie_id: i64) -> Result<MovieDetail> {
        let url = format!("{}/movie/{}", self.base_url, movie_id);
        self.fetcher.fetch(&url, &self.base_query()).await
    }

    fn base_query(&self) -> Vec<(&'static str, String)> {
        vec![
            ("api_key", self.api_key.clone()),
            ("language", self.language.clone()),
        ]
    }
}
