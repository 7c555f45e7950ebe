use crate::core::filter;
use crate::core::tmdb::TmdbClient;
use crate::domain::model::{MovieRecord, MovieSummary};
use crate::domain::ports::Sleeper;
use crate::utils::error::{EtlError, Result};
use std::time::Duration;

/// TMDB 限制約 40 req / 10s
pub const DEFAULT_RATE_LIMIT_DELAY: Duration = Duration::from_millis(250);

/// Result of one detail lookup.
#[derive(Debug)]
pub enum ItemOutcome {
    Kept(MovieRecord),
    Filtered { movie_id: i64 },
    Failed { movie_id: i64, error: EtlError },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WalkStats {
    pub pages: u32,
    pub listed: usize,
    pub malformed: usize,
    pub filtered: usize,
    pub failed: usize,
    pub kept: usize,
}

pub struct PaginationWalker<Z: Sleeper> {
    client: TmdbClient<Z>,
    rate_limit_delay: Duration,
}

impl<Z: Sleeper> PaginationWalker<Z> {
    pub fn new(client: TmdbClient<Z>, rate_limit_delay: Duration) -> Self {
        Self {
            client,
            rate_limit_delay,
        }
    }

    pub async fn walk(&self, total_pages: u32) -> Result<Vec<MovieRecord>> {
        let (records, _) = self.walk_with_stats(total_pages).await?;
        Ok(records)
    }

    /// Listing failures abort the walk; detail failures only skip the item.
    pub async fn walk_with_stats(&self, total_pages: u32) -> Result<(Vec<MovieRecord>, WalkStats)> {
        let mut records = Vec::new();
        let mut stats = WalkStats::default();

        for page in 1..=total_pages {
            tracing::info!("📥 Fetching popular movies page {}/{}", page, total_pages);

            let listing = self.client.popular_movies(page).await.map_err(|e| {
                tracing::error!("❌ Failed to fetch listing page {}: {}", page, e);
                e
            })?;

            let kept_before = records.len();
            for summary in &listing.summaries() {
                stats.listed += 1;

                let outcome = match self.process_item(summary).await {
                    Some(outcome) => outcome,
                    None => {
                        stats.malformed += 1;
                        continue;
                    }
                };

                match outcome {
                    ItemOutcome::Kept(record) => {
                        stats.kept += 1;
                        records.push(record);
                    }
                    ItemOutcome::Filtered { .. } => stats.filtered += 1,
                    ItemOutcome::Failed { movie_id, error } => {
                        stats.failed += 1;
                        log_item_failure(movie_id, &error);
                    }
                }
            }
            stats.pages += 1;

            tracing::info!(
                page,
                kept_on_page = records.len() - kept_before,
                total = records.len(),
                "✅ Page {} complete: {} new, {} movies collected so far",
                page,
                records.len() - kept_before,
                records.len()
            );

            if listing.total_pages.is_some_and(|last| page >= last) && page < total_pages {
                tracing::info!(
                    "Upstream reports only {} page(s), stopping early",
                    page
                );
                break;
            }
        }

        tracing::info!(
            "📊 Walk finished: {} pages, {} listed, {} malformed, {} filtered, {} failed, {} kept",
            stats.pages,
            stats.listed,
            stats.malformed,
            stats.filtered,
            stats.failed,
            stats.kept
        );

        Ok((records, stats))
    }

    /// `None` when the summary has no usable id.
    pub async fn process_item(&self, summary: &MovieSummary) -> Option<ItemOutcome> {
        let Some(movie_id) = summary.movie_id() else {
            tracing::debug!(
                "Skipping listing item without a usable id (title: {:?})",
                summary.title
            );
            return None;
        };

        let outcome = self.fetch_item(movie_id).await;

        // 不論成功失敗都要節流
        self.client.sleeper().sleep(self.rate_limit_delay).await;

        Some(outcome)
    }

    async fn fetch_item(&self, movie_id: i64) -> ItemOutcome {
        match self.client.movie_details(movie_id).await {
            Ok(detail) => match filter::consider(detail) {
                Some(record) => ItemOutcome::Kept(record),
                None => ItemOutcome::Filtered { movie_id },
            },
            Err(error) => ItemOutcome::Failed { movie_id, error },
        }
    }
}

fn log_item_failure(movie_id: i64, error: &EtlError) {
    match error {
        EtlError::ClientError { .. }
        | EtlError::ServerError { .. }
        | EtlError::TransientError { .. }
        | EtlError::ApiError(_) => {
            tracing::warn!("⚠️ HTTP error for movie {}: {}", movie_id, error)
        }
        _ => tracing::error!("❌ Unexpected error for movie {}: {}", movie_id, error),
    }
}
