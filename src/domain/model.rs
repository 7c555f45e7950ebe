use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// 熱門電影列表的一頁；`results` 保持原始 JSON，壞掉的單筆不影響整頁
#[derive(Debug, Clone, Deserialize)]
pub struct ListPage {
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub results: Vec<serde_json::Value>,
    #[serde(default)]
    pub total_pages: Option<u32>,
}

impl ListPage {
    pub fn summaries(&self) -> Vec<MovieSummary> {
        self.results.iter().map(MovieSummary::from_value).collect()
    }
}

/// 列表中的單筆摘要，上游資料可能缺 id 或型別不對
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MovieSummary {
    pub id: Option<i64>,
    pub title: Option<String>,
}

impl MovieSummary {
    pub fn from_value(value: &serde_json::Value) -> Self {
        Self {
            id: value.get("id").and_then(|v| v.as_i64()),
            title: value
                .get("title")
                .and_then(|v| v.as_str())
                .map(str::to_string),
        }
    }

    pub fn movie_id(&self) -> Option<i64> {
        self.id
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Genre {
    pub id: i64,
    pub name: String,
}

/// `/movie/{id}` 的完整回應；只有 id 與 title 是必填
#[derive(Debug, Clone, Deserialize)]
pub struct MovieDetail {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub budget: Option<i64>,
    #[serde(default)]
    pub revenue: Option<i64>,
    #[serde(default)]
    pub popularity: Option<f64>,
    #[serde(default)]
    pub vote_average: Option<f64>,
    #[serde(default)]
    pub vote_count: Option<i64>,
    #[serde(default)]
    pub runtime: Option<i64>,
    #[serde(default)]
    pub genres: Vec<Genre>,
    #[serde(default)]
    pub original_language: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

impl MovieDetail {
    pub fn budget(&self) -> i64 {
        self.budget.unwrap_or(0)
    }

    pub fn revenue(&self) -> i64 {
        self.revenue.unwrap_or(0)
    }
}

/// One line of the NDJSON output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieRecord {
    pub movie_id: i64,
    pub title: String,
    pub release_date: Option<String>,
    pub budget: i64,
    pub revenue: i64,
    pub popularity: Option<f64>,
    pub vote_average: Option<f64>,
    pub vote_count: Option<i64>,
    pub runtime: Option<i64>,
    pub genres: Vec<String>,
    pub genre_ids: Vec<i64>,
    pub original_language: Option<String>,
    pub status: Option<String>,
    #[serde(rename = "_ingested_at")]
    pub ingested_at: String,
}

impl MovieRecord {
    pub fn from_detail(detail: MovieDetail, ingested_at: DateTime<Utc>) -> Self {
        let budget = detail.budget();
        let revenue = detail.revenue();
        let (genre_ids, genres) = detail.genres.into_iter().map(|g| (g.id, g.name)).unzip();

        Self {
            movie_id: detail.id,
            title: detail.title,
            release_date: detail.release_date,
            budget,
            revenue,
            popularity: detail.popularity,
            vote_average: detail.vote_average,
            vote_count: detail.vote_count,
            runtime: detail.runtime,
            genres,
            genre_ids,
            original_language: detail.original_language,
            status: detail.status,
            ingested_at: ingested_at.to_rfc3339_opts(SecondsFormat::Micros, true),
        }
    }
}
