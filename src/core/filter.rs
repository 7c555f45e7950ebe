use crate::domain::model::{MovieDetail, MovieRecord};
use chrono::{DateTime, Utc};

/// 預算與票房都是 0 代表沒有財務資料，對 ROI 分析沒用
pub fn has_financial_data(detail: &MovieDetail) -> bool {
    detail.budget() != 0 || detail.revenue() != 0
}

/// Keep or drop a detail record, stamping the ingestion time now.
pub fn consider(detail: MovieDetail) -> Option<MovieRecord> {
    consider_at(detail, Utc::now())
}

pub fn consider_at(detail: MovieDetail, ingested_at: DateTime<Utc>) -> Option<MovieRecord> {
    if !has_financial_data(&detail) {
        tracing::debug!("Skipping movie {}: no financial data", detail.id);
        return None;
    }
    Some(MovieRecord::from_detail(detail, ingested_at))
}
