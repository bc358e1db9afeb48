use crate::core::{ScreeningReport, RankingOutcome};
use crate::models::domain::{Requester, StructuredResponse};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub database: Option<bool>,
    pub enhanced_summaries: bool,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

/// Response for the listing filter endpoint
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterListingsResponse {
    #[serde(flatten)]
    pub report: ScreeningReport,
    /// URLs of accepted listings flagged as likely unsuitable
    pub unsuitable: Vec<String>,
}

/// Response for the ranking endpoint
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankResponsesResponse {
    pub results: Vec<StructuredResponse>,
    pub available_count: usize,
    pub summary: String,
    pub ranking_id: Option<Uuid>,
}

impl RankResponsesResponse {
    pub fn new(outcome: RankingOutcome, summary: String, ranking_id: Option<Uuid>) -> Self {
        Self {
            results: outcome.results,
            available_count: outcome.available_count,
            summary,
            ranking_id,
        }
    }
}

/// Response listing the active roster
#[derive(Debug, Clone, Serialize)]
pub struct RequestersResponse {
    pub requesters: Vec<Requester>,
    pub total: usize,
}
