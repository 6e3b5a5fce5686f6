use axum::{extract::State, Json};
use chrono::Utc;
use serde::Serialize;
use serde_json::Value;

use crate::constants::{GRADED_STATUS, RECENT_HISTORY_LIMIT};
use crate::db::{Query, Table};
use crate::error::Result;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct AuditResponse {
    pub metrics: Vec<Value>,
    pub recent: Vec<Value>,
    pub timestamp: String,
}

/// Graded history rows, newest game first
pub fn recent_graded_query() -> Query {
    Query::new()
        .eq("status", GRADED_STATUS)
        .order_desc("game_date")
        .limit(RECENT_HISTORY_LIMIT)
}

/// Accuracy report: per-league aggregates plus the latest graded picks
///
/// GET /api/audit
///
/// Rows are returned exactly as stored. Any store error is a 500.
pub async fn audit_report(State(state): State<AppState>) -> Result<Json<AuditResponse>> {
    let metrics = state
        .store
        .query_all(Table::AuditSummary, &Query::new())
        .await?;

    let recent = state
        .store
        .query_all(Table::PredictionsHistory, &recent_graded_query())
        .await?;

    tracing::debug!(
        "Audit report: {} leagues, {} recent picks",
        metrics.len(),
        recent.len()
    );

    Ok(Json(AuditResponse {
        metrics,
        recent,
        timestamp: Utc::now().to_rfc3339(),
    }))
}
