use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::Value;

use crate::constants::{
    DEFAULT_LEAGUE, DEFAULT_MODE, DETAILS_NO_ROW, DETAILS_STORE_NOT_CONFIGURED,
    ERR_PREDICTIONS_UNAVAILABLE,
};
use crate::db::Table;
use crate::models::{PredictionRecord, PredictionsUnavailable};
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct PredictionsParams {
    pub league: Option<String>,
    /// Intelligence mode; informational only
    pub mode: Option<String>,
    /// Slate date; informational only, the store keeps one payload per league
    pub date: Option<String>,
}

impl PredictionsParams {
    pub fn league(&self) -> &str {
        non_empty(self.league.as_deref()).unwrap_or(DEFAULT_LEAGUE)
    }

    pub fn mode(&self) -> &str {
        non_empty(self.mode.as_deref()).unwrap_or(DEFAULT_MODE)
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Outcome of a predictions lookup
#[derive(Debug)]
pub enum PredictionsResponse {
    Ready(Value),
    Unavailable(PredictionsUnavailable),
}

impl IntoResponse for PredictionsResponse {
    fn into_response(self) -> Response {
        match self {
            PredictionsResponse::Ready(payload) => Json(payload).into_response(),
            PredictionsResponse::Unavailable(body) => {
                (StatusCode::NOT_FOUND, Json(body)).into_response()
            }
        }
    }
}

/// Current prediction payload for a league
///
/// GET /api/predictions?league=<code>&mode=<mode>&date=<date>
///
/// Absence and store failures both answer 404 with context; `details` says
/// whether the store connection is configured at all.
pub async fn get_predictions(
    State(state): State<AppState>,
    Query(params): Query<PredictionsParams>,
) -> PredictionsResponse {
    let league = params.league();
    tracing::debug!(
        "Predictions requested: league={}, mode={}, date={:?}",
        league,
        params.mode(),
        params.date
    );

    let configured = state.config.store_credentials_present();

    let row = match state
        .store
        .get_by_key(Table::PredictionsStore, "league", league)
        .await
    {
        Ok(row) => row,
        Err(e) => {
            tracing::error!("Predictions query failed for {}: {:?}", league, e);
            let details = if configured {
                format!("Store query failed: {e}")
            } else {
                DETAILS_STORE_NOT_CONFIGURED.to_string()
            };
            return PredictionsResponse::Unavailable(PredictionsUnavailable::new(
                ERR_PREDICTIONS_UNAVAILABLE,
                details,
                league,
            ));
        }
    };

    let record = match row.map(serde_json::from_value::<PredictionRecord>) {
        Some(Ok(record)) => record,
        Some(Err(e)) => {
            tracing::error!("Malformed predictions row for {}: {}", league, e);
            return PredictionsResponse::Unavailable(PredictionsUnavailable::new(
                ERR_PREDICTIONS_UNAVAILABLE,
                format!("Stored row could not be read: {e}"),
                league,
            ));
        }
        None => {
            tracing::warn!("No predictions stored for league {}", league);
            let details = if configured {
                DETAILS_NO_ROW
            } else {
                DETAILS_STORE_NOT_CONFIGURED
            };
            return PredictionsResponse::Unavailable(PredictionsUnavailable::new(
                ERR_PREDICTIONS_UNAVAILABLE,
                details,
                league,
            ));
        }
    };

    PredictionsResponse::Ready(record.into_payload())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_params_defaults() {
        let params = PredictionsParams::default();
        assert_eq!(params.league(), "nba");
        assert_eq!(params.mode(), "safe");

        let blank = PredictionsParams {
            league: Some("  ".to_string()),
            mode: Some(String::new()),
            date: None,
        };
        assert_eq!(blank.league(), "nba");
        assert_eq!(blank.mode(), "safe");
    }

    #[test]
    fn test_params_keep_free_form_league() {
        let params = PredictionsParams {
            league: Some("EuroCup".to_string()),
            mode: Some("aggressive".to_string()),
            date: Some("2026-01-05".to_string()),
        };
        assert_eq!(params.league(), "EuroCup");
        assert_eq!(params.mode(), "aggressive");
    }
}
