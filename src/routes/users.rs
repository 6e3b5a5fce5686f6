use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::db::{Query, StoreError, Table};
use crate::models::{UserPatch, UserRow, UserSummary, UserUpsert};
use crate::AppState;

/// Body of `POST admin/users`: one user or a bulk list
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum UserUpsertRequest {
    Many(Vec<UserPatch>),
    One(UserPatch),
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum UserUpsertResponse {
    One { success: bool, user: UserSummary },
    Many { success: bool, users: Vec<UserSummary> },
}

/// Failed admin write, rendered as `{success: false, error}`
#[derive(Debug)]
pub struct AdminWriteError {
    pub status: StatusCode,
    pub message: String,
}

impl AdminWriteError {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }
}

impl From<JsonRejection> for AdminWriteError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!("Rejected admin request body: {}", rejection);
        Self::invalid(rejection.body_text())
    }
}

impl From<StoreError> for AdminWriteError {
    fn from(err: StoreError) -> Self {
        tracing::error!("Admin write failed: {:?}", err);
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for AdminWriteError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::from(err).into()
    }
}

impl IntoResponse for AdminWriteError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "success": false,
            "error": self.message,
        }));
        (self.status, body).into_response()
    }
}

/// Decode stored user rows into their listing view
fn summaries(rows: Vec<serde_json::Value>) -> Result<Vec<UserSummary>, serde_json::Error> {
    rows.into_iter()
        .map(|row| serde_json::from_value::<UserRow>(row).map(|u| u.summary()))
        .collect()
}

/// List all users
///
/// GET /api/admin/users
///
/// Credential hashes are never included. Failures answer an empty list.
pub async fn list_users(State(state): State<AppState>) -> Json<Vec<UserSummary>> {
    let rows = match state.store.query_all(Table::Users, &Query::new()).await {
        Ok(rows) => rows,
        Err(e) => {
            tracing::error!("Failed to list users: {:?}", e);
            return Json(Vec::new());
        }
    };

    match summaries(rows) {
        Ok(users) => Json(users),
        Err(e) => {
            tracing::error!("Malformed user row: {}", e);
            Json(Vec::new())
        }
    }
}

/// Grant or revoke the pro flag, creating users that do not exist yet
///
/// POST /api/admin/users with `{username, is_pro?}` or an array of them.
/// `isPro` is accepted as a legacy spelling of `is_pro`.
pub async fn upsert_users(
    State(state): State<AppState>,
    request: Result<Json<UserUpsertRequest>, JsonRejection>,
) -> Result<Json<UserUpsertResponse>, AdminWriteError> {
    let Json(request) = request?;
    let (patches, single) = match request {
        UserUpsertRequest::One(patch) => (vec![patch], true),
        UserUpsertRequest::Many(patches) => (patches, false),
    };

    let upserts: Vec<UserUpsert> = patches.into_iter().map(UserPatch::normalize).collect();
    if upserts.iter().any(|u| u.username.is_empty()) {
        return Err(AdminWriteError::invalid("username is required"));
    }

    let rows = upserts
        .iter()
        .map(serde_json::to_value)
        .collect::<Result<Vec<_>, _>>()?;

    let written = state.store.upsert(Table::Users, rows, "username").await?;
    let mut users = summaries(written)?;

    tracing::info!("Upserted {} user(s)", users.len());

    if single {
        let user = users
            .pop()
            .ok_or_else(|| StoreError::InvalidRow("upsert returned no row".to_string()))?;
        Ok(Json(UserUpsertResponse::One {
            success: true,
            user,
        }))
    } else {
        Ok(Json(UserUpsertResponse::Many {
            success: true,
            users,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_accepts_single_and_bulk() {
        let one: UserUpsertRequest =
            serde_json::from_value(json!({ "username": "alice", "isPro": true })).unwrap();
        assert!(matches!(one, UserUpsertRequest::One(_)));

        let many: UserUpsertRequest =
            serde_json::from_value(json!([{ "username": "a" }, { "username": "b" }])).unwrap();
        match many {
            UserUpsertRequest::Many(patches) => assert_eq!(patches.len(), 2),
            UserUpsertRequest::One(_) => panic!("expected bulk request"),
        }
    }

    #[test]
    fn test_request_without_username_is_rejected() {
        let result = serde_json::from_value::<UserUpsertRequest>(json!({ "is_pro": true }));
        assert!(result.is_err());
    }

    #[test]
    fn test_admin_write_error_body() {
        let response = AdminWriteError::invalid("username is required").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
