use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header::AUTHORIZATION, HeaderMap},
    Json,
};
use chrono::DateTime;
use serde::{Deserialize, Serialize};

use crate::constants::ERR_CREDENTIALS_REQUIRED;
use crate::db::{StoreError, Table};
use crate::error::{AppError, Result};
use crate::models::{Identity, NewUser, RowId, UserRow};
use crate::security::{hash_password, issue_token, verify_password, verify_token, SessionClaims};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

impl CredentialsRequest {
    /// Username and password, or `None` when either is missing or blank
    fn parts(self) -> Option<(String, String)> {
        let username = self.username.map(|u| u.trim().to_string())?;
        let password = self.password?;
        if username.is_empty() || password.is_empty() {
            return None;
        }
        Some((username, password))
    }
}

/// Unwrap a credentials body, answering 400 `{error}` when it does not parse
fn credentials(
    payload: std::result::Result<Json<CredentialsRequest>, JsonRejection>,
) -> Result<CredentialsRequest> {
    match payload {
        Ok(Json(request)) => Ok(request),
        Err(rejection) => {
            tracing::debug!("Rejected credentials body: {}", rejection);
            Err(AppError::InvalidInput(rejection.body_text()))
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RegisteredUser {
    pub id: RowId,
    pub username: String,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub message: String,
    pub user: RegisteredUser,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: Identity,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub user: Identity,
    pub expires: String,
}

/// Register a new user
///
/// POST /api/auth/register
///
/// Returns 400 when a field is missing or the username is taken. The stored
/// bcrypt hash never leaves the server.
pub async fn register_user(
    State(state): State<AppState>,
    payload: std::result::Result<Json<CredentialsRequest>, JsonRejection>,
) -> Result<Json<RegisterResponse>> {
    let (username, password) = credentials(payload)?
        .parts()
        .ok_or_else(|| AppError::InvalidInput(ERR_CREDENTIALS_REQUIRED.to_string()))?;

    if state
        .store
        .get_by_key(Table::Users, "username", &username)
        .await?
        .is_some()
    {
        tracing::info!("Registration rejected, username taken: {}", username);
        return Err(AppError::UserAlreadyExists);
    }

    let password_hash = hash_password(password).await?;
    let row = serde_json::to_value(NewUser::new(username.as_str(), password_hash))?;

    let created = match state.store.insert(Table::Users, row).await {
        Ok(created) => created,
        Err(StoreError::Conflict { .. }) => return Err(AppError::UserAlreadyExists),
        Err(e) => return Err(AppError::UserCreationFailed(e)),
    };
    let user: UserRow = serde_json::from_value(created)?;

    tracing::info!("New user registered: {}", user.username);

    Ok(Json(RegisterResponse {
        message: "User created successfully".to_string(),
        user: RegisteredUser {
            id: user.id,
            username: user.username,
        },
    }))
}

/// Credential check.
///
/// Fails closed: unknown users, users without a stored hash, malformed rows
/// and wrong passwords all produce `None`.
pub async fn authenticate(
    state: &AppState,
    username: &str,
    password: String,
) -> Result<Option<Identity>> {
    let Some(row) = state
        .store
        .get_by_key(Table::Users, "username", username)
        .await?
    else {
        return Ok(None);
    };

    let user: UserRow = match serde_json::from_value(row) {
        Ok(user) => user,
        Err(e) => {
            tracing::warn!("Unreadable user row for {}: {}", username, e);
            return Ok(None);
        }
    };

    let Some(hash) = user.password_hash.clone() else {
        return Ok(None);
    };

    if verify_password(password, hash).await? {
        Ok(Some(user.identity()))
    } else {
        Ok(None)
    }
}

/// Exchange credentials for an identity token
///
/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    payload: std::result::Result<Json<CredentialsRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>> {
    let (username, password) = credentials(payload)?
        .parts()
        .ok_or_else(|| AppError::InvalidInput(ERR_CREDENTIALS_REQUIRED.to_string()))?;

    let identity = authenticate(&state, &username, password)
        .await?
        .ok_or_else(|| {
            tracing::info!("Failed login for {}", username);
            AppError::InvalidCredentials
        })?;

    let claims = SessionClaims::new(identity.clone(), state.config.session_ttl_secs);
    let token = issue_token(&claims, &state.config.session_secret)?;

    Ok(Json(LoginResponse {
        token,
        user: identity,
    }))
}

/// Bearer token from the Authorization header
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
}

/// Current session read from the identity token
///
/// GET /api/auth/session with `Authorization: Bearer <token>`
pub async fn session(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<SessionResponse>> {
    let token = bearer_token(&headers).ok_or(AppError::Unauthorized)?;
    let claims =
        verify_token(token, &state.config.session_secret).ok_or(AppError::Unauthorized)?;

    let expires = DateTime::from_timestamp(claims.exp, 0)
        .map(|dt| dt.to_rfc3339())
        .unwrap_or_default();

    Ok(Json(SessionResponse {
        user: claims.identity(),
        expires,
    }))
}
