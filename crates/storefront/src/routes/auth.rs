//! Authentication route handlers.
//!
//! Registration and login run through [`AuthService`]; the resulting identity
//! is held in the Postgres-backed session as a [`CurrentUser`].

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{AppError, Result, clear_sentry_user, set_sentry_user};
use crate::middleware::{clear_current_user, set_current_user};
use crate::models::CurrentUser;
use crate::services::auth::AuthService;
use crate::state::AppState;

/// Credentials payload for register and login.
#[derive(Debug, Deserialize)]
pub struct CredentialsBody {
    pub email: String,
    pub password: String,
}

/// Identity returned after register/login.
#[derive(Debug, Serialize)]
pub struct IdentityResponse {
    pub id: String,
    pub email: String,
}

impl From<&CurrentUser> for IdentityResponse {
    fn from(user: &CurrentUser) -> Self {
        Self {
            id: user.id.to_string(),
            email: user.email.clone(),
        }
    }
}

/// Register a new account and log it in.
#[instrument(skip(state, session, body), fields(email = %body.email))]
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    Json(body): Json<CredentialsBody>,
) -> Result<impl IntoResponse> {
    let auth = AuthService::new(state.pool());
    let user = auth
        .register_with_password(&body.email, &body.password)
        .await?;

    let current = CurrentUser::from(&user);
    set_current_user(&session, &current)
        .await
        .map_err(|e| AppError::Internal(format!("failed to persist session: {e}")))?;
    set_sentry_user(&current.id, Some(&current.email));

    Ok((StatusCode::CREATED, Json(IdentityResponse::from(&current))))
}

/// Login with email and password.
#[instrument(skip(state, session, body), fields(email = %body.email))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Json(body): Json<CredentialsBody>,
) -> Result<impl IntoResponse> {
    let auth = AuthService::new(state.pool());
    let user = auth.login_with_password(&body.email, &body.password).await?;

    // Rotate the session ID on privilege change.
    session
        .cycle_id()
        .await
        .map_err(|e| AppError::Internal(format!("failed to cycle session: {e}")))?;

    let current = CurrentUser::from(&user);
    set_current_user(&session, &current)
        .await
        .map_err(|e| AppError::Internal(format!("failed to persist session: {e}")))?;
    set_sentry_user(&current.id, Some(&current.email));

    Ok(Json(IdentityResponse::from(&current)))
}

/// Logout: clear the identity and destroy the session.
#[instrument(skip(session))]
pub async fn logout(session: Session) -> Result<impl IntoResponse> {
    if let Err(e) = clear_current_user(&session).await {
        tracing::error!("Failed to clear session: {e}");
    }

    if let Err(e) = session.flush().await {
        tracing::error!("Failed to flush session: {e}");
    }

    clear_sentry_user();

    Ok(StatusCode::NO_CONTENT)
}
