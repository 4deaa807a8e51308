use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use super::MessageResponse;
use crate::error::ApiError;
use crate::extract::AppJson;
use crate::AppState;

/// Body of both auth endpoints. Fields are optional so that a missing one
/// is reported by the service rather than as a deserialization failure.
#[derive(Debug, Deserialize)]
pub struct Credentials {
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SignInResponse {
    pub message: String,
    pub token: String,
}

/// POST /api/auth/register
pub async fn register(
    State(state): State<AppState>,
    AppJson(body): AppJson<Credentials>,
) -> Result<Json<MessageResponse>, ApiError> {
    state
        .auth
        .register(
            body.username.as_deref().unwrap_or_default(),
            body.password.as_deref().unwrap_or_default(),
        )
        .await?;

    Ok(Json(MessageResponse::new("User registered successfully")))
}

/// POST /api/auth/signin
pub async fn sign_in(
    State(state): State<AppState>,
    AppJson(body): AppJson<Credentials>,
) -> Result<Json<SignInResponse>, ApiError> {
    let signed_in = state
        .auth
        .sign_in(
            body.username.as_deref().unwrap_or_default(),
            body.password.as_deref().unwrap_or_default(),
        )
        .await?;

    Ok(Json(SignInResponse {
        message: "Sign in successful.".to_string(),
        token: signed_in.token,
    }))
}
