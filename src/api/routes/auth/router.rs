//! Router for the OAuth consent flow

use axum::{
    Router,
    extract::State,
    response::{IntoResponse, Json, Response},
};
use axum_extra::extract::Query;
use http::{StatusCode, header};

use super::public;
use crate::api::public::ApiError;
use crate::api::state::SharedState;

/// Send the user to Google's consent screen
async fn authenticate(State(state): State<SharedState>) -> Result<Response, ApiError> {
    let url = state
        .session
        .auth_url()
        .map_err(ApiError::google("Failed to generate authentication URL"))?;

    tracing::debug!("Redirecting to consent screen");
    Ok((StatusCode::FOUND, [(header::LOCATION, url)]).into_response())
}

/// OAuth callback: exchange the code for tokens
async fn redirect(
    State(state): State<SharedState>,
    Query(params): Query<public::RedirectParams>,
) -> Result<Json<public::RedirectResponse>, ApiError> {
    let code = match params.code.as_deref().map(str::trim) {
        Some(code) if !code.is_empty() => code.to_string(),
        _ => {
            let message = match params.error {
                Some(error) => format!("Authorization code is required (Google returned {})", error),
                None => "Authorization code is required".to_string(),
            };
            return Err(ApiError::Validation(message));
        }
    };

    let tokens = state
        .session
        .exchange_code(&code)
        .await
        .map_err(ApiError::google("Authentication failed"))?;

    Ok(Json(public::RedirectResponse {
        message: "Authentication successful".to_string(),
        tokens,
    }))
}

/// Create the auth router
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/authenticate", axum::routing::get(authenticate))
        .route("/redirect", axum::routing::get(redirect))
}
