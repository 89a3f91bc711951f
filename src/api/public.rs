//! Public API types

use axum::Json;
use axum::response::{IntoResponse, Response};
use http::StatusCode;
use serde::{Deserialize, Serialize};

use crate::google::GoogleError;

// Errors

/// Body of every error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug)]
pub enum ApiError {
    /// Malformed request, rejected before anything reaches Google
    Validation(String),
    /// A failed Google call, with what the handler was trying to do
    Google {
        context: &'static str,
        source: GoogleError,
    },
}

impl ApiError {
    /// For use with `map_err`, e.g. `.map_err(ApiError::google("Failed to fetch events"))`
    pub fn google(context: &'static str) -> impl FnOnce(GoogleError) -> ApiError {
        move |source| ApiError::Google { context, source }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Google { source, .. } => match source {
                GoogleError::NotAuthenticated
                | GoogleError::AuthExpired
                | GoogleError::AuthExchange(_) => StatusCode::UNAUTHORIZED,
                GoogleError::InvalidEvent(_) => StatusCode::BAD_REQUEST,
                GoogleError::InvalidConfig(_) | GoogleError::Upstream { .. } => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
        }
    }
}

/// Convert `ApiError` into an Axum compatible response.
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            ApiError::Validation(message) => {
                tracing::warn!("Rejected request: {}", message);
                ErrorResponse {
                    message,
                    error: None,
                }
            }
            ApiError::Google { context, source } => {
                tracing::error!("{}: {}", context, source);
                ErrorResponse {
                    message: context.to_string(),
                    error: Some(source.to_string()),
                }
            }
        };

        (status, Json(body)).into_response()
    }
}

// Re-export public types from each route

pub mod auth {
    pub use crate::api::routes::auth::public::*;
}

pub mod calendar {
    pub use crate::api::routes::calendar::public::*;
}
