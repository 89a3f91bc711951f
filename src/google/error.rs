use serde::Deserialize;
use thiserror::Error;

/// Failures talking to Google, grouped by how callers should react.
#[derive(Debug, Error)]
pub enum GoogleError {
    /// No access or refresh token is held.
    #[error("Not authenticated with Google Calendar")]
    NotAuthenticated,

    /// Google rejected the bearer token or the refresh token.
    #[error("Authentication token expired")]
    AuthExpired,

    /// The authorization code was invalid, expired or already used.
    #[error("Failed to authenticate with Google: {0}")]
    AuthExchange(String),

    /// Google rejected the event payload.
    #[error("Invalid event data: {0}")]
    InvalidEvent(String),

    #[error("Invalid OAuth configuration: {0}")]
    InvalidConfig(String),

    /// Anything else, with the upstream status and reason when known.
    #[error("{message}")]
    Upstream {
        status: Option<u16>,
        reason: Option<String>,
        message: String,
    },
}

impl GoogleError {
    /// HTTP status Google answered with, if the request got that far.
    pub fn upstream_status(&self) -> Option<u16> {
        match self {
            GoogleError::Upstream { status, .. } => *status,
            _ => None,
        }
    }

    /// Build an error from a non-success Google response.
    ///
    /// Calendar errors look like `{"error": {"code", "message", "status"}}`
    /// and OAuth errors like `{"error": "invalid_grant",
    /// "error_description": "..."}`. Anything else keeps the raw body.
    pub fn from_response(status: u16, body: &str) -> Self {
        let (reason, message) = match serde_json::from_str::<ErrorEnvelope>(body) {
            Ok(ErrorEnvelope {
                error: ErrorBody::Api {
                    message,
                    status: reason,
                },
                ..
            }) => (reason, message),
            Ok(ErrorEnvelope {
                error: ErrorBody::OAuth(code),
                error_description,
            }) => {
                let message = error_description.unwrap_or_else(|| code.clone());
                (Some(code), message)
            }
            Err(_) => (None, body.trim().to_string()),
        };

        let message = if message.is_empty() {
            format!("Google API request failed with status {}", status)
        } else {
            message
        };

        GoogleError::Upstream {
            status: Some(status),
            reason,
            message,
        }
    }
}

impl From<reqwest::Error> for GoogleError {
    fn from(err: reqwest::Error) -> Self {
        GoogleError::Upstream {
            status: err.status().map(|s| s.as_u16()),
            reason: None,
            message: err.to_string(),
        }
    }
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
    error_description: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ErrorBody {
    Api {
        #[serde(default)]
        message: String,
        status: Option<String>,
    },
    OAuth(String),
}
