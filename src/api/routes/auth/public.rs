//! Public types for the auth API
use serde::{Deserialize, Serialize};

pub use crate::google::oauth::TokenSet;

/// Query parameters Google sends back to the redirect URI
#[derive(Deserialize)]
pub struct RedirectParams {
    pub code: Option<String>,
    pub error: Option<String>,
}

#[derive(Serialize, Deserialize)]
pub struct RedirectResponse {
    pub message: String,
    pub tokens: TokenSet,
}
