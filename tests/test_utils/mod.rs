//! Test utilities for integration tests
use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, Response},
};
use serde_json::Value;

use weekcal::api::AppState;
use weekcal::api::app;
use weekcal::core::{AppConfig, GoogleEndpoints};

pub const TEST_ACCESS_TOKEN: &str = "ya29.test_access_token";
pub const TEST_REFRESH_TOKEN: &str = "1//test_refresh_token";

/// Configuration pointing every Google endpoint at `server_url`,
/// normally a `mockito` server. The week is computed in UTC.
pub fn test_config(server_url: &str, authenticated: bool) -> AppConfig {
    AppConfig {
        google_client_id: String::from("test_client_id"),
        google_client_secret: String::from("test_client_secret"),
        google_redirect_uri: String::from("http://localhost:3000/redirect"),
        google_access_token: authenticated.then(|| TEST_ACCESS_TOKEN.to_string()),
        google_refresh_token: authenticated.then(|| TEST_REFRESH_TOKEN.to_string()),
        google_token_expiry: None,
        google_endpoints: GoogleEndpoints {
            auth_url: format!("{}/o/oauth2/v2/auth", server_url),
            token_url: format!("{}/token", server_url),
            calendar_api_url: server_url.to_string(),
        },
        calendar_id: String::from("primary"),
        timezone: Some(chrono_tz::UTC),
    }
}

/// Creates a test application router from a config
pub fn test_app(config: AppConfig) -> Router {
    app(Arc::new(AppState::new(&config)))
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub async fn body_to_json(response: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
