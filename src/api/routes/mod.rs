//! API routes module

pub mod auth;
pub mod calendar;

use axum::Router;

use crate::api::state::SharedState;

/// Create the combined API router
pub fn router() -> Router<SharedState> {
    Router::new()
        // OAuth consent and callback
        .merge(auth::router())
        // Week listing and event creation
        .merge(calendar::router())
}
