//! Router for the calendar API

use axum::{
    Router,
    extract::{State, rejection::JsonRejection},
    response::Json,
};
use http::StatusCode;

use super::public;
use crate::api::public::ApiError;
use crate::api::state::SharedState;

/// Events of the current week. Responds with the `items` of Google's
/// list response, not the whole envelope.
async fn week_handler(
    State(state): State<SharedState>,
) -> Result<Json<Vec<public::CalendarEvent>>, ApiError> {
    let events = state
        .calendar
        .list_current_week_events()
        .await
        .map_err(ApiError::google("Failed to fetch events"))?;

    Ok(Json(events))
}

/// Create an event in the calendar
async fn create_handler(
    State(state): State<SharedState>,
    payload: Result<Json<public::EventRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<public::CalendarEvent>), ApiError> {
    // Missing fields are a 400 here rather than axum's default 422
    let Json(request) = payload.map_err(|rejection| {
        ApiError::Validation(format!("Invalid event request: {}", rejection.body_text()))
    })?;
    request
        .validate()
        .map_err(|e| ApiError::Validation(format!("Invalid event request: {}", e)))?;

    let event = state
        .calendar
        .create_event(&request)
        .await
        .map_err(ApiError::google("Failed to create event"))?;

    Ok((StatusCode::CREATED, Json(event)))
}

/// Create the calendar router
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/week", axum::routing::get(week_handler))
        .route("/create", axum::routing::post(create_handler))
}
