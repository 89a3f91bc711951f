use std::sync::Arc;

use chrono::{Local, Utc};
use chrono_tz::Tz;
use serde_json::Value;

use super::event::EventRequest;
use super::week::{WeekWindow, week_window};
use crate::google::GoogleError;
use crate::google::gcal::{EventsQuery, GoogleCalendarClient};
use crate::google::oauth::OAuthSession;

const MAX_WEEK_EVENTS: u32 = 10;

/// Lists and creates events on one calendar using the session's tokens.
pub struct CalendarService {
    session: Arc<OAuthSession>,
    client: GoogleCalendarClient,
    calendar_id: String,
    timezone: Option<Tz>,
}

impl CalendarService {
    pub fn new(
        session: Arc<OAuthSession>,
        client: GoogleCalendarClient,
        calendar_id: &str,
        timezone: Option<Tz>,
    ) -> Self {
        Self {
            session,
            client,
            calendar_id: calendar_id.to_string(),
            timezone,
        }
    }

    /// The week containing now, in the configured timezone or the
    /// process-local one.
    pub fn current_week(&self) -> WeekWindow {
        match self.timezone {
            Some(tz) => week_window(&Utc::now().with_timezone(&tz)),
            None => week_window(&Local::now()),
        }
    }

    /// Up to 10 events of the current week, recurring events expanded,
    /// ordered by start time.
    pub async fn list_current_week_events(&self) -> Result<Vec<Value>, GoogleError> {
        let access_token = self.session.access_token().await?;
        let WeekWindow { start, end } = self.current_week();
        let query = EventsQuery {
            time_min: start.to_rfc3339(),
            time_max: end.to_rfc3339(),
            single_events: true,
            order_by: "startTime",
            max_results: MAX_WEEK_EVENTS,
        };

        let events = self
            .client
            .list_events(&access_token, &self.calendar_id, &query)
            .await
            .map_err(map_list_error)?;

        Ok(events.items)
    }

    /// Insert the event and return Google's copy of it
    pub async fn create_event(&self, request: &EventRequest) -> Result<Value, GoogleError> {
        let access_token = self.session.access_token().await?;
        let event = request.to_new_event();

        let created = self
            .client
            .insert_event(&access_token, &self.calendar_id, &event)
            .await
            .map_err(map_create_error)?;

        let id = created
            .get("id")
            .and_then(Value::as_str)
            .unwrap_or("<unknown>");
        tracing::info!("Created event {} in calendar {}", id, self.calendar_id);
        Ok(created)
    }
}

fn map_list_error(err: GoogleError) -> GoogleError {
    match err.upstream_status() {
        Some(401) => GoogleError::AuthExpired,
        _ => err,
    }
}

fn map_create_error(err: GoogleError) -> GoogleError {
    match err.upstream_status() {
        Some(401) => GoogleError::AuthExpired,
        Some(400) => GoogleError::InvalidEvent(err.to_string()),
        _ => err,
    }
}
