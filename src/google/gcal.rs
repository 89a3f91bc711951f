//! Google Calendar v3 REST client. Events are kept as raw JSON since
//! they are passed straight through to callers.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::error::GoogleError;

#[derive(Debug, Clone, Serialize)]
pub struct EventsQuery {
    #[serde(rename = "timeMin")]
    pub time_min: String,
    #[serde(rename = "timeMax")]
    pub time_max: String,
    #[serde(rename = "singleEvents")]
    pub single_events: bool,
    #[serde(rename = "orderBy")]
    pub order_by: &'static str,
    #[serde(rename = "maxResults")]
    pub max_results: u32,
}

#[derive(Debug, Deserialize)]
pub struct EventList {
    #[serde(default)]
    pub items: Vec<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventDateTime {
    #[serde(rename = "dateTime")]
    pub date_time: String,
    #[serde(rename = "timeZone")]
    pub time_zone: String,
}

/// Attendee as Google models it. Only `email` is required; fields such
/// as `optional` or `displayName` are carried through as given.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventAttendee {
    pub email: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Request body for `events.insert`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewEvent {
    pub summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub start: EventDateTime,
    pub end: EventDateTime,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attendees: Option<Vec<EventAttendee>>,
}

pub struct GoogleCalendarClient {
    http: Client,
    api_base: String,
}

impl GoogleCalendarClient {
    pub fn new(http: Client, api_base: &str) -> Self {
        Self {
            http,
            api_base: api_base.trim_end_matches('/').to_string(),
        }
    }

    fn events_url(&self, calendar_id: &str) -> String {
        format!(
            "{}/calendars/{}/events",
            self.api_base,
            urlencoding::encode(calendar_id)
        )
    }

    /// List events of a calendar in a time range
    pub async fn list_events(
        &self,
        access_token: &str,
        calendar_id: &str,
        query: &EventsQuery,
    ) -> Result<EventList, GoogleError> {
        let res = self
            .http
            .get(self.events_url(calendar_id))
            .bearer_auth(access_token)
            .query(query)
            .send()
            .await?;
        let status = res.status();
        if !status.is_success() {
            let text = res.text().await.unwrap_or_default();
            return Err(GoogleError::from_response(status.as_u16(), &text));
        }
        let events: EventList = res.json().await?;
        tracing::debug!(
            "Fetched {} events from calendar {}",
            events.items.len(),
            calendar_id
        );
        Ok(events)
    }

    /// Insert an event and return it as stored by Google
    pub async fn insert_event(
        &self,
        access_token: &str,
        calendar_id: &str,
        event: &NewEvent,
    ) -> Result<Value, GoogleError> {
        let res = self
            .http
            .post(self.events_url(calendar_id))
            .bearer_auth(access_token)
            .json(event)
            .send()
            .await?;
        let status = res.status();
        if !status.is_success() {
            let text = res.text().await.unwrap_or_default();
            return Err(GoogleError::from_response(status.as_u16(), &text));
        }
        Ok(res.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn test_query() -> EventsQuery {
        EventsQuery {
            time_min: "2024-06-02T00:00:00+00:00".to_string(),
            time_max: "2024-06-08T23:59:59.999+00:00".to_string(),
            single_events: true,
            order_by: "startTime",
            max_results: 10,
        }
    }

    #[test]
    fn test_new_event_omits_missing_fields() {
        let event = NewEvent {
            summary: "Sync".to_string(),
            description: None,
            start: EventDateTime {
                date_time: "2024-06-03T10:00:00Z".to_string(),
                time_zone: "UTC".to_string(),
            },
            end: EventDateTime {
                date_time: "2024-06-03T11:00:00Z".to_string(),
                time_zone: "UTC".to_string(),
            },
            attendees: None,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "summary": "Sync",
                "start": {"dateTime": "2024-06-03T10:00:00Z", "timeZone": "UTC"},
                "end": {"dateTime": "2024-06-03T11:00:00Z", "timeZone": "UTC"},
            })
        );
    }

    #[test]
    fn test_events_url_encodes_calendar_id() {
        let client = GoogleCalendarClient::new(Client::new(), "https://example.com/calendar/v3/");
        assert_eq!(
            client.events_url("team@group.calendar.google.com"),
            "https://example.com/calendar/v3/calendars/team%40group.calendar.google.com/events"
        );
    }

    #[tokio::test]
    async fn test_list_events() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/calendars/primary/events")
            .match_header("authorization", "Bearer test_token")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("singleEvents".into(), "true".into()),
                Matcher::UrlEncoded("orderBy".into(), "startTime".into()),
                Matcher::UrlEncoded("maxResults".into(), "10".into()),
                Matcher::UrlEncoded("timeMin".into(), "2024-06-02T00:00:00+00:00".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"kind": "calendar#events", "items": [{"id": "evt_1", "summary": "Standup"}]}"#)
            .create_async()
            .await;

        let client = GoogleCalendarClient::new(Client::new(), &server.url());
        let events = client
            .list_events("test_token", "primary", &test_query())
            .await
            .unwrap();
        mock.assert_async().await;

        assert_eq!(events.items.len(), 1);
        assert_eq!(events.items[0]["summary"], "Standup");
    }

    #[tokio::test]
    async fn test_list_events_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/calendars/primary/events")
            .match_query(Matcher::Any)
            .with_status(401)
            .with_header("content-type", "application/json")
            .with_body(r#"{"error": {"code": 401, "message": "Invalid Credentials", "status": "UNAUTHENTICATED"}}"#)
            .create_async()
            .await;

        let client = GoogleCalendarClient::new(Client::new(), &server.url());
        let err = client
            .list_events("bad_token", "primary", &test_query())
            .await
            .unwrap_err();
        assert_eq!(err.upstream_status(), Some(401));
        assert_eq!(err.to_string(), "Invalid Credentials");
    }
}
