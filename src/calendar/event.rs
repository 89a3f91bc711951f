use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Serialize};

const OFFSET_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f%z", "%Y-%m-%dT%H:%M%z"];
const LOCAL_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

pub use crate::google::gcal::EventAttendee as Attendee;
use crate::google::gcal::{EventDateTime, NewEvent};

/// Body of `POST /create`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRequest {
    pub summary: String,
    pub start: String,
    pub end: String,
    pub description: Option<String>,
    pub attendees: Option<Vec<Attendee>>,
}

impl EventRequest {
    /// Check the shape of the request. Start after end is allowed and
    /// left for Google to reject.
    pub fn validate(&self) -> Result<(), String> {
        if self.summary.trim().is_empty() {
            return Err("summary must be a non-empty string".to_string());
        }
        if !is_date_time(&self.start) {
            return Err(format!("start must be an ISO 8601 date-time, got {:?}", self.start));
        }
        if !is_date_time(&self.end) {
            return Err(format!("end must be an ISO 8601 date-time, got {:?}", self.end));
        }
        Ok(())
    }

    /// Google's event shape. Times are sent as given and tagged UTC.
    pub fn to_new_event(&self) -> NewEvent {
        let date_time = |value: &str| EventDateTime {
            date_time: value.to_string(),
            time_zone: "UTC".to_string(),
        };
        NewEvent {
            summary: self.summary.clone(),
            description: self.description.clone(),
            start: date_time(&self.start),
            end: date_time(&self.end),
            attendees: self.attendees.clone(),
        }
    }
}

// ISO 8601 calendar date and time, seconds optional, with a `Z`,
// `+hh:mm` or `+hhmm` offset or none at all
fn is_date_time(value: &str) -> bool {
    if DateTime::parse_from_rfc3339(value).is_ok() {
        return true;
    }
    let with_offset = match value.strip_suffix(['Z', 'z']) {
        Some(rest) => format!("{}+00:00", rest),
        None => value.to_string(),
    };
    OFFSET_FORMATS
        .iter()
        .any(|f| DateTime::parse_from_str(&with_offset, f).is_ok())
        || LOCAL_FORMATS
            .iter()
            .any(|f| NaiveDateTime::parse_from_str(value, f).is_ok())
}
