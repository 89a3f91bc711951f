//! Public types for the calendar API
use serde_json::Value;

pub use crate::calendar::{Attendee, EventRequest};

/// Events are returned exactly as Google sends them
pub type CalendarEvent = Value;
