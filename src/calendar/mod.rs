//! Calendar operations on top of the held Google credential
mod event;
mod service;
mod week;

pub use event::{Attendee, EventRequest};
pub use service::CalendarService;
pub use week::{WeekWindow, week_window};
