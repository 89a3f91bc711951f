//! Google OAuth2 and Calendar v3 clients
pub mod error;
pub mod gcal;
pub mod oauth;

pub use error::GoogleError;
