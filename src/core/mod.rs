mod config;
pub use config::{AppConfig, GoogleEndpoints};
