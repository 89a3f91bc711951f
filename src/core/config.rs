use std::env;

use anyhow::{Context, Result, anyhow};
use chrono_tz::Tz;

pub const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
pub const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
pub const GOOGLE_CALENDAR_API_URL: &str = "https://www.googleapis.com/calendar/v3";

/// Where the OAuth and Calendar requests are sent. Overridable so the
/// server can be pointed at a stub.
#[derive(Clone, Debug)]
pub struct GoogleEndpoints {
    pub auth_url: String,
    pub token_url: String,
    pub calendar_api_url: String,
}

impl Default for GoogleEndpoints {
    fn default() -> Self {
        Self {
            auth_url: GOOGLE_AUTH_URL.to_string(),
            token_url: GOOGLE_TOKEN_URL.to_string(),
            calendar_api_url: GOOGLE_CALENDAR_API_URL.to_string(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub google_client_id: String,
    pub google_client_secret: String,
    pub google_redirect_uri: String,
    pub google_access_token: Option<String>,
    pub google_refresh_token: Option<String>,
    pub google_token_expiry: Option<i64>,
    pub google_endpoints: GoogleEndpoints,
    pub calendar_id: String,
    // Timezone used to compute the current week. Falls back to the
    // process-local timezone when unset.
    pub timezone: Option<Tz>,
}

impl AppConfig {
    /// Read the configuration from the environment, loading a `.env`
    /// file first if there is one.
    pub fn from_env() -> Result<Self> {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!("Loaded environment from {}", path.display());
        }

        let google_client_id = required("GOOGLE_CLIENT_ID")?;
        let google_client_secret = required("GOOGLE_CLIENT_SECRET")?;
        let google_redirect_uri = required("GOOGLE_REDIRECT_URI")?;
        let google_access_token = optional("GOOGLE_OAUTH_ACCESS_TOKEN");
        let google_refresh_token = optional("GOOGLE_OAUTH_REFRESH_TOKEN");
        let google_token_expiry = optional("GOOGLE_OAUTH_EXPIRY_DATE")
            .map(|s| {
                s.parse::<i64>()
                    .with_context(|| format!("Invalid GOOGLE_OAUTH_EXPIRY_DATE {}", s))
            })
            .transpose()?;

        let defaults = GoogleEndpoints::default();
        let google_endpoints = GoogleEndpoints {
            auth_url: optional("GOOGLE_AUTH_URL").unwrap_or(defaults.auth_url),
            token_url: optional("GOOGLE_TOKEN_URL").unwrap_or(defaults.token_url),
            calendar_api_url: optional("GOOGLE_CALENDAR_API_URL")
                .unwrap_or(defaults.calendar_api_url),
        };

        let calendar_id = optional("WEEKCAL_CALENDAR_ID").unwrap_or_else(|| "primary".to_string());
        let timezone = optional("WEEKCAL_TIMEZONE")
            .map(|s| parse_timezone(&s))
            .transpose()?;

        Ok(Self {
            google_client_id,
            google_client_secret,
            google_redirect_uri,
            google_access_token,
            google_refresh_token,
            google_token_expiry,
            google_endpoints,
            calendar_id,
            timezone,
        })
    }
}

fn required(key: &str) -> Result<String> {
    optional(key).ok_or_else(|| anyhow!("Missing env var {}", key))
}

// Empty values count as unset
fn optional(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub(crate) fn parse_timezone(name: &str) -> Result<Tz> {
    name.parse::<Tz>()
        .map_err(|e| anyhow!("Invalid timezone {}: {}", name, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_parses_iana_timezones() {
        let tz = parse_timezone("Europe/Paris").unwrap();
        assert_eq!(tz, chrono_tz::Europe::Paris);
    }

    #[test]
    fn it_rejects_unknown_timezones() {
        assert!(parse_timezone("Mars/Olympus_Mons").is_err());
    }

    #[test]
    fn it_defaults_to_google_endpoints() {
        let endpoints = GoogleEndpoints::default();
        assert_eq!(endpoints.token_url, "https://oauth2.googleapis.com/token");
        assert!(endpoints.calendar_api_url.ends_with("/calendar/v3"));
    }
}
