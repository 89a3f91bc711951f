use std::sync::Arc;

use reqwest::Client;

use crate::calendar::CalendarService;
use crate::core::AppConfig;
use crate::google::gcal::GoogleCalendarClient;
use crate::google::oauth::OAuthSession;

pub type SharedState = Arc<AppState>;

pub struct AppState {
    // The single OAuth credential for the process. Token updates are
    // synchronized inside the session.
    pub session: Arc<OAuthSession>,
    pub calendar: CalendarService,
}

impl AppState {
    pub fn new(config: &AppConfig) -> Self {
        let http = Client::new();
        let session = Arc::new(OAuthSession::from_config(http.clone(), config));
        let client = GoogleCalendarClient::new(http, &config.google_endpoints.calendar_api_url);
        let calendar = CalendarService::new(
            Arc::clone(&session),
            client,
            &config.calendar_id,
            config.timezone,
        );
        Self {
            session,
            calendar,
        }
    }
}
