//! OAuth2 against Google: consent URL, authorization code exchange
//! and access token refresh.
//!
//! The server holds exactly one credential. `OAuthSession` owns it and
//! is the only thing that mutates the token set.

use chrono::Utc;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use super::error::GoogleError;
use crate::core::{AppConfig, GoogleEndpoints};

pub const CALENDAR_SCOPES: [&str; 3] = [
    "https://www.googleapis.com/auth/calendar",
    "https://www.googleapis.com/auth/calendar.events",
    "https://www.googleapis.com/auth/calendar.readonly",
];

/// Refresh this many milliseconds before Google considers the token expired
const EXPIRY_SKEW_MS: i64 = 60_000;

/// The registered OAuth application
#[derive(Clone, Debug)]
pub struct OAuthClient {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
}

/// Tokens currently held for the user. Serialized as returned to
/// callers of `/redirect`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TokenSet {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
    /// Epoch milliseconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiry_date: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id_token: Option<String>,
}

impl TokenSet {
    pub fn is_empty(&self) -> bool {
        self.access_token.is_none() && self.refresh_token.is_none()
    }

    /// An unknown expiry is treated as still valid
    pub fn expires_soon(&self, now_ms: i64) -> bool {
        self.expiry_date
            .is_some_and(|expiry| expiry <= now_ms + EXPIRY_SKEW_MS)
    }
}

/// Response body of Google's token endpoint
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub expires_in: Option<i64>,
    pub refresh_token: Option<String>,
    pub scope: Option<String>,
    pub token_type: Option<String>,
    pub id_token: Option<String>,
}

impl TokenResponse {
    pub fn into_token_set(self, now_ms: i64) -> TokenSet {
        TokenSet {
            access_token: Some(self.access_token),
            refresh_token: self.refresh_token,
            scope: self.scope,
            token_type: self.token_type,
            expiry_date: self.expires_in.map(|secs| now_ms + secs * 1000),
            id_token: self.id_token,
        }
    }
}

/// Build the consent screen URL. Requests offline access so Google
/// issues a refresh token.
pub fn build_auth_url(auth_url: &str, client: &OAuthClient) -> Result<String, GoogleError> {
    let scope = CALENDAR_SCOPES.join(" ");
    let url = reqwest::Url::parse_with_params(
        auth_url,
        &[
            ("access_type", "offline"),
            ("scope", scope.as_str()),
            ("response_type", "code"),
            ("client_id", client.client_id.as_str()),
            ("redirect_uri", client.redirect_uri.as_str()),
        ],
    )
    .map_err(|e| GoogleError::InvalidConfig(format!("{} ({})", e, auth_url)))?;

    Ok(url.into())
}

/// Trade an authorization code for tokens
pub async fn exchange_code_for_token(
    http: &Client,
    token_url: &str,
    client: &OAuthClient,
    code: &str,
) -> Result<TokenResponse, GoogleError> {
    let params = [
        ("client_id", client.client_id.as_str()),
        ("client_secret", client.client_secret.as_str()),
        ("code", code),
        ("grant_type", "authorization_code"),
        ("redirect_uri", client.redirect_uri.as_str()),
    ];
    request_token(http, token_url, &params).await
}

/// Get a fresh access token using the refresh token
pub async fn refresh_access_token(
    http: &Client,
    token_url: &str,
    client: &OAuthClient,
    refresh_token: &str,
) -> Result<TokenResponse, GoogleError> {
    let params = [
        ("client_id", client.client_id.as_str()),
        ("client_secret", client.client_secret.as_str()),
        ("refresh_token", refresh_token),
        ("grant_type", "refresh_token"),
    ];
    request_token(http, token_url, &params).await
}

async fn request_token(
    http: &Client,
    token_url: &str,
    params: &[(&str, &str)],
) -> Result<TokenResponse, GoogleError> {
    let res = http.post(token_url).form(params).send().await?;
    let status = res.status();
    if !status.is_success() {
        let text = res.text().await.unwrap_or_default();
        return Err(GoogleError::from_response(status.as_u16(), &text));
    }
    Ok(res.json::<TokenResponse>().await?)
}

fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

/// Holds the process-wide credential: the OAuth client plus whatever
/// tokens were configured at startup or obtained since.
pub struct OAuthSession {
    http: Client,
    auth_url: String,
    token_url: String,
    client: OAuthClient,
    tokens: RwLock<TokenSet>,
}

impl OAuthSession {
    pub fn new(
        http: Client,
        endpoints: &GoogleEndpoints,
        client: OAuthClient,
        tokens: TokenSet,
    ) -> Self {
        Self {
            http,
            auth_url: endpoints.auth_url.clone(),
            token_url: endpoints.token_url.clone(),
            client,
            tokens: RwLock::new(tokens),
        }
    }

    pub fn from_config(http: Client, config: &AppConfig) -> Self {
        let client = OAuthClient {
            client_id: config.google_client_id.clone(),
            client_secret: config.google_client_secret.clone(),
            redirect_uri: config.google_redirect_uri.clone(),
        };
        let has_tokens =
            config.google_access_token.is_some() || config.google_refresh_token.is_some();
        let tokens = TokenSet {
            access_token: config.google_access_token.clone(),
            refresh_token: config.google_refresh_token.clone(),
            scope: has_tokens.then(|| CALENDAR_SCOPES.join(" ")),
            token_type: has_tokens.then(|| "Bearer".to_string()),
            expiry_date: config.google_token_expiry,
            id_token: None,
        };
        Self::new(http, &config.google_endpoints, client, tokens)
    }

    pub fn auth_url(&self) -> Result<String, GoogleError> {
        build_auth_url(&self.auth_url, &self.client)
    }

    /// Exchange an authorization code and replace the held tokens with
    /// the result. Google only sends a refresh token on first consent so
    /// the previous one is kept when the response has none.
    pub async fn exchange_code(&self, code: &str) -> Result<TokenSet, GoogleError> {
        let resp = exchange_code_for_token(&self.http, &self.token_url, &self.client, code)
            .await
            .map_err(|e| match e {
                GoogleError::Upstream {
                    status: Some(_),
                    message,
                    ..
                } => GoogleError::AuthExchange(message),
                other => other,
            })?;

        let mut tokens = resp.into_token_set(now_ms());
        let mut held = self.tokens.write().await;
        if tokens.refresh_token.is_none() {
            tokens.refresh_token = held.refresh_token.clone();
        }
        *held = tokens.clone();
        tracing::info!("Exchanged authorization code for Google tokens");

        Ok(tokens)
    }

    /// Returns a bearer token for Calendar requests, refreshing it first
    /// if it is missing or about to expire. Never touches the network
    /// when no tokens are held.
    pub async fn access_token(&self) -> Result<String, GoogleError> {
        let (access_token, refresh_token) = {
            let held = self.tokens.read().await;
            if let Some(token) = &held.access_token
                && !held.expires_soon(now_ms())
            {
                return Ok(token.clone());
            }
            (held.access_token.clone(), held.refresh_token.clone())
        };

        let Some(refresh_token) = refresh_token else {
            // An expired token without a way to refresh it is still sent
            // and Google decides.
            return access_token.ok_or(GoogleError::NotAuthenticated);
        };

        tracing::debug!("Refreshing Google access token");
        let resp = refresh_access_token(&self.http, &self.token_url, &self.client, &refresh_token)
            .await
            .map_err(|e| match e.upstream_status() {
                Some(400) | Some(401) => GoogleError::AuthExpired,
                _ => e,
            })?;

        let mut tokens = resp.into_token_set(now_ms());
        if tokens.refresh_token.is_none() {
            tokens.refresh_token = Some(refresh_token);
        }
        let access_token = tokens.access_token.clone().unwrap_or_default();

        let mut held = self.tokens.write().await;
        if tokens.scope.is_none() {
            tokens.scope = held.scope.clone();
        }
        *held = tokens;

        Ok(access_token)
    }

    #[cfg(test)]
    async fn tokens(&self) -> TokenSet {
        self.tokens.read().await.clone()
    }
}
