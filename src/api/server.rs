use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use super::routes;
use crate::api::state::{AppState, SharedState};
use crate::core::AppConfig;

pub fn app(shared_state: SharedState) -> Router {
    let cors = CorsLayer::permissive();

    Router::new()
        .merge(routes::router())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(shared_state)
}

// Run the server
pub async fn serve(host: String, port: String, config: AppConfig) -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                // axum logs rejections from built-in extractors with the `axum::rejection`
                // target, at `TRACE` level. `axum::rejection=trace` enables showing those events
                format! {
                    "{}=debug,tower_http=debug,axum::rejection=trace",
                    env!("CARGO_CRATE_NAME")
                }
                .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if config.google_access_token.is_none() && config.google_refresh_token.is_none() {
        tracing::warn!("No Google tokens configured, visit /authenticate before using the calendar");
    }

    let app_state = AppState::new(&config);
    let app = app(Arc::new(app_state));

    let listener = tokio::net::TcpListener::bind(format!("{}:{}", host, port))
        .await
        .with_context(|| format!("Failed to bind {}:{}", host, port))?;

    tracing::debug!("Server started. Listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
