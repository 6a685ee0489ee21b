mod api_client;
mod config;
mod errors;
mod models;
mod routes;
mod session;
mod state;
mod upload;

#[cfg(test)]
mod test_support;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::api_client::ApiClient;
use crate::config::Config;
use crate::routes::build_router;
use crate::state::AppState;
use crate::upload::registry::DEFAULT_IDLE_TTL;
use crate::upload::{ProgressSettings, UploadPolicy, UploadSessions};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting CareerLeap web v{}", env!("CARGO_PKG_VERSION"));

    // Backend client, shared by the proxy routes and the upload transport
    let api = ApiClient::new(&config.api_base_url)?;
    info!("Backend client initialized ({})", api.base_url());

    let uploads = UploadSessions::new(
        Arc::new(api.clone()),
        UploadPolicy::default(),
        ProgressSettings::default(),
    );
    let _sweeper = uploads.spawn_sweeper(Duration::from_secs(60));
    info!("Upload views idle for {DEFAULT_IDLE_TTL:?} are evicted");

    let state = AppState { api, uploads };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once the frontend host is fixed

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
