mod config;
mod error;
mod fetcher;
mod handlers;
mod parser;
mod service;
mod types;
mod validate;

use anyhow::{Context, Result};
use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

use config::AppConfig;
use fetcher::{Fetcher, HttpFetcher};
use parser::IqdbParser;

pub struct AppState {
    pub fetcher: Arc<dyn Fetcher>,
    pub parser: IqdbParser,
}

pub fn build_router(state: Arc<AppState>, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/IqDB", post(handlers::search_iqdb))
        .route("/health", get(handlers::health_check))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::from_env();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let fetcher = HttpFetcher::new(&config.upstream_url, config.upstream_timeout_secs)?;
    let state = Arc::new(AppState {
        fetcher: Arc::new(fetcher),
        parser: IqdbParser::new()?,
    });

    let app = build_router(state, config.max_upload_bytes);

    let listener = tokio::net::TcpListener::bind(&config.listen_addr)
        .await
        .with_context(|| format!("無法監聽 {}", config.listen_addr))?;
    info!(
        listen_addr = %config.listen_addr,
        upstream = %config.upstream_url,
        "IqDB proxy 啟動"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("已關閉");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
