//! SocialSwap Server
//!
//! Marketplace backend for buying and selling social media accounts:
//! listings, watchlists and buyer/seller messaging over a JSON API.
//!
//! Storage is either in-process (DashMap) or embedded SQLite, chosen at
//! startup by `SOCIALSWAP_BACKEND`.

mod config;
mod extractors;
mod handlers;
mod seed;
mod services;
mod storage;

use anyhow::{Context, Result};
use axum::{
    routing::{delete, get},
    Router,
};
use socialswap_core::EntityStore;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::config::ServerConfig;
use services::{Integrity, MessagingRelay, WatchlistManager};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn EntityStore>,
    pub integrity: Integrity,
    pub watchlist: Arc<WatchlistManager>,
    pub messages: Arc<MessagingRelay>,
}

impl AppState {
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        let integrity = Integrity::new(store.clone());
        Self {
            watchlist: Arc::new(WatchlistManager::new(integrity.clone())),
            messages: Arc::new(MessagingRelay::new(integrity.clone())),
            integrity,
            store,
        }
    }
}

#[tokio::main]
async fn main() {
    // Set up panic hook to log crashes
    std::panic::set_hook(Box::new(|info| {
        let location = info
            .location()
            .map(|l| format!("{}:{}", l.file(), l.line()));
        let payload = if let Some(s) = info.payload().downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = info.payload().downcast_ref::<String>() {
            s.clone()
        } else {
            "Unknown panic".to_string()
        };
        eprintln!("[PANIC] at {:?}: {}", location, payload);
        tracing::error!("PANIC at {:?}: {}", location, payload);
    }));

    // RUST_LOG overrides the default filter
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("socialswap_server=info,tower_http=info"));
    if let Err(e) = tracing_subscriber::fmt().with_env_filter(filter).try_init() {
        eprintln!("[FATAL] Failed to initialize logging: {}", e);
        std::process::exit(1);
    }

    info!("Starting SocialSwap Server v{}", env!("CARGO_PKG_VERSION"));

    if let Err(e) = run_server().await {
        error!("Server failed: {:#}", e);
        std::process::exit(1);
    }
}

async fn run_server() -> Result<()> {
    let config = ServerConfig::load().context("Failed to load configuration")?;
    info!(
        "Config loaded: backend={:?}, bind={}",
        config.backend, config.bind_address
    );

    let store = storage::open(&config)
        .await
        .context("Failed to open store")?;

    seed::bootstrap_reference_data(&*store)
        .await
        .context("Failed to create reference data")?;

    let state = AppState::new(store);
    if config.seed_demo_data {
        seed::seed_demo_data(&state.integrity)
            .await
            .context("Failed to seed demo data")?;
    }

    let app = router(state);

    let addr: SocketAddr = config
        .bind_address
        .parse()
        .context("Failed to parse bind address")?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    info!("Server listening on {}", addr);
    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}

fn router(state: AppState) -> Router {
    Router::new()
        .nest("/api", api_routes())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/platforms", get(handlers::catalog::list_platforms))
        .route("/platforms/:id", get(handlers::catalog::get_platform))
        .route("/categories", get(handlers::catalog::list_categories))
        .route("/categories/:id", get(handlers::catalog::get_category))
        .route(
            "/listings",
            get(handlers::listings::list).post(handlers::listings::create),
        )
        .route("/listings/featured", get(handlers::listings::featured))
        .route("/listings/:id", get(handlers::listings::get))
        .route(
            "/watchlist",
            get(handlers::watchlist::list).post(handlers::watchlist::add),
        )
        .route("/watchlist/:listing_id", delete(handlers::watchlist::remove))
        .route(
            "/messages",
            get(handlers::messages::list).post(handlers::messages::send),
        )
}
