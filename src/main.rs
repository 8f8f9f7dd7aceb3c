use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use user_registry_api::auth::key_fingerprint;
use user_registry_api::config::Config;
use user_registry_api::db::Database;
use user_registry_api::db_storage::{InMemoryUserStore, PgUserStore, UserStore};
use user_registry_api::enrichment::UserService;
use user_registry_api::handlers::AppState;
use user_registry_api::routes::{build_router, with_rate_limit};
use user_registry_api::services::EnrichmentService;

/// Main entry point for the application.
///
/// Initializes logging, configuration, the record store and the provider
/// clients, then serves the router with per-IP rate limiting until Ctrl-C.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "user_registry_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;
    tracing::info!("Configuration loaded successfully");

    match config.api_key {
        Some(ref key) => tracing::info!("API key configured (fingerprint {})", key_fingerprint(key)),
        None => tracing::warn!("API_KEY not set: every request except the docs will be rejected"),
    }

    let store: Arc<dyn UserStore> = match config.database_url {
        Some(ref url) => {
            let db = Database::new(url).await?;
            tracing::info!("Database connection pool established");
            Arc::new(PgUserStore::new(db.pool))
        }
        None => Arc::new(InMemoryUserStore::new()),
    };

    let enrichment = EnrichmentService::from_config(&config)?;
    tracing::info!(
        "Provider clients initialized ({} ms timeout)",
        config.provider_timeout_ms
    );

    let app_state = Arc::new(AppState {
        users: UserService::new(store, enrichment, config.welcome_message.clone()),
        api_key: config.api_key.clone(),
    });

    let app = with_rate_limit(
        build_router(app_state),
        config.rate_limit_per_second,
        config.rate_limit_burst,
    )?;
    tracing::info!(
        "Rate limit: {} request(s)/s per IP, burst {}",
        config.rate_limit_per_second,
        config.rate_limit_burst
    );

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
