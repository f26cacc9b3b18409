use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::info;
use tracing_subscriber::EnvFilter;

use villa_pricing::cache::{start_cache_warmer, AppCache};
use villa_pricing::config::Config;
use villa_pricing::db::{self, PgStore};
use villa_pricing::pricing::{PricingService, PricingSettings};
use villa_pricing::{create_router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,tower_http=info")),
        )
        .init();

    let config = Config::from_env().context("loading configuration")?;
    info!(
        "Calendar offset {}, strict seasons: {}",
        config.calendar.offset(),
        config.strict_seasons
    );

    let pool = db::connect(&config.database_url, config.database_max_connections)
        .await
        .context("connecting to database")?;
    info!("Connected to database");

    let store = Arc::new(PgStore::new(pool));
    let service = Arc::new(PricingService::new(
        store.clone(),
        store.clone(),
        store,
        AppCache::new(config.cache_ttl),
        PricingSettings {
            calendar: config.calendar,
            strict_seasons: config.strict_seasons,
        },
    ));

    tokio::spawn(start_cache_warmer(service.clone(), config.cache_warm_interval));

    let app = create_router(AppState { pricing: service });

    let listener = TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("binding {}", config.bind_addr))?;
    info!("Listening on {}", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
