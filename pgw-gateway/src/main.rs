//! pgw-gateway - photo asset gateway service
//!
//! Fronts the Immich asset store with bearer-token authentication, enriches
//! asset pages with grouping and near-duplicate classification, and exposes a
//! composite health check.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use pgw_common::config::{ConfigOverrides, GatewayConfig};
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pgw_gateway::cache::{self, TokenCache};
use pgw_gateway::clients::{DeduplicationClient, GroupingClient, ImmichClient};
use pgw_gateway::services::{AuthGate, EnrichmentEngine, HealthAggregator};
use pgw_gateway::{build_router, AppState};

/// Command-line arguments for pgw-gateway
///
/// Every value is optional here. A flag wins over its environment variable;
/// values set by neither fall back to the config file, then compiled defaults.
#[derive(Parser, Debug)]
#[command(name = "pgw-gateway")]
#[command(about = "Photo asset gateway")]
#[command(version)]
struct Args {
    /// Config file (default: ~/.config/pgw/gateway.toml if present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port to listen on
    #[arg(short, long, env = "PORT")]
    port: Option<u16>,

    /// Immich server base URL
    #[arg(long, env = "IMMICH_API_URL")]
    immich_api_url: Option<String>,

    /// Grouping service base URL
    #[arg(long, env = "GROUPING_API_URL")]
    grouping_api_url: Option<String>,

    /// Deduplication service base URL
    #[arg(long, env = "DEDUP_API_URL")]
    dedup_api_url: Option<String>,

    /// Token cache URL (`redis://...` or `memory://`)
    #[arg(long, env = "REDIS_URL")]
    redis_url: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL")]
    log_level: Option<String>,

    /// Token cache TTL in seconds
    #[arg(long, env = "CACHE_EXPIRY")]
    cache_expiry: Option<u64>,
}

impl Args {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            port: self.port,
            immich_api_url: self.immich_api_url.clone(),
            grouping_api_url: self.grouping_api_url.clone(),
            dedup_api_url: self.dedup_api_url.clone(),
            redis_url: self.redis_url.clone(),
            log_level: self.log_level.clone(),
            cache_expiry_secs: self.cache_expiry,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // CLI > ENV (both via clap) > TOML > defaults
    let config = GatewayConfig::resolve(args.config.as_deref(), args.overrides())
        .context("Failed to load configuration")?;

    // RUST_LOG wins over the configured level
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log_level.as_str().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Log build identification immediately after tracing init
    info!(
        "Starting photo gateway (pgw-gateway) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );
    info!("Immich: {}", config.immich_api_url);
    info!("Grouping service: {}", config.grouping_api_url);
    info!("Deduplication service: {}", config.dedup_api_url);

    let immich = Arc::new(
        ImmichClient::new(&config.immich_api_url).context("Failed to build Immich client")?,
    );
    let grouping = Arc::new(
        GroupingClient::new(&config.grouping_api_url)
            .context("Failed to build grouping client")?,
    );
    let dedup = Arc::new(
        DeduplicationClient::new(&config.dedup_api_url)
            .context("Failed to build deduplication client")?,
    );

    let backend = cache::connect(&config.redis_url)
        .await
        .context("Failed to connect to token cache")?;
    let token_cache = Arc::new(TokenCache::new(
        backend,
        Duration::from_secs(config.cache_expiry_secs),
    ));
    info!("Token cache TTL: {}s", config.cache_expiry_secs);

    let state = AppState::new(
        Arc::new(AuthGate::new(token_cache.clone(), immich.clone())),
        immich.clone(),
        Arc::new(EnrichmentEngine::new(grouping.clone(), dedup.clone())),
        Arc::new(HealthAggregator::new(immich, grouping, dedup, token_cache)),
    );
    let app = build_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("pgw-gateway listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
