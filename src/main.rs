use std::{net::SocketAddr, sync::Arc, time::Duration};
use tokio::net::TcpListener;
use tracing::{info, warn};

use whois_lookup::{
    api::{self, AppState},
    config::Config,
    metrics, store,
    whois::WhoisXmlApiClient,
    LookupService,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // A missing .env file is the normal case in production
    let _ = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "whois_lookup=info,tower_http=debug".into()),
        )
        .init();

    // Misconfiguration must not stop /health from serving
    let config = match Config::load() {
        Ok(config) => {
            info!("Configuration loaded successfully");
            config
        }
        Err(e) => {
            warn!("Failed to load configuration, using defaults: {}", e);
            Config::default()
        }
    };

    let provider = Arc::new(WhoisXmlApiClient::new(&config)?);
    let lookup_store = store::connect(
        config.database_url.as_deref(),
        Duration::from_millis(config.database_connect_timeout_ms),
    )
    .await;

    metrics::init_metrics();

    let lookup_service = Arc::new(LookupService::with_config(provider, lookup_store, &config));
    let app = api::router(AppState { lookup_service }, &config.cors_origins);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(addr).await?;

    info!("WHOIS lookup service listening on {}", addr);
    info!("Health check: http://{}/health", addr);
    info!("Metrics: http://{}/metrics", addr);

    // Graceful shutdown handling
    let shutdown_signal = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to install CTRL+C signal handler: {}", e);
            std::future::pending::<()>().await;
        }
        info!("Received shutdown signal, gracefully shutting down...");
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    Ok(())
}
