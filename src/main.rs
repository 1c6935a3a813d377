use aes_antiforgery::{
    config::{AntiforgeryConfig, EnvironmentKeyProvider},
    handlers, AntiforgeryService, AppState,
};

use std::net::SocketAddr;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "aes_antiforgery=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Key material and validity are read once; a bad configuration stops here.
    let config = AntiforgeryConfig::from_env()?;
    let antiforgery = AntiforgeryService::from_provider(&EnvironmentKeyProvider::default(), config)?;

    tracing::info!(
        "Antiforgery tokens valid for {} hours",
        antiforgery.validity().num_hours()
    );

    let app = handlers::routes(AppState { antiforgery }).layer(TraceLayer::new_for_http());

    let addr: SocketAddr = std::env::var("BIND_ADDR")
        .unwrap_or_else(|_| "127.0.0.1:3000".to_string())
        .parse()?;

    tracing::info!("Server running on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
