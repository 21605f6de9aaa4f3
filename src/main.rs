// Main entry point - Dependency injection and server setup
mod application;
mod domain;
mod infrastructure;
mod presentation;

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tokio::{net::TcpListener, signal};
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

use crate::application::chart_builder::{ChartBuilder, ChartTheme};
use crate::application::dashboard_app::DashboardApp;
use crate::application::trend_data_provider::TrendDataProvider;
use crate::infrastructure::config::load_settings;
use crate::infrastructure::google_trends::GoogleTrendsSource;
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{
    analyze, current_view, download_csv, filter_regions, health_check, index, options,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Load configuration
    let settings = load_settings()?;

    // Create source (infrastructure layer)
    let source = Arc::new(GoogleTrendsSource::new(&settings.provider)?);

    // Create services (application layer)
    let provider = TrendDataProvider::new(source, settings.provider.region_resolution);
    let charts = ChartBuilder::new(ChartTheme {
        template: settings.charts.template.clone(),
        ..ChartTheme::default()
    });
    let dashboard = DashboardApp::new(provider, charts);

    // Create application state
    let state = Arc::new(AppState { dashboard });

    // Build router (presentation layer)
    let router = Router::new()
        .route("/", get(index))
        .route("/healthz", get(health_check))
        .route("/api/options", get(options))
        .route("/api/view", get(current_view))
        .route("/api/analyze", post(analyze))
        .route("/api/regions", post(filter_regions))
        .route("/api/download.csv", get(download_csv))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    let address = settings.server.address();
    let listener = TcpListener::bind(&address).await?;
    info!("Trends dashboard listening on http://{}", address);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                tracing::error!("Failed to install signal handler: {}", e);
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
}
