use anyhow::Result;
use std::net::SocketAddr;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use submittal_api::config::Config;
use submittal_api::routes::build_router;
use submittal_api::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on malformed env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={},tower_http={}",
                env!("CARGO_CRATE_NAME"),
                &config.rust_log,
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Submittal API v{}", env!("CARGO_PKG_VERSION"));
    info!(
        "Engine defaults: strict_mode={}, confidence_threshold={}, match_threshold={}, pass/conditional={}/{}, max_critical_issues={}",
        config.analysis.strict_mode,
        config.analysis.confidence_threshold,
        config.analysis.match_threshold,
        config.analysis.compliance_pass_score,
        config.analysis.conditional_score,
        config.analysis.max_critical_issues
    );

    let state = AppState::new(config.clone());
    info!("Section classifier: {}", state.engine.classifier().name());

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once the review UI has a fixed host

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
