mod config;
mod errors;
mod models;
mod routes;
mod scan;
mod state;
mod taxonomy;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::routes::build_router;
use crate::scan::classifier::{HeadingClassifier, SectionClassifier};
use crate::state::AppState;
use crate::taxonomy::store::load_registry;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on unparsable values or bad score weights)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Scanner API v{}", env!("CARGO_PKG_VERSION"));

    // Load taxonomies (built-in, plus TAXONOMY_PATH when set)
    let taxonomies = load_registry(config.taxonomy_path.as_deref()).await?;

    // Initialize section classifier (HeadingClassifier by default)
    let classifier: Arc<dyn SectionClassifier> = Arc::new(HeadingClassifier::new());
    info!(
        classifier = classifier.name(),
        max_input_bytes = config.max_input_bytes,
        scan_timeout_ms = config.scan_timeout_ms,
        "Scan engine configured (weights {}/{}/{})",
        config.weights.skill_coverage,
        config.weights.section_completeness,
        config.weights.clarity
    );

    // Build app state
    let state = AppState {
        config: config.clone(),
        taxonomies: Arc::new(taxonomies),
        classifier,
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
