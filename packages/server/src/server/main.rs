// Main entry point for the HAR extraction API server

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use harlog::{ExtractionPipeline, OpenAiClassifier};
use server_core::server::app::{build_app, AppState};
use server_core::uploads::{spawn_session_sweeper, MemorySessionStore, UploadTracker};
use server_core::Config;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,server_core=debug,harlog=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting HAR extraction API");

    // Load configuration
    let config = Config::from_env().context("Failed to load configuration")?;

    tokio::fs::create_dir_all(&config.upload_dir)
        .await
        .with_context(|| format!("Failed to create upload dir {}", config.upload_dir.display()))?;

    // Upload tracking with background TTL eviction
    let tracker = Arc::new(
        UploadTracker::new(Arc::new(MemorySessionStore::new()), &config.upload_dir)
            .with_ttl(Duration::from_secs(config.session_ttl_secs)),
    );
    spawn_session_sweeper(tracker.clone(), SWEEP_INTERVAL);

    // Extraction pipeline with the OpenAI classifier
    let classifier = Arc::new(OpenAiClassifier::new(config.openai_api_key.clone()));
    let pipeline = Arc::new(
        ExtractionPipeline::new(classifier)
            .with_classifier_deadline(Duration::from_secs(config.classifier_timeout_secs)),
    );

    let state = AppState {
        tracker,
        pipeline,
        default_model: config.default_model.clone(),
        http_client: reqwest::Client::new(),
    };
    let app = build_app(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("Starting server on {}", addr);
    tracing::info!("Health check: http://localhost:{}/health", config.port);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
