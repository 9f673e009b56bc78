// Main entry point for the competitor analysis API

use std::sync::Arc;

use anyhow::{Context, Result};
use competitor_analysis::{ChromeRenderer, OpenAiReasoner, Pipeline};
use competitor_server::{build_app, AppState, Config};
use openai_client::OpenAIClient;
use secrecy::ExposeSecret;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,competitor_analysis=debug,competitor_server=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting competitor analysis API");

    // Load configuration
    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::info!(
        text_model = %config.pipeline.text_model,
        vision_model = %config.pipeline.vision_model,
        render_concurrency = config.pipeline.render_permits(),
        "Configuration loaded"
    );

    let mut client = OpenAIClient::new(config.openai_api_key.expose_secret())
        .with_timeout(config.pipeline.analysis_timeout());
    if let Some(base_url) = &config.openai_base_url {
        client = client.with_base_url(base_url);
    }
    let reasoner = OpenAiReasoner::new(client);

    // Leave room inside the render deadline for content and screenshot capture
    let mut renderer =
        ChromeRenderer::new().with_navigation_timeout(config.pipeline.render_timeout() / 3);
    if let Some(path) = &config.chrome_path {
        renderer = renderer.with_chrome_path(path);
    }

    let pipeline = Pipeline::builder(Arc::new(reasoner))
        .config(config.pipeline.clone())
        .renderer(Arc::new(renderer))
        .build()
        .context("Failed to build pipeline")?;

    let app = build_app(AppState::new(pipeline));

    // Start server
    let addr = config.bind_addr();
    tracing::info!("Starting server on {}", addr);
    tracing::info!("Health check: http://localhost:{}/health", config.port);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
