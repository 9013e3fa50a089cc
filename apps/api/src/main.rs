mod config;
mod embedding_client;
mod errors;
mod generation;
mod models;
mod render;
mod routes;
mod selection;
mod state;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::embedding_client::EmbeddingClient;
use crate::render::compiler::DocumentCompiler;
use crate::render::cover_letter::CoverLetterRenderer;
use crate::render::process::TokioProcessRunner;
use crate::render::template::TemplateRenderer;
use crate::routes::build_router;
use crate::selection::semantic::SemanticScorer;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on malformed values)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Tailor API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize embedding client (keyword scoring only when no key is configured)
    let embedder = EmbeddingClient::new(&config.embedding)?;
    if embedder.is_enabled() {
        info!("Embedding client initialized (model: {})", embedder.model());
    } else {
        warn!("No embedding API key configured; ranking will use keyword scoring only");
    }
    let scorer = Arc::new(SemanticScorer::new(Arc::new(embedder)));

    // Load the templates once; a missing asset is fatal
    let renderer = TemplateRenderer::load(&config.render.template_path).with_context(|| {
        format!(
            "Failed to load resume template from {}",
            config.render.template_path.display()
        )
    })?;
    let cover_letter = CoverLetterRenderer::load(&config.render.cover_letter_template_path)
        .with_context(|| {
            format!(
                "Failed to load cover letter template from {}",
                config.render.cover_letter_template_path.display()
            )
        })?;

    let compiler = DocumentCompiler::new(&config.render, Arc::new(TokioProcessRunner));
    for status in compiler.compiler_status().await {
        match status.version {
            Some(version) => info!(compiler = %status.name, "LaTeX compiler available: {version}"),
            None => warn!(compiler = %status.name, "LaTeX compiler unavailable"),
        }
    }

    // Build app state
    let state = AppState {
        config: config.clone(),
        scorer,
        renderer: Arc::new(renderer),
        cover_letter: Arc::new(cover_letter),
        compiler: Arc::new(compiler),
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
