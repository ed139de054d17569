//! Delulu server: HTTP front end for the conversation analyzer.

use std::sync::Arc;

use delulu_analyze::{LlmCollaborator, DELULU_LABELS};
use delulu_chat::LLMConfig;
use delulu_core::AnalyzerConfig;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod error;
mod routes;
mod state;

use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AnalyzerConfig::from_env()?;
    let port = config.port;
    info!(
        output_mode = %config.output_mode,
        per_item_summaries = config.per_item_summaries,
        "Configuration loaded"
    );

    let llm_config = LLMConfig::load(&config.llm_config_file);
    let state = match LlmCollaborator::from_config(&llm_config, &DELULU_LABELS) {
        Ok(llm) => AppState::with_llm(config, llm),
        Err(e) => {
            warn!(error = %e, "Starting without an LLM provider; analysis requests will fail");
            AppState::new(config, None, None)
        }
    };

    let app = routes::build_router(Arc::new(state));

    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Delulu server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
