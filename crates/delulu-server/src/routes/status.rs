//! Service status route.

use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};

use crate::state::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/status", get(get_status))
}

/// GET /api/status: provider availability and analyzer settings.
async fn get_status(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "llmAvailable": state.provider.is_some(),
        "llmProvider": state.provider.as_ref().map(|p| p.provider.to_string()),
        "model": state.provider.as_ref().map(|p| p.model.clone()),
        "outputMode": state.config.output_mode.to_string(),
        "perItemSummaries": state.config.per_item_summaries,
        "minTextLength": state.config.min_text_length,
    }))
}
