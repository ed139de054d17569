//! Analysis routes: single text, single screenshot, and screenshot batches.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use delulu_analyze::{AnalysisResult, BatchResult, Identity};
use delulu_core::ImageSource;
use serde::Deserialize;
use serde_json::Value;

use crate::error::ApiError;
use crate::state::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/analyze-text", post(analyze_text))
        .route("/analyze-screenshot", post(analyze_screenshot))
        .route("/analyze-screenshots", post(analyze_screenshots))
}

#[derive(Debug, Deserialize)]
pub struct TextRequest {
    #[serde(default)]
    pub text: Option<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScreenshotRequest {
    #[serde(default, alias = "screenshot")]
    pub image: Option<String>,
    #[serde(default, alias = "mimeType")]
    pub media_type: Option<String>,
}

/// One batch entry: a URL or data URL string, or inline base64 with a media type.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ImageEntry {
    Reference(String),
    Inline {
        data: String,
        #[serde(rename = "mediaType", alias = "mimeType")]
        media_type: String,
    },
}

#[derive(Debug, Deserialize)]
pub struct BatchRequest {
    #[serde(default)]
    pub images: Vec<ImageEntry>,
}

impl ImageEntry {
    /// Parse into an image plus the identity its output item will carry.
    fn resolve(&self, index: usize) -> Result<(Identity, ImageSource), ApiError> {
        let image = match self {
            ImageEntry::Reference(reference) => ImageSource::from_reference(reference),
            ImageEntry::Inline { data, media_type } => ImageSource::inline(data, media_type),
        }
        .map_err(|e| ApiError::bad_request(format!("Image {}: {}", index, e)))?;

        let identity = match image.url() {
            Some(url) => Identity::Url(url.to_string()),
            None => Identity::Index(index),
        };
        Ok((identity, image))
    }
}

/// POST /api/analyze-text
async fn analyze_text(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<TextRequest>, JsonRejection>,
) -> Result<Json<AnalysisResult>, ApiError> {
    let Json(req) = payload?;
    let text = req
        .text
        .as_ref()
        .and_then(Value::as_str)
        .ok_or_else(|| ApiError::bad_request("Text content is required"))?;

    let result = state.pipeline()?.analyze_text(text).await?;
    Ok(Json(result))
}

/// POST /api/analyze-screenshot
async fn analyze_screenshot(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ScreenshotRequest>, JsonRejection>,
) -> Result<Json<AnalysisResult>, ApiError> {
    let Json(req) = payload?;
    let data = req
        .image
        .as_deref()
        .filter(|d| !d.trim().is_empty())
        .ok_or_else(|| ApiError::bad_request("No screenshot provided"))?;

    let image = match req.media_type.as_deref() {
        Some(media_type) => ImageSource::inline(data, media_type)?,
        None => ImageSource::from_reference(data)?,
    };

    let result = state.pipeline()?.analyze_image(&image).await?;
    Ok(Json(result))
}

/// POST /api/analyze-screenshots
async fn analyze_screenshots(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<BatchRequest>, JsonRejection>,
) -> Result<Json<BatchResult>, ApiError> {
    let Json(req) = payload?;
    if req.images.is_empty() {
        return Err(ApiError::bad_request("At least one image is required"));
    }

    let images = req
        .images
        .iter()
        .enumerate()
        .map(|(i, entry)| entry.resolve(i))
        .collect::<Result<Vec<_>, _>>()?;

    let batch = state.pipeline()?.analyze_batch(images).await?;
    Ok(Json(batch))
}
