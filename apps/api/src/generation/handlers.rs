//! Axum route handlers for the Generation API.

use axum::{extract::State, Json};
use tracing::info;

use crate::errors::AppError;
use crate::generation::models::{GenerationRequest, GenerationResult};
use crate::state::AppState;

/// POST /api/v1/generate
///
/// Runs the constrained generation pipeline. Invalid requests are a 400; a model
/// failure is reported as a 200 with `success=false` and the underlying message.
pub async fn handle_generate(
    State(state): State<AppState>,
    Json(request): Json<GenerationRequest>,
) -> Result<Json<GenerationResult>, AppError> {
    let result = state.generator.generate(request).await?;

    info!(
        model = state.generator.model(),
        success = result.success,
        variants = result.variants.len(),
        processing_time_ms = result.metadata.processing_time_ms,
        "Generate request served"
    );

    Ok(Json(result))
}
