use axum::{Json, extract::State};
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::error;

use crate::error::ApiError;
use crate::state::AppState;

// GET /api/images - make sure <public>/images exists
pub async fn images_handler(State(state): State<Arc<AppState>>) -> Result<Json<Value>, ApiError> {
    let images_dir = state.public_dir.join("images");

    tokio::fs::create_dir_all(&images_dir).await.map_err(|e| {
        error!(error = %e, dir = %images_dir.display(), "Error setting up image directories");
        ApiError::Internal("Failed to set up image directories")
    })?;

    Ok(Json(json!({ "success": true })))
}
