use axum::{Json, extract::State};
use serde_json::{Map, json};
use std::sync::Arc;

use crate::catalog;
use crate::models::ProjectCatalog;
use crate::state::AppState;

// GET /api/projects
pub async fn projects_handler(State(state): State<Arc<AppState>>) -> Json<ProjectCatalog> {
    let projects = catalog::projects();
    let images_exist = catalog::images_exist(&projects, &state.public_dir).await;

    let mut meta = Map::new();
    meta.insert("imagesExist".to_string(), json!(images_exist));
    state.batcher.track("projects", "listed", meta);

    Json(ProjectCatalog {
        projects,
        images_exist,
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}
