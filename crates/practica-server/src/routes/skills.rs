//! Skill catalog endpoint.

use axum::{extract::State, Json};

use crate::error::ApiResult;
use crate::state::AppState;
use practica_core::types::Skill;

/// List the skill catalog in order.
/// GET /skills
pub async fn list_skills(State(state): State<AppState>) -> ApiResult<Json<Vec<Skill>>> {
    let catalog = state.catalog().await;
    Ok(Json(catalog.iter().cloned().collect()))
}
