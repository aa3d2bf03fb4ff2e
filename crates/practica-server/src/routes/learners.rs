//! Learner sign-in, sign-out and progress endpoints.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::error::ApiResult;
use crate::state::AppState;
use practica_core::error::PracticaError;
use practica_core::learner::Learner;
use practica_core::progress::ProgressSummary;
use practica_core::types::{MasteryLevel, MasteryRecord};

/// Request body for signing in.
#[derive(Debug, Deserialize)]
pub struct SignInRequest {
    pub display_name: String,
}

/// Response for signing out.
#[derive(Debug, Serialize)]
pub struct SignOutResponse {
    pub user_id: String,
    pub removed_records: usize,
}

/// Mastery of one skill.
#[derive(Debug, Serialize)]
pub struct MasteryResponse {
    pub skill_id: String,
    pub title: String,
    pub level: MasteryLevel,
    pub record: Option<MasteryRecord>,
}

/// Sign a learner in.
/// POST /learners
pub async fn sign_in(
    State(state): State<AppState>,
    Json(request): Json<SignInRequest>,
) -> ApiResult<(StatusCode, Json<Learner>)> {
    let name = request.display_name.trim();
    if name.is_empty() {
        return Err(PracticaError::validation("display_name must not be empty").into());
    }

    let learner = state.sign_in(name).await;
    Ok((StatusCode::CREATED, Json(learner)))
}

/// Sign a learner out and clear their mastery records.
/// DELETE /learners/:id
pub async fn sign_out(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> ApiResult<Json<SignOutResponse>> {
    let removed_records = state.sign_out(&user_id).await?;
    Ok(Json(SignOutResponse {
        user_id,
        removed_records,
    }))
}

/// Progress summary.
/// GET /learners/:id/progress
pub async fn get_progress(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> ApiResult<Json<ProgressSummary>> {
    let learner = state.learner(&user_id).await?;
    let catalog = state.catalog().await;
    Ok(Json(learner.progress(&catalog)?))
}

/// Mastery record and level of one skill.
/// GET /learners/:id/mastery/:skill
pub async fn get_mastery(
    State(state): State<AppState>,
    Path((user_id, skill_id)): Path<(String, String)>,
) -> ApiResult<Json<MasteryResponse>> {
    let learner = state.learner(&user_id).await?;
    let catalog = state.catalog().await;
    let record = learner.store().get(&skill_id)?;

    if record.is_none() && !catalog.contains(&skill_id) {
        return Err(PracticaError::skill_not_found(&skill_id).into());
    }

    Ok(Json(MasteryResponse {
        title: catalog.title_for(&skill_id).to_string(),
        level: learner.level(&skill_id)?,
        skill_id,
        record,
    }))
}
