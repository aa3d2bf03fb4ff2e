//! Review bucket endpoints.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::error::ApiResult;
use crate::state::AppState;
use practica_core::error::PracticaError;
use practica_core::review::ReviewPlan;
use practica_core::session::SessionSnapshot;
use practica_core::types::{MasteryRecord, SkillId};

/// A due bucket with the plan that would practice it.
#[derive(Debug, Serialize)]
pub struct BucketResponse {
    pub records: Vec<MasteryRecord>,
    pub plan: ReviewPlan,
}

/// Request body for a custom review.
#[derive(Debug, Deserialize)]
pub struct CustomReviewRequest {
    pub skills: Vec<SkillId>,
    pub item_count: Option<u32>,
    /// Start practicing the plan right away.
    #[serde(default)]
    pub start: bool,
}

#[derive(Debug, Serialize)]
pub struct CustomReviewResponse {
    pub plan: ReviewPlan,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session: Option<SessionSnapshot>,
}

/// Skills due for review now.
/// GET /learners/:id/review/today
pub async fn due_today(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> ApiResult<Json<BucketResponse>> {
    let learner = state.learner(&user_id).await?;
    let now = learner.now();
    let scheduler = learner.scheduler();

    Ok(Json(BucketResponse {
        records: scheduler.due_today(now)?,
        plan: scheduler.today_plan(now)?,
    }))
}

/// Skills due for review within the week.
/// GET /learners/:id/review/week
pub async fn due_this_week(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> ApiResult<Json<BucketResponse>> {
    let learner = state.learner(&user_id).await?;
    let now = learner.now();
    let scheduler = learner.scheduler();

    Ok(Json(BucketResponse {
        records: scheduler.due_this_week(now)?,
        plan: scheduler.week_plan(now)?,
    }))
}

/// Build (and optionally start) a custom review.
/// POST /learners/:id/review/custom
pub async fn custom_review(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(request): Json<CustomReviewRequest>,
) -> ApiResult<Json<CustomReviewResponse>> {
    let learner = state.learner(&user_id).await?;
    let catalog = state.catalog().await;

    let plan = learner
        .scheduler()
        .custom_set(&request.skills, request.item_count)?;
    if let Some(unknown) = plan.skills.iter().find(|s| !catalog.contains(s)) {
        return Err(PracticaError::skill_not_found(unknown.as_str()).into());
    }

    let session = if request.start {
        Some(learner.session().start_review(plan.clone()).await?)
    } else {
        None
    };

    Ok(Json(CustomReviewResponse { plan, session }))
}
