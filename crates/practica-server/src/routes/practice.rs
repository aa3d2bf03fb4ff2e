//! Practice session endpoints.

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use practica_core::error::PracticaError;
use practica_core::review::ReviewKind;
use practica_core::session::{RejectReason, SessionSnapshot, SubmitOutcome};
use practica_core::types::{AttemptResult, SkillId};

/// Request body for starting or retargeting practice. An empty body starts
/// unconstrained practice.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StartPracticeRequest {
    /// Skill to practice; unconstrained when absent.
    pub target: Option<SkillId>,
    /// Practice a due bucket instead of a single skill.
    pub review: Option<ReviewKind>,
    /// Load a new item even if the current one already matches.
    #[serde(default)]
    pub force: bool,
}

/// Request body for updating the response buffer.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ResponseInput {
    Text { text: String },
    Options { options: Vec<String> },
}

#[derive(Debug, Serialize)]
pub struct HintsResponse {
    pub hints: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SubmitResponse {
    Graded { result: AttemptResult },
    Rejected { reason: RejectReason },
}

#[derive(Debug, Serialize)]
pub struct NextSkillResponse {
    pub target: Option<SkillId>,
    pub session: SessionSnapshot,
}

/// Start practice or change its target.
/// POST /learners/:id/practice
pub async fn start_practice(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    body: Bytes,
) -> ApiResult<Json<SessionSnapshot>> {
    let request: StartPracticeRequest = if body.is_empty() {
        StartPracticeRequest::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| ApiError::bad_request(format!("Invalid practice request: {}", e)))?
    };
    let learner = state.learner(&user_id).await?;
    let session = learner.session();

    if let Some(kind) = request.review {
        let now = learner.now();
        let plan = match kind {
            ReviewKind::DueToday => learner.scheduler().today_plan(now)?,
            ReviewKind::ThisWeek => learner.scheduler().week_plan(now)?,
            ReviewKind::Custom => {
                return Err(ApiError::bad_request(
                    "Custom reviews start from /review/custom",
                ))
            }
        };
        return Ok(Json(session.start_review(plan).await?));
    }

    if let Some(ref target) = request.target {
        let catalog = state.catalog().await;
        if !catalog.contains(target) {
            return Err(PracticaError::skill_not_found(target.as_str()).into());
        }
    }

    let snapshot = if request.force {
        session.retarget(request.target.as_deref()).await?
    } else {
        session.ensure_item(request.target.as_deref()).await?
    };
    Ok(Json(snapshot))
}

/// Current session state, idle when no session is open.
/// GET /learners/:id/practice
pub async fn get_practice(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> ApiResult<Json<SessionSnapshot>> {
    let learner = state.learner(&user_id).await?;
    let snapshot = match learner.active_session() {
        Some(session) => session.snapshot().await,
        None => SessionSnapshot::default(),
    };
    Ok(Json(snapshot))
}

/// Replace the response buffer.
/// PUT /learners/:id/practice/response
pub async fn put_response(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(input): Json<ResponseInput>,
) -> ApiResult<Json<SessionSnapshot>> {
    let learner = state.learner(&user_id).await?;
    let session = learner.session();

    match input {
        ResponseInput::Text { text } => session.set_response_text(text).await?,
        ResponseInput::Options { options } => session.set_selection(options).await?,
    }
    Ok(Json(session.snapshot().await))
}

/// Reveal hints for the current item.
/// POST /learners/:id/practice/hints
pub async fn reveal_hints(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> ApiResult<Json<HintsResponse>> {
    let learner = state.learner(&user_id).await?;
    let hints = learner.session().hints().await?;
    Ok(Json(HintsResponse { hints }))
}

/// Submit the response buffer for grading.
/// POST /learners/:id/practice/submit
pub async fn submit(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> ApiResult<Json<SubmitResponse>> {
    let learner = state.learner(&user_id).await?;
    let response = match learner.session().submit().await? {
        SubmitOutcome::Graded(result) => SubmitResponse::Graded { result },
        SubmitOutcome::Rejected(reason) => SubmitResponse::Rejected { reason },
    };
    Ok(Json(response))
}

/// Advance the review queue.
/// POST /learners/:id/practice/next-skill
pub async fn next_skill(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> ApiResult<Json<NextSkillResponse>> {
    let learner = state.learner(&user_id).await?;
    let session = learner.session();
    let target = session.next_skill().await?;
    Ok(Json(NextSkillResponse {
        target,
        session: session.snapshot().await,
    }))
}

/// Dispose the session.
/// DELETE /learners/:id/practice
pub async fn end_practice(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> ApiResult<StatusCode> {
    let learner = state.learner(&user_id).await?;
    learner.end_session().await;
    Ok(StatusCode::NO_CONTENT)
}
