//! Route definitions for the REST API.

mod health;
mod learners;
mod practice;
mod review;
mod skills;

use axum::{
    routing::{delete, get, post, put},
    Router,
};

use crate::state::AppState;

/// Create the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/skills", get(skills::list_skills))
        // Learners
        .route("/learners", post(learners::sign_in))
        .route("/learners/:id", delete(learners::sign_out))
        .route("/learners/:id/progress", get(learners::get_progress))
        .route("/learners/:id/mastery/:skill", get(learners::get_mastery))
        // Review buckets
        .route("/learners/:id/review/today", get(review::due_today))
        .route("/learners/:id/review/week", get(review::due_this_week))
        .route("/learners/:id/review/custom", post(review::custom_review))
        // Practice session
        .route(
            "/learners/:id/practice",
            post(practice::start_practice)
                .get(practice::get_practice)
                .delete(practice::end_practice),
        )
        .route("/learners/:id/practice/response", put(practice::put_response))
        .route("/learners/:id/practice/hints", post(practice::reveal_hints))
        .route("/learners/:id/practice/submit", post(practice::submit))
        .route("/learners/:id/practice/next-skill", post(practice::next_skill))
        .with_state(state)
}

pub use health::*;
pub use learners::*;
pub use practice::*;
pub use review::*;
pub use skills::*;
