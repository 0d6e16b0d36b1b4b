pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::job_skills::handlers as job_skills;
use crate::jobs::handlers as jobs;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health::root_handler))
        .route("/health", get(health::health_handler))
        // Listings and localized lookup
        .route("/api/jobs", get(jobs::handle_list_jobs))
        .route("/api/jobs/:positionId", get(jobs::handle_get_job))
        .route(
            "/api/positions/:positionId/languages",
            get(jobs::handle_position_languages),
        )
        .route("/api/languages", get(jobs::handle_languages))
        // Search dropdowns and charts
        .route("/api/query/position", get(jobs::handle_positions))
        .route(
            "/api/query/position-group",
            get(jobs::handle_position_groups),
        )
        .route(
            "/api/query/mainpageScore",
            get(jobs::handle_main_page_scores),
        )
        // Job-skill writes
        .route("/api/job-skills", post(job_skills::handle_replace_job_skills))
        .route("/api/job-skills/add", post(job_skills::handle_add_job_skill))
        .with_state(state)
}
