use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use tracing::info;

use crate::errors::AppError;
use crate::jobs::filter::{normalize_language, JobListQuery};
use crate::jobs::query::{find_job_with_fallback, list_jobs};
use crate::models::catalog::{PositionGroupRow, PositionSummary};
use crate::models::job::{JobDetail, JobListResponse};
use crate::models::job_skill::SkillScore;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LangQuery {
    pub lang: Option<String>,
}

/// GET /api/jobs
pub async fn handle_list_jobs(
    State(state): State<AppState>,
    Query(params): Query<JobListQuery>,
) -> Result<Json<JobListResponse>, AppError> {
    let listing = params.normalize();
    info!(
        "Trending: {:?} | Group pos IDs: {:?} | Language: {} | Search: {:?}",
        listing.ordering.trending, listing.filter.group_ids, listing.filter.language, listing.filter.search
    );

    let response = list_jobs(state.store.as_ref(), &listing).await?;
    info!(
        "Found {} jobs ({} total) for language: {}",
        response.items.len(),
        response.pagination.total,
        listing.filter.language
    );
    Ok(Json(response))
}

/// GET /api/jobs/:positionId
pub async fn handle_get_job(
    State(state): State<AppState>,
    Path(position_id): Path<String>,
    Query(params): Query<LangQuery>,
) -> Result<Json<JobDetail>, AppError> {
    let position_id = parse_position_id(&position_id)?;
    let lang = normalize_language(params.lang.as_deref());
    info!("Fetching position {position_id} in language: {lang}");

    let job = find_job_with_fallback(state.store.as_ref(), position_id, &lang).await?;
    info!("Found position details in language: {}", job.language);
    Ok(Json(job))
}

/// GET /api/positions/:positionId/languages
pub async fn handle_position_languages(
    State(state): State<AppState>,
    Path(position_id): Path<String>,
) -> Result<Json<Vec<String>>, AppError> {
    let position_id = parse_position_id(&position_id)?;
    Ok(Json(state.store.languages(Some(position_id)).await?))
}

/// GET /api/languages
pub async fn handle_languages(
    State(state): State<AppState>,
) -> Result<Json<Vec<String>>, AppError> {
    Ok(Json(state.store.languages(None).await?))
}

/// GET /api/query/position
pub async fn handle_positions(
    State(state): State<AppState>,
) -> Result<Json<Vec<PositionSummary>>, AppError> {
    Ok(Json(state.store.positions().await?))
}

/// GET /api/query/position-group
pub async fn handle_position_groups(
    State(state): State<AppState>,
) -> Result<Json<Vec<PositionGroupRow>>, AppError> {
    Ok(Json(state.store.position_groups().await?))
}

/// GET /api/query/mainpageScore
pub async fn handle_main_page_scores(
    State(state): State<AppState>,
) -> Result<Json<Vec<SkillScore>>, AppError> {
    Ok(Json(state.store.skill_scores().await?))
}

fn parse_position_id(raw: &str) -> Result<i32, AppError> {
    raw.trim()
        .parse::<i32>()
        .map_err(|_| AppError::Validation(format!("positionId must be an integer, got '{raw}'")))
}
