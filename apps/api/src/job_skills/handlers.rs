use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde::Serialize;
use serde_json::Value;

use crate::errors::AppError;
use crate::job_skills::replace::{add_one, replace_all};
use crate::job_skills::validation::{parse_bulk_body, parse_single_body};
use crate::models::job_skill::JobSkillRow;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ReplaceJobSkillsResponse {
    pub message: String,
    pub deleted_count: u64,
    pub inserted_count: usize,
    pub data: Vec<JobSkillRow>,
}

#[derive(Debug, Serialize)]
pub struct AddJobSkillResponse {
    pub message: String,
    pub data: JobSkillRow,
}

/// POST /api/job-skills
///
/// Replaces every job-skill association with the submitted array. `[]` clears all of them.
pub async fn handle_replace_job_skills(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<ReplaceJobSkillsResponse>, AppError> {
    let Json(body) = body?;
    let entries = parse_bulk_body(&body)?;

    let outcome = replace_all(state.store.as_ref(), &entries).await?;
    let message = if entries.is_empty() {
        "All job skills cleared"
    } else {
        "Job skills replaced successfully"
    };

    Ok(Json(ReplaceJobSkillsResponse {
        message: message.to_string(),
        deleted_count: outcome.deleted_count,
        inserted_count: outcome.inserted.len(),
        data: outcome.inserted,
    }))
}

/// POST /api/job-skills/add
///
/// Upserts a single association keyed on `(job_id, skill_id)`.
pub async fn handle_add_job_skill(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<AddJobSkillResponse>, AppError> {
    let Json(body) = body?;
    let entry = parse_single_body(&body)?;

    let row = add_one(state.store.as_ref(), entry).await?;
    Ok(Json(AddJobSkillResponse {
        message: "Job skill saved successfully".to_string(),
        data: row,
    }))
}
