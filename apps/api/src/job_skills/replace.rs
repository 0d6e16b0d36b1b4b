use std::collections::BTreeSet;

use tracing::{info, warn};

use crate::errors::AppError;
use crate::jobs::store::JobStore;
use crate::models::job_skill::{JobSkillRow, NewJobSkill, ReplaceOutcome};

/// Replaces the whole association set with `entries`.
///
/// An empty set clears everything. Otherwise every referenced position and skill must exist
/// before anything is deleted; the delete and insert then run in one transaction.
pub async fn replace_all(
    store: &dyn JobStore,
    entries: &[NewJobSkill],
) -> Result<ReplaceOutcome, AppError> {
    if !entries.is_empty() {
        check_references(store, entries).await?;
    }

    let outcome = store.replace_job_skills(entries).await?;
    info!(
        "Replaced job skills: {} deleted, {} inserted",
        outcome.deleted_count,
        outcome.inserted.len()
    );
    Ok(outcome)
}

/// Inserts one association or updates the score of the existing pair.
pub async fn add_one(store: &dyn JobStore, entry: NewJobSkill) -> Result<JobSkillRow, AppError> {
    if store.existing_position_ids(&[entry.job_id]).await?.is_empty() {
        return Err(AppError::NotFound(format!(
            "Position {} not found",
            entry.job_id
        )));
    }
    if store.existing_skill_ids(&[entry.skill_id]).await?.is_empty() {
        return Err(AppError::NotFound(format!(
            "Skill {} not found",
            entry.skill_id
        )));
    }

    let row = store.upsert_job_skill(entry).await?;
    info!(
        "Saved job skill {} (job {}, skill {}, score {})",
        row.id, row.job_id, row.skill_id, row.score
    );
    Ok(row)
}

/// Fails with every unknown job and skill id if any reference is dangling.
async fn check_references(store: &dyn JobStore, entries: &[NewJobSkill]) -> Result<(), AppError> {
    let job_ids: Vec<i32> = entries
        .iter()
        .map(|e| e.job_id)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let skill_ids: Vec<i32> = entries
        .iter()
        .map(|e| e.skill_id)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let (known_jobs, known_skills) = tokio::try_join!(
        store.existing_position_ids(&job_ids),
        store.existing_skill_ids(&skill_ids),
    )?;

    let unknown_jobs = missing(&job_ids, &known_jobs);
    let unknown_skills = missing(&skill_ids, &known_skills);
    if unknown_jobs.is_empty() && unknown_skills.is_empty() {
        return Ok(());
    }

    warn!("Rejected job skill replace: unknown jobs {unknown_jobs:?}, unknown skills {unknown_skills:?}");
    Err(AppError::UnknownReferences {
        job_ids: unknown_jobs,
        skill_ids: unknown_skills,
    })
}

fn missing(wanted: &[i32], found: &[i32]) -> Vec<i32> {
    let found: BTreeSet<i32> = found.iter().copied().collect();
    wanted
        .iter()
        .copied()
        .filter(|id| !found.contains(id))
        .collect()
}
