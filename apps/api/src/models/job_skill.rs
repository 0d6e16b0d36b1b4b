use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct JobSkillRow {
    pub id: i32,
    pub job_id: i32,
    pub skill_id: i32,
    pub score: f64,
}

/// A validated association waiting to be written. `score` already carries its default.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NewJobSkill {
    pub job_id: i32,
    pub skill_id: i32,
    pub score: f64,
}

/// Row of the main page score chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct SkillScore {
    pub skill: String,
    pub score: f64,
}

/// What a full replace did: rows removed, rows written.
#[derive(Debug, Clone, PartialEq)]
pub struct ReplaceOutcome {
    pub deleted_count: u64,
    pub inserted: Vec<JobSkillRow>,
}
