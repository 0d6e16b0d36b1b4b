//! Data-access seam. Handlers only ever see `Arc<dyn JobStore>`.
//!
//! `PgJobStore` is the production backend. Tests swap in `MemoryJobStore`.

use async_trait::async_trait;

use crate::errors::AppError;
use crate::jobs::filter::{JobFilter, JobOrdering, PageRequest};
use crate::models::catalog::{PositionGroupRow, PositionSummary};
use crate::models::job::JobDetail;
use crate::models::job_skill::{JobSkillRow, NewJobSkill, ReplaceOutcome, SkillScore};

#[async_trait]
pub trait JobStore: Send + Sync {
    /// One page of expanded position details matching `filter`, in `ordering`.
    async fn list_jobs(
        &self,
        filter: &JobFilter,
        ordering: &JobOrdering,
        page: &PageRequest,
    ) -> Result<Vec<JobDetail>, AppError>;

    /// Number of rows matching `filter`, ignoring pagination.
    async fn count_jobs(&self, filter: &JobFilter) -> Result<i64, AppError>;

    /// Exact `(position_id, language)` lookup. No fallback here.
    async fn find_job(&self, position_id: i32, language: &str)
        -> Result<Option<JobDetail>, AppError>;

    /// Distinct locale codes, optionally scoped to one position.
    async fn languages(&self, position_id: Option<i32>) -> Result<Vec<String>, AppError>;

    async fn positions(&self) -> Result<Vec<PositionSummary>, AppError>;

    async fn position_groups(&self) -> Result<Vec<PositionGroupRow>, AppError>;

    async fn skill_scores(&self) -> Result<Vec<SkillScore>, AppError>;

    /// The subset of `ids` that exist as positions.
    async fn existing_position_ids(&self, ids: &[i32]) -> Result<Vec<i32>, AppError>;

    /// The subset of `ids` that exist as skills.
    async fn existing_skill_ids(&self, ids: &[i32]) -> Result<Vec<i32>, AppError>;

    /// Atomically deletes every association and inserts `entries`.
    /// Any failure leaves the previous set untouched.
    async fn replace_job_skills(&self, entries: &[NewJobSkill]) -> Result<ReplaceOutcome, AppError>;

    /// Inserts the pair or replaces the score of the existing `(job_id, skill_id)` row.
    async fn upsert_job_skill(&self, entry: NewJobSkill) -> Result<JobSkillRow, AppError>;
}
