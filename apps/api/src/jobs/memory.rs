//! In-memory [`JobStore`] for handler tests. Mirrors the PostgreSQL schema's uniqueness rules and
//! the all-or-nothing behaviour of the bulk replace.

use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};

use crate::errors::AppError;
use crate::jobs::filter::{JobFilter, JobOrdering, PageRequest};
use crate::jobs::store::JobStore;
use crate::models::catalog::{
    PositionDetailsRow, PositionGroupRow, PositionRow, PositionSummary, SkillRow, TrendingRow,
};
use crate::models::job::{JobDetail, JobSkillView, PositionView, SkillView, TrendingView};
use crate::models::job_skill::{JobSkillRow, NewJobSkill, ReplaceOutcome, SkillScore};

#[derive(Debug, Default, Clone)]
struct Tables {
    groups: Vec<PositionGroupRow>,
    positions: Vec<PositionRow>,
    skills: Vec<SkillRow>,
    trending: Vec<TrendingRow>,
    details: Vec<PositionDetailsRow>,
    job_skills: Vec<JobSkillRow>,
    next_job_skill_id: i32,
}

impl Tables {
    fn expand(&self, row: &PositionDetailsRow) -> Option<JobDetail> {
        let position = self.positions.iter().find(|p| p.id == row.position_id)?;
        let trending = row
            .trending_id
            .and_then(|id| self.trending.iter().find(|t| t.id == id))
            .map(|t| TrendingView {
                id: t.id,
                name: t.name.clone(),
                level: t.level,
            });
        let mut job_skills: Vec<JobSkillView> = self
            .job_skills
            .iter()
            .filter(|js| js.job_id == position.id)
            .filter_map(|js| {
                let skill = self.skills.iter().find(|s| s.id == js.skill_id)?;
                Some(JobSkillView {
                    job_id: js.job_id,
                    skill_id: js.skill_id,
                    score: js.score,
                    skills: SkillView {
                        id: skill.id,
                        name: skill.name.clone(),
                        group: skill.group.clone(),
                    },
                })
            })
            .collect();
        job_skills.sort_by_key(|js| js.skill_id);

        Some(JobDetail {
            id: row.id,
            position_id: row.position_id,
            language: row.language.clone(),
            description: row.description.clone(),
            responsibilities: row.responsibilities.clone(),
            created_at: row.created_at,
            updated_at: row.updated_at,
            trending,
            position: PositionView {
                id: position.id,
                name: position.name.clone(),
                group_id: position.group_id,
                job_skills,
            },
        })
    }

    fn matching(&self, filter: &JobFilter) -> Vec<JobDetail> {
        self.details
            .iter()
            .filter_map(|d| self.expand(d))
            .filter(|job| filter.matches(job))
            .collect()
    }

    fn insert_job_skill(&mut self, entry: NewJobSkill) -> JobSkillRow {
        self.next_job_skill_id += 1;
        let row = JobSkillRow {
            id: self.next_job_skill_id,
            job_id: entry.job_id,
            skill_id: entry.skill_id,
            score: entry.score,
        };
        self.job_skills.push(row.clone());
        row
    }
}

#[derive(Debug, Default)]
pub struct MemoryJobStore {
    tables: Mutex<Tables>,
}

impl MemoryJobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Two groups, three positions, three skills, two trending levels and four detail rows:
    ///
    /// | details | position (group) | language | trending level |
    /// |---------|------------------|----------|----------------|
    /// | 1       | Rust Engineer (1)| en       | 2              |
    /// | 2       | Rust Engineer (1)| th       | 2              |
    /// | 3       | Data Analyst (1) | en       | 1              |
    /// | 4       | UX Designer (2)  | en       | none           |
    pub fn seeded() -> Self {
        let store = Self::new()
            .with_group(1, "Engineering")
            .with_group(2, "Design")
            .with_position(1, "Rust Engineer", Some(1))
            .with_position(2, "Data Analyst", Some(1))
            .with_position(3, "UX Designer", Some(2))
            .with_skill(1, "Rust", Some("Language"))
            .with_skill(2, "SQL", Some("Language"))
            .with_skill(3, "Figma", None)
            .with_trending(1, "Hot", 1)
            .with_trending(2, "Rising", 2)
            .with_details(1, 1, "en", Some(2))
            .with_details(2, 1, "th", Some(2))
            .with_details(3, 2, "en", Some(1))
            .with_details(4, 3, "en", None);
        for (job_id, skill_id, score) in [(1, 1, 90.0), (1, 2, 60.0), (2, 2, 80.0), (3, 3, 70.0)] {
            store.lock().insert_job_skill(NewJobSkill {
                job_id,
                skill_id,
                score,
            });
        }
        store
    }

    pub fn with_group(self, id: i32, name: &str) -> Self {
        self.lock().groups.push(PositionGroupRow {
            id,
            name: name.to_string(),
        });
        self
    }

    pub fn with_position(self, id: i32, name: &str, group_id: Option<i32>) -> Self {
        self.lock().positions.push(PositionRow {
            id,
            name: name.to_string(),
            group_id,
        });
        self
    }

    pub fn with_skill(self, id: i32, name: &str, group: Option<&str>) -> Self {
        self.lock().skills.push(SkillRow {
            id,
            name: name.to_string(),
            group: group.map(String::from),
        });
        self
    }

    pub fn with_trending(self, id: i32, name: &str, level: i32) -> Self {
        self.lock().trending.push(TrendingRow {
            id,
            name: name.to_string(),
            level,
        });
        self
    }

    pub fn with_details(
        self,
        id: i32,
        position_id: i32,
        language: &str,
        trending_id: Option<i32>,
    ) -> Self {
        let stamp = Utc
            .with_ymd_and_hms(2024, 1, 1, 0, 0, 0)
            .single()
            .unwrap_or_else(Utc::now);
        self.lock().details.push(PositionDetailsRow {
            id,
            position_id,
            language: language.to_string(),
            description: Some(format!("description {position_id}/{language}")),
            responsibilities: Some(format!("responsibilities {position_id}/{language}")),
            trending_id,
            created_at: stamp,
            updated_at: stamp,
        });
        self
    }

    pub fn job_skills(&self) -> Vec<JobSkillRow> {
        self.lock().job_skills.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl JobStore for MemoryJobStore {
    async fn list_jobs(
        &self,
        filter: &JobFilter,
        ordering: &JobOrdering,
        page: &PageRequest,
    ) -> Result<Vec<JobDetail>, AppError> {
        let mut jobs = self.lock().matching(filter);
        jobs.sort_by(|a, b| ordering.compare(a, b));
        Ok(jobs
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.size as usize)
            .collect())
    }

    async fn count_jobs(&self, filter: &JobFilter) -> Result<i64, AppError> {
        Ok(self.lock().matching(filter).len() as i64)
    }

    async fn find_job(
        &self,
        position_id: i32,
        language: &str,
    ) -> Result<Option<JobDetail>, AppError> {
        let tables = self.lock();
        Ok(tables
            .details
            .iter()
            .find(|d| d.position_id == position_id && d.language == language)
            .and_then(|d| tables.expand(d)))
    }

    async fn languages(&self, position_id: Option<i32>) -> Result<Vec<String>, AppError> {
        let mut languages: Vec<String> = self
            .lock()
            .details
            .iter()
            .filter(|d| position_id.map_or(true, |id| d.position_id == id))
            .map(|d| d.language.clone())
            .collect();
        languages.sort();
        languages.dedup();
        Ok(languages)
    }

    async fn positions(&self) -> Result<Vec<PositionSummary>, AppError> {
        Ok(self
            .lock()
            .positions
            .iter()
            .map(|p| PositionSummary {
                id: p.id,
                name: p.name.clone(),
            })
            .collect())
    }

    async fn position_groups(&self) -> Result<Vec<PositionGroupRow>, AppError> {
        Ok(self.lock().groups.clone())
    }

    async fn skill_scores(&self) -> Result<Vec<SkillScore>, AppError> {
        let tables = self.lock();
        Ok(tables
            .job_skills
            .iter()
            .map(|js| SkillScore {
                skill: tables
                    .skills
                    .iter()
                    .find(|s| s.id == js.skill_id)
                    .map(|s| s.name.clone())
                    .unwrap_or_else(|| "Unknown".to_string()),
                score: js.score,
            })
            .collect())
    }

    async fn existing_position_ids(&self, ids: &[i32]) -> Result<Vec<i32>, AppError> {
        let tables = self.lock();
        Ok(ids
            .iter()
            .copied()
            .filter(|id| tables.positions.iter().any(|p| p.id == *id))
            .collect())
    }

    async fn existing_skill_ids(&self, ids: &[i32]) -> Result<Vec<i32>, AppError> {
        let tables = self.lock();
        Ok(ids
            .iter()
            .copied()
            .filter(|id| tables.skills.iter().any(|s| s.id == *id))
            .collect())
    }

    async fn replace_job_skills(&self, entries: &[NewJobSkill]) -> Result<ReplaceOutcome, AppError> {
        let mut tables = self.lock();

        // Work on a copy; only a fully successful replace is swapped in.
        let mut staged = tables.clone();
        let deleted_count = staged.job_skills.len() as u64;
        staged.job_skills.clear();

        let mut seen = HashSet::new();
        let mut inserted = Vec::with_capacity(entries.len());
        for entry in entries {
            if !seen.insert((entry.job_id, entry.skill_id)) {
                return Err(AppError::Conflict(format!(
                    "duplicate key value violates unique constraint: (job_id, skill_id)=({}, {})",
                    entry.job_id, entry.skill_id
                )));
            }
            inserted.push(staged.insert_job_skill(*entry));
        }

        *tables = staged;
        Ok(ReplaceOutcome {
            deleted_count,
            inserted,
        })
    }

    async fn upsert_job_skill(&self, entry: NewJobSkill) -> Result<JobSkillRow, AppError> {
        let mut tables = self.lock();
        if let Some(existing) = tables
            .job_skills
            .iter_mut()
            .find(|js| js.job_id == entry.job_id && js.skill_id == entry.skill_id)
        {
            existing.score = entry.score;
            return Ok(existing.clone());
        }
        Ok(tables.insert_job_skill(entry))
    }
}
