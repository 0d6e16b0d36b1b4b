use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use tracing::debug;

use crate::errors::AppError;
use crate::jobs::filter::{JobFilter, JobOrdering, PageRequest};
use crate::jobs::store::JobStore;
use crate::models::catalog::{PositionGroupRow, PositionSummary};
use crate::models::job::{JobDetail, JobSkillView, PositionView, SkillView, TrendingView};
use crate::models::job_skill::{JobSkillRow, NewJobSkill, ReplaceOutcome, SkillScore};

/// Rows per INSERT statement during a bulk replace. Three binds per row keeps each statement
/// well under PostgreSQL's 65535 bind parameter limit.
const INSERT_CHUNK: usize = 1000;

const JOB_DETAIL_SELECT: &str = r#"
    SELECT pd.id, pd.position_id, pd.language, pd.description, pd.responsibilities,
           pd.created_at, pd.updated_at,
           t.id AS trending_id, t.name AS trending_name, t.level AS trending_level,
           p.name AS position_name, p.group_id AS position_group_id
    FROM position_details pd
    JOIN position p ON p.id = pd.position_id
    LEFT JOIN trending t ON t.id = pd.trending_id
"#;

const JOB_DETAIL_COUNT: &str = r#"
    SELECT COUNT(*)
    FROM position_details pd
    JOIN position p ON p.id = pd.position_id
"#;

#[derive(Debug, FromRow)]
struct JobDetailRow {
    id: i32,
    position_id: i32,
    language: String,
    description: Option<String>,
    responsibilities: Option<String>,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: chrono::DateTime<chrono::Utc>,
    trending_id: Option<i32>,
    trending_name: Option<String>,
    trending_level: Option<i32>,
    position_name: String,
    position_group_id: Option<i32>,
}

#[derive(Debug, FromRow)]
struct JobSkillJoinRow {
    job_id: i32,
    skill_id: i32,
    score: f64,
    skill_name: String,
    skill_group: Option<String>,
}

/// PostgreSQL-backed [`JobStore`].
#[derive(Clone)]
pub struct PgJobStore {
    pool: PgPool,
}

impl PgJobStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Loads the job skills of every position in `rows` with one query and nests them.
    async fn expand(&self, rows: Vec<JobDetailRow>) -> Result<Vec<JobDetail>, AppError> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let mut position_ids: Vec<i32> = rows.iter().map(|r| r.position_id).collect();
        position_ids.sort_unstable();
        position_ids.dedup();

        let skill_rows = sqlx::query_as::<_, JobSkillJoinRow>(
            r#"
            SELECT js.job_id, js.skill_id, js.score,
                   s.name AS skill_name, s."group" AS skill_group
            FROM job_skills js
            JOIN skills s ON s.id = js.skill_id
            WHERE js.job_id = ANY($1)
            ORDER BY js.job_id, js.skill_id
            "#,
        )
        .bind(&position_ids)
        .fetch_all(&self.pool)
        .await?;

        let mut by_position: HashMap<i32, Vec<JobSkillView>> = HashMap::new();
        for s in skill_rows {
            by_position.entry(s.job_id).or_default().push(JobSkillView {
                job_id: s.job_id,
                skill_id: s.skill_id,
                score: s.score,
                skills: SkillView {
                    id: s.skill_id,
                    name: s.skill_name,
                    group: s.skill_group,
                },
            });
        }

        Ok(rows
            .into_iter()
            .map(|row| {
                let job_skills = by_position.get(&row.position_id).cloned().unwrap_or_default();
                into_job_detail(row, job_skills)
            })
            .collect())
    }
}

fn into_job_detail(row: JobDetailRow, job_skills: Vec<JobSkillView>) -> JobDetail {
    let trending = match (row.trending_id, row.trending_name, row.trending_level) {
        (Some(id), Some(name), Some(level)) => Some(TrendingView { id, name, level }),
        _ => None,
    };
    JobDetail {
        id: row.id,
        position_id: row.position_id,
        language: row.language,
        description: row.description,
        responsibilities: row.responsibilities,
        created_at: row.created_at,
        updated_at: row.updated_at,
        trending,
        position: PositionView {
            id: row.position_id,
            name: row.position_name,
            group_id: row.position_group_id,
            job_skills,
        },
    }
}

#[async_trait]
impl JobStore for PgJobStore {
    async fn list_jobs(
        &self,
        filter: &JobFilter,
        ordering: &JobOrdering,
        page: &PageRequest,
    ) -> Result<Vec<JobDetail>, AppError> {
        let mut qb: QueryBuilder<'_, Postgres> = QueryBuilder::new(JOB_DETAIL_SELECT);
        filter.push_predicate(&mut qb);
        ordering.push_order_by(&mut qb);
        qb.push(" LIMIT ").push_bind(page.size);
        qb.push(" OFFSET ").push_bind(page.offset());
        debug!("list_jobs: {}", qb.sql());

        let rows = qb
            .build_query_as::<JobDetailRow>()
            .fetch_all(&self.pool)
            .await?;
        self.expand(rows).await
    }

    async fn count_jobs(&self, filter: &JobFilter) -> Result<i64, AppError> {
        let mut qb: QueryBuilder<'_, Postgres> = QueryBuilder::new(JOB_DETAIL_COUNT);
        filter.push_predicate(&mut qb);
        Ok(qb.build_query_scalar::<i64>().fetch_one(&self.pool).await?)
    }

    async fn find_job(
        &self,
        position_id: i32,
        language: &str,
    ) -> Result<Option<JobDetail>, AppError> {
        let mut qb: QueryBuilder<'_, Postgres> = QueryBuilder::new(JOB_DETAIL_SELECT);
        qb.push(" WHERE pd.position_id = ")
            .push_bind(position_id)
            .push(" AND pd.language = ")
            .push_bind(language.to_string())
            .push(" ORDER BY pd.id LIMIT 1");

        let row = qb
            .build_query_as::<JobDetailRow>()
            .fetch_optional(&self.pool)
            .await?;
        match row {
            Some(row) => Ok(self.expand(vec![row]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn languages(&self, position_id: Option<i32>) -> Result<Vec<String>, AppError> {
        Ok(sqlx::query_scalar::<_, String>(
            r#"
            SELECT DISTINCT language
            FROM position_details
            WHERE ($1::INTEGER IS NULL OR position_id = $1)
            ORDER BY language
            "#,
        )
        .bind(position_id)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn positions(&self) -> Result<Vec<PositionSummary>, AppError> {
        Ok(
            sqlx::query_as::<_, PositionSummary>("SELECT id, name FROM position ORDER BY id")
                .fetch_all(&self.pool)
                .await?,
        )
    }

    async fn position_groups(&self) -> Result<Vec<PositionGroupRow>, AppError> {
        Ok(sqlx::query_as::<_, PositionGroupRow>(
            "SELECT id, name FROM position_group ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?)
    }

    async fn skill_scores(&self) -> Result<Vec<SkillScore>, AppError> {
        Ok(sqlx::query_as::<_, SkillScore>(
            r#"
            SELECT COALESCE(s.name, 'Unknown') AS skill, js.score
            FROM job_skills js
            LEFT JOIN skills s ON s.id = js.skill_id
            ORDER BY js.id
            "#,
        )
        .fetch_all(&self.pool)
        .await?)
    }

    async fn existing_position_ids(&self, ids: &[i32]) -> Result<Vec<i32>, AppError> {
        Ok(
            sqlx::query_scalar::<_, i32>("SELECT id FROM position WHERE id = ANY($1)")
                .bind(ids)
                .fetch_all(&self.pool)
                .await?,
        )
    }

    async fn existing_skill_ids(&self, ids: &[i32]) -> Result<Vec<i32>, AppError> {
        Ok(
            sqlx::query_scalar::<_, i32>("SELECT id FROM skills WHERE id = ANY($1)")
                .bind(ids)
                .fetch_all(&self.pool)
                .await?,
        )
    }

    async fn replace_job_skills(&self, entries: &[NewJobSkill]) -> Result<ReplaceOutcome, AppError> {
        // Dropping `tx` on any early return rolls the whole replace back.
        let mut tx = self.pool.begin().await?;

        let deleted_count = sqlx::query("DELETE FROM job_skills")
            .execute(&mut *tx)
            .await?
            .rows_affected();

        let mut inserted = Vec::with_capacity(entries.len());
        for chunk in entries.chunks(INSERT_CHUNK) {
            let mut qb: QueryBuilder<'_, Postgres> =
                QueryBuilder::new("INSERT INTO job_skills (job_id, skill_id, score) ");
            qb.push_values(chunk, |mut b, e| {
                b.push_bind(e.job_id).push_bind(e.skill_id).push_bind(e.score);
            });
            qb.push(" RETURNING id, job_id, skill_id, score");
            let rows = qb
                .build_query_as::<JobSkillRow>()
                .fetch_all(&mut *tx)
                .await?;
            inserted.extend(rows);
        }

        tx.commit().await?;

        Ok(ReplaceOutcome {
            deleted_count,
            inserted,
        })
    }

    async fn upsert_job_skill(&self, entry: NewJobSkill) -> Result<JobSkillRow, AppError> {
        Ok(sqlx::query_as::<_, JobSkillRow>(
            r#"
            INSERT INTO job_skills (job_id, skill_id, score)
            VALUES ($1, $2, $3)
            ON CONFLICT (job_id, skill_id) DO UPDATE SET score = EXCLUDED.score
            RETURNING id, job_id, skill_id, score
            "#,
        )
        .bind(entry.job_id)
        .bind(entry.skill_id)
        .bind(entry.score)
        .fetch_one(&self.pool)
        .await?)
    }
}
