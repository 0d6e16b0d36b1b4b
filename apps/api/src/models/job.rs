use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// Nested JSON projection returned by the listing and lookup endpoints.
// Field names are part of the public contract.

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendingView {
    pub id: i32,
    pub name: String,
    pub level: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillView {
    pub id: i32,
    pub name: String,
    pub group: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobSkillView {
    pub job_id: i32,
    pub skill_id: i32,
    pub score: f64,
    pub skills: SkillView,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionView {
    pub id: i32,
    pub name: String,
    pub group_id: Option<i32>,
    pub job_skills: Vec<JobSkillView>,
}

/// A position details row expanded with its trending label and its position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobDetail {
    pub id: i32,
    pub position_id: i32,
    pub language: String,
    pub description: Option<String>,
    pub responsibilities: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub trending: Option<TrendingView>,
    pub position: PositionView,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pagination {
    pub total: i64,
    #[serde(rename = "pageTotal")]
    pub page_total: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobListResponse {
    pub items: Vec<JobDetail>,
    pub pagination: Pagination,
}
