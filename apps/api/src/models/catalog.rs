#![allow(dead_code)]

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// `{id, name}` projection used by the search dropdowns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct PositionSummary {
    pub id: i32,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct PositionGroupRow {
    pub id: i32,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct PositionRow {
    pub id: i32,
    pub name: String,
    pub group_id: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct SkillRow {
    pub id: i32,
    pub name: String,
    pub group: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct TrendingRow {
    pub id: i32,
    pub name: String,
    pub level: i32,
}

/// One localized row of position content. At most one per `(position_id, language)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct PositionDetailsRow {
    pub id: i32,
    pub position_id: i32,
    pub language: String,
    pub description: Option<String>,
    pub responsibilities: Option<String>,
    pub trending_id: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
