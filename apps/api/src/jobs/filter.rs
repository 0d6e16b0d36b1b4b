//! Filter builder for the job listing.
//!
//! Turns raw query-string values into a [`JobListing`]: one predicate, one ordering and one page
//! window. Malformed inputs never fail; they degrade to "no filter" or to the defaults.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use serde::Deserialize;
use sqlx::{Postgres, QueryBuilder};

use crate::models::job::JobDetail;

pub const DEFAULT_LANGUAGE: &str = "en";
pub const DEFAULT_PAGE_SIZE: i64 = 13;
pub const MAX_PAGE_SIZE: i64 = 100;

/// Raw query string of `GET /api/jobs`. Everything is optional and kept as text so that a bad
/// value degrades instead of rejecting the request.
#[derive(Debug, Default, Deserialize)]
pub struct JobListQuery {
    pub page: Option<String>,
    pub size: Option<String>,
    #[serde(rename = "sortTrending")]
    pub sort_trending: Option<String>,
    #[serde(rename = "groupOfPos")]
    pub group_of_pos: Option<String>,
    pub search: Option<String>,
    pub language: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn parse(raw: &str) -> Self {
        if raw.trim().eq_ignore_ascii_case("desc") {
            SortDirection::Desc
        } else {
            SortDirection::Asc
        }
    }

    pub fn as_sql(self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: i64,
    pub size: i64,
}

impl PageRequest {
    pub fn offset(&self) -> i64 {
        self.page.saturating_mul(self.size)
    }

    /// `ceil(total / size)`.
    pub fn page_total(&self, total: i64) -> i64 {
        if total <= 0 {
            return 0;
        }
        (total + self.size - 1) / self.size
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        PageRequest {
            page: 0,
            size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Predicate over position details rows.
#[derive(Debug, Clone, PartialEq)]
pub struct JobFilter {
    pub language: String,
    /// Sorted and deduplicated. Empty means every group.
    pub group_ids: Vec<i32>,
    pub search: Option<String>,
}

impl Default for JobFilter {
    fn default() -> Self {
        JobFilter {
            language: DEFAULT_LANGUAGE.to_string(),
            group_ids: Vec::new(),
            search: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct JobOrdering {
    pub trending: SortDirection,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct JobListing {
    pub filter: JobFilter,
    pub ordering: JobOrdering,
    pub page: PageRequest,
}

impl JobListQuery {
    pub fn normalize(&self) -> JobListing {
        let page = self
            .page
            .as_deref()
            .and_then(|p| p.trim().parse::<i64>().ok())
            .filter(|p| *p >= 0)
            .unwrap_or(0);
        let size = self
            .size
            .as_deref()
            .and_then(|s| s.trim().parse::<i64>().ok())
            .filter(|s| *s >= 1)
            .map(|s| s.min(MAX_PAGE_SIZE))
            .unwrap_or(DEFAULT_PAGE_SIZE);

        JobListing {
            filter: JobFilter {
                language: normalize_language(self.language.as_deref()),
                group_ids: parse_group_ids(self.group_of_pos.as_deref().unwrap_or("")),
                search: self
                    .search
                    .as_deref()
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(String::from),
            },
            ordering: JobOrdering {
                trending: self
                    .sort_trending
                    .as_deref()
                    .map(SortDirection::parse)
                    .unwrap_or_default(),
            },
            page: PageRequest { page, size },
        }
    }
}

/// Trims a locale code; blank or absent means the default locale.
pub fn normalize_language(raw: Option<&str>) -> String {
    raw.map(str::trim)
        .filter(|l| !l.is_empty())
        .unwrap_or(DEFAULT_LANGUAGE)
        .to_string()
}

/// Parses a comma separated id list. Non-numeric and non-positive tokens are dropped.
pub fn parse_group_ids(raw: &str) -> Vec<i32> {
    raw.split(',')
        .filter_map(|token| token.trim().parse::<i32>().ok())
        .filter(|id| *id > 0)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

impl JobFilter {
    /// Appends ` WHERE ...` for this filter. Expects `pd` (position_details) and `p` (position)
    /// to be in scope. Both the page query and the count query go through here.
    pub fn push_predicate(&self, qb: &mut QueryBuilder<'_, Postgres>) {
        qb.push(" WHERE pd.language = ");
        qb.push_bind(self.language.clone());

        if !self.group_ids.is_empty() {
            qb.push(" AND p.group_id = ANY(");
            qb.push_bind(self.group_ids.clone());
            qb.push(")");
        }

        if let Some(search) = &self.search {
            qb.push(" AND (strpos(p.name, ");
            qb.push_bind(search.clone());
            qb.push(") > 0 OR EXISTS (SELECT 1 FROM job_skills js JOIN skills s ON s.id = js.skill_id WHERE js.job_id = p.id AND strpos(s.name, ");
            qb.push_bind(search.clone());
            qb.push(") > 0))");
        }
    }

    /// Same predicate as [`JobFilter::push_predicate`], evaluated in memory.
    pub fn matches(&self, job: &JobDetail) -> bool {
        if job.language != self.language {
            return false;
        }
        if !self.group_ids.is_empty() {
            match job.position.group_id {
                Some(group_id) if self.group_ids.binary_search(&group_id).is_ok() => {}
                _ => return false,
            }
        }
        match &self.search {
            None => true,
            Some(search) => {
                job.position.name.contains(search.as_str())
                    || job
                        .position
                        .job_skills
                        .iter()
                        .any(|js| js.skills.name.contains(search.as_str()))
            }
        }
    }
}

impl JobOrdering {
    /// Appends ` ORDER BY ...`. Expects `t` (trending) and `pd` in scope.
    pub fn push_order_by(&self, qb: &mut QueryBuilder<'_, Postgres>) {
        qb.push(" ORDER BY t.level ");
        qb.push(self.trending.as_sql());
        qb.push(" NULLS LAST, pd.id ASC");
    }

    /// Rows without a trending label sort last in either direction; ties break on id.
    pub fn compare(&self, a: &JobDetail, b: &JobDetail) -> Ordering {
        let by_level = match (&a.trending, &b.trending) {
            (Some(ta), Some(tb)) => match self.trending {
                SortDirection::Asc => ta.level.cmp(&tb.level),
                SortDirection::Desc => tb.level.cmp(&ta.level),
            },
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        };
        by_level.then(a.id.cmp(&b.id))
    }
}
