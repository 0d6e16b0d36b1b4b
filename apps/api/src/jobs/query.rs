use tracing::info;

use crate::errors::AppError;
use crate::jobs::filter::{JobListing, DEFAULT_LANGUAGE};
use crate::jobs::store::JobStore;
use crate::models::job::{JobDetail, JobListResponse, Pagination};

/// Runs the page query and the count query under the same predicate.
pub async fn list_jobs(
    store: &dyn JobStore,
    listing: &JobListing,
) -> Result<JobListResponse, AppError> {
    let (items, total) = tokio::try_join!(
        store.list_jobs(&listing.filter, &listing.ordering, &listing.page),
        store.count_jobs(&listing.filter),
    )?;

    Ok(JobListResponse {
        items,
        pagination: Pagination {
            total,
            page_total: listing.page.page_total(total),
        },
    })
}

/// Looks up `(position_id, language)`, then `(position_id, "en")` if the first misses.
pub async fn find_job_with_fallback(
    store: &dyn JobStore,
    position_id: i32,
    language: &str,
) -> Result<JobDetail, AppError> {
    if let Some(job) = store.find_job(position_id, language).await? {
        return Ok(job);
    }

    if language != DEFAULT_LANGUAGE {
        info!("Position {position_id} not found in {language}, falling back to {DEFAULT_LANGUAGE}");
        if let Some(job) = store.find_job(position_id, DEFAULT_LANGUAGE).await? {
            return Ok(job);
        }
    }

    Err(AppError::PositionNotFound {
        position_id,
        language: language.to_string(),
    })
}
