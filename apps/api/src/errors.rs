use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;

/// PostgreSQL SQLSTATE for a unique constraint violation.
const UNIQUE_VIOLATION: &str = "23505";
/// PostgreSQL SQLSTATE for a foreign key violation.
const FOREIGN_KEY_VIOLATION: &str = "23503";

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Position {position_id} not found in '{language}'")]
    PositionNotFound { position_id: i32, language: String },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unknown references: jobs {job_ids:?}, skills {skill_ids:?}")]
    UnknownReferences {
        job_ids: Vec<i32>,
        skill_ids: Vec<i32>,
    },

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message, details) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone(), None),
            AppError::PositionNotFound {
                position_id,
                language,
            } => (
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
                "Position not found".to_string(),
                Some(json!({
                    "positionId": position_id,
                    "requestedLanguage": language,
                })),
            ),
            AppError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
                msg.clone(),
                None,
            ),
            AppError::UnknownReferences { job_ids, skill_ids } => (
                StatusCode::BAD_REQUEST,
                "UNKNOWN_REFERENCE",
                "Some job_id or skill_id values do not exist".to_string(),
                Some(json!({
                    "unknown_job_ids": job_ids,
                    "unknown_skill_ids": skill_ids,
                })),
            ),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, "DUPLICATE_KEY", msg.clone(), None),
            AppError::Database(e) => {
                let (status, code) = classify_database_error(e);
                if status.is_server_error() {
                    tracing::error!("Database error: {e}");
                } else {
                    tracing::warn!("Constraint violation ({code}): {e}");
                }
                (status, code, database_message(e), None)
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                    None,
                )
            }
        };

        (status, Json(error_body(code, &message, details))).into_response()
    }
}

fn error_body(code: &str, message: &str, details: Option<Value>) -> Value {
    let mut error = json!({
        "code": code,
        "message": message,
    });
    if let Some(details) = details {
        error["details"] = details;
    }
    json!({ "error": error })
}

/// Maps a database failure to the closest status by SQLSTATE.
fn classify_database_error(e: &sqlx::Error) -> (StatusCode, &'static str) {
    let code = e.as_database_error().and_then(|db_err| db_err.code());
    match code.as_deref() {
        Some(UNIQUE_VIOLATION) => (StatusCode::CONFLICT, "DUPLICATE_KEY"),
        Some(FOREIGN_KEY_VIOLATION) => (StatusCode::BAD_REQUEST, "FOREIGN_KEY_VIOLATION"),
        _ => (StatusCode::INTERNAL_SERVER_ERROR, "DATABASE_ERROR"),
    }
}

fn database_message(e: &sqlx::Error) -> String {
    match e.as_database_error() {
        Some(db_err) => db_err.message().to_string(),
        None => e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn render(err: AppError) -> (StatusCode, Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_position_not_found_echoes_request() {
        let (status, body) = render(AppError::PositionNotFound {
            position_id: 42,
            language: "fr".to_string(),
        })
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["message"], "Position not found");
        assert_eq!(body["error"]["details"]["positionId"], 42);
        assert_eq!(body["error"]["details"]["requestedLanguage"], "fr");
    }

    #[tokio::test]
    async fn test_unknown_references_list_offending_ids() {
        let (status, body) = render(AppError::UnknownReferences {
            job_ids: vec![99],
            skill_ids: vec![],
        })
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "UNKNOWN_REFERENCE");
        assert_eq!(body["error"]["details"]["unknown_job_ids"][0], 99);
    }

    #[tokio::test]
    async fn test_conflict_is_409() {
        let (status, body) = render(AppError::Conflict("duplicate pair".to_string())).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"]["code"], "DUPLICATE_KEY");
        assert!(body["error"].get("details").is_none());
    }

    #[tokio::test]
    async fn test_unclassified_database_error_keeps_raw_message() {
        let (status, body) = render(AppError::Database(sqlx::Error::RowNotFound)).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"]["code"], "DATABASE_ERROR");
        assert_eq!(
            body["error"]["message"],
            sqlx::Error::RowNotFound.to_string()
        );
    }
}
