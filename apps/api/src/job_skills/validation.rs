//! Shape checks for job-skill payloads. Runs before any database call.

use serde_json::{Map, Value};

use crate::errors::AppError;
use crate::models::job_skill::NewJobSkill;

pub const MIN_SCORE: f64 = 0.0;
pub const MAX_SCORE: f64 = 100.0;
pub const DEFAULT_SCORE: f64 = 0.0;

/// Validates the bulk replace body. Fails on the first bad element.
pub fn parse_bulk_body(body: &Value) -> Result<Vec<NewJobSkill>, AppError> {
    let items = body
        .as_array()
        .ok_or_else(|| AppError::Validation("Request body must be an array".to_string()))?;

    items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            parse_entry(item).map_err(|msg| AppError::Validation(format!("Item {index}: {msg}")))
        })
        .collect()
}

/// Validates the single add body.
pub fn parse_single_body(body: &Value) -> Result<NewJobSkill, AppError> {
    parse_entry(body).map_err(AppError::Validation)
}

fn parse_entry(value: &Value) -> Result<NewJobSkill, String> {
    let obj = value
        .as_object()
        .ok_or_else(|| "expected an object with job_id and skill_id".to_string())?;

    Ok(NewJobSkill {
        job_id: required_id(obj, "job_id")?,
        skill_id: required_id(obj, "skill_id")?,
        score: optional_score(obj)?,
    })
}

fn required_id(obj: &Map<String, Value>, field: &str) -> Result<i32, String> {
    let value = match obj.get(field) {
        None | Some(Value::Null) => return Err(format!("{field} is required")),
        Some(v) => v,
    };
    let n = value
        .as_i64()
        .or_else(|| value.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64))
        .ok_or_else(|| format!("{field} must be an integer"))?;
    i32::try_from(n).map_err(|_| format!("{field} is out of range"))
}

fn optional_score(obj: &Map<String, Value>) -> Result<f64, String> {
    let value = match obj.get("score") {
        None | Some(Value::Null) => return Ok(DEFAULT_SCORE),
        Some(v) => v,
    };
    let score = value
        .as_f64()
        .ok_or_else(|| "score must be a number".to_string())?;
    if !(MIN_SCORE..=MAX_SCORE).contains(&score) {
        return Err(format!(
            "score must be between {MIN_SCORE} and {MAX_SCORE}, got {score}"
        ));
    }
    Ok(score)
}
