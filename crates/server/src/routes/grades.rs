//! Handlers for `/grades`.
//!
//! Id sources: DELETE takes the path segment, GET takes `?id=`, PUT takes the
//! body `id` and falls back to `?id=`. The aggregate endpoints read their
//! filter from the query string, or from a JSON body when the query string
//! carries no criteria.

use axum::{
    body::Bytes,
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    Json,
};
use models::filter::{StudentSubjectQuery, SubjectTypeQuery};
use models::{Grade, GradeId, GradeInput};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use service::grades::{format_number, TopGrades};

use crate::errors::ApiError;
use crate::routes::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct IdQuery {
    pub id: Option<String>,
}

fn parse_id(raw: &str) -> Result<GradeId, ApiError> {
    raw.trim()
        .parse::<GradeId>()
        .map_err(|_| ApiError::Validation(format!("id must be a non-negative integer, got {:?}", raw)))
}

/// Pick the PUT target id from the body and the query string. Both may be
/// given as long as they agree.
fn resolve_update_id(body_id: Option<GradeId>, query_id: Option<&str>) -> Result<GradeId, ApiError> {
    let query_id = query_id.map(parse_id).transpose()?;
    match (body_id, query_id) {
        (Some(b), Some(q)) if b != q => Err(ApiError::Validation(format!(
            "body id {} does not match query id {}",
            b, q
        ))),
        (Some(id), _) | (None, Some(id)) => Ok(id),
        (None, None) => Err(ApiError::Validation("id is required".into())),
    }
}

/// Query-string criteria win; an empty query string falls back to a JSON body.
fn filter_or_body<T: DeserializeOwned>(from_query: T, query_is_empty: bool, body: &Bytes) -> Result<T, ApiError> {
    if !query_is_empty || body.iter().all(u8::is_ascii_whitespace) {
        return Ok(from_query);
    }
    serde_json::from_slice(body).map_err(|e| ApiError::Validation(format!("invalid filter body: {}", e)))
}

#[utoipa::path(post, path = "/grades", tag = "grades",
    request_body = crate::openapi::GradeInputDoc,
    responses((status = 200, description = "Created grade", body = crate::openapi::GradeDoc), (status = 400, description = "Validation error", body = crate::openapi::ErrorDoc)))]
pub async fn create_grade(
    State(state): State<AppState>,
    payload: Result<Json<GradeInput>, JsonRejection>,
) -> Result<Json<Grade>, ApiError> {
    let Json(input) = payload?;
    let grade = state.grades.create(input).await?;
    Ok(Json(grade))
}

#[utoipa::path(put, path = "/grades", tag = "grades",
    params(("id" = Option<u64>, Query, description = "Fallback when the body has no id")),
    request_body = crate::openapi::GradeInputDoc,
    responses((status = 200, description = "Updated grade", body = crate::openapi::GradeDoc), (status = 400, description = "Validation error", body = crate::openapi::ErrorDoc), (status = 404, description = "Unknown id", body = crate::openapi::ErrorDoc)))]
pub async fn update_grade(
    State(state): State<AppState>,
    query: Result<Query<IdQuery>, QueryRejection>,
    payload: Result<Json<GradeInput>, JsonRejection>,
) -> Result<Json<Grade>, ApiError> {
    let Query(q) = query?;
    let Json(input) = payload?;
    let id = resolve_update_id(input.id, q.id.as_deref())?;
    let grade = state.grades.update(id, input).await?;
    Ok(Json(grade))
}

#[utoipa::path(delete, path = "/grades/{id}", tag = "grades",
    params(("id" = u64, Path, description = "Grade id")),
    responses((status = 200, description = "Deleted"), (status = 404, description = "Unknown id", body = crate::openapi::ErrorDoc)))]
pub async fn delete_grade(State(state): State<AppState>, Path(raw): Path<String>) -> Result<(), ApiError> {
    let id = parse_id(&raw)?;
    state.grades.delete(id).await?;
    Ok(())
}

#[utoipa::path(get, path = "/grades", tag = "grades",
    params(("id" = u64, Query, description = "Grade id")),
    responses((status = 200, description = "Grade", body = crate::openapi::GradeDoc), (status = 404, description = "Unknown id", body = crate::openapi::ErrorDoc)))]
pub async fn get_grade(
    State(state): State<AppState>,
    query: Result<Query<IdQuery>, QueryRejection>,
) -> Result<Json<Grade>, ApiError> {
    let Query(q) = query?;
    let raw = q.id.ok_or_else(|| ApiError::Validation("id is required".into()))?;
    let grade = state.grades.get(parse_id(&raw)?).await?;
    Ok(Json(grade))
}

#[utoipa::path(get, path = "/grades/total", tag = "grades",
    params(("student" = String, Query, description = "Exact student name"), ("subject" = String, Query, description = "Exact subject")),
    responses((status = 200, description = "Integer sum as text", body = String)))]
pub async fn total(
    State(state): State<AppState>,
    query: Result<Query<StudentSubjectQuery>, QueryRejection>,
    body: Bytes,
) -> Result<String, ApiError> {
    let Query(q) = query?;
    let is_empty = q.is_empty();
    let filter = filter_or_body(q, is_empty, &body)?;
    let sum = state.grades.total(filter).await?;
    Ok(format_number(sum))
}

#[utoipa::path(get, path = "/grades/average", tag = "grades",
    params(("subject" = String, Query, description = "Exact subject"), ("type" = String, Query, description = "Exact assessment type")),
    responses((status = 200, description = "Average as text, NaN when nothing matches", body = String)))]
pub async fn average(
    State(state): State<AppState>,
    query: Result<Query<SubjectTypeQuery>, QueryRejection>,
    body: Bytes,
) -> Result<String, ApiError> {
    let Query(q) = query?;
    let is_empty = q.is_empty();
    let filter = filter_or_body(q, is_empty, &body)?;
    let avg = state.grades.average(filter).await?;
    Ok(format_number(avg))
}

#[utoipa::path(get, path = "/grades/top3", tag = "grades",
    params(("subject" = String, Query, description = "Exact subject"), ("type" = String, Query, description = "Exact assessment type")),
    responses((status = 200, description = "Up to three best grades", body = crate::openapi::TopGradesDoc)))]
pub async fn top3(
    State(state): State<AppState>,
    query: Result<Query<SubjectTypeQuery>, QueryRejection>,
    body: Bytes,
) -> Result<Json<TopGrades>, ApiError> {
    let Query(q) = query?;
    let is_empty = q.is_empty();
    let filter = filter_or_body(q, is_empty, &body)?;
    let top = state.grades.top3(filter).await?;
    Ok(Json(top))
}
