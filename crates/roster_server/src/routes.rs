use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use roster_core::{StudentFields, StudentId, TOP_N_DEFAULT};
use serde::Deserialize;
use serde_json::json;

use super::{error::ApiError, state::AppState};

#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    search: Option<String>,
}

pub async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({ "status": "ok", "version": state.version }))
}

pub async fn list_students_handler(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<impl IntoResponse, ApiError> {
    let students = state
        .with_roster(move |roster| roster.search(params.search.as_deref()))
        .await?;
    Ok(Json(students))
}

pub async fn get_student_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_id(&id)?;
    let student = state
        .with_roster(move |roster| roster.find(id))
        .await?
        .ok_or(ApiError::NotFound)?;
    Ok(Json(student))
}

pub async fn create_student_handler(
    State(state): State<AppState>,
    payload: Result<Json<StudentFields>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let fields = submitted_fields(payload)?;
    let student = state
        .with_roster(move |roster| roster.insert(fields).map(roster_core::decorate))
        .await?;
    Ok((StatusCode::CREATED, Json(student)))
}

pub async fn update_student_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<StudentFields>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_id(&id)?;
    let fields = submitted_fields(payload)?;
    let student = state
        .with_roster(move |roster| Ok(roster.replace(id, fields)?.map(roster_core::decorate)))
        .await?
        .ok_or(ApiError::NotFound)?;
    Ok(Json(student))
}

pub async fn delete_student_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_id(&id)?;
    if state.with_roster(move |roster| roster.remove(id)).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound)
    }
}

pub async fn rank_list_handler(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.with_roster(|roster| roster.rank_list()).await?))
}

pub async fn top_students_handler(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(
        state
            .with_roster(|roster| roster.top(TOP_N_DEFAULT))
            .await?,
    ))
}

pub async fn subject_averages_handler(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(
        state
            .with_roster(|roster| roster.subject_averages())
            .await?,
    ))
}

pub async fn summary_handler(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.with_roster(|roster| roster.summary()).await?))
}

// Ids that are not UUIDs cannot name a stored student.
fn parse_id(raw: &str) -> Result<StudentId, ApiError> {
    StudentId::parse_str(raw).map_err(|_| ApiError::NotFound)
}

/// A body sent without a JSON content type carries no fields.
fn submitted_fields(
    payload: Result<Json<StudentFields>, JsonRejection>,
) -> Result<StudentFields, ApiError> {
    match payload {
        Ok(Json(fields)) => Ok(fields),
        Err(JsonRejection::MissingJsonContentType(_)) => Ok(StudentFields::default()),
        Err(rejection) => Err(rejection.into()),
    }
}
