//! Route handlers. Each one is a thin mapping from a request onto a research
//! store operation or the generation provider.

use axum::body::Body;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::Json;

use super::error::ApiError;
use super::AppState;
use crate::gateway::GenerateRequest;
use crate::research::types::{
    NewResearchLog, NewResearchSession, NewResearchTask, ResearchLog, ResearchSession,
    ResearchTask, SessionDetail, SessionUpdate,
};
use crate::research::{logs, sessions, tasks};

/// `POST /api/ai/generate`
pub async fn generate(
    State(state): State<AppState>,
    payload: Result<Json<GenerateRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(request) = payload?;
    request.validate()?;

    tracing::info!(
        model = %request.model,
        turns = request.contents.len(),
        stream = request.stream,
        "generate called"
    );

    if request.stream {
        let stream = state.provider().generate_stream(&request).await?;
        let headers = [
            (header::CONTENT_TYPE, "text/event-stream"),
            (header::CACHE_CONTROL, "no-cache"),
        ];
        return Ok((headers, Body::from_stream(stream)).into_response());
    }

    let response = state.provider().generate(&request).await?;
    Ok(Json(response).into_response())
}

/// `GET /api/research/sessions`
pub async fn list_sessions(
    State(state): State<AppState>,
) -> Result<Json<Vec<ResearchSession>>, ApiError> {
    let sessions = state.with_db(sessions::list_sessions).await?;
    Ok(Json(sessions))
}

/// `POST /api/research/sessions`
pub async fn create_session(
    State(state): State<AppState>,
    payload: Result<Json<NewResearchSession>, JsonRejection>,
) -> Result<Json<ResearchSession>, ApiError> {
    let Json(new) = payload?;
    let session = state
        .with_db(move |conn| sessions::create_session(conn, &new))
        .await?;

    tracing::info!(id = %session.id, status = %session.status, "session created");
    Ok(Json(session))
}

/// `GET /api/research/sessions/{id}`
pub async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SessionDetail>, ApiError> {
    let detail = state
        .with_db(move |conn| sessions::get_session(conn, &id))
        .await?
        .ok_or(ApiError::NotFound)?;
    Ok(Json(detail))
}

/// `PATCH /api/research/sessions/{id}`
pub async fn update_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<SessionUpdate>, JsonRejection>,
) -> Result<Json<ResearchSession>, ApiError> {
    let Json(update) = payload?;
    let session = state
        .with_db(move |conn| sessions::update_session(conn, &id, &update))
        .await?
        .ok_or(ApiError::NotFound)?;

    tracing::info!(id = %session.id, status = %session.status, "session updated");
    Ok(Json(session))
}

/// `POST /api/research/tasks`
pub async fn create_task(
    State(state): State<AppState>,
    payload: Result<Json<NewResearchTask>, JsonRejection>,
) -> Result<Json<ResearchTask>, ApiError> {
    let Json(new) = payload?;
    let task = state.with_db(move |conn| tasks::create_task(conn, &new)).await?;

    tracing::info!(id = %task.id, session = %task.session_id, "task created");
    Ok(Json(task))
}

/// `POST /api/research/logs`
pub async fn create_log(
    State(state): State<AppState>,
    payload: Result<Json<NewResearchLog>, JsonRejection>,
) -> Result<Json<ResearchLog>, ApiError> {
    let Json(new) = payload?;
    let log = state.with_db(move |conn| logs::create_log(conn, &new)).await?;

    tracing::debug!(id = %log.id, session = %log.session_id, "log created");
    Ok(Json(log))
}

/// Anything the route table does not cover, including known paths with an
/// unsupported method.
pub async fn not_found() -> ApiError {
    ApiError::NotFound
}
