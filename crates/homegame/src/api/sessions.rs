use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use serde_json::{json, Value};

use homegame_db::{NewSession, SessionDetail, SessionUpdate};

use super::extract::ApiJson;
use super::{ApiError, AppState};

pub async fn list_sessions(
    State(state): State<AppState>,
) -> Result<Json<Vec<SessionDetail>>, ApiError> {
    let sessions = state.db.sessions().list()?;
    Ok(Json(sessions))
}

pub async fn create_session(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<NewSession>,
) -> Result<(StatusCode, Json<SessionDetail>), ApiError> {
    let session = state.db.sessions().create(&body)?;
    Ok((StatusCode::CREATED, Json(session)))
}

pub async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SessionDetail>, ApiError> {
    state
        .db
        .sessions()
        .get(&id)?
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("Session not found: {}", id)))
}

pub async fn update_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<SessionUpdate>,
) -> Result<Json<SessionDetail>, ApiError> {
    let session = state.db.sessions().update(&id, &body)?;
    Ok(Json(session))
}

pub async fn delete_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    if !state.db.sessions().delete(&id)? {
        return Err(ApiError::not_found(format!("Session not found: {}", id)));
    }
    Ok(Json(json!({ "success": true })))
}
