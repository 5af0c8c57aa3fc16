use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use serde_json::{json, Value};

use homegame_core::Player;
use homegame_db::{NewPlayer, PlayerUpdate, PlayerWithSessions};

use super::extract::ApiJson;
use super::{ApiError, AppState};

pub async fn list_players(State(state): State<AppState>) -> Result<Json<Vec<Player>>, ApiError> {
    let players = state.db.players().list()?;
    Ok(Json(players))
}

pub async fn create_player(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<NewPlayer>,
) -> Result<(StatusCode, Json<Player>), ApiError> {
    let player = state.db.players().create(&body)?;
    Ok((StatusCode::CREATED, Json(player)))
}

pub async fn get_player(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<PlayerWithSessions>, ApiError> {
    state
        .db
        .players()
        .get_with_sessions(&id)?
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("Player not found: {}", id)))
}

pub async fn update_player(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<PlayerUpdate>,
) -> Result<Json<Player>, ApiError> {
    let player = state.db.players().update(&id, &body)?;
    Ok(Json(player))
}

pub async fn delete_player(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    if !state.db.players().delete(&id)? {
        return Err(ApiError::not_found(format!("Player not found: {}", id)));
    }
    Ok(Json(json!({ "success": true })))
}
