use axum::extract::State;
use axum::response::Json;
use serde::Deserialize;

use homegame_core::{Achievements, Player};

use super::extract::{ApiJson, ApiQuery};
use super::{ApiError, AppState};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BestComboRequest {
    #[serde(default)]
    pub player_id: String,
}

pub async fn get_achievements(
    State(state): State<AppState>,
) -> Result<Json<Achievements>, ApiError> {
    let achievements = state.db.achievements_report()?;
    Ok(Json(achievements))
}

pub async fn set_best_combo(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<BestComboRequest>,
) -> Result<Json<Player>, ApiError> {
    let player = state.db.achievements().set_best_combo(&body.player_id)?;
    Ok(Json(player))
}

pub async fn clear_best_combo(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<BestComboRequest>,
) -> Result<Json<Player>, ApiError> {
    let player = state.db.achievements().clear_best_combo(&params.player_id)?;
    Ok(Json(player))
}
