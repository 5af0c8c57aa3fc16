use axum::extract::{Path, State};
use axum::response::Json;

use homegame_core::{GameRow, PlayerStatistics, SessionPlayerProfit};

use super::{ApiError, AppState};

pub async fn get_stats(
    State(state): State<AppState>,
) -> Result<Json<Vec<PlayerStatistics>>, ApiError> {
    let stats = state.db.player_statistics()?;
    Ok(Json(stats))
}

pub async fn get_games_stats(State(state): State<AppState>) -> Result<Json<Vec<GameRow>>, ApiError> {
    let games = state.db.game_matrix()?;
    Ok(Json(games))
}

pub async fn get_session_player_profit(
    State(state): State<AppState>,
    Path((session_id, player_id)): Path<(String, String)>,
) -> Result<Json<SessionPlayerProfit>, ApiError> {
    let profit = state.db.session_player_profit(&session_id, &player_id)?;
    Ok(Json(profit))
}
