use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use homegame_core::{Amount, LedgerKind};
use homegame_db::LedgerLine;

use super::extract::ApiJson;
use super::{ApiError, AppState};

/// Body of a buy-in or cash-out. `amount` accepts a JSON number or a
/// decimal string.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerEntryRequest {
    #[serde(default)]
    pub player_id: String,
    pub amount: Option<Amount>,
}

pub async fn add_buy_in(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    ApiJson(body): ApiJson<LedgerEntryRequest>,
) -> Result<(StatusCode, Json<LedgerLine>), ApiError> {
    add_entry(&state, LedgerKind::BuyIn, &session_id, body)
}

pub async fn add_cash_out(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    ApiJson(body): ApiJson<LedgerEntryRequest>,
) -> Result<(StatusCode, Json<LedgerLine>), ApiError> {
    add_entry(&state, LedgerKind::CashOut, &session_id, body)
}

fn add_entry(
    state: &AppState,
    kind: LedgerKind,
    session_id: &str,
    body: LedgerEntryRequest,
) -> Result<(StatusCode, Json<LedgerLine>), ApiError> {
    let amount = body
        .amount
        .ok_or_else(|| ApiError::bad_request("Amount is required"))?;
    let line = state
        .db
        .ledger()
        .add(kind, session_id, &body.player_id, amount)?;
    Ok((StatusCode::CREATED, Json(line)))
}

pub async fn delete_buy_in(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    delete_entry(&state, LedgerKind::BuyIn, &id)
}

pub async fn delete_cash_out(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    delete_entry(&state, LedgerKind::CashOut, &id)
}

fn delete_entry(state: &AppState, kind: LedgerKind, id: &str) -> Result<Json<Value>, ApiError> {
    if !state.db.ledger().delete(kind, id)? {
        return Err(ApiError::not_found(format!(
            "{} not found: {}",
            kind.entity_name(),
            id
        )));
    }
    Ok(Json(json!({ "success": true })))
}
