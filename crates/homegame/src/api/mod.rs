mod achievements;
mod auth;
mod error;
mod extract;
mod ledger;
mod logging;
mod players;
mod sessions;
mod stats;

pub use auth::{AuthState, Credentials, AUTH_COOKIE};
pub use error::ApiError;

use std::sync::Arc;

use axum::middleware;
use axum::routing::{delete, get, post};
use axum::Router;
use tower_http::cors::CorsLayer;

use homegame_db::Database;

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
    pub auth: Arc<AuthState>,
}

pub fn create_router(db: Arc<Database>, credentials: Option<Credentials>) -> Router {
    let state = AppState {
        db,
        auth: Arc::new(AuthState::new(credentials)),
    };

    let public = Router::new()
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/logout", post(auth::logout))
        .route("/api/auth/check", get(auth::check));

    let protected = Router::new()
        .route(
            "/api/players",
            get(players::list_players).post(players::create_player),
        )
        .route(
            "/api/players/{id}",
            get(players::get_player)
                .put(players::update_player)
                .delete(players::delete_player),
        )
        .route(
            "/api/sessions",
            get(sessions::list_sessions).post(sessions::create_session),
        )
        .route(
            "/api/sessions/{id}",
            get(sessions::get_session)
                .put(sessions::update_session)
                .delete(sessions::delete_session),
        )
        .route("/api/sessions/{id}/buyins", post(ledger::add_buy_in))
        .route("/api/sessions/{id}/cashouts", post(ledger::add_cash_out))
        .route(
            "/api/sessions/{id}/players/{player_id}/profit",
            get(stats::get_session_player_profit),
        )
        .route("/api/buyins/{id}", delete(ledger::delete_buy_in))
        .route("/api/cashouts/{id}", delete(ledger::delete_cash_out))
        .route("/api/stats", get(stats::get_stats))
        .route("/api/games-stats", get(stats::get_games_stats))
        .route("/api/achievements", get(achievements::get_achievements))
        .route(
            "/api/achievements/best-combo",
            post(achievements::set_best_combo).delete(achievements::clear_best_combo),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_auth,
        ));

    Router::new()
        .merge(public)
        .merge(protected)
        .layer(middleware::from_fn(logging::log_requests))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
