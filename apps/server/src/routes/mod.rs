pub mod config;
pub mod healthz;
pub mod rooms;
pub mod segments;

use axum::Router;
use axum::routing::{get, post};

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/segments", post(segments::ingest))
        .route("/config", get(config::get_config))
        .route("/rooms/{slug}", get(rooms::get_room))
        .route("/healthz", get(healthz::healthz))
}
