use axum::Json;
use axum::extract::State;

use crate::state::AppState;

/// `GET config` (§4.6, §6): the runtime tunables capture clients need —
/// stability thresholds, TTS backlog knobs, watchdog timers. Returned
/// verbatim from the process-wide `CoreConfig`.
pub async fn get_config(State(state): State<AppState>) -> Json<polyglot_core::CoreConfig> {
    Json((*state.core_config).clone())
}
