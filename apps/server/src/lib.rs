pub mod env;
pub mod error;
pub mod routes;
pub mod state;
pub mod validation;
pub mod ws;

use axum::Router;
use axum::extract::MatchedPath;
use axum::http::Request;
use axum::routing::get;
use tower_http::cors::{self, CorsLayer};
use tower_http::trace::TraceLayer;

pub use state::AppState;

/// Builds the full router for a given [`AppState`] (§4.6, §6): every HTTP
/// route plus the `/ws` upgrade endpoint, with CORS and request tracing
/// layered on top the way the teacher's `app()` composes its own router.
pub fn app(state: AppState) -> Router {
    routes::router()
        .route("/ws", get(ws::handler))
        .layer(
            CorsLayer::new()
                .allow_origin(cors::Any)
                .allow_methods(cors::Any)
                .allow_headers(cors::Any),
        )
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<axum::body::Body>| {
                    let path = request.uri().path();
                    let matched_path = request
                        .extensions()
                        .get::<MatchedPath>()
                        .map(MatchedPath::as_str)
                        .unwrap_or(path);
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        http.route = %matched_path,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<axum::body::Body>,
                     latency: std::time::Duration,
                     _span: &tracing::Span| {
                        tracing::info!(
                            http_status = %response.status().as_u16(),
                            latency_ms = %latency.as_millis(),
                            "http_request_finished"
                        );
                    },
                ),
        )
        .with_state(state)
}

pub async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("failed to install CTRL+C signal handler");
    tracing::info!("shutdown_signal_received");
}
