use axum::Json;
use serde::Serialize;

#[derive(Serialize)]
pub struct Health {
    status: &'static str,
}

/// `GET healthz` (§4.6): liveness only. The process can always accept
/// ingest once this responds 200 — there is no dependency check here, since
/// providers degrade to identity/silent fallbacks rather than failing
/// ingest (§7).
pub async fn healthz() -> Json<Health> {
    Json(Health { status: "ok" })
}
