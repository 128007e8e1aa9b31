//! Liveness and readiness probes.

use actix_web::HttpResponse;
use serde_json::json;

/// GET `/health/live`
pub async fn live() -> HttpResponse {
    HttpResponse::Ok().json(json!({ "status": "ok" }))
}

/// GET `/health/ready`
pub async fn ready() -> HttpResponse {
    HttpResponse::Ok().json(json!({ "status": "ready" }))
}
