use actix_web::{web, HttpResponse};

use crate::auth::KeyRing;

/// GET /health_check
///
/// Reports liveness and whether a key rotation grace period is open.
pub async fn health_check(key_ring: web::Data<KeyRing>) -> HttpResponse {
    tracing::debug!("Health check endpoint called");
    HttpResponse::Ok().json(serde_json::json!({
        "status": "ok",
        "rotation_in_progress": key_ring.has_previous(),
    }))
}
