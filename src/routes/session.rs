/// Session Routes
///
/// Endpoints that expose the authenticated caller's identity.

use actix_web::{web, HttpResponse};
use serde::Serialize;

use crate::auth::Payload;

/// Identity recovered from the caller's bearer token
#[derive(Serialize)]
pub struct SessionResponse {
    pub token_id: String,
    pub user_id: i64,
    pub email: String,
    pub issued_at: String,
    pub expires_at: String,
}

impl From<&Payload> for SessionResponse {
    fn from(payload: &Payload) -> Self {
        Self {
            token_id: payload.token_id.to_string(),
            user_id: payload.user_id,
            email: payload.subject_email.clone(),
            issued_at: payload.issued_at.to_rfc3339(),
            expires_at: payload.expires_at.to_rfc3339(),
        }
    }
}

/// GET /api/me
///
/// **Requires a valid bearer token.** The payload is injected by
/// `BearerAuth`; only `user_id` and `email` should be trusted downstream.
///
/// # Errors
/// - 401: Missing, invalid or expired token (handled by middleware)
pub async fn current_session(payload: web::ReqData<Payload>) -> HttpResponse {
    HttpResponse::Ok().json(SessionResponse::from(&*payload))
}
