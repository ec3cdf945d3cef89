/// Bearer Authentication Middleware
///
/// Strips the `Authorization: Bearer <token>` header, verifies the token with
/// the shared key ring and injects the recovered [`Payload`] into request
/// extensions for route handlers.

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header::{HeaderMap, AUTHORIZATION},
    Error, HttpMessage,
};
use futures::future::LocalBoxFuture;
use std::rc::Rc;
use std::sync::Arc;

use crate::auth::{KeyRing, Maker};
use crate::error::AppError;

const BEARER_PREFIX: &str = "Bearer ";

/// Middleware protecting a scope with bearer tokens
pub struct BearerAuth {
    key_ring: Arc<KeyRing>,
}

impl BearerAuth {
    pub fn new(key_ring: Arc<KeyRing>) -> Self {
        Self { key_ring }
    }
}

impl<S, B> Transform<S, ServiceRequest> for BearerAuth
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = BearerAuthService<S>;
    type Future = std::future::Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        std::future::ready(Ok(BearerAuthService {
            service: Rc::new(service),
            key_ring: Arc::clone(&self.key_ring),
        }))
    }
}

pub struct BearerAuthService<S> {
    service: Rc<S>,
    key_ring: Arc<KeyRing>,
}

impl<S, B> Service<ServiceRequest> for BearerAuthService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let Some(token) = bearer_token(req.headers()) else {
            tracing::warn!(path = %req.path(), "Missing or malformed Authorization header");
            let error: Error = AppError::MissingToken.into();
            return Box::pin(async move { Err(error) });
        };

        match self.key_ring.verify_token(token) {
            Ok(payload) => {
                tracing::debug!(
                    user_id = payload.user_id,
                    token_id = %payload.token_id,
                    "Bearer token accepted"
                );
                req.extensions_mut().insert(payload);

                let service = Rc::clone(&self.service);
                Box::pin(async move { service.call(req).await })
            }
            Err(e) => {
                let error: Error = AppError::Token(e).into();
                Box::pin(async move { Err(error) })
            }
        }
    }
}

/// Extract the token from an `Authorization: Bearer <token>` header
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix(BEARER_PREFIX))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}
