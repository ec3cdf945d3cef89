/// Token Maker capability
///
/// Every token backend issues and verifies tokens through [`Maker`]. Callers
/// hold a [`TokenMaker`] (or a [`KeyRing`](crate::auth::KeyRing) wrapping
/// one) and never depend on the concrete scheme.

use chrono::Duration;
use jsonwebtoken::Algorithm;
use uuid::Uuid;

use crate::auth::jwt::JwtMaker;
use crate::auth::paseto::PasetoMaker;
use crate::auth::payload::Payload;
use crate::error::TokenError;

/// Issue and verify stateless bearer tokens
pub trait Maker: Send + Sync {
    /// Mint a token for `subject_email` / `user_id`, valid for `duration`
    ///
    /// # Errors
    /// Returns `TokenError::Encoding` if the claims cannot be serialized or
    /// signed/sealed
    fn create_token(
        &self,
        subject_email: &str,
        user_id: i64,
        duration: Duration,
    ) -> Result<String, TokenError>;

    /// Recover the payload of a token
    ///
    /// # Errors
    /// - `TokenError::Invalid` for malformed, forged or tampered tokens
    /// - `TokenError::Expired` for authentic tokens past their expiry
    fn verify_token(&self, token: &str) -> Result<Payload, TokenError>;
}

/// Token scheme selected in configuration
#[derive(serde::Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    /// HMAC-signed JWT
    Jwt,
    /// Sealed `v4.local` token
    Paseto,
}

/// The configured token backend
pub enum TokenMaker {
    Jwt(JwtMaker),
    Paseto(PasetoMaker),
}

impl TokenMaker {
    /// Build the maker for `kind` from raw key material
    ///
    /// `algorithm` only applies to JWT makers.
    pub fn new(kind: TokenKind, secret: &[u8], algorithm: Algorithm) -> Result<Self, TokenError> {
        match kind {
            TokenKind::Jwt => JwtMaker::with_algorithm(secret, algorithm).map(TokenMaker::Jwt),
            TokenKind::Paseto => PasetoMaker::new(secret).map(TokenMaker::Paseto),
        }
    }

    /// Reject tokens issued further than `skew` in the future
    pub fn with_max_clock_skew(self, skew: Duration) -> Self {
        match self {
            TokenMaker::Jwt(maker) => TokenMaker::Jwt(maker.with_max_clock_skew(skew)),
            TokenMaker::Paseto(maker) => TokenMaker::Paseto(maker.with_max_clock_skew(skew)),
        }
    }

    pub fn kind(&self) -> TokenKind {
        match self {
            TokenMaker::Jwt(_) => TokenKind::Jwt,
            TokenMaker::Paseto(_) => TokenKind::Paseto,
        }
    }

    pub fn key_id(&self) -> &str {
        match self {
            TokenMaker::Jwt(maker) => maker.key_id(),
            TokenMaker::Paseto(maker) => maker.key_id(),
        }
    }
}

impl Maker for TokenMaker {
    fn create_token(
        &self,
        subject_email: &str,
        user_id: i64,
        duration: Duration,
    ) -> Result<String, TokenError> {
        match self {
            TokenMaker::Jwt(maker) => maker.create_token(subject_email, user_id, duration),
            TokenMaker::Paseto(maker) => maker.create_token(subject_email, user_id, duration),
        }
    }

    fn verify_token(&self, token: &str) -> Result<Payload, TokenError> {
        match self {
            TokenMaker::Jwt(maker) => maker.verify_token(token),
            TokenMaker::Paseto(maker) => maker.verify_token(token),
        }
    }
}

impl std::fmt::Debug for TokenMaker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenMaker::Jwt(maker) => std::fmt::Debug::fmt(maker, f),
            TokenMaker::Paseto(maker) => std::fmt::Debug::fmt(maker, f),
        }
    }
}

/// Random label identifying a maker in logs
///
/// Not derived from the key, so logs reveal nothing about the secret.
pub(crate) fn new_key_id() -> String {
    let mut id = Uuid::new_v4().simple().to_string();
    id.truncate(12);
    id
}

/// Default tolerance for `iat` claims ahead of the local clock
pub(crate) fn default_clock_skew() -> Duration {
    Duration::seconds(30)
}
