/// Wire representation of the token claims
///
/// Both token formats carry the same JSON claim set. The mapping to and from
/// [`Payload`] is written out by hand so the wire format stays fixed even if
/// the in-memory payload changes.
///
/// | claim | meaning                    |
/// |-------|----------------------------|
/// | `jti` | token id (UUID, hyphenated)|
/// | `sub` | subject email              |
/// | `uid` | numeric user id            |
/// | `iat` | issued at, Unix seconds    |
/// | `exp` | expires at, Unix seconds   |

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::payload::Payload;
use crate::error::TokenError;

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct RegisteredClaims {
    pub jti: String,
    pub sub: String,
    pub uid: i64,
    pub iat: i64,
    pub exp: i64,
}

impl From<&Payload> for RegisteredClaims {
    fn from(payload: &Payload) -> Self {
        Self {
            jti: payload.token_id.hyphenated().to_string(),
            sub: payload.subject_email.clone(),
            uid: payload.user_id,
            iat: payload.issued_at.timestamp(),
            exp: payload.expires_at.timestamp(),
        }
    }
}

impl TryFrom<RegisteredClaims> for Payload {
    type Error = TokenError;

    fn try_from(claims: RegisteredClaims) -> Result<Self, Self::Error> {
        let token_id = Uuid::parse_str(&claims.jti).map_err(|_| TokenError::Invalid)?;
        let issued_at = timestamp(claims.iat)?;
        let expires_at = timestamp(claims.exp)?;

        Ok(Payload {
            token_id,
            subject_email: claims.sub,
            user_id: claims.uid,
            issued_at,
            expires_at,
        })
    }
}

fn timestamp(secs: i64) -> Result<DateTime<Utc>, TokenError> {
    DateTime::<Utc>::from_timestamp(secs, 0).ok_or(TokenError::Invalid)
}
