/// Sealed Token Maker
///
/// Issues PASETO `v4.local` tokens: the serialized claims are encrypted and
/// authenticated under the symmetric key as one opaque blob. Footers and
/// implicit assertions are never used; a token carrying a footer is rejected.

use chrono::{Duration, Utc};
use rand::rngs::OsRng;
use rand::RngCore;
use rusty_paseto::core::{
    Footer, ImplicitAssertion, Key, Local, Paseto, PasetoNonce, PasetoSymmetricKey,
    Payload as PasetoPayload, V4,
};

use crate::auth::claims::RegisteredClaims;
use crate::auth::maker::{default_clock_skew, new_key_id, Maker};
use crate::auth::payload::Payload;
use crate::error::{KeyError, TokenError};

/// Required symmetric key length in bytes
pub const SYMMETRIC_KEY_LENGTH: usize = 32;

const HEADER: &str = "v4.local.";
// base64url length of a 32-byte nonce followed by a 32-byte tag
const MIN_BODY_LENGTH: usize = 86;

/// Sealed-token maker
pub struct PasetoMaker {
    key: PasetoSymmetricKey<V4, Local>,
    max_clock_skew: Duration,
    key_id: String,
}

impl PasetoMaker {
    /// Create a maker from a 32-byte symmetric key
    ///
    /// # Errors
    /// Returns `KeyError::InvalidLength` unless `key` is exactly 32 bytes
    pub fn new(key: &[u8]) -> Result<Self, TokenError> {
        let key: [u8; SYMMETRIC_KEY_LENGTH] =
            key.try_into().map_err(|_| KeyError::InvalidLength {
                expected: SYMMETRIC_KEY_LENGTH,
                actual: key.len(),
            })?;

        let key_id = new_key_id();
        tracing::info!(key_id = %key_id, "PASETO maker initialized");

        Ok(Self {
            key: PasetoSymmetricKey::<V4, Local>::from(Key::from(key)),
            max_clock_skew: default_clock_skew(),
            key_id,
        })
    }

    /// Negative values are treated as zero
    pub fn with_max_clock_skew(mut self, skew: Duration) -> Self {
        self.max_clock_skew = skew.max(Duration::zero());
        self
    }

    pub fn key_id(&self) -> &str {
        &self.key_id
    }

    /// Seal an already built payload
    pub fn seal(&self, payload: &Payload) -> Result<String, TokenError> {
        let message = serde_json::to_string(&RegisteredClaims::from(payload))
            .map_err(|e| TokenError::Encoding(format!("claims serialization failed: {}", e)))?;

        let mut nonce = [0u8; 32];
        OsRng.fill_bytes(&mut nonce);
        let nonce = Key::from(nonce);

        Paseto::<V4, Local>::builder()
            .set_payload(PasetoPayload::from(message.as_str()))
            .try_encrypt(&self.key, &PasetoNonce::<V4, Local>::from(&nonce))
            .map_err(|e| TokenError::Encoding(format!("token sealing failed: {}", e)))
    }

    /// Authenticate and decrypt a token back into its claims
    fn open(&self, token: &str) -> Result<RegisteredClaims, TokenError> {
        let body = token.strip_prefix(HEADER).ok_or(TokenError::Invalid)?;

        // A '.' would introduce a footer.
        if body.len() < MIN_BODY_LENGTH || body.contains('.') {
            return Err(TokenError::Invalid);
        }

        let message = Paseto::<V4, Local>::try_decrypt(
            token,
            &self.key,
            None::<Footer>,
            None::<ImplicitAssertion>,
        )
        .map_err(|_| TokenError::Invalid)?;

        serde_json::from_str(&message).map_err(|_| TokenError::Invalid)
    }
}

impl Maker for PasetoMaker {
    fn create_token(
        &self,
        subject_email: &str,
        user_id: i64,
        duration: Duration,
    ) -> Result<String, TokenError> {
        let payload = Payload::new(subject_email, user_id, duration);
        self.seal(&payload)
    }

    fn verify_token(&self, token: &str) -> Result<Payload, TokenError> {
        let claims = self.open(token).map_err(|e| {
            tracing::debug!("PASETO token rejected");
            e
        })?;

        let payload = Payload::try_from(claims)?;
        let now = Utc::now();

        if payload.is_expired_at(now) {
            return Err(TokenError::Expired);
        }

        if payload.is_issued_after(now, self.max_clock_skew) {
            tracing::warn!(
                token_id = %payload.token_id,
                "PASETO token issued in the future"
            );
            return Err(TokenError::Invalid);
        }

        Ok(payload)
    }
}

impl std::fmt::Debug for PasetoMaker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasetoMaker")
            .field("key_id", &self.key_id)
            .finish()
    }
}
