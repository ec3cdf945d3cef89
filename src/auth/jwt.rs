/// JWT Token Maker
///
/// Issues and verifies HMAC-signed JWTs. The header algorithm is pinned to the
/// configured HMAC algorithm and checked before the signature, so a token
/// declaring `none` or an asymmetric algorithm never reaches verification.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, decode_header, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};

use crate::auth::claims::RegisteredClaims;
use crate::auth::maker::{default_clock_skew, new_key_id, Maker};
use crate::auth::payload::Payload;
use crate::error::{KeyError, TokenError};

/// Minimum accepted secret length in bytes
pub const MIN_SECRET_LENGTH: usize = 32;

/// Signed-claims token maker
pub struct JwtMaker {
    algorithm: Algorithm,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    max_clock_skew: Duration,
    key_id: String,
}

impl JwtMaker {
    /// Create an HS256 maker
    ///
    /// # Errors
    /// Returns `KeyError::Weak` if `secret` is shorter than 32 bytes
    pub fn new(secret: &[u8]) -> Result<Self, TokenError> {
        Self::with_algorithm(secret, Algorithm::HS256)
    }

    /// Create a maker signing with `algorithm` (HS256, HS384 or HS512)
    ///
    /// # Errors
    /// - `KeyError::Weak` if `secret` is shorter than 32 bytes
    /// - `KeyError::UnsupportedAlgorithm` for non-HMAC algorithms
    pub fn with_algorithm(secret: &[u8], algorithm: Algorithm) -> Result<Self, TokenError> {
        if secret.len() < MIN_SECRET_LENGTH {
            return Err(KeyError::Weak {
                min: MIN_SECRET_LENGTH,
                actual: secret.len(),
            }
            .into());
        }

        if !matches!(algorithm, Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512) {
            return Err(KeyError::UnsupportedAlgorithm(format!("{:?}", algorithm)).into());
        }

        // Expiry is checked by the maker itself: strictly, and only once the
        // signature is known to be good.
        let mut validation = Validation::new(algorithm);
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.required_spec_claims.clear();

        let key_id = new_key_id();
        tracing::info!(
            algorithm = ?algorithm,
            key_id = %key_id,
            "JWT maker initialized"
        );

        Ok(Self {
            algorithm,
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            max_clock_skew: default_clock_skew(),
            key_id,
        })
    }

    /// Negative values are treated as zero
    pub fn with_max_clock_skew(mut self, skew: Duration) -> Self {
        self.max_clock_skew = skew.max(Duration::zero());
        self
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    pub fn key_id(&self) -> &str {
        &self.key_id
    }

    /// Sign an already built payload
    pub fn sign(&self, payload: &Payload) -> Result<String, TokenError> {
        encode(
            &Header::new(self.algorithm),
            &RegisteredClaims::from(payload),
            &self.encoding_key,
        )
        .map_err(|e| TokenError::Encoding(format!("JWT signing failed: {}", e)))
    }
}

impl Maker for JwtMaker {
    fn create_token(
        &self,
        subject_email: &str,
        user_id: i64,
        duration: Duration,
    ) -> Result<String, TokenError> {
        let payload = Payload::new(subject_email, user_id, duration);
        self.sign(&payload)
    }

    fn verify_token(&self, token: &str) -> Result<Payload, TokenError> {
        let header = decode_header(token).map_err(|e| {
            tracing::debug!("JWT header rejected: {}", e);
            TokenError::Invalid
        })?;

        if header.alg != self.algorithm {
            tracing::warn!(
                declared = ?header.alg,
                expected = ?self.algorithm,
                "JWT algorithm mismatch"
            );
            return Err(TokenError::Invalid);
        }

        let data = decode::<RegisteredClaims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| {
                tracing::debug!("JWT validation error: {}", e);
                TokenError::Invalid
            })?;

        let payload = Payload::try_from(data.claims)?;
        let now = Utc::now();

        if payload.is_expired_at(now) {
            return Err(TokenError::Expired);
        }

        if payload.is_issued_after(now, self.max_clock_skew) {
            tracing::warn!(
                token_id = %payload.token_id,
                "JWT issued in the future"
            );
            return Err(TokenError::Invalid);
        }

        Ok(payload)
    }
}

impl std::fmt::Debug for JwtMaker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtMaker")
            .field("algorithm", &self.algorithm)
            .field("key_id", &self.key_id)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};

    const SECRET: &[u8] = b"test-secret-key-at-least-32-characters-long";

    fn get_test_maker() -> JwtMaker {
        JwtMaker::new(SECRET).expect("Failed to build maker")
    }

    #[test]
    fn test_generate_and_validate_token() {
        let maker = get_test_maker();

        let token = maker
            .create_token("test@example.com", 42, Duration::minutes(1))
            .expect("Failed to generate token");
        let payload = maker.verify_token(&token).expect("Failed to validate token");

        assert_eq!(payload.subject_email, "test@example.com");
        assert_eq!(payload.user_id, 42);
        assert_eq!(token.split('.').count(), 3);
    }

    #[test]
    fn test_short_secret_is_rejected() {
        let result = JwtMaker::new(b"too-short");

        assert_eq!(
            result.err(),
            Some(TokenError::Config(KeyError::Weak { min: 32, actual: 9 }))
        );
    }

    #[test]
    fn test_exactly_32_bytes_is_enough() {
        assert!(JwtMaker::new(&[7u8; 32]).is_ok());
        assert!(JwtMaker::new(&[7u8; 31]).is_err());
    }

    #[test]
    fn test_asymmetric_algorithm_is_rejected() {
        let result = JwtMaker::with_algorithm(SECRET, Algorithm::RS256);

        assert!(matches!(
            result,
            Err(TokenError::Config(KeyError::UnsupportedAlgorithm(_)))
        ));
    }

    #[test]
    fn test_invalid_token() {
        let maker = get_test_maker();

        assert_eq!(maker.verify_token("invalid.token.here"), Err(TokenError::Invalid));
        assert_eq!(maker.verify_token("not-a-real-token"), Err(TokenError::Invalid));
        assert_eq!(maker.verify_token(""), Err(TokenError::Invalid));
    }

    #[test]
    fn test_tampered_token() {
        let maker = get_test_maker();
        let token = maker
            .create_token("test@example.com", 1, Duration::minutes(1))
            .expect("Failed to generate token");

        let tampered = format!("{}X", token);
        assert_eq!(maker.verify_token(&tampered), Err(TokenError::Invalid));
    }

    #[test]
    fn test_expired_token_with_valid_signature() {
        let maker = get_test_maker();
        let token = maker
            .create_token("test@example.com", 1, Duration::minutes(-1))
            .expect("Failed to generate token");

        assert_eq!(maker.verify_token(&token), Err(TokenError::Expired));
    }

    #[test]
    fn test_none_algorithm_is_rejected() {
        let maker = get_test_maker();
        let token = maker
            .create_token("test@example.com", 1, Duration::minutes(1))
            .expect("Failed to generate token");
        let claims = token.split('.').nth(1).unwrap();
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"none","typ":"JWT"}"#);

        let unsigned = format!("{}.{}.", header, claims);
        assert_eq!(maker.verify_token(&unsigned), Err(TokenError::Invalid));
    }

    #[test]
    fn test_algorithm_substitution_is_rejected() {
        let maker = get_test_maker();
        let hs512 = JwtMaker::with_algorithm(SECRET, Algorithm::HS512).unwrap();

        // Same secret, different algorithm: the signature would verify under
        // HS512, but the pinned algorithm refuses it first.
        let token = hs512
            .create_token("test@example.com", 1, Duration::minutes(1))
            .unwrap();
        assert_eq!(maker.verify_token(&token), Err(TokenError::Invalid));
        assert!(hs512.verify_token(&token).is_ok());
    }

    #[test]
    fn test_wrong_secret() {
        let maker = get_test_maker();
        let other = JwtMaker::new(b"another-secret-key-at-least-32-characters").unwrap();

        let token = maker
            .create_token("test@example.com", 1, Duration::minutes(1))
            .unwrap();
        assert_eq!(other.verify_token(&token), Err(TokenError::Invalid));
    }

    #[test]
    fn test_future_issued_at_is_rejected() {
        let maker = get_test_maker();
        let mut payload = Payload::new("test@example.com", 1, Duration::minutes(10));
        payload.issued_at = payload.issued_at + Duration::minutes(5);

        let token = maker.sign(&payload).unwrap();
        assert_eq!(maker.verify_token(&token), Err(TokenError::Invalid));
    }
}
