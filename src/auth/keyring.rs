/// Key Rotation
///
/// A [`KeyRing`] holds the current maker and, during a rotation grace period,
/// the previous one. Tokens are always issued with the current key. A token
/// the current maker calls `Invalid` is retried against the previous maker, so
/// tokens minted just before a rotation keep working until the previous key
/// is retired.
///
/// Both makers are swapped as one snapshot; verifications already running keep
/// the snapshot they started with.

use std::sync::{Arc, PoisonError, RwLock};

use chrono::Duration;

use crate::auth::maker::{Maker, TokenMaker};
use crate::auth::payload::Payload;
use crate::configuration::TokenSettings;
use crate::error::TokenError;

struct Generation {
    current: Arc<TokenMaker>,
    previous: Option<Arc<TokenMaker>>,
}

pub struct KeyRing {
    generation: RwLock<Arc<Generation>>,
}

impl KeyRing {
    pub fn new(current: TokenMaker) -> Self {
        Self::with_previous(current, None)
    }

    pub fn with_previous(current: TokenMaker, previous: Option<TokenMaker>) -> Self {
        Self {
            generation: RwLock::new(Arc::new(Generation {
                current: Arc::new(current),
                previous: previous.map(Arc::new),
            })),
        }
    }

    /// Build the key ring described by the token settings
    ///
    /// # Errors
    /// Returns `TokenError::Config` if either secret or the clock skew is
    /// rejected
    pub fn from_settings(settings: &TokenSettings) -> Result<Self, TokenError> {
        let max_clock_skew = settings.max_clock_skew()?;
        let build = |secret: &str| {
            TokenMaker::new(settings.kind, secret.as_bytes(), settings.algorithm)
                .map(|maker| maker.with_max_clock_skew(max_clock_skew))
        };

        let current = build(settings.secret.as_str())?;
        let previous = settings.previous_secret.as_deref().map(build).transpose()?;

        tracing::info!(
            kind = ?current.kind(),
            key_id = %current.key_id(),
            previous_key = previous.is_some(),
            "Key ring loaded"
        );

        Ok(Self::with_previous(current, previous))
    }

    /// Make `next` the signing key and keep the current one for verification
    pub fn rotate(&self, next: TokenMaker) {
        let mut guard = self.generation.write().unwrap_or_else(PoisonError::into_inner);

        tracing::info!(
            key_id = %next.key_id(),
            retiring = %guard.current.key_id(),
            "Rotating token key"
        );

        let previous = Arc::clone(&guard.current);
        *guard = Arc::new(Generation {
            current: Arc::new(next),
            previous: Some(previous),
        });
    }

    /// End the grace period: only the current key verifies from now on
    pub fn retire_previous(&self) {
        let mut guard = self.generation.write().unwrap_or_else(PoisonError::into_inner);
        if guard.previous.is_none() {
            return;
        }

        tracing::info!("Retiring previous token key");
        let current = Arc::clone(&guard.current);
        *guard = Arc::new(Generation {
            current,
            previous: None,
        });
    }

    pub fn has_previous(&self) -> bool {
        self.snapshot().previous.is_some()
    }

    pub fn current_key_id(&self) -> String {
        self.snapshot().current.key_id().to_string()
    }

    fn snapshot(&self) -> Arc<Generation> {
        let guard = self.generation.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&guard)
    }
}

impl Maker for KeyRing {
    fn create_token(
        &self,
        subject_email: &str,
        user_id: i64,
        duration: Duration,
    ) -> Result<String, TokenError> {
        self.snapshot()
            .current
            .create_token(subject_email, user_id, duration)
    }

    fn verify_token(&self, token: &str) -> Result<Payload, TokenError> {
        let generation = self.snapshot();

        match (generation.current.verify_token(token), &generation.previous) {
            (Err(TokenError::Invalid), Some(previous)) => previous.verify_token(token),
            (result, _) => result,
        }
    }
}

impl std::fmt::Debug for KeyRing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let generation = self.snapshot();
        f.debug_struct("KeyRing")
            .field("current", &generation.current)
            .field("previous", &generation.previous)
            .finish()
    }
}
