use chrono::Duration;
use config::ConfigError;
use jsonwebtoken::Algorithm;

use crate::auth::TokenKind;
use crate::error::KeyError;

#[derive(serde::Deserialize, Clone, Debug)]
pub struct Settings {
    pub application: ApplicationSettings,
    pub token: TokenSettings,
}

#[derive(serde::Deserialize, Clone, Debug)]
pub struct ApplicationSettings {
    #[serde(default = "default_host")]
    pub host: String,
    pub port: u16,
}

impl ApplicationSettings {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Token issuance settings
///
/// `secret` must be at least 32 bytes for `jwt` and exactly 32 bytes for
/// `paseto`. `previous_secret` keeps tokens signed with the prior key valid
/// during a rotation.
#[derive(serde::Deserialize, Clone)]
pub struct TokenSettings {
    pub kind: TokenKind,
    pub secret: String,
    #[serde(default)]
    pub previous_secret: Option<String>,
    #[serde(default = "default_algorithm")]
    pub algorithm: Algorithm,
    #[serde(default = "default_max_clock_skew")]
    pub max_clock_skew: i64, // seconds
}

impl TokenSettings {
    /// Tolerance for `iat` claims ahead of the local clock
    ///
    /// # Errors
    /// Returns `KeyError::InvalidSetting` for negative values or values
    /// outside the representable duration range
    pub fn max_clock_skew(&self) -> Result<Duration, KeyError> {
        let invalid = KeyError::InvalidSetting {
            name: "max_clock_skew",
            value: self.max_clock_skew,
        };

        if self.max_clock_skew < 0 {
            return Err(invalid);
        }
        Duration::try_seconds(self.max_clock_skew).ok_or(invalid)
    }
}

impl std::fmt::Debug for TokenSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenSettings")
            .field("kind", &self.kind)
            .field("secret", &"[redacted]")
            .field(
                "previous_secret",
                &self.previous_secret.as_ref().map(|_| "[redacted]"),
            )
            .field("algorithm", &self.algorithm)
            .field("max_clock_skew", &self.max_clock_skew)
            .finish()
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_algorithm() -> Algorithm {
    Algorithm::HS256
}

fn default_max_clock_skew() -> i64 {
    30
}

/// Load settings from `configuration.*` and `APP_*` environment variables
///
/// Nested keys use `__`, e.g. `APP_TOKEN__SECRET`.
pub fn get_configuration() -> Result<Settings, ConfigError> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("configuration").required(false))
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;
    settings.try_deserialize::<Settings>()
}
