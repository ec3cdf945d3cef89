/// Error Handling Module
///
/// Unified error handling for the token service. It covers:
/// 1. Token errors raised by the makers (key material, encoding, verification)
/// 2. The application error type that reaches the HTTP boundary
/// 3. HTTP response mapping with structured logging

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use std::error::Error as StdError;
use std::fmt;

/// ============================================================================
/// 1. TOKEN ERRORS
/// ============================================================================

/// Key material rejected while constructing a maker
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyError {
    /// Signing secret shorter than the minimum length
    Weak { min: usize, actual: usize },
    /// Symmetric key of the wrong size for the cipher
    InvalidLength { expected: usize, actual: usize },
    /// Signing algorithm outside the HMAC family
    UnsupportedAlgorithm(String),
    /// Token setting out of its accepted range
    InvalidSetting { name: &'static str, value: i64 },
}

impl fmt::Display for KeyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyError::Weak { min, actual } => write!(
                f,
                "secret is too weak (minimum {} bytes, got {})",
                min, actual
            ),
            KeyError::InvalidLength { expected, actual } => write!(
                f,
                "invalid key length (expected exactly {} bytes, got {})",
                expected, actual
            ),
            KeyError::UnsupportedAlgorithm(alg) => {
                write!(f, "unsupported signing algorithm: {}", alg)
            }
            KeyError::InvalidSetting { name, value } => {
                write!(f, "token setting {} is out of range: {}", name, value)
            }
        }
    }
}

impl StdError for KeyError {}

/// Errors produced while creating or verifying a token
///
/// `Invalid` carries no detail on purpose: a caller must not be able to tell
/// a bad signature from a corrupted token or a wrong key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    Config(KeyError),
    Encoding(String),
    Invalid,
    Expired,
}

impl fmt::Display for TokenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenError::Config(e) => write!(f, "Token maker configuration error: {}", e),
            TokenError::Encoding(msg) => write!(f, "Token encoding failed: {}", msg),
            TokenError::Invalid => write!(f, "Token is invalid"),
            TokenError::Expired => write!(f, "Token has expired"),
        }
    }
}

impl StdError for TokenError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            TokenError::Config(e) => Some(e),
            _ => None,
        }
    }
}

impl From<KeyError> for TokenError {
    fn from(err: KeyError) -> Self {
        TokenError::Config(err)
    }
}

/// ============================================================================
/// 2. UNIFIED APPLICATION ERROR TYPE
/// ============================================================================

/// Central error type that reaches the HTTP boundary
#[derive(Debug)]
pub enum AppError {
    Token(TokenError),
    MissingToken,
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Token(e) => write!(f, "{}", e),
            AppError::MissingToken => write!(f, "Missing authentication token"),
        }
    }
}

impl StdError for AppError {}

impl From<TokenError> for AppError {
    fn from(err: TokenError) -> Self {
        AppError::Token(err)
    }
}

impl From<KeyError> for AppError {
    fn from(err: KeyError) -> Self {
        AppError::Token(TokenError::Config(err))
    }
}

// ============================================================================
// 3. HTTP RESPONSE MAPPING
// ============================================================================

/// Error response structure for HTTP responses
#[derive(Debug, serde::Serialize)]
pub struct ErrorResponse {
    /// Unique error ID for tracking
    pub error_id: String,
    /// Human-readable error message
    pub message: String,
    /// Error code for client-side handling
    pub code: String,
    /// HTTP status code
    pub status: u16,
    /// Timestamp when error occurred
    pub timestamp: String,
}

impl ErrorResponse {
    pub fn new(error_id: String, message: String, code: String, status: u16) -> Self {
        Self {
            error_id,
            message,
            code,
            status,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Trait for converting errors to HTTP responses with proper logging
pub trait ErrorHandler {
    fn error_response(&self, request_id: &str) -> (StatusCode, ErrorResponse);
    fn log_error(&self, request_id: &str);
}

impl AppError {
    fn classify(&self) -> (StatusCode, &'static str, &'static str) {
        match self {
            AppError::Token(TokenError::Invalid) => (
                StatusCode::UNAUTHORIZED,
                "TOKEN_INVALID",
                "Invalid token",
            ),
            AppError::Token(TokenError::Expired) => (
                StatusCode::UNAUTHORIZED,
                "TOKEN_EXPIRED",
                "Token has expired",
            ),
            AppError::Token(TokenError::Encoding(_)) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "TOKEN_ENCODING_ERROR",
                "Internal server error",
            ),
            AppError::Token(TokenError::Config(_)) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "CONFIG_ERROR",
                "Server configuration error",
            ),
            AppError::MissingToken => (
                StatusCode::UNAUTHORIZED,
                "MISSING_TOKEN",
                "Missing authentication token",
            ),
        }
    }
}

impl ErrorHandler for AppError {
    fn error_response(&self, request_id: &str) -> (StatusCode, ErrorResponse) {
        let (status, code, message) = self.classify();

        let error_response = ErrorResponse::new(
            request_id.to_string(),
            message.to_string(),
            code.to_string(),
            status.as_u16(),
        );

        (status, error_response)
    }

    fn log_error(&self, request_id: &str) {
        match self {
            AppError::Token(TokenError::Invalid)
            | AppError::Token(TokenError::Expired)
            | AppError::MissingToken => {
                tracing::warn!(
                    request_id = request_id,
                    error = %self,
                    "Authentication error"
                );
            }
            AppError::Token(_) => {
                tracing::error!(
                    request_id = request_id,
                    error = %self,
                    "Token service error"
                );
            }
        }
    }
}

/// Implement ResponseError for Actix-web integration
impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        let request_id = uuid::Uuid::new_v4().to_string();
        self.log_error(&request_id);

        let (status, error_response) = <Self as ErrorHandler>::error_response(self, &request_id);

        HttpResponse::build(status).json(error_response)
    }

    fn status_code(&self) -> StatusCode {
        self.classify().0
    }
}
