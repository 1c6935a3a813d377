use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

// Type alias for Result with our AntiforgeryError
pub type Result<T> = std::result::Result<T, AntiforgeryError>;

/// Message returned to clients whose request failed validation, whatever the reason.
pub const VALIDATION_FAILED_MESSAGE: &str = "The request is not valid.";

/// Reasons a serialized token string could not be turned back into a token.
#[derive(Debug, Error)]
pub enum TokenParseError {
    #[error("token is empty")]
    Blank,

    #[error("token must be an identifier and a tick count separated by a single underscore")]
    Layout,

    #[error("invalid token identifier: {0}")]
    Identifier(#[from] uuid::Error),

    #[error("invalid token expiry: {0}")]
    Expiry(String),
}

/// Failures of the symmetric cipher.
#[derive(Debug, Error)]
pub enum CipherError {
    #[error("ciphertext is not valid base64: {0}")]
    Encoding(#[from] base64::DecodeError),

    #[error("decryption failed")]
    Decryption,

    #[error("decrypted data is not valid UTF-8")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Missing or malformed configuration. Always fatal at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("The {0} environment variable is missing")]
    MissingVariable(String),

    #[error("Failed to parse base64 data from {name}: {source}")]
    InvalidBase64 {
        name: String,
        #[source]
        source: base64::DecodeError,
    },

    #[error("{name} must be exactly {expected} bytes, got {actual}")]
    InvalidLength {
        name: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Invalid value for {name}: {value}")]
    InvalidValue { name: String, value: String },
}

#[derive(Error, Debug)]
pub enum AntiforgeryError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Cipher error: {0}")]
    Cipher(#[from] CipherError),

    #[error("{}", VALIDATION_FAILED_MESSAGE)]
    ValidationFailed,

    #[error("Failed to read request body: {0}")]
    Body(#[from] axum::Error),
}

impl IntoResponse for AntiforgeryError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AntiforgeryError::ValidationFailed => {
                (StatusCode::BAD_REQUEST, VALIDATION_FAILED_MESSAGE.to_string())
            }
            AntiforgeryError::Body(_) => (
                StatusCode::BAD_REQUEST,
                "Failed to read request body".to_string(),
            ),
            AntiforgeryError::Config(_) | AntiforgeryError::Cipher(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        };

        (status, error_message).into_response()
    }
}
