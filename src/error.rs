use miette::{Diagnostic, Result};
use thiserror::Error;

/// Main error type for the application
#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("Not authenticated")]
    #[diagnostic(code(casebook::unauthenticated))]
    Unauthenticated,

    #[error("API error (HTTP {status}): {message}")]
    #[diagnostic(code(casebook::api))]
    Api { status: u16, message: String },

    #[error("Network error: {0}")]
    #[diagnostic(code(casebook::network))]
    Network(String),

    #[error("Validation error: {0}")]
    #[diagnostic(code(casebook::validation))]
    Validation(String),

    #[error("Token store error: {0}")]
    #[diagnostic(code(casebook::token_store))]
    TokenStore(String),

    #[error("Environment error: {0}")]
    #[diagnostic(code(casebook::environment))]
    Environment(String),

    #[error("Configuration error: {0}")]
    #[diagnostic(code(casebook::config))]
    Config(String),

    #[error(transparent)]
    #[diagnostic(code(casebook::io))]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    #[diagnostic(code(casebook::serialization))]
    Serialization(String),

    #[error("Other error: {0}")]
    #[diagnostic(code(casebook::other))]
    Other(String),
}

impl Error {
    /// True for the authorization failures that must force re-login:
    /// a missing token or a 401 from the provider/backend.
    pub fn is_unauthorized(&self) -> bool {
        match self {
            Error::Unauthenticated => true,
            Error::Api { status, .. } => *status == 401,
            _ => false,
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Network(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

// Implement From for TOML deserialization errors
impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

/// Type alias for Result with our Error type
pub type CrmResult<T> = Result<T, Error>;

/// Helper to create environment errors
pub fn env_error(var: &str) -> Error {
    Error::Environment(format!("Missing environment variable: {}", var))
}

/// Helper to create configuration errors
#[allow(dead_code)]
pub fn config_error(message: &str) -> Error {
    Error::Config(message.to_string())
}

/// Helper to create token store errors
pub fn token_store_error(message: &str) -> Error {
    Error::TokenStore(message.to_string())
}

/// Helper to create validation errors
pub fn validation_error(message: &str) -> Error {
    Error::Validation(message.to_string())
}

/// Helper to create other errors
#[allow(dead_code)]
pub fn other_error(message: &str) -> Error {
    Error::Other(message.to_string())
}
