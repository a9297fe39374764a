//! Error types for ParkPal services.

use thiserror::Error;

/// Result type alias using ParkPalError.
pub type ParkPalResult<T> = Result<T, ParkPalError>;

/// Primary error type for ParkPal operations.
#[derive(Debug, Error)]
pub enum ParkPalError {
    // === Request Errors ===
    #[error("Missing required parameter: {0}")]
    MissingParameter(String),

    #[error("Invalid parameter value for '{param}': {message}")]
    InvalidParameter { param: String, message: String },

    #[error("Unknown region: {0}")]
    RegionNotFound(String),

    #[error("Unknown park: {0}")]
    ParkNotFound(i64),

    // === Upstream Errors ===
    #[error("Upstream request timed out")]
    Timeout,

    #[error("Upstream returned HTTP {0}")]
    UpstreamStatus(u16),

    #[error("Malformed upstream response: {0}")]
    MalformedResponse(String),

    #[error("Upstream transport error: {0}")]
    UpstreamTransport(String),

    // === Cache Errors ===
    #[error("Corrupt cache entry: {0}")]
    CacheCorrupt(String),

    #[error("Cache error: {0}")]
    CacheError(String),

    // === Infrastructure Errors ===
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Internal server error: {0}")]
    InternalError(String),
}

impl ParkPalError {
    /// Get the HTTP status code for this error.
    pub fn http_status_code(&self) -> u16 {
        match self {
            ParkPalError::MissingParameter(_) | ParkPalError::InvalidParameter { .. } => 400,

            ParkPalError::RegionNotFound(_) | ParkPalError::ParkNotFound(_) => 404,

            ParkPalError::ServiceUnavailable(_)
            | ParkPalError::UpstreamStatus(_)
            | ParkPalError::MalformedResponse(_)
            | ParkPalError::UpstreamTransport(_) => 503,
            ParkPalError::Timeout => 504,

            _ => 500,
        }
    }

    /// Reason suffix used in payload error tokens, e.g. `HTTP_500` in
    /// `park_6_HTTP_500`.
    pub fn token_reason(&self) -> String {
        match self {
            ParkPalError::UpstreamStatus(code) => format!("HTTP_{}", code),
            ParkPalError::Timeout => "timeout".to_string(),
            ParkPalError::MalformedResponse(_) => "malformed".to_string(),
            _ => "error".to_string(),
        }
    }

    /// True for failures raised while talking to an upstream provider.
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            ParkPalError::Timeout
                | ParkPalError::UpstreamStatus(_)
                | ParkPalError::MalformedResponse(_)
                | ParkPalError::UpstreamTransport(_)
        )
    }
}

// Conversion from common error types
impl From<std::io::Error> for ParkPalError {
    fn from(err: std::io::Error) -> Self {
        ParkPalError::InternalError(err.to_string())
    }
}

impl From<serde_json::Error> for ParkPalError {
    fn from(err: serde_json::Error) -> Self {
        ParkPalError::InternalError(format!("JSON error: {}", err))
    }
}

impl From<serde_yaml::Error> for ParkPalError {
    fn from(err: serde_yaml::Error) -> Self {
        ParkPalError::Config(format!("YAML error: {}", err))
    }
}
