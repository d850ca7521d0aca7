//! Error types for the OpenStock CLI

use thiserror::Error;

/// Result type alias for OpenStock operations
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type for the application
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Interactive prompt error: {0}")]
    Dialoguer(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The backend answered but refused the request, e.g. bad credentials
    #[error("{0}")]
    Declined(String),

    #[error("Operation failed: {0}")]
    Other(String),
}

impl Error {
    /// True when the failure means the held session is no longer valid.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Error::Api(ApiError::Unauthorized))
    }
}

impl From<dialoguer::Error> for Error {
    fn from(err: dialoguer::Error) -> Self {
        Error::Dialoguer(err.to_string())
    }
}

/// API-related errors, classified from the HTTP response
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Authentication required. Please sign in.")]
    Unauthorized,

    #[error("Access denied. You don't have permission to perform this action.")]
    Forbidden,

    #[error("Resource not found.")]
    NotFound,

    #[error("Server error. Please try again later.")]
    ServerError(u16),

    /// Any other non-2xx status; the message comes from the body when present
    #[error("{message}")]
    Status { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid API response: {0}")]
    InvalidResponse(String),
}

impl ApiError {
    /// Classify a non-2xx status code. `message` is only used for statuses
    /// outside the fixed taxonomy.
    pub fn from_status(status: u16, message: Option<String>) -> Self {
        match status {
            401 => ApiError::Unauthorized,
            403 => ApiError::Forbidden,
            404 => ApiError::NotFound,
            s if s >= 500 => ApiError::ServerError(s),
            s => ApiError::Status {
                status: s,
                message: message.unwrap_or_else(|| format!("HTTP error! status: {}", s)),
            },
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::Network("Request timed out".to_string())
        } else if err.is_connect() {
            ApiError::Network("Failed to connect to API".to_string())
        } else {
            ApiError::Network(err.to_string())
        }
    }
}

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

impl From<serde_yaml::Error> for ConfigError {
    fn from(err: serde_yaml::Error) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}

/// Persisted storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Could not determine data directory")]
    NoHome,

    #[error("Storage I/O error: {0}")]
    Io(String),

    #[error("Storage database error: {0}")]
    Database(String),
}

impl From<rusqlite::Error> for StorageError {
    fn from(err: rusqlite::Error) -> Self {
        StorageError::Database(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_401_is_unauthorized() {
        let err = ApiError::from_status(401, Some("ignored".to_string()));
        assert!(matches!(err, ApiError::Unauthorized));
        assert_eq!(err.to_string(), "Authentication required. Please sign in.");
    }

    #[test]
    fn test_status_403_is_forbidden() {
        let err = ApiError::from_status(403, None);
        assert!(matches!(err, ApiError::Forbidden));
        assert!(err.to_string().contains("permission"));
    }

    #[test]
    fn test_status_404_is_not_found() {
        let err = ApiError::from_status(404, None);
        assert!(matches!(err, ApiError::NotFound));
        assert_eq!(err.to_string(), "Resource not found.");
    }

    #[test]
    fn test_5xx_is_server_error() {
        for status in [500, 502, 503] {
            let err = ApiError::from_status(status, Some("boom".to_string()));
            assert!(matches!(err, ApiError::ServerError(s) if s == status));
            assert_eq!(err.to_string(), "Server error. Please try again later.");
        }
    }

    #[test]
    fn test_other_status_uses_body_message() {
        let err = ApiError::from_status(400, Some("Symbol is required".to_string()));
        assert!(matches!(err, ApiError::Status { status: 400, .. }));
        assert_eq!(err.to_string(), "Symbol is required");
    }

    #[test]
    fn test_other_status_without_message() {
        let err = ApiError::from_status(409, None);
        assert_eq!(err.to_string(), "HTTP error! status: 409");
    }

    #[test]
    fn test_network_error_message() {
        let err = ApiError::Network("Connection refused".to_string());
        assert!(err.to_string().contains("Connection refused"));
    }

    #[test]
    fn test_error_is_unauthorized() {
        let err: Error = ApiError::Unauthorized.into();
        assert!(err.is_unauthorized());

        let err: Error = ApiError::Forbidden.into();
        assert!(!err.is_unauthorized());
    }

    #[test]
    fn test_config_error_from_yaml_error() {
        let yaml_str = "invalid: [yaml: content";
        let yaml_err = serde_yaml::from_str::<serde_yaml::Value>(yaml_str).unwrap_err();
        let config_err: ConfigError = yaml_err.into();

        match config_err {
            ConfigError::ParseError(_) => (),
            _ => panic!("Expected ConfigError::ParseError"),
        }
    }

    #[test]
    fn test_error_from_storage_error() {
        let err: Error = StorageError::NoHome.into();
        match err {
            Error::Storage(StorageError::NoHome) => (),
            _ => panic!("Expected Error::Storage(StorageError::NoHome)"),
        }
    }
}
