use thiserror::Error;

#[derive(Error, Debug)]
pub enum DashError {
    #[error("API request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    UrlError(#[from] url::ParseError),

    #[error("Configuration error in {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Build error: {message}")]
    BuildError { message: String },

    #[error("Dev server error: {message}")]
    ServerError { message: String },

    #[error("Request body exceeds {limit} bytes")]
    PayloadTooLarge { limit: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Configuration,
    Filesystem,
    Data,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl DashError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            DashError::Http(_)
            | DashError::ServerError { .. }
            | DashError::PayloadTooLarge { .. } => ErrorCategory::Network,
            DashError::UrlError(_)
            | DashError::ConfigValidationError { .. }
            | DashError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            DashError::IoError(_) | DashError::BuildError { .. } => ErrorCategory::Filesystem,
            DashError::SerializationError(_) => ErrorCategory::Data,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            // The backend may simply be down or slow; running again can succeed.
            DashError::Http(_) => ErrorSeverity::Medium,
            DashError::PayloadTooLarge { .. } => ErrorSeverity::Low,
            DashError::SerializationError(_) | DashError::BuildError { .. } => ErrorSeverity::High,
            DashError::UrlError(_)
            | DashError::ConfigValidationError { .. }
            | DashError::InvalidConfigValueError { .. } => ErrorSeverity::High,
            DashError::IoError(_) | DashError::ServerError { .. } => ErrorSeverity::Critical,
        }
    }

    /// True when the underlying HTTP request was aborted by the client timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, DashError::Http(e) if e.is_timeout())
    }

    /// HTTP status of a rejected response, if the backend answered at all.
    pub fn status(&self) -> Option<reqwest::StatusCode> {
        match self {
            DashError::Http(e) => e.status(),
            _ => None,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            DashError::Http(e) if e.is_timeout() => "The backend did not answer in time".to_string(),
            DashError::Http(e) if e.is_connect() => "Could not connect to the backend".to_string(),
            DashError::Http(e) => match e.status() {
                Some(status) => format!("The backend rejected the request ({})", status),
                None => format!("Request failed: {}", e),
            },
            DashError::ConfigValidationError { field, message } => {
                format!("Configuration problem in '{}': {}", field, message)
            }
            DashError::InvalidConfigValueError { field, reason, .. } => {
                format!("Configuration value '{}' is invalid: {}", field, reason)
            }
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Network => "Check that the backend is running and reachable, then retry",
            ErrorCategory::Configuration => "Fix the configuration file or command-line arguments",
            ErrorCategory::Filesystem => "Check that the project files exist and are writable",
            ErrorCategory::Data => "The backend returned an unexpected payload; check the API version",
        }
    }
}

pub type Result<T> = std::result::Result<T, DashError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_errors_are_high_severity() {
        let err = DashError::InvalidConfigValueError {
            field: "server.port".to_string(),
            value: "0".to_string(),
            reason: "Value must be between 1 and 65535".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Configuration);
        assert_eq!(err.severity(), ErrorSeverity::High);
        assert!(!err.is_timeout());
        assert!(err.status().is_none());
        assert!(err.user_friendly_message().contains("server.port"));
    }

    #[test]
    fn test_io_errors_are_critical() {
        let err: DashError = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
        assert_eq!(err.category(), ErrorCategory::Filesystem);
        assert_eq!(err.severity(), ErrorSeverity::Critical);
    }
}
