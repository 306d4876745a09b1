//! Error types for the dashboard client

use std::fmt;

pub type Result<T> = std::result::Result<T, DashboardError>;

#[derive(Debug)]
pub enum DashboardError {
    /// IO operation failed
    Io(std::io::Error),

    /// HTTP request failed
    Http(reqwest::Error),

    /// JSON serialization/deserialization failed
    Json(serde_json::Error),

    /// Configuration error
    Config(String),

    /// Server answered with a non-success status
    Status(u16),

    /// Generic error with message
    Other(String),
}

impl fmt::Display for DashboardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DashboardError::Io(err) => write!(f, "IO error: {}", err),
            DashboardError::Http(err) => write!(f, "HTTP error: {}", err),
            DashboardError::Json(err) => write!(f, "JSON error: {}", err),
            DashboardError::Config(msg) => write!(f, "Configuration error: {}", msg),
            DashboardError::Status(code) => write!(f, "Unexpected HTTP status {}", code),
            DashboardError::Other(msg) => write!(f, "Error: {}", msg),
        }
    }
}

impl std::error::Error for DashboardError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DashboardError::Io(err) => Some(err),
            DashboardError::Http(err) => Some(err),
            DashboardError::Json(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for DashboardError {
    fn from(err: std::io::Error) -> Self {
        DashboardError::Io(err)
    }
}

impl From<reqwest::Error> for DashboardError {
    fn from(err: reqwest::Error) -> Self {
        DashboardError::Http(err)
    }
}

impl From<serde_json::Error> for DashboardError {
    fn from(err: serde_json::Error) -> Self {
        DashboardError::Json(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        assert_eq!(
            DashboardError::Config("base_url cannot be empty".to_string()).to_string(),
            "Configuration error: base_url cannot be empty"
        );
        assert_eq!(DashboardError::Status(503).to_string(), "Unexpected HTTP status 503");
    }

    #[test]
    fn test_io_error_converts_with_question_mark() {
        fn wait_for_signal() -> Result<()> {
            Err::<(), _>(std::io::Error::new(std::io::ErrorKind::Other, "signal handler unavailable"))?;
            Ok(())
        }

        let err = wait_for_signal().unwrap_err();
        assert!(matches!(err, DashboardError::Io(_)));
        assert_eq!(err.to_string(), "IO error: signal handler unavailable");
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_json_error_has_source() {
        let err: DashboardError = serde_json::from_str::<u32>("nope").unwrap_err().into();
        assert!(std::error::Error::source(&err).is_some());
        assert!(err.to_string().starts_with("JSON error"));
    }
}
