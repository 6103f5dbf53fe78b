use std::fmt;

use serde::Serialize;

/// Structured error type for the driver. Surfaces (CLI, HTTP API) match on the
/// `code` tag instead of parsing messages.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "code", content = "detail")]
pub enum DriverError {
    NotConnected,
    Transport { message: String },
    Link { endpoint: String, message: String },
    InvalidIntent { message: String },
    UnknownIntent { name: String },
    Settings { message: String },
    Io { message: String },
}

impl fmt::Display for DriverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DriverError::NotConnected => write!(f, "Remote socket is not connected"),
            DriverError::Transport { message } => write!(f, "Transport error: {message}"),
            DriverError::Link { endpoint, message } => {
                write!(f, "Link request to {endpoint} failed: {message}")
            }
            DriverError::InvalidIntent { message } => write!(f, "{message}"),
            DriverError::UnknownIntent { name } => write!(f, "Unknown intent: {name}"),
            DriverError::Settings { message } => write!(f, "Settings error: {message}"),
            DriverError::Io { message } => write!(f, "I/O error: {message}"),
        }
    }
}

impl std::error::Error for DriverError {}

impl From<std::io::Error> for DriverError {
    fn from(e: std::io::Error) -> Self {
        DriverError::Io {
            message: e.to_string(),
        }
    }
}

impl From<serde_json::Error> for DriverError {
    fn from(e: serde_json::Error) -> Self {
        DriverError::InvalidIntent {
            message: e.to_string(),
        }
    }
}

impl From<reqwest::Error> for DriverError {
    fn from(e: reqwest::Error) -> Self {
        DriverError::Link {
            endpoint: e
                .url()
                .map(|u| u.path().to_string())
                .unwrap_or_default(),
            message: e.to_string(),
        }
    }
}

impl From<tokio_tungstenite::tungstenite::Error> for DriverError {
    fn from(e: tokio_tungstenite::tungstenite::Error) -> Self {
        DriverError::Transport {
            message: e.to_string(),
        }
    }
}

/// Allow converting DriverError to String for CLI output and HTTP bodies.
impl From<DriverError> for String {
    fn from(e: DriverError) -> String {
        e.to_string()
    }
}

impl From<String> for DriverError {
    fn from(s: String) -> Self {
        DriverError::InvalidIntent { message: s }
    }
}

impl From<&str> for DriverError {
    fn from(s: &str) -> Self {
        DriverError::InvalidIntent {
            message: s.to_string(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_code_tag() {
        let err = DriverError::UnknownIntent {
            name: "bogus".into(),
        };
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["code"], "UnknownIntent");
        assert_eq!(json["detail"]["name"], "bogus");
    }

    #[test]
    fn unit_variant_has_no_detail() {
        let json = serde_json::to_value(DriverError::NotConnected).unwrap();
        assert_eq!(json["code"], "NotConnected");
        assert!(json.get("detail").is_none());
    }
}
