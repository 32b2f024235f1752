//! Transport error types

use std::fmt;

/// Result type for transport operations
pub type Result<T> = std::result::Result<T, TransportError>;

/// Network-level failures of a single HTTP attempt.
///
/// A non-2xx status is not a transport error: the response is returned to
/// the caller, which owns status classification.
#[derive(Debug)]
pub enum TransportError {
    /// Request could not be built or the response body could not be read
    Http(String),

    /// Connection could not be established
    Connection(String),

    /// I/O error
    Io(std::io::Error),

    /// The attempt exceeded its timeout
    Timeout,

    /// Serialization error
    Serialization(String),

    /// Generic transport error
    Other(String),
}

impl TransportError {
    /// Whether the failure happened on the wire (and may succeed if repeated).
    pub fn is_network(&self) -> bool {
        matches!(
            self,
            Self::Timeout | Self::Connection(_) | Self::Http(_) | Self::Io(_)
        )
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Http(msg) => write!(f, "HTTP error: {}", msg),
            Self::Connection(msg) => write!(f, "Connection error: {}", msg),
            Self::Io(err) => write!(f, "I/O error: {}", err),
            Self::Timeout => write!(f, "Timeout"),
            Self::Serialization(msg) => write!(f, "Serialization error: {}", msg),
            Self::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for TransportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for TransportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_connect() {
            Self::Connection(err.to_string())
        } else {
            Self::Http(err.to_string())
        }
    }
}

impl From<serde_json::Error> for TransportError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_network_classification() {
        assert!(TransportError::Timeout.is_network());
        assert!(TransportError::Connection("refused".into()).is_network());
        assert!(TransportError::Http("read response: eof".into()).is_network());
        assert!(!TransportError::Serialization("bad".into()).is_network());
        assert!(!TransportError::Other("?".into()).is_network());
    }

    #[test]
    fn test_display() {
        assert_eq!(TransportError::Timeout.to_string(), "Timeout");
        assert_eq!(
            TransportError::Connection("refused".into()).to_string(),
            "Connection error: refused"
        );
    }
}
