//! GBFS client error types.

use std::fmt;
use std::time::Duration;

/// Which of the two feeds a failure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedKind {
    Info,
    Status,
}

impl FeedKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FeedKind::Info => "station_information",
            FeedKind::Status => "station_status",
        }
    }
}

impl fmt::Display for FeedKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors that can occur while fetching the feed pair.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// The shared deadline elapsed before both feeds arrived
    #[error("feeds did not arrive within {0:?}")]
    Timeout(Duration),

    /// A feed answered with a non-success status
    #[error("{feed} returned HTTP {status}")]
    HttpStatus { feed: FeedKind, status: u16 },

    /// A feed body was not the expected JSON shape
    #[error("{feed} body is malformed: {message}")]
    Malformed { feed: FeedKind, message: String },

    /// The request could not be sent or the body could not be read
    #[error("{feed} request failed: {source}")]
    Transport {
        feed: FeedKind,
        #[source]
        source: reqwest::Error,
    },

    /// The HTTP client could not be constructed
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

impl FetchError {
    /// Short machine-readable label, used as a log field.
    pub fn kind(&self) -> &'static str {
        match self {
            FetchError::Timeout(_) => "timeout",
            FetchError::HttpStatus { .. } => "http_status",
            FetchError::Malformed { .. } => "malformed",
            FetchError::Transport { .. } => "transport",
            FetchError::Client(_) => "client",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = FetchError::Timeout(Duration::from_secs(30));
        assert_eq!(err.to_string(), "feeds did not arrive within 30s");

        let err = FetchError::HttpStatus {
            feed: FeedKind::Status,
            status: 500,
        };
        assert_eq!(err.to_string(), "station_status returned HTTP 500");

        let err = FetchError::Malformed {
            feed: FeedKind::Info,
            message: "missing field `stations`".into(),
        };
        assert!(err.to_string().contains("station_information"));
        assert!(err.to_string().contains("missing field `stations`"));
    }

    #[test]
    fn kinds() {
        assert_eq!(FetchError::Timeout(Duration::ZERO).kind(), "timeout");
        assert_eq!(
            FetchError::HttpStatus {
                feed: FeedKind::Info,
                status: 404
            }
            .kind(),
            "http_status"
        );
    }
}
