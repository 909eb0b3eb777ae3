//! # Client Errors
//!
//! Every failure of one invocation is one of these. Nothing is retried; the
//! binary reports the error and exits non-zero.

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ClientError>;

#[derive(Debug, Error)]
pub enum ClientError {
    /// The `host:port` string could not be parsed.
    #[error("Invalid server address '{address}': {reason}")]
    InvalidAddress { address: String, reason: String },

    /// The config file could not be read or parsed.
    #[error("Failed to load config '{}'", .path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The config parsed but holds an unusable value.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The image file is missing, unreadable or the path is empty.
    #[error("Failed to read image '{}': {source}", .path.display())]
    ImageRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The channel to the prediction service could not be opened.
    #[error("Failed to connect to {address}: {source}")]
    Connect {
        address: String,
        #[source]
        source: tonic::transport::Error,
    },

    /// No response arrived within the request timeout.
    #[error("Predict call exceeded its deadline of {0:?}")]
    DeadlineExceeded(Duration),

    /// The service answered with a non-OK status.
    #[error("Prediction service error: {}: {}", .0.code(), .0.message())]
    Service(tonic::Status),

    /// Writing the rendered response failed.
    #[error("Failed to write response: {0}")]
    Output(#[from] io::Error),
}

impl ClientError {
    /// The image path did not point at an existing file.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ClientError::ImageRead { source, .. } if source.kind() == io::ErrorKind::NotFound)
    }

    /// The service could not be reached at all. A service that was reached
    /// but reported `UNAVAILABLE` counts too.
    pub fn is_connection(&self) -> bool {
        match self {
            ClientError::Connect { .. } => true,
            ClientError::Service(status) => status.code() == tonic::Code::Unavailable,
            _ => false,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, ClientError::DeadlineExceeded(_))
    }

    /// Maps a call status to the client taxonomy. `DEADLINE_EXCEEDED` is a
    /// timeout, and so is `CANCELLED` once `elapsed` has reached the
    /// deadline: that is how tonic reports an expired `grpc-timeout`.
    pub fn from_status(status: tonic::Status, deadline: Duration, elapsed: Duration) -> Self {
        match status.code() {
            tonic::Code::DeadlineExceeded => ClientError::DeadlineExceeded(deadline),
            tonic::Code::Cancelled if elapsed >= deadline => ClientError::DeadlineExceeded(deadline),
            _ => ClientError::Service(status),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let deadline = Duration::from_secs(10);

        let err = ClientError::from_status(tonic::Status::deadline_exceeded("slow"), deadline, Duration::ZERO);
        assert!(err.is_timeout());

        let err = ClientError::from_status(tonic::Status::not_found("no model"), deadline, Duration::ZERO);
        assert!(matches!(err, ClientError::Service(ref s) if s.code() == tonic::Code::NotFound));
        assert!(!err.is_connection());

        let err = ClientError::from_status(tonic::Status::unavailable("down"), deadline, Duration::ZERO);
        assert!(err.is_connection());
    }

    #[test]
    fn test_cancelled_after_deadline_is_timeout() {
        let deadline = Duration::from_millis(200);

        let err = ClientError::from_status(
            tonic::Status::cancelled("Timeout expired"),
            deadline,
            Duration::from_millis(201),
        );
        assert!(err.is_timeout());

        let err = ClientError::from_status(
            tonic::Status::cancelled("client went away"),
            deadline,
            Duration::from_millis(50),
        );
        assert!(matches!(err, ClientError::Service(ref s) if s.code() == tonic::Code::Cancelled));
    }

    #[test]
    fn test_not_found_only_for_missing_files() {
        let missing = ClientError::ImageRead {
            path: PathBuf::from("cat.jpg"),
            source: io::Error::from(io::ErrorKind::NotFound),
        };
        assert!(missing.is_not_found());
        assert!(missing.to_string().contains("cat.jpg"));

        let denied = ClientError::ImageRead {
            path: PathBuf::from("cat.jpg"),
            source: io::Error::from(io::ErrorKind::PermissionDenied),
        };
        assert!(!denied.is_not_found());
    }
}
