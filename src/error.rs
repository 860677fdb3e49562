//! Error types for the IRC client engine.
//!
//! This module defines errors for connection establishment, transport
//! I/O, and message parsing.

use std::time::Duration;

use thiserror::Error;

/// Convenience type alias for Results using [`ProtocolError`].
pub type Result<T, E = ProtocolError> = std::result::Result<T, E>;

/// Top-level protocol errors.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProtocolError {
    /// I/O error during connecting, reading or writing.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Connection attempt did not complete within the bounded wait.
    #[error("connect timed out after {0:?}")]
    ConnectTimeout(Duration),

    /// Host name was not usable as a TLS server name (SNI).
    #[error("invalid server name: {0}")]
    InvalidServerName(String),

    /// TLS handshake or configuration failure.
    #[error("tls error: {0}")]
    Tls(String),

    /// Message exceeded maximum allowed length.
    #[error("message too long: {0} bytes")]
    MessageTooLong(usize),

    /// Failed to parse an IRC message.
    #[error("invalid message: {string}")]
    InvalidMessage {
        /// The raw message string.
        string: String,
        /// The underlying parse error.
        #[source]
        cause: MessageParseError,
    },
}

/// Errors encountered when parsing IRC messages.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum MessageParseError {
    /// Message was empty.
    #[error("empty message")]
    EmptyMessage,

    /// Command was invalid or missing.
    #[error("invalid command")]
    InvalidCommand,

    /// Invalid message prefix.
    #[error("invalid prefix: {0}")]
    InvalidPrefix(String),

    /// A tag key or value was malformed.
    #[error("invalid tag: {0}")]
    InvalidTag(String),

    /// Trailing bytes remained after a full parse.
    #[error("trailing input after message: {0}")]
    TrailingInput(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ProtocolError::MessageTooLong(1024);
        assert_eq!(format!("{}", err), "message too long: 1024 bytes");

        let err = ProtocolError::ConnectTimeout(Duration::from_secs(15));
        assert_eq!(format!("{}", err), "connect timed out after 15s");
    }

    #[test]
    fn test_protocol_error_chaining() {
        let parse_err = MessageParseError::InvalidCommand;
        let protocol_err = ProtocolError::InvalidMessage {
            string: "INVALID".to_string(),
            cause: parse_err.clone(),
        };

        let source = std::error::Error::source(&protocol_err);
        assert!(source.is_some());
        assert_eq!(source.unwrap().to_string(), parse_err.to_string());
    }

    #[test]
    fn test_error_conversion() {
        let io_err =
            std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "connection refused");
        let protocol_err: ProtocolError = io_err.into();

        match protocol_err {
            ProtocolError::Io(_) => {}
            _ => panic!("Expected Io variant"),
        }
    }
}
