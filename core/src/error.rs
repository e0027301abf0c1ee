//! Error types for the Etherpad API client.
//!
//! # Design
//! The envelope `code` selects one of four server-reported kinds. Three more
//! kinds are produced locally: an operation the catalogue does not know is
//! rejected before any I/O, a failed exchange or a non-JSON body becomes
//! `Transport`, and JSON without the envelope shape becomes
//! `MalformedResponse`. `ErrorKind` mirrors the variants without payloads so
//! callers can branch or log on the category alone.

use std::fmt;

use thiserror::Error;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Category of an [`ApiError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidParameters,
    InternalError,
    UnknownOperation,
    PermissionDenied,
    Transport,
    MalformedResponse,
    InvalidConfig,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::InvalidParameters => "invalid_parameters",
            ErrorKind::InternalError => "internal_error",
            ErrorKind::UnknownOperation => "unknown_operation",
            ErrorKind::PermissionDenied => "permission_denied",
            ErrorKind::Transport => "transport",
            ErrorKind::MalformedResponse => "malformed_response",
            ErrorKind::InvalidConfig => "invalid_config",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors returned by [`crate::EtherpadClient`].
#[derive(Debug, Error)]
pub enum ApiError {
    /// Envelope code 1, or a required parameter missing before dispatch.
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),

    /// Envelope code 2, or any code outside the known table.
    #[error("internal server error: {0}")]
    InternalError(String),

    /// Envelope code 3, or a name missing from the local catalogue.
    #[error("unknown operation: {0}")]
    UnknownOperation(String),

    /// Envelope code 4: wrong API key or operation not permitted.
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// The exchange failed or the body was not a JSON envelope.
    #[error("transport error: {message}")]
    Transport {
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    /// The body was JSON but not `{code, message, data}`, or `data` did not
    /// have the shape the operation returns.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// The client could not be constructed from its configuration.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl ApiError {
    /// Classify a non-zero envelope code. The message is kept verbatim.
    pub fn from_code(code: i64, message: impl Into<String>) -> Self {
        let message = message.into();
        match code {
            1 => ApiError::InvalidParameters(message),
            2 => ApiError::InternalError(message),
            3 => ApiError::UnknownOperation(message),
            4 => ApiError::PermissionDenied(message),
            other => ApiError::InternalError(format!("code {other}: {message}")),
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        ApiError::Transport {
            message: message.into(),
            source: None,
        }
    }

    pub fn transport_with_source(
        message: impl Into<String>,
        source: impl Into<BoxError>,
    ) -> Self {
        ApiError::Transport {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::InvalidParameters(_) => ErrorKind::InvalidParameters,
            ApiError::InternalError(_) => ErrorKind::InternalError,
            ApiError::UnknownOperation(_) => ErrorKind::UnknownOperation,
            ApiError::PermissionDenied(_) => ErrorKind::PermissionDenied,
            ApiError::Transport { .. } => ErrorKind::Transport,
            ApiError::MalformedResponse(_) => ErrorKind::MalformedResponse,
            ApiError::InvalidConfig(_) => ErrorKind::InvalidConfig,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn codes_map_to_kinds() {
        assert_eq!(ApiError::from_code(1, "m").kind(), ErrorKind::InvalidParameters);
        assert_eq!(ApiError::from_code(2, "m").kind(), ErrorKind::InternalError);
        assert_eq!(ApiError::from_code(3, "m").kind(), ErrorKind::UnknownOperation);
        assert_eq!(ApiError::from_code(4, "m").kind(), ErrorKind::PermissionDenied);
    }

    #[test]
    fn message_is_kept_verbatim() {
        match ApiError::from_code(1, "padID does not exist") {
            ApiError::InvalidParameters(msg) => assert_eq!(msg, "padID does not exist"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn unknown_code_is_internal_error() {
        let err = ApiError::from_code(42, "teapot");
        assert!(matches!(&err, ApiError::InternalError(msg) if msg == "code 42: teapot"));
    }

    #[test]
    fn transport_error_keeps_source() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        let err = ApiError::transport_with_source("connect failed", io);
        assert_eq!(err.kind(), ErrorKind::Transport);
        assert_eq!(err.source().unwrap().to_string(), "refused");
        assert_eq!(err.to_string(), "transport error: connect failed");
    }

    #[test]
    fn kind_names() {
        assert_eq!(ErrorKind::PermissionDenied.to_string(), "permission_denied");
        assert_eq!(ErrorKind::MalformedResponse.as_str(), "malformed_response");
    }
}
