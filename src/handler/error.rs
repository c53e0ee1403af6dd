//! Error type returned by route handlers.

use std::backtrace::{Backtrace, BacktraceStatus};
use std::fmt::Write;

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Handler error.
///
/// Carries the HTTP status the failure should surface as (500 unless the
/// handler says otherwise) and, for debug responses, the underlying error
/// chain and a backtrace captured where the error was created.
#[derive(Debug)]
pub struct HandlerError {
    /// Error message.
    pub message: String,
    /// HTTP status code.
    pub code: u16,
    source: Option<BoxError>,
    backtrace: Backtrace,
}

impl HandlerError {
    /// Create a new HandlerError.
    pub fn new(message: impl Into<String>) -> Self {
        Self::with_code(500, message)
    }

    /// Create a HandlerError with a specific code.
    pub fn with_code(code: u16, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code,
            source: None,
            backtrace: Backtrace::capture(),
        }
    }

    /// Wrap an arbitrary error as an internal failure.
    pub fn internal(err: impl Into<BoxError>) -> Self {
        let source = err.into();
        Self {
            message: source.to_string(),
            code: 500,
            source: Some(source),
            backtrace: Backtrace::capture(),
        }
    }

    /// Create a not found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::with_code(404, message)
    }

    /// Create a bad request error.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::with_code(400, message)
    }

    /// Create an unauthorized error.
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::with_code(401, message)
    }

    /// Attach the error that caused this one.
    pub fn with_source(mut self, source: impl Into<BoxError>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Human-readable trace: the error chain, then the backtrace if one
    /// was captured (`RUST_BACKTRACE` / `RUST_LIB_BACKTRACE`).
    pub fn trace(&self) -> String {
        let mut out = format!("HandlerError: {}", self);
        let mut cause = std::error::Error::source(self);
        while let Some(err) = cause {
            let _ = write!(out, "\nCaused by: {}", err);
            cause = err.source();
        }
        if self.backtrace.status() == BacktraceStatus::Captured {
            let _ = write!(out, "\n\n{}", self.backtrace);
        }
        out
    }
}

impl std::fmt::Display for HandlerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for HandlerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|err| err as &(dyn std::error::Error + 'static))
    }
}

impl From<std::io::Error> for HandlerError {
    fn from(err: std::io::Error) -> Self {
        HandlerError::internal(err)
    }
}

impl From<serde_json::Error> for HandlerError {
    fn from(err: serde_json::Error) -> Self {
        HandlerError::bad_request(err.to_string()).with_source(err)
    }
}

impl From<base64::DecodeError> for HandlerError {
    fn from(err: base64::DecodeError) -> Self {
        HandlerError::bad_request(err.to_string()).with_source(err)
    }
}
