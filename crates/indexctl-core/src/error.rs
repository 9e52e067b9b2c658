use thiserror::Error;

use crate::outcome::Output;

/// Message attached to every unexpected probe status.
pub const SERVICE_UNAVAILABLE_MESSAGE: &str =
    "An error occurred. Check if the service is available.";

/// Errors raised by a reconciliation call. All of them are terminal for the call.
#[derive(Debug, Error)]
pub enum ReconcileError {
    /// The existence probe returned something other than 200 or 404.
    #[error("Service unavailable (HTTP {}): {}", .0.rc, message_of(.0))]
    ServiceUnavailable(Output),

    /// A write returned a status that does not signal success.
    #[error("Write failed (HTTP {}): {}", .0.rc, message_of(.0))]
    WriteFailed(Output),

    /// The remote state makes the requested change impossible.
    #[error("Precondition failed (HTTP {}): {}", .0.rc, message_of(.0))]
    PreconditionFailed(Output),

    #[error("Request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Invalid document payload: {0}")]
    InvalidPayload(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

fn message_of(output: &Output) -> &str {
    output.message.as_deref().unwrap_or("unexpected status")
}

impl ReconcileError {
    pub fn service_unavailable(rc: u16, request: impl Into<String>) -> Self {
        Self::ServiceUnavailable(
            Output::new(rc)
                .with_message(SERVICE_UNAVAILABLE_MESSAGE)
                .with_request(request),
        )
    }

    pub fn write_failed(rc: u16, request: impl Into<String>, response: impl Into<String>) -> Self {
        Self::WriteFailed(
            Output::new(rc)
                .with_message("An error occurred.")
                .with_request(request)
                .with_response(response),
        )
    }

    pub fn precondition_failed(
        rc: u16,
        message: impl Into<String>,
        request: impl Into<String>,
    ) -> Self {
        Self::PreconditionFailed(Output::new(rc).with_message(message).with_request(request))
    }

    pub fn invalid_payload(message: impl Into<String>) -> Self {
        Self::InvalidPayload(message.into())
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Remote detail for failures that got as far as an HTTP status.
    pub fn output(&self) -> Option<&Output> {
        match self {
            Self::ServiceUnavailable(output)
            | Self::WriteFailed(output)
            | Self::PreconditionFailed(output) => Some(output),
            Self::Transport { .. } | Self::InvalidPayload(_) | Self::Configuration(_) => None,
        }
    }

    pub fn status_code(&self) -> Option<u16> {
        self.output().map(|output| output.rc)
    }

    /// Get error category for logging
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::ServiceUnavailable(_) | Self::Transport { .. } => ErrorCategory::Service,
            Self::WriteFailed(_) => ErrorCategory::Write,
            Self::PreconditionFailed(_) => ErrorCategory::Precondition,
            Self::InvalidPayload(_) | Self::Configuration(_) => ErrorCategory::Input,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Service,
    Write,
    Precondition,
    Input,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Service => "service",
            Self::Write => "write",
            Self::Precondition => "precondition",
            Self::Input => "input",
        };
        f.write_str(name)
    }
}

pub type Result<T> = std::result::Result<T, ReconcileError>;
