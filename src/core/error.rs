use serde::Serialize;
use thiserror::Error;

use super::types::{ProfileKind, SyntaxKind};

/// Errors that end a validation request.
///
/// None of these are retried. [`ValidatorError::is_client_error`] tells the
/// boundary layer whether the document itself was at fault or the service.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ValidatorError {
    /// The bytes are not a usable invoice document.
    #[error("invalid document: {0}")]
    InvalidDocument(#[from] InvalidDocumentReason),

    /// The dialect was recognized but the profile identifier was missing or unsupported.
    #[error("unknown profile: {0}")]
    UnknownProfile(String),

    /// The rule engine could not parse or process a classified document.
    #[error("processing failure: {0}")]
    ProcessingFailure(String),

    /// No registered validator handles the pair, or a stage declined to report.
    #[error("no applicable validator for {syntax} / {profile}")]
    NoApplicableValidator {
        syntax: SyntaxKind,
        profile: ProfileKind,
    },

    /// Anything else.
    #[error("unexpected failure: {0}")]
    Unexpected(String),
}

/// Why a document was rejected as [`ValidatorError::InvalidDocument`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum InvalidDocumentReason {
    #[error("document is empty or blank")]
    Blank,

    #[error("character encoding could not be determined")]
    EncodingUndetermined,

    #[error("neither CII nor UBL root element found")]
    UnrecognizedSyntax,

    #[error("malformed XML: {0}")]
    MalformedXml(String),

    #[error("no embedded invoice XML: {0}")]
    NoEmbeddedInvoice(String),
}

/// Coarse error classification for callers that only need the category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidDocument,
    UnknownProfile,
    ProcessingFailure,
    NoApplicableValidator,
    Unexpected,
}

/// JSON error body for transport layers (`{"error": "..."}`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ValidatorError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidDocument(_) => ErrorKind::InvalidDocument,
            Self::UnknownProfile(_) => ErrorKind::UnknownProfile,
            Self::ProcessingFailure(_) => ErrorKind::ProcessingFailure,
            Self::NoApplicableValidator { .. } => ErrorKind::NoApplicableValidator,
            Self::Unexpected(_) => ErrorKind::Unexpected,
        }
    }

    /// `true` when the submitted document caused the failure.
    ///
    /// Server-side errors must be reported to an operator instead.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::InvalidDocument | ErrorKind::UnknownProfile | ErrorKind::ProcessingFailure
        )
    }

    /// HTTP-style status: 422 Unprocessable Content for client errors, 500 otherwise.
    pub fn status_code(&self) -> u16 {
        if self.is_client_error() { 422 } else { 500 }
    }

    /// Stable, client-facing message. Server-side details are never exposed.
    pub fn client_message(&self) -> &'static str {
        match self.kind() {
            ErrorKind::InvalidDocument => "The provided XML is not valid",
            ErrorKind::UnknownProfile => {
                "The validation profile could not be determined. Maybe the profile is not supported."
            }
            ErrorKind::ProcessingFailure => "The parsing of the provided XML failed.",
            ErrorKind::NoApplicableValidator | ErrorKind::Unexpected => "Internal Server Error",
        }
    }

    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            error: self.client_message().to_string(),
        }
    }
}
