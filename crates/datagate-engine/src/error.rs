//! Gateway error taxonomy.
//!
//! One error enum crosses every layer of the pipeline, so the
//! orchestration code can propagate failures *unchanged in kind* and the
//! transport/observability layers classify exactly once.
//!
//! # Error Codes
//!
//! | Variant | Code | Recoverable |
//! |---------|------|-------------|
//! | [`GatewayError::InvalidCommand`] | `GATEWAY_INVALID_COMMAND` | No |
//! | [`GatewayError::SchemaNotFound`] | `GATEWAY_SCHEMA_NOT_FOUND` | No |
//! | [`GatewayError::LanguageNotSupported`] | `GATEWAY_LANGUAGE_NOT_SUPPORTED` | No |
//! | [`GatewayError::Forbidden`] | `GATEWAY_FORBIDDEN` | No |
//! | [`GatewayError::Execution`] | `GATEWAY_EXECUTION_FAILED` | No |
//! | [`GatewayError::Cancelled`] | `GATEWAY_CANCELLED` | No |
//! | [`GatewayError::Timeout`] | `GATEWAY_TIMEOUT` | Yes |
//! | [`GatewayError::Internal`] | `GATEWAY_INTERNAL` | No |
//!
//! # Classification
//!
//! [`is_rejection`](GatewayError::is_rejection) separates client-caused
//! outcomes (4xx-class: bad command, unknown dataset, unsupported
//! language, missing permission) from system failures. Cancellation and
//! timeout are their own kinds so observers are never misled into
//! treating an aborted request as a backend defect.

use datagate_auth::AccessDenied;
use datagate_types::{ErrorCode, Language, SchemaId};
use thiserror::Error;

/// Terminal failure of a gateway request.
///
/// `Clone` so an invalid [`Command`](crate::Command) can carry its
/// captured construction error as a value until the pipeline surfaces it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    /// The command is malformed: missing, duplicated or illegal
    /// parameters, or an engine-detected usage error.
    #[error("invalid command: {0}")]
    InvalidCommand(String),

    /// No dataset with the requested schema id is deployed.
    #[error("no dataset named '{0}' is deployed")]
    SchemaNotFound(SchemaId),

    /// The dataset exists but has no engine for the requested language.
    #[error("dataset '{schema}' does not support '{language}'")]
    LanguageNotSupported {
        /// The deployed dataset.
        schema: SchemaId,
        /// The unsupported payload language.
        language: Language,
    },

    /// The command's owner lacks the required permission.
    #[error(transparent)]
    Forbidden(#[from] AccessDenied),

    /// The engine failed while executing or serializing.
    #[error("execution failed: {0}")]
    Execution(String),

    /// The request was cancelled before it completed.
    #[error("execution cancelled")]
    Cancelled,

    /// The transport-level deadline elapsed before completion.
    #[error("execution did not complete in time")]
    Timeout,

    /// An unexpected failure not covered by the taxonomy.
    #[error("internal error: {0}")]
    Internal(String),
}

impl GatewayError {
    /// Returns `true` for client-caused outcomes (reported as `rejected`
    /// rather than `failed`).
    #[must_use]
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            Self::InvalidCommand(_)
                | Self::SchemaNotFound(_)
                | Self::LanguageNotSupported { .. }
                | Self::Forbidden(_)
        )
    }

    /// Returns `true` if the request ended because it was cancelled or
    /// timed out rather than because it failed.
    #[must_use]
    pub fn is_abort(&self) -> bool {
        matches!(self, Self::Cancelled | Self::Timeout)
    }
}

impl ErrorCode for GatewayError {
    fn code(&self) -> &'static str {
        match self {
            Self::InvalidCommand(_) => "GATEWAY_INVALID_COMMAND",
            Self::SchemaNotFound(_) => "GATEWAY_SCHEMA_NOT_FOUND",
            Self::LanguageNotSupported { .. } => "GATEWAY_LANGUAGE_NOT_SUPPORTED",
            Self::Forbidden(_) => "GATEWAY_FORBIDDEN",
            Self::Execution(_) => "GATEWAY_EXECUTION_FAILED",
            Self::Cancelled => "GATEWAY_CANCELLED",
            Self::Timeout => "GATEWAY_TIMEOUT",
            Self::Internal(_) => "GATEWAY_INTERNAL",
        }
    }

    fn is_recoverable(&self) -> bool {
        matches!(self, Self::Timeout)
    }
}
