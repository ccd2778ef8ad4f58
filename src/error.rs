use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::domain::{MemberId, NominationId};

/// Engine-level failures.
///
/// Every mutating engine operation either succeeds or returns one of these
/// with the ledger left untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// Referrer id does not resolve to an existing member. A programming
    /// error in callers, never a recoverable user condition.
    #[error("Unknown referrer: {0}")]
    UnknownReferrer(MemberId),
    /// Member id does not resolve to an existing member.
    #[error("Unknown member: {0}")]
    UnknownMember(MemberId),
    /// Nomination id does not resolve to a known nomination.
    #[error("Unknown nomination: {0}")]
    UnknownNomination(NominationId),
    /// Confirm/decline attempted on a nomination that is not `proposed`.
    #[error("Nomination {0} is not in the proposed state")]
    NominationConflict(NominationId),
    /// The nomination handshake failed in transit. The proposal is left
    /// intact; retrying is safe.
    #[error("Transient operation failure: {0}")]
    TransientOperation(String),
}

/// API-level error, mapped onto HTTP responses.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Internal server error: {0}")]
    Internal(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Bad request: {0}")]
    BadRequest(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Temporarily unavailable: {0}")]
    Unavailable(String),
}

impl From<EngineError> for AppError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::UnknownReferrer(_)
            | EngineError::UnknownMember(_)
            | EngineError::UnknownNomination(_) => AppError::NotFound(err.to_string()),
            EngineError::NominationConflict(_) => AppError::Conflict(err.to_string()),
            EngineError::TransientOperation(_) => AppError::Unavailable(err.to_string()),
        }
    }
}

impl From<crate::config::ConfigError> for AppError {
    fn from(err: crate::config::ConfigError) -> Self {
        AppError::Config(err.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::Config(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            AppError::Unavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg),
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}
