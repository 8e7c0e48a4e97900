//! RPC error types and their HTTP mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use reunite_types::TypeError;
use reunite_verification::VerificationError;
use serde::Serialize;
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum RpcError {
    #[error("missing caller identity: the {0} header is required")]
    MissingIdentity(&'static str),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error(transparent)]
    Workflow(#[from] VerificationError),

    #[error("server error: {0}")]
    Server(String),
}

impl From<TypeError> for RpcError {
    fn from(e: TypeError) -> Self {
        RpcError::BadRequest(e.to_string())
    }
}

/// Body of every error response.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
    pub message: String,
}

impl RpcError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            RpcError::MissingIdentity(_) => StatusCode::UNAUTHORIZED,
            RpcError::BadRequest(_) => StatusCode::BAD_REQUEST,
            RpcError::Server(_) => StatusCode::INTERNAL_SERVER_ERROR,
            RpcError::Workflow(e) => match e {
                VerificationError::Unauthorized { .. } => StatusCode::FORBIDDEN,
                VerificationError::NotFound(_) => StatusCode::NOT_FOUND,
                VerificationError::InvalidTransition { .. }
                | VerificationError::VersionConflict { .. } => StatusCode::CONFLICT,
                VerificationError::ChannelFrozen(_) => StatusCode::LOCKED,
                VerificationError::MalformedEvidence(_) => StatusCode::UNPROCESSABLE_ENTITY,
                VerificationError::InvalidCase(_)
                | VerificationError::InvalidInput(_)
                | VerificationError::CaseId(_) => StatusCode::BAD_REQUEST,
                VerificationError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    /// Stable machine-readable code for the `error` field.
    pub fn error_code(&self) -> &'static str {
        match self {
            RpcError::MissingIdentity(_) => "missing_identity",
            RpcError::BadRequest(_) => "bad_request",
            RpcError::Server(_) => "server_error",
            RpcError::Workflow(e) => match e {
                VerificationError::Unauthorized { .. } => "unauthorized",
                VerificationError::NotFound(_) => "not_found",
                VerificationError::InvalidTransition { .. } => "invalid_transition",
                VerificationError::VersionConflict { .. } => "version_conflict",
                VerificationError::ChannelFrozen(_) => "channel_frozen",
                VerificationError::MalformedEvidence(_) => "malformed_evidence",
                VerificationError::InvalidCase(_) => "invalid_case",
                VerificationError::InvalidInput(_) => "invalid_input",
                VerificationError::CaseId(_) => "bad_request",
                VerificationError::Store(_) => "storage_error",
            },
        }
    }
}

impl IntoResponse for RpcError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!(error = %self, "request failed");
        }
        let message = match &self {
            // Storage details stay in the log.
            RpcError::Workflow(VerificationError::Store(_)) | RpcError::Server(_) => {
                "internal error".to_string()
            }
            other => other.to_string(),
        };
        let body = ErrorBody {
            error: self.error_code(),
            message,
        };
        (status, Json(body)).into_response()
    }
}
