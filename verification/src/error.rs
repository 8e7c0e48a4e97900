use reunite_store::StoreError;
use reunite_types::{CaseStatus, Role, TypeError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum VerificationError {
    #[error("{role} may not {action}")]
    Unauthorized { role: Role, action: &'static str },

    #[error("cannot {action} while the case is {status}: {reason}")]
    InvalidTransition {
        status: CaseStatus,
        action: &'static str,
        reason: &'static str,
    },

    #[error("someone already acted on this case (expected revision {expected}, found {actual}); reload it")]
    VersionConflict { expected: u64, actual: u64 },

    #[error("malformed evidence: {0}")]
    MalformedEvidence(String),

    #[error("case {0} not found")]
    NotFound(String),

    #[error("chat of case {0} is closed for good")]
    ChannelFrozen(String),

    #[error("invalid case: {0}")]
    InvalidCase(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("case id error: {0}")]
    CaseId(#[from] TypeError),

    #[error("store error: {0}")]
    Store(StoreError),
}

impl From<StoreError> for VerificationError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(key) => VerificationError::NotFound(key),
            StoreError::VersionConflict { expected, actual } => {
                VerificationError::VersionConflict { expected, actual }
            }
            StoreError::ChannelFrozen(key) => VerificationError::ChannelFrozen(key),
            other => VerificationError::Store(other),
        }
    }
}
