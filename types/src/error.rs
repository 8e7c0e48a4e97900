//! Errors raised while parsing or constructing shared types.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid case id: {0}")]
    InvalidCaseId(String),

    #[error("could not gather randomness for a case id: {0}")]
    Randomness(String),
}
