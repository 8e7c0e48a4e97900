//! Fundamental types for the Reunite ownership-verification workflow.
//!
//! This crate defines the vocabulary shared by every other crate in the
//! workspace: case ids, identities, pet snapshots, evidence payloads, case
//! statuses, timestamps, and the two collaborator traits the workflow is
//! parameterised over ([`Clock`] and [`Notifier`]).

pub mod case;
pub mod error;
pub mod evidence;
pub mod id;
pub mod identity;
pub mod notify;
pub mod pet;
pub mod state;
pub mod time;

pub use case::{Case, ChatMessage, Ruling, SubmittedEvidence, WorkflowProjection};
pub use error::TypeError;
pub use evidence::Evidence;
pub use id::CaseId;
pub use identity::{Caller, Identity};
pub use notify::{Notification, Notifier};
pub use pet::PetSnapshot;
pub use state::{CaseStatus, Outcome, Role, VerificationMethod};
pub use time::{Clock, SystemClock, Timestamp};
