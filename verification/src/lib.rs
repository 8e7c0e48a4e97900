//! Pet ownership verification and dispute resolution.
//!
//! A finder (who has the animal) and a claimant (who says they own it) work
//! through a case:
//! 1. **Evidence**: the claimant submits proof matching the case's method.
//! 2. **Review**: the finder approves (terminal) or rejects the claim.
//! 3. **Dispute**: after a rejection the claimant may escalate; an admin rules
//!    and the case is resolved for good.
//!
//! A per-case chat channel runs alongside until the case is settled.
//!
//! Every operation resolves the caller's role first and fails closed, then
//! validates against the transition table, then commits through the store's
//! compare-and-swap. Nothing in here retries a state transition on conflict;
//! only chat appends are retried.

pub mod dispute;
pub mod error;
pub mod evidence;
pub mod identity;
pub mod limits;
pub mod machine;
pub mod messaging;
pub mod notify;
pub mod review;
pub mod workflow;

pub use error::VerificationError;
pub use identity::IdentityResolver;
pub use limits::WorkflowLimits;
pub use machine::{Event, StateMachine, Transition, TRANSITIONS};
pub use messaging::MessagePage;
pub use notify::TracingNotifier;
pub use workflow::{CaseWorkflow, NewCase};
