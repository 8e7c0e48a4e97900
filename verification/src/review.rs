//! Finder review of submitted evidence.

use reunite_types::{Caller, Case, CaseId, Notification, Outcome, Ruling};

use crate::error::VerificationError;
use crate::machine::Event;
use crate::workflow::CaseWorkflow;

impl CaseWorkflow {
    /// Finder approves or rejects the claim once evidence is in.
    ///
    /// `Verified` is terminal. `Rejected` leaves the claimant the option to
    /// open a dispute. The claimant is notified either way.
    pub fn decide(
        &self,
        caller: &Caller,
        id: &CaseId,
        outcome: Outcome,
        reason: &str,
    ) -> Result<Case, VerificationError> {
        let transition = self.authorize_transition(caller, id, Event::Decide(outcome))?;
        let reason = self.limits().require_reason(reason)?;
        let decided_by = caller.identity.normalized_email();

        let updated = self.commit_transition(transition, &|case, now| {
            case.decision = Some(Ruling {
                outcome,
                reason: reason.clone(),
                decided_by: decided_by.clone(),
                decided_at: now,
            });
        })?;

        self.notify(Notification::DecisionMade {
            case_id: updated.id,
            recipient: updated.claimant.email.clone(),
            outcome,
        });
        Ok(updated)
    }

    pub fn approve(
        &self,
        caller: &Caller,
        id: &CaseId,
        reason: &str,
    ) -> Result<Case, VerificationError> {
        self.decide(caller, id, Outcome::Verified, reason)
    }

    pub fn reject(
        &self,
        caller: &Caller,
        id: &CaseId,
        reason: &str,
    ) -> Result<Case, VerificationError> {
        self.decide(caller, id, Outcome::Rejected, reason)
    }
}
