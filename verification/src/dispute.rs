//! Dispute escalation and admin rulings.

use reunite_types::{Caller, Case, CaseId, CaseStatus, Notification, Outcome, Role, Ruling};
use tracing::{debug, warn};

use crate::error::VerificationError;
use crate::machine::Event;
use crate::workflow::CaseWorkflow;

impl CaseWorkflow {
    /// Claimant contests a rejection. Only one dispute per case.
    pub fn open_dispute(
        &self,
        caller: &Caller,
        id: &CaseId,
        reason: &str,
    ) -> Result<Case, VerificationError> {
        let transition = self.authorize_transition(caller, id, Event::OpenDispute)?;
        let reason = self.limits().require_reason(reason)?;

        self.commit_transition(transition, &|case, now| {
            case.dispute_reason = Some(reason.clone());
            case.disputed_at = Some(now);
        })
    }

    /// Admin settles a dispute for good. Both parties are notified.
    pub fn rule_dispute(
        &self,
        caller: &Caller,
        id: &CaseId,
        outcome: Outcome,
        reason: &str,
    ) -> Result<Case, VerificationError> {
        let transition = self.authorize_transition(caller, id, Event::RuleDispute(outcome))?;
        let reason = self.limits().require_reason(reason)?;
        let decided_by = caller.identity.normalized_email();

        let updated = self.commit_transition(transition, &|case, now| {
            case.dispute_ruling = Some(Ruling {
                outcome,
                reason: reason.clone(),
                decided_by: decided_by.clone(),
                decided_at: now,
            });
        })?;

        for party in [&updated.finder, &updated.claimant] {
            self.notify(Notification::DisputeRuled {
                case_id: updated.id,
                recipient: party.email.clone(),
                outcome,
            });
        }
        Ok(updated)
    }

    /// Open disputes awaiting a ruling, longest-waiting first. Admins only.
    pub fn dispute_queue(&self, caller: &Caller) -> Result<Vec<Case>, VerificationError> {
        if !caller.is_admin {
            warn!(caller = %caller.email(), "dispute queue refused to non-admin");
            return Err(VerificationError::Unauthorized {
                role: Role::Unauthorized,
                action: "view the dispute queue",
            });
        }

        let mut queue: Vec<Case> = self
            .store()
            .iter_cases()?
            .into_iter()
            .filter(|c| c.status == CaseStatus::Disputed)
            .collect();
        queue.sort_by_key(|c| (c.disputed_at, c.created_at));

        debug!(open = queue.len(), "dispute queue read");
        Ok(queue)
    }
}
