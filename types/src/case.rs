//! The verification case record.

use serde::{Deserialize, Serialize};

use crate::{
    CaseId, CaseStatus, Evidence, Identity, Outcome, PetSnapshot, Role, Timestamp,
    VerificationMethod,
};

/// A single verification/dispute record tying one finder and one claimant to
/// one pet snapshot.
///
/// Cases are never deleted. All mutation goes through the store's
/// compare-and-swap; `version` and `workflow_revision` are maintained by the
/// store, never by callers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Case {
    pub id: CaseId,
    pub pet: PetSnapshot,
    pub finder: Identity,
    pub claimant: Identity,
    pub verification_method: VerificationMethod,
    pub status: CaseStatus,
    pub evidence: Option<SubmittedEvidence>,
    pub decision: Option<Ruling>,
    pub dispute_reason: Option<String>,
    pub disputed_at: Option<Timestamp>,
    pub dispute_ruling: Option<Ruling>,
    pub chat_history: Vec<ChatMessage>,
    /// Starts at 1, +1 on every successful mutation.
    pub version: u64,
    /// +1 whenever the workflow projection changes.
    pub workflow_revision: u64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Evidence as recorded on the case.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmittedEvidence {
    pub payload: Evidence,
    pub submitted_at: Timestamp,
}

/// A finder decision or an admin dispute ruling.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ruling {
    pub outcome: Outcome,
    pub reason: String,
    /// Email of whoever made the call.
    pub decided_by: String,
    pub decided_at: Timestamp,
}

/// One entry of a case's chat channel.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub sender_role: Role,
    pub sender: Identity,
    pub body: String,
    pub sent_at: Timestamp,
}

/// The status-bearing fields of a case, everything except the chat list and
/// the bookkeeping counters.
///
/// Status transitions and chat appends touch disjoint projections of the same
/// record; the store compares projections to verify a mutation only touched
/// what it declared.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WorkflowProjection {
    pub status: CaseStatus,
    pub evidence: Option<SubmittedEvidence>,
    pub decision: Option<Ruling>,
    pub dispute_reason: Option<String>,
    pub disputed_at: Option<Timestamp>,
    pub dispute_ruling: Option<Ruling>,
}

impl Case {
    /// A fresh `PENDING` case at version 1.
    pub fn open(
        id: CaseId,
        pet: PetSnapshot,
        finder: Identity,
        claimant: Identity,
        verification_method: VerificationMethod,
        now: Timestamp,
    ) -> Self {
        Self {
            id,
            pet,
            finder,
            claimant,
            verification_method,
            status: CaseStatus::Pending,
            evidence: None,
            decision: None,
            dispute_reason: None,
            disputed_at: None,
            dispute_ruling: None,
            chat_history: Vec::new(),
            version: 1,
            workflow_revision: 1,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn workflow_projection(&self) -> WorkflowProjection {
        WorkflowProjection {
            status: self.status,
            evidence: self.evidence.clone(),
            decision: self.decision.clone(),
            dispute_reason: self.dispute_reason.clone(),
            disputed_at: self.disputed_at,
            dispute_ruling: self.dispute_ruling.clone(),
        }
    }

    /// Whether `email` belongs to the finder or the claimant.
    pub fn involves(&self, email: &str) -> bool {
        let email = crate::identity::normalize_email(email);
        self.finder.normalized_email() == email || self.claimant.normalized_email() == email
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Case {
        Case::open(
            CaseId::new([1; 16]),
            PetSnapshot {
                name: "Biscuit".into(),
                species: "dog".into(),
                image: None,
                description: String::new(),
                last_known_location: Some("Elm Park".into()),
            },
            Identity::new("Fay", "fay@example.org"),
            Identity::new("Cal", "cal@example.org"),
            VerificationMethod::Microchip,
            Timestamp::new(100),
        )
    }

    #[test]
    fn open_case_starts_pending_at_version_one() {
        let case = sample();
        assert_eq!(case.status, CaseStatus::Pending);
        assert_eq!(case.version, 1);
        assert!(case.chat_history.is_empty());
        assert_eq!(case.created_at, case.updated_at);
    }

    #[test]
    fn chat_does_not_change_workflow_projection() {
        let mut case = sample();
        let before = case.workflow_projection();
        case.chat_history.push(ChatMessage {
            sender_role: Role::Finder,
            sender: case.finder.clone(),
            body: "hello".into(),
            sent_at: Timestamp::new(101),
        });
        assert_eq!(before, case.workflow_projection());
    }

    #[test]
    fn involves_matches_either_party() {
        let case = sample();
        assert!(case.involves("FAY@example.org"));
        assert!(case.involves("cal@example.org"));
        assert!(!case.involves("admin@example.org"));
    }
}
