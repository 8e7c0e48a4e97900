//! State machine engine: the authoritative transition table.
//!
//! ```text
//! PENDING --evidence--> PENDING --approve--> VERIFIED
//!                               --reject---> REJECTED --dispute--> DISPUTED
//!                                                        --rule---> RESOLVED(outcome)
//! ```
//!
//! Each step needs an explicit actor action; nothing here chains two
//! transitions together.

use crate::error::VerificationError;
use reunite_types::{Case, CaseStatus, Outcome, Role};

/// An actor action against the state machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Event {
    SubmitEvidence,
    Decide(Outcome),
    OpenDispute,
    RuleDispute(Outcome),
}

impl Event {
    /// The only role allowed to raise this event.
    pub fn required_role(&self) -> Role {
        match self {
            Self::SubmitEvidence | Self::OpenDispute => Role::Claimant,
            Self::Decide(_) => Role::Finder,
            Self::RuleDispute(_) => Role::Admin,
        }
    }

    /// Human phrase used in errors and logs.
    pub fn action(&self) -> &'static str {
        match self {
            Self::SubmitEvidence => "submit evidence",
            Self::Decide(_) => "decide",
            Self::OpenDispute => "open a dispute",
            Self::RuleDispute(_) => "rule on a dispute",
        }
    }
}

/// One row of the transition table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Transition {
    pub from: CaseStatus,
    pub event: Event,
    pub to: CaseStatus,
}

/// Every legal transition. Anything not listed is rejected.
pub const TRANSITIONS: [Transition; 6] = [
    Transition {
        from: CaseStatus::Pending,
        event: Event::SubmitEvidence,
        to: CaseStatus::Pending,
    },
    Transition {
        from: CaseStatus::Pending,
        event: Event::Decide(Outcome::Verified),
        to: CaseStatus::Verified,
    },
    Transition {
        from: CaseStatus::Pending,
        event: Event::Decide(Outcome::Rejected),
        to: CaseStatus::Rejected,
    },
    Transition {
        from: CaseStatus::Rejected,
        event: Event::OpenDispute,
        to: CaseStatus::Disputed,
    },
    Transition {
        from: CaseStatus::Disputed,
        event: Event::RuleDispute(Outcome::Verified),
        to: CaseStatus::Resolved {
            outcome: Outcome::Verified,
        },
    },
    Transition {
        from: CaseStatus::Disputed,
        event: Event::RuleDispute(Outcome::Rejected),
        to: CaseStatus::Resolved {
            outcome: Outcome::Rejected,
        },
    },
];

pub struct StateMachine;

impl StateMachine {
    /// Validate `event` raised by `role` against `case` and return the status
    /// the case moves to. Never mutates.
    ///
    /// The role guard is checked before the state guard, so a caller never
    /// learns about the state of an action they could not take anyway.
    pub fn check(
        &self,
        case: &Case,
        role: Role,
        event: Event,
    ) -> Result<CaseStatus, VerificationError> {
        if role != event.required_role() {
            return Err(VerificationError::Unauthorized {
                role,
                action: event.action(),
            });
        }

        let row = TRANSITIONS
            .iter()
            .find(|t| t.from == case.status && t.event == event)
            .ok_or_else(|| invalid(case.status, event, wrong_state_reason(case.status, event)))?;

        let field_guard = match event {
            Event::SubmitEvidence if case.evidence.is_some() => {
                Some("evidence has already been submitted")
            }
            Event::Decide(_) if case.evidence.is_none() => {
                Some("the claimant has not submitted evidence yet")
            }
            Event::Decide(_) if case.decision.is_some() => {
                Some("the case has already been decided")
            }
            Event::OpenDispute if case.dispute_reason.is_some() => {
                Some("a dispute has already been opened")
            }
            Event::RuleDispute(_) if case.dispute_ruling.is_some() => {
                Some("the dispute has already been ruled on")
            }
            _ => None,
        };
        if let Some(reason) = field_guard {
            return Err(invalid(case.status, event, reason));
        }

        Ok(row.to)
    }

    /// Whether some table row moves `from` to `to`.
    pub fn is_legal(&self, from: CaseStatus, to: CaseStatus) -> bool {
        TRANSITIONS.iter().any(|t| t.from == from && t.to == to)
    }
}

fn invalid(status: CaseStatus, event: Event, reason: &'static str) -> VerificationError {
    VerificationError::InvalidTransition {
        status,
        action: event.action(),
        reason,
    }
}

fn wrong_state_reason(status: CaseStatus, event: Event) -> &'static str {
    match (event, status) {
        (Event::SubmitEvidence, _) => "evidence can only be submitted while the case is pending",
        (Event::Decide(_), CaseStatus::Pending) => "this decision is not allowed",
        (Event::Decide(_), _) => "the case has already been decided",
        (Event::OpenDispute, CaseStatus::Disputed) => "a dispute is already open",
        (Event::OpenDispute, CaseStatus::Resolved { .. }) => {
            "the dispute has already been ruled on"
        }
        (Event::OpenDispute, _) => "only a rejected case can be disputed",
        (Event::RuleDispute(_), CaseStatus::Resolved { .. }) => {
            "the dispute has already been ruled on"
        }
        (Event::RuleDispute(_), _) => "there is no open dispute to rule on",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reunite_types::{
        CaseId, Evidence, Identity, PetSnapshot, Ruling, SubmittedEvidence, Timestamp,
        VerificationMethod,
    };

    fn case(status: CaseStatus) -> Case {
        let mut case = Case::open(
            CaseId::new([2; 16]),
            PetSnapshot {
                name: "Rex".into(),
                species: "dog".into(),
                image: None,
                description: String::new(),
                last_known_location: None,
            },
            Identity::new("Fay", "fay@example.org"),
            Identity::new("Cal", "cal@example.org"),
            VerificationMethod::Microchip,
            Timestamp::new(1),
        );
        case.status = status;
        case
    }

    fn with_evidence(mut case: Case) -> Case {
        case.evidence = Some(SubmittedEvidence {
            payload: Evidence::Microchip {
                chip_number: "985121000000001".into(),
            },
            submitted_at: Timestamp::new(2),
        });
        case
    }

    #[test]
    fn evidence_keeps_case_pending() {
        let to = StateMachine
            .check(&case(CaseStatus::Pending), Role::Claimant, Event::SubmitEvidence)
            .unwrap();
        assert_eq!(to, CaseStatus::Pending);
    }

    #[test]
    fn decision_needs_evidence() {
        let err = StateMachine
            .check(
                &case(CaseStatus::Pending),
                Role::Finder,
                Event::Decide(Outcome::Verified),
            )
            .unwrap_err();
        assert!(matches!(err, VerificationError::InvalidTransition { .. }));

        let to = StateMachine
            .check(
                &with_evidence(case(CaseStatus::Pending)),
                Role::Finder,
                Event::Decide(Outcome::Rejected),
            )
            .unwrap();
        assert_eq!(to, CaseStatus::Rejected);
    }

    #[test]
    fn wrong_role_is_unauthorized_even_in_wrong_state() {
        let err = StateMachine
            .check(
                &case(CaseStatus::Verified),
                Role::Claimant,
                Event::Decide(Outcome::Verified),
            )
            .unwrap_err();
        assert!(matches!(
            err,
            VerificationError::Unauthorized {
                role: Role::Claimant,
                ..
            }
        ));
    }

    #[test]
    fn admin_cannot_decide_or_submit() {
        let pending = with_evidence(case(CaseStatus::Pending));
        for event in [Event::SubmitEvidence, Event::Decide(Outcome::Verified), Event::OpenDispute] {
            let err = StateMachine.check(&pending, Role::Admin, event).unwrap_err();
            assert!(matches!(err, VerificationError::Unauthorized { .. }));
        }
    }

    #[test]
    fn dispute_only_from_rejected() {
        for status in [
            CaseStatus::Pending,
            CaseStatus::Verified,
            CaseStatus::Disputed,
            CaseStatus::Resolved {
                outcome: Outcome::Rejected,
            },
        ] {
            let err = StateMachine
                .check(&case(status), Role::Claimant, Event::OpenDispute)
                .unwrap_err();
            assert!(matches!(err, VerificationError::InvalidTransition { .. }));
        }
        assert_eq!(
            StateMachine
                .check(&case(CaseStatus::Rejected), Role::Claimant, Event::OpenDispute)
                .unwrap(),
            CaseStatus::Disputed
        );
    }

    #[test]
    fn ruling_carries_outcome() {
        let to = StateMachine
            .check(
                &case(CaseStatus::Disputed),
                Role::Admin,
                Event::RuleDispute(Outcome::Verified),
            )
            .unwrap();
        assert_eq!(
            to,
            CaseStatus::Resolved {
                outcome: Outcome::Verified
            }
        );
    }

    #[test]
    fn second_decision_reports_already_decided() {
        let mut decided = with_evidence(case(CaseStatus::Rejected));
        decided.decision = Some(Ruling {
            outcome: Outcome::Rejected,
            reason: "chip mismatch".into(),
            decided_by: "fay@example.org".into(),
            decided_at: Timestamp::new(3),
        });
        let err = StateMachine
            .check(&decided, Role::Finder, Event::Decide(Outcome::Verified))
            .unwrap_err();
        assert!(err.to_string().contains("already been decided"));
    }

    #[test]
    fn terminal_states_have_no_outgoing_rows() {
        for t in TRANSITIONS {
            assert!(!t.from.is_terminal());
        }
        assert!(!StateMachine.is_legal(CaseStatus::Verified, CaseStatus::Rejected));
        assert!(StateMachine.is_legal(CaseStatus::Rejected, CaseStatus::Disputed));
    }
}
