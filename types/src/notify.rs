//! Notification side effects handed to an external dispatcher.

use serde::{Deserialize, Serialize};

use crate::{CaseId, Outcome};

/// Something a party should be told about. Delivery (email, push) is the
/// dispatcher's business.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Notification {
    /// Sent to the finder once the claimant has submitted evidence.
    EvidenceSubmitted { case_id: CaseId, recipient: String },
    /// Sent to the claimant once the finder has decided.
    DecisionMade {
        case_id: CaseId,
        recipient: String,
        outcome: Outcome,
    },
    /// Sent to each party once an admin has ruled on the dispute.
    DisputeRuled {
        case_id: CaseId,
        recipient: String,
        outcome: Outcome,
    },
}

impl Notification {
    pub fn recipient(&self) -> &str {
        match self {
            Self::EvidenceSubmitted { recipient, .. }
            | Self::DecisionMade { recipient, .. }
            | Self::DisputeRuled { recipient, .. } => recipient,
        }
    }

    pub fn case_id(&self) -> CaseId {
        match self {
            Self::EvidenceSubmitted { case_id, .. }
            | Self::DecisionMade { case_id, .. }
            | Self::DisputeRuled { case_id, .. } => *case_id,
        }
    }
}

/// Fire-and-forget notification dispatcher.
///
/// Implementations must not block the caller and must swallow their own
/// delivery failures; the workflow has already committed by the time
/// `notify` runs.
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}
