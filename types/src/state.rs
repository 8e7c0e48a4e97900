//! State enums for cases, outcomes, roles and verification methods.

use serde::{Deserialize, Serialize};
use std::fmt;

/// How the claimant is expected to prove ownership. Fixed at case creation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VerificationMethod {
    PhotoMatch,
    Microchip,
    Documentation,
    PhysicalMeeting,
    Other,
}

impl VerificationMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PhotoMatch => "PHOTO_MATCH",
            Self::Microchip => "MICROCHIP",
            Self::Documentation => "DOCUMENTATION",
            Self::PhysicalMeeting => "PHYSICAL_MEETING",
            Self::Other => "OTHER",
        }
    }
}

impl fmt::Display for VerificationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of a finder decision or an admin ruling.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Outcome {
    Verified,
    Rejected,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Verified => f.write_str("VERIFIED"),
            Self::Rejected => f.write_str("REJECTED"),
        }
    }
}

/// Lifecycle status of a case.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CaseStatus {
    /// Waiting for evidence and then for the finder's decision.
    Pending,
    /// Finder accepted the evidence. Terminal.
    Verified,
    /// Finder rejected the evidence. Terminal unless the claimant disputes.
    Rejected,
    /// Claimant escalated the rejection to an admin.
    Disputed,
    /// Admin ruled on the dispute. Terminal.
    Resolved { outcome: Outcome },
}

impl CaseStatus {
    /// Whether no further state-machine transition can leave this status.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Verified | Self::Resolved { .. })
    }

    /// Whether the case's chat channel still accepts new messages.
    ///
    /// A rejected case may still be disputed, so its channel stays open.
    pub fn accepts_messages(&self) -> bool {
        !self.is_terminal()
    }

    /// The final outcome, if the case has reached one.
    pub fn final_outcome(&self) -> Option<Outcome> {
        match self {
            Self::Verified => Some(Outcome::Verified),
            Self::Resolved { outcome } => Some(*outcome),
            _ => None,
        }
    }
}

impl fmt::Display for CaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => f.write_str("PENDING"),
            Self::Verified => f.write_str("VERIFIED"),
            Self::Rejected => f.write_str("REJECTED"),
            Self::Disputed => f.write_str("DISPUTED"),
            Self::Resolved { outcome } => write!(f, "RESOLVED({outcome})"),
        }
    }
}

/// What a caller is with respect to one case.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Finder,
    Claimant,
    Admin,
    Unauthorized,
}

impl Role {
    /// Whether this role is one of the two case parties.
    pub fn is_party(&self) -> bool {
        matches!(self, Self::Finder | Self::Claimant)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Finder => "finder",
            Self::Claimant => "claimant",
            Self::Admin => "admin",
            Self::Unauthorized => "unauthorized",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
