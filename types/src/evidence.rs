//! Claimant-supplied proof of ownership, one variant per verification method.

use serde::{Deserialize, Serialize};

use crate::{Timestamp, VerificationMethod};

/// Evidence payload. The variant must match the case's [`VerificationMethod`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Evidence {
    /// Photos of the claimant with the pet, to be compared by the finder.
    PhotoMatch {
        photo_refs: Vec<String>,
        #[serde(default)]
        notes: String,
    },
    /// Registered microchip number.
    Microchip {
        #[serde(alias = "chip")]
        chip_number: String,
    },
    /// Adoption papers, vet records, registration certificates.
    Documentation {
        document_refs: Vec<String>,
        #[serde(default)]
        description: String,
    },
    /// A proposed in-person meeting where the finder can check the pet reacts.
    PhysicalMeeting {
        place: String,
        proposed_at: Timestamp,
    },
    Other { description: String },
}

impl Evidence {
    /// The verification method this payload belongs to.
    pub fn method(&self) -> VerificationMethod {
        match self {
            Self::PhotoMatch { .. } => VerificationMethod::PhotoMatch,
            Self::Microchip { .. } => VerificationMethod::Microchip,
            Self::Documentation { .. } => VerificationMethod::Documentation,
            Self::PhysicalMeeting { .. } => VerificationMethod::PhysicalMeeting,
            Self::Other { .. } => VerificationMethod::Other,
        }
    }
}
