//! Evidence submission: the claimant's proof of ownership.

use reunite_types::{
    Caller, Case, CaseId, Evidence, Notification, SubmittedEvidence, VerificationMethod,
};

use crate::error::VerificationError;
use crate::limits::WorkflowLimits;
use crate::machine::Event;
use crate::workflow::CaseWorkflow;

/// Longest accepted microchip number after normalisation. ISO 11784/11785
/// chips are 15 digits; older encodings are shorter and may contain letters.
pub const MAX_CHIP_LEN: usize = 32;

/// Check `evidence` against the case's method and return it normalised.
pub fn validate_evidence(
    method: VerificationMethod,
    evidence: Evidence,
    limits: &WorkflowLimits,
) -> Result<Evidence, VerificationError> {
    if evidence.method() != method {
        return Err(VerificationError::MalformedEvidence(format!(
            "case expects {method} evidence, got {}",
            evidence.method()
        )));
    }

    let max = limits.max_text_len;
    match evidence {
        Evidence::PhotoMatch { photo_refs, notes } => Ok(Evidence::PhotoMatch {
            photo_refs: references("photo", photo_refs, max)?,
            notes: optional_text("notes", notes, max)?,
        }),
        Evidence::Microchip { chip_number } => Ok(Evidence::Microchip {
            chip_number: normalize_chip(&chip_number)?,
        }),
        Evidence::Documentation {
            document_refs,
            description,
        } => Ok(Evidence::Documentation {
            document_refs: references("document", document_refs, max)?,
            description: optional_text("description", description, max)?,
        }),
        Evidence::PhysicalMeeting { place, proposed_at } => {
            if proposed_at.is_epoch() {
                return Err(VerificationError::MalformedEvidence(
                    "a physical meeting needs a proposed time".into(),
                ));
            }
            Ok(Evidence::PhysicalMeeting {
                place: required_text("meeting place", &place, max)?,
                proposed_at,
            })
        }
        Evidence::Other { description } => Ok(Evidence::Other {
            description: required_text("description", &description, max)?,
        }),
    }
}

/// Strip spaces and dashes, uppercase, and require 1..=32 ASCII alphanumerics.
fn normalize_chip(raw: &str) -> Result<String, VerificationError> {
    let chip: String = raw
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .map(|c| c.to_ascii_uppercase())
        .collect();
    if chip.is_empty() {
        return Err(VerificationError::MalformedEvidence(
            "microchip number is required".into(),
        ));
    }
    if chip.len() > MAX_CHIP_LEN || !chip.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(VerificationError::MalformedEvidence(format!(
            "microchip number must be at most {MAX_CHIP_LEN} letters or digits"
        )));
    }
    Ok(chip)
}

fn references(
    kind: &str,
    refs: Vec<String>,
    max: usize,
) -> Result<Vec<String>, VerificationError> {
    let refs: Vec<String> = refs
        .into_iter()
        .map(|r| r.trim().to_string())
        .filter(|r| !r.is_empty())
        .collect();
    if refs.is_empty() {
        return Err(VerificationError::MalformedEvidence(format!(
            "at least one {kind} reference is required"
        )));
    }
    if refs.iter().any(|r| r.chars().count() > max) {
        return Err(VerificationError::MalformedEvidence(format!(
            "{kind} reference is longer than {max} characters"
        )));
    }
    Ok(refs)
}

fn required_text(field: &str, value: &str, max: usize) -> Result<String, VerificationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(VerificationError::MalformedEvidence(format!("{field} is required")));
    }
    optional_text(field, trimmed.to_string(), max)
}

fn optional_text(field: &str, value: String, max: usize) -> Result<String, VerificationError> {
    let trimmed = value.trim();
    if trimmed.chars().count() > max {
        return Err(VerificationError::MalformedEvidence(format!(
            "{field} is longer than {max} characters"
        )));
    }
    Ok(trimmed.to_string())
}

impl CaseWorkflow {
    /// Claimant submits proof. Allowed once, while the case is pending.
    /// The finder is notified.
    pub fn submit_evidence(
        &self,
        caller: &Caller,
        id: &CaseId,
        evidence: Evidence,
    ) -> Result<Case, VerificationError> {
        let transition = self.authorize_transition(caller, id, Event::SubmitEvidence)?;
        let payload = validate_evidence(
            transition.case.verification_method,
            evidence,
            self.limits(),
        )?;

        let updated = self.commit_transition(transition, &|case, now| {
            case.evidence = Some(SubmittedEvidence {
                payload: payload.clone(),
                submitted_at: now,
            });
        })?;

        self.notify(Notification::EvidenceSubmitted {
            case_id: updated.id,
            recipient: updated.finder.email.clone(),
        });
        Ok(updated)
    }
}
