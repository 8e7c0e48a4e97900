//! Case workflow. Connects identity resolution, the state machine, the case
//! store, the clock and the notifier into the operations callers use.
//!
//! The per-step handlers live in their own modules (`evidence`, `review`,
//! `dispute`, `messaging`) as further `impl CaseWorkflow` blocks; this module
//! holds case creation, the queries, and the shared read/authorize/commit
//! path every transition goes through.

use std::sync::Arc;

use reunite_store::{CaseStore, Precondition, StoreError};
use reunite_types::{
    Caller, Case, CaseId, CaseStatus, Clock, Identity, Notification, Notifier, PetSnapshot, Role,
    Timestamp, VerificationMethod,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::VerificationError;
use crate::identity::IdentityResolver;
use crate::limits::WorkflowLimits;
use crate::machine::{Event, StateMachine};

/// Longest accepted party email, in bytes after normalisation (RFC 5321 path limit).
pub const MAX_EMAIL_LEN: usize = 254;

/// Input to [`CaseWorkflow::create_case`], supplied by the matching feature.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NewCase {
    pub pet: PetSnapshot,
    pub finder: Identity,
    pub claimant: Identity,
    pub verification_method: VerificationMethod,
}

/// A transition that passed every guard against the case as read.
pub(crate) struct AuthorizedTransition {
    pub case: Case,
    pub role: Role,
    pub event: Event,
    pub to: CaseStatus,
}

/// The verification workflow service.
///
/// Synchronous and shareable across threads; all coordination between
/// concurrent callers happens in the store.
pub struct CaseWorkflow {
    store: Arc<dyn CaseStore>,
    clock: Arc<dyn Clock>,
    notifier: Arc<dyn Notifier>,
    limits: WorkflowLimits,
    resolver: IdentityResolver,
    machine: StateMachine,
}

impl CaseWorkflow {
    pub fn new(
        store: Arc<dyn CaseStore>,
        clock: Arc<dyn Clock>,
        notifier: Arc<dyn Notifier>,
        limits: WorkflowLimits,
    ) -> Self {
        Self {
            store,
            clock,
            notifier,
            limits,
            resolver: IdentityResolver,
            machine: StateMachine,
        }
    }

    pub fn limits(&self) -> &WorkflowLimits {
        &self.limits
    }

    /// Open a new `PENDING` case.
    ///
    /// The caller must be one of the two parties named: the matching feature
    /// acts on behalf of whoever triggered the match. A caller carrying the
    /// admin claim always resolves to `Admin`, so it could never act as a
    /// party and is refused.
    pub fn create_case(
        &self,
        caller: &Caller,
        new_case: NewCase,
    ) -> Result<CaseId, VerificationError> {
        let NewCase {
            pet,
            finder,
            claimant,
            verification_method,
        } = new_case;

        let finder = self.validate_party("finder", finder)?;
        let claimant = self.validate_party("claimant", claimant)?;
        if finder.same_person(&claimant) {
            return Err(VerificationError::InvalidCase(
                "finder and claimant must be different people".into(),
            ));
        }

        if caller.is_admin {
            warn!(caller = %caller.email(), "case creation with the admin claim refused");
            return Err(VerificationError::Unauthorized {
                role: Role::Admin,
                action: "open a case",
            });
        }

        let caller_email = caller.identity.normalized_email();
        if caller_email.is_empty()
            || (caller_email != finder.normalized_email()
                && caller_email != claimant.normalized_email())
        {
            warn!(caller = %caller.email(), "case creation by a non-party refused");
            return Err(VerificationError::Unauthorized {
                role: Role::Unauthorized,
                action: "open a case",
            });
        }

        let pet = self.validate_pet(pet)?;
        let case = Case::open(
            CaseId::generate()?,
            pet,
            finder,
            claimant,
            verification_method,
            self.clock.now(),
        );
        let id = self.store.create(&case)?;

        info!(case = %id, method = %verification_method, "case opened");
        Ok(id)
    }

    /// Read a case. Any role other than `unauthorized` may read.
    pub fn get_case(&self, caller: &Caller, id: &CaseId) -> Result<Case, VerificationError> {
        let (case, _role) = self.load(caller, id, "view this case")?;
        Ok(case)
    }

    /// Cases where the caller is the finder or the claimant, oldest first.
    pub fn list_cases_for_user(&self, caller: &Caller) -> Result<Vec<Case>, VerificationError> {
        let email = caller.identity.normalized_email();
        if email.is_empty() {
            return Ok(Vec::new());
        }
        Ok(self.store.list_for_party(&email)?)
    }

    // ── Shared plumbing for the handler modules ────────────────────────────

    pub(crate) fn now(&self) -> Timestamp {
        self.clock.now()
    }

    pub(crate) fn store(&self) -> &dyn CaseStore {
        self.store.as_ref()
    }

    pub(crate) fn notify(&self, notification: Notification) {
        debug!(case = %notification.case_id(), recipient = notification.recipient(), "dispatching notification");
        self.notifier.notify(notification);
    }

    /// Fetch the case and resolve the caller's role, failing closed.
    pub(crate) fn load(
        &self,
        caller: &Caller,
        id: &CaseId,
        action: &'static str,
    ) -> Result<(Case, Role), VerificationError> {
        let case = self.store.get(id)?;
        let role = self.resolver.resolve(caller, &case);
        if role == Role::Unauthorized {
            warn!(case = %id, caller = %caller.email(), action, "unauthorized access refused");
            return Err(VerificationError::Unauthorized { role, action });
        }
        Ok((case, role))
    }

    /// Read the case, resolve the role and run the state machine guards.
    pub(crate) fn authorize_transition(
        &self,
        caller: &Caller,
        id: &CaseId,
        event: Event,
    ) -> Result<AuthorizedTransition, VerificationError> {
        let (case, role) = self.load(caller, id, event.action())?;
        let to = self.machine.check(&case, role, event).inspect_err(|e| {
            debug!(case = %id, %role, action = event.action(), error = %e, "transition refused");
        })?;
        Ok(AuthorizedTransition {
            case,
            role,
            event,
            to,
        })
    }

    /// Commit an authorized transition against the workflow projection the
    /// guards were checked on. A concurrent transition makes this fail with
    /// `VersionConflict`; it is never retried here.
    pub(crate) fn commit_transition(
        &self,
        transition: AuthorizedTransition,
        apply: &dyn Fn(&mut Case, Timestamp),
    ) -> Result<Case, VerificationError> {
        let AuthorizedTransition {
            case,
            role,
            event,
            to,
        } = transition;
        let now = self.clock.now();

        let result = self.store.compare_and_swap(
            &case.id,
            Precondition::Workflow {
                revision: case.workflow_revision,
            },
            &|c| {
                apply(c, now);
                c.status = to;
                c.updated_at = now;
            },
        );

        match result {
            Ok(updated) => {
                info!(
                    case = %case.id,
                    %role,
                    action = event.action(),
                    from = %case.status,
                    to = %updated.status,
                    version = updated.version,
                    "case transition"
                );
                Ok(updated)
            }
            Err(e @ StoreError::VersionConflict { .. }) => {
                info!(case = %case.id, %role, action = event.action(), "lost race to a concurrent transition");
                Err(e.into())
            }
            Err(e) => Err(e.into()),
        }
    }

    fn validate_party(
        &self,
        label: &str,
        mut party: Identity,
    ) -> Result<Identity, VerificationError> {
        let max = self.limits.max_text_len;
        party.email = party.email.trim().to_string();
        party.display_name = party.display_name.trim().to_string();
        if party.email.is_empty() {
            return Err(VerificationError::InvalidCase(format!("{label} email is required")));
        }
        if party.normalized_email().len() > MAX_EMAIL_LEN {
            return Err(VerificationError::InvalidCase(format!(
                "{label} email is longer than {MAX_EMAIL_LEN} bytes"
            )));
        }
        if party.email.chars().any(|c| c.is_control() || c.is_whitespace()) {
            return Err(VerificationError::InvalidCase(format!(
                "{label} email contains whitespace or control characters"
            )));
        }
        if party.display_name.is_empty() {
            return Err(VerificationError::InvalidCase(format!("{label} name is required")));
        }
        if party.display_name.chars().any(char::is_control) {
            return Err(VerificationError::InvalidCase(format!(
                "{label} name contains control characters"
            )));
        }
        check_len(&format!("{label} name"), &party.display_name, max)?;
        if let Some(avatar) = &party.avatar {
            check_len(&format!("{label} avatar"), avatar, max)?;
        }
        Ok(party)
    }

    fn validate_pet(&self, mut pet: PetSnapshot) -> Result<PetSnapshot, VerificationError> {
        let max = self.limits.max_text_len;
        pet.name = self
            .limits
            .require_text("pet name", &pet.name, max)
            .map_err(|e| VerificationError::InvalidCase(e.to_string()))?;
        pet.species = self
            .limits
            .require_text("pet species", &pet.species, max)
            .map_err(|e| VerificationError::InvalidCase(e.to_string()))?;
        check_len("pet description", &pet.description, max)?;
        if let Some(image) = &pet.image {
            check_len("pet image", image, max)?;
        }
        if let Some(location) = &pet.last_known_location {
            check_len("pet last known location", location, max)?;
        }
        Ok(pet)
    }
}

fn check_len(field: &str, value: &str, max: usize) -> Result<(), VerificationError> {
    if value.chars().count() > max {
        return Err(VerificationError::InvalidCase(format!(
            "{field} is longer than {max} characters"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use reunite_nullables::{NullCaseStore, NullClock, NullNotifier};

    fn workflow() -> CaseWorkflow {
        CaseWorkflow::new(
            Arc::new(NullCaseStore::new()),
            Arc::new(NullClock::new(1_000)),
            Arc::new(NullNotifier::new()),
            WorkflowLimits::default(),
        )
    }

    fn new_case() -> NewCase {
        NewCase {
            pet: PetSnapshot {
                name: "Biscuit".into(),
                species: "dog".into(),
                image: Some("img/biscuit.jpg".into()),
                description: "brown terrier, red collar".into(),
                last_known_location: Some("Elm Park".into()),
            },
            finder: Identity::new("Fay", "fay@example.org"),
            claimant: Identity::new("Cal", "cal@example.org"),
            verification_method: VerificationMethod::Microchip,
        }
    }

    fn claimant() -> Caller {
        Caller::user(Identity::new("Cal", "cal@example.org"))
    }

    #[test]
    fn create_case_opens_pending_version_one() {
        let wf = workflow();
        let id = wf.create_case(&claimant(), new_case()).unwrap();
        let case = wf.get_case(&claimant(), &id).unwrap();
        assert_eq!(case.status, CaseStatus::Pending);
        assert_eq!(case.version, 1);
        assert_eq!(case.created_at, Timestamp::new(1_000));
        assert_eq!(case.pet.name, "Biscuit");
    }

    #[test]
    fn create_case_requires_distinct_parties() {
        let wf = workflow();
        let mut nc = new_case();
        nc.claimant = Identity::new("Fay again", "FAY@example.org");
        let err = wf
            .create_case(&Caller::user(Identity::new("Fay", "fay@example.org")), nc)
            .unwrap_err();
        assert!(matches!(err, VerificationError::InvalidCase(_)));
    }

    #[test]
    fn create_case_requires_caller_to_be_a_party() {
        let wf = workflow();
        let stranger = Caller::user(Identity::new("Eve", "eve@example.org"));
        let err = wf.create_case(&stranger, new_case()).unwrap_err();
        assert!(matches!(err, VerificationError::Unauthorized { .. }));
    }

    #[test]
    fn create_case_requires_pet_name() {
        let wf = workflow();
        let mut nc = new_case();
        nc.pet.name = "  ".into();
        assert!(matches!(
            wf.create_case(&claimant(), nc),
            Err(VerificationError::InvalidCase(_))
        ));
    }

    #[test]
    fn admin_claim_cannot_open_a_case_as_a_party() {
        let wf = workflow();
        let mut nc = new_case();
        nc.finder = Identity::new("Ada", "ada@example.org");
        let admin_finder = Caller::admin(Identity::new("Ada", "ada@example.org"));
        let err = wf.create_case(&admin_finder, nc.clone()).unwrap_err();
        assert!(matches!(
            err,
            VerificationError::Unauthorized {
                role: Role::Admin,
                ..
            }
        ));

        // Without the claim the same person is an ordinary finder.
        let as_user = Caller::user(Identity::new("Ada", "ada@example.org"));
        assert!(wf.create_case(&as_user, nc).is_ok());
    }

    #[test]
    fn create_case_bounds_party_and_pet_fields() {
        let wf = workflow();
        let max = wf.limits().max_text_len;

        let mut long_email = new_case();
        long_email.finder.email = format!("{}@example.org", "f".repeat(MAX_EMAIL_LEN));
        let mut nul_email = new_case();
        nul_email.finder.email = "fay@example.org\0evil".into();
        let mut long_name = new_case();
        long_name.finder.display_name = "F".repeat(max + 1);
        let mut long_image = new_case();
        long_image.pet.image = Some("i".repeat(max + 1));
        let mut long_location = new_case();
        long_location.pet.last_known_location = Some("l".repeat(max + 1));

        for nc in [long_email, nul_email, long_name, long_image, long_location] {
            assert!(matches!(
                wf.create_case(&claimant(), nc),
                Err(VerificationError::InvalidCase(_))
            ));
        }
    }

    #[test]
    fn strangers_cannot_read_but_admins_can() {
        let wf = workflow();
        let id = wf.create_case(&claimant(), new_case()).unwrap();
        let stranger = Caller::user(Identity::new("Eve", "eve@example.org"));
        assert!(matches!(
            wf.get_case(&stranger, &id),
            Err(VerificationError::Unauthorized { .. })
        ));
        let admin = Caller::admin(Identity::new("Ada", "ada@example.org"));
        assert!(wf.get_case(&admin, &id).is_ok());
    }

    #[test]
    fn unknown_case_is_not_found() {
        let wf = workflow();
        let err = wf.get_case(&claimant(), &CaseId::new([9; 16])).unwrap_err();
        assert!(matches!(err, VerificationError::NotFound(_)));
    }

    #[test]
    fn list_cases_for_user_returns_own_cases() {
        let wf = workflow();
        wf.create_case(&claimant(), new_case()).unwrap();
        let mut other = new_case();
        other.finder = Identity::new("Gus", "gus@example.org");
        other.claimant = Identity::new("Hal", "hal@example.org");
        wf.create_case(&Caller::user(other.finder.clone()), other)
            .unwrap();

        assert_eq!(wf.list_cases_for_user(&claimant()).unwrap().len(), 1);
        let finder = Caller::user(Identity::new("Fay", "fay@example.org"));
        assert_eq!(wf.list_cases_for_user(&finder).unwrap().len(), 1);
        let nobody = Caller::user(Identity::new("Eve", "eve@example.org"));
        assert!(wf.list_cases_for_user(&nobody).unwrap().is_empty());
    }
}
