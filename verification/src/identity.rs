//! Identity resolver: who the caller is with respect to one case.

use reunite_types::{Caller, Case, Role};

/// Maps an authenticated caller to a role on a case.
///
/// Pure lookup. The admin claim is taken from the caller as asserted by the
/// identity provider and outranks party membership; an admin is never treated
/// as finder or claimant, even on a case naming their email.
pub struct IdentityResolver;

impl IdentityResolver {
    pub fn resolve(&self, caller: &Caller, case: &Case) -> Role {
        if caller.is_admin {
            return Role::Admin;
        }

        let email = caller.identity.normalized_email();
        if email.is_empty() {
            return Role::Unauthorized;
        }
        if email == case.finder.normalized_email() {
            Role::Finder
        } else if email == case.claimant.normalized_email() {
            Role::Claimant
        } else {
            Role::Unauthorized
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reunite_types::{CaseId, Identity, PetSnapshot, Timestamp, VerificationMethod};

    fn case() -> Case {
        Case::open(
            CaseId::new([1; 16]),
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
        )
    }

    #[test]
    fn parties_resolve_by_email() {
        let resolver = IdentityResolver;
        let case = case();
        let finder = Caller::user(Identity::new("Fay", " FAY@example.org"));
        let claimant = Caller::user(Identity::new("Someone else", "cal@example.org"));
        assert_eq!(resolver.resolve(&finder, &case), Role::Finder);
        assert_eq!(resolver.resolve(&claimant, &case), Role::Claimant);
    }

    #[test]
    fn strangers_are_unauthorized() {
        let resolver = IdentityResolver;
        let stranger = Caller::user(Identity::new("Eve", "eve@example.org"));
        let blank = Caller::user(Identity::new("", "  "));
        assert_eq!(resolver.resolve(&stranger, &case()), Role::Unauthorized);
        assert_eq!(resolver.resolve(&blank, &case()), Role::Unauthorized);
    }

    #[test]
    fn admin_claim_outranks_party_membership() {
        let resolver = IdentityResolver;
        let admin_finder = Caller::admin(Identity::new("Fay", "fay@example.org"));
        assert_eq!(resolver.resolve(&admin_finder, &case()), Role::Admin);
    }
}
