//! Party identities and the authenticated caller.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A person taking part in a case, as reported by the identity provider.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub display_name: String,
    pub email: String,
    /// Reference to an avatar image hosted elsewhere.
    #[serde(default)]
    pub avatar: Option<String>,
}

impl Identity {
    pub fn new(display_name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
            email: email.into(),
            avatar: None,
        }
    }

    pub fn with_avatar(mut self, avatar: impl Into<String>) -> Self {
        self.avatar = Some(avatar.into());
        self
    }

    /// Email in the form used for every identity comparison.
    pub fn normalized_email(&self) -> String {
        normalize_email(&self.email)
    }

    /// Whether both identities denote the same person.
    pub fn same_person(&self, other: &Identity) -> bool {
        self.normalized_email() == other.normalized_email()
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <{}>", self.display_name, self.email)
    }
}

/// Trimmed, lowercased email.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// The authenticated caller of a workflow operation.
///
/// `is_admin` is asserted by the identity provider at the boundary; the
/// workflow never derives it on its own.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Caller {
    pub identity: Identity,
    pub is_admin: bool,
}

impl Caller {
    pub fn user(identity: Identity) -> Self {
        Self {
            identity,
            is_admin: false,
        }
    }

    pub fn admin(identity: Identity) -> Self {
        Self {
            identity,
            is_admin: true,
        }
    }

    pub fn email(&self) -> &str {
        &self.identity.email
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_person_ignores_case_and_whitespace() {
        let a = Identity::new("Ana", "Ana@Example.org ");
        let b = Identity::new("Ana B.", "ana@example.org");
        assert!(a.same_person(&b));
    }

    #[test]
    fn different_emails_are_different_people() {
        let a = Identity::new("Ana", "ana@example.org");
        let b = Identity::new("Ana", "ana2@example.org");
        assert!(!a.same_person(&b));
    }
}
