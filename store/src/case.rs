//! Case storage trait.

use crate::{Precondition, StoreError};
use reunite_types::{Case, CaseId};

/// Durable keyed storage for verification cases.
pub trait CaseStore: Send + Sync {
    /// Insert a new case. Fails with `Duplicate` if the id is taken.
    fn create(&self, case: &Case) -> Result<CaseId, StoreError>;

    /// Get a case by id.
    fn get(&self, id: &CaseId) -> Result<Case, StoreError>;

    /// Atomically check `expected` against the stored case, apply `mutator`,
    /// bump the version and persist. See [`crate::apply_swap`] for the rules
    /// every backend enforces.
    fn compare_and_swap(
        &self,
        id: &CaseId,
        expected: Precondition,
        mutator: &dyn Fn(&mut Case),
    ) -> Result<Case, StoreError>;

    /// All cases where `email` is the finder or the claimant, oldest first.
    fn list_for_party(&self, email: &str) -> Result<Vec<Case>, StoreError>;

    /// Every stored case, oldest first.
    fn iter_cases(&self) -> Result<Vec<Case>, StoreError>;

    fn case_count(&self) -> Result<u64, StoreError>;
}
