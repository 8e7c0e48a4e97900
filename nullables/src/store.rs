//! Nullable store: thread-safe in-memory case storage.

use reunite_store::{apply_swap, CaseStore, Precondition, StoreError};
use reunite_types::{Case, CaseId};
use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Default)]
struct Cases {
    by_id: HashMap<CaseId, Case>,
    /// Creation order.
    order: Vec<CaseId>,
}

/// An in-memory case store.
///
/// One mutex guards the whole map, so every compare-and-swap is atomic and
/// readers only ever see complete cases.
#[derive(Default)]
pub struct NullCaseStore {
    cases: Mutex<Cases>,
}

impl NullCaseStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CaseStore for NullCaseStore {
    fn create(&self, case: &Case) -> Result<CaseId, StoreError> {
        let mut cases = self.cases.lock().unwrap();
        if cases.by_id.contains_key(&case.id) {
            return Err(StoreError::Duplicate(case.id.to_string()));
        }
        cases.by_id.insert(case.id, case.clone());
        cases.order.push(case.id);
        Ok(case.id)
    }

    fn get(&self, id: &CaseId) -> Result<Case, StoreError> {
        self.cases
            .lock()
            .unwrap()
            .by_id
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    fn compare_and_swap(
        &self,
        id: &CaseId,
        expected: Precondition,
        mutator: &dyn Fn(&mut Case),
    ) -> Result<Case, StoreError> {
        let mut cases = self.cases.lock().unwrap();
        let current = cases
            .by_id
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        let next = apply_swap(current, expected, mutator)?;
        *current = next.clone();
        Ok(next)
    }

    fn list_for_party(&self, email: &str) -> Result<Vec<Case>, StoreError> {
        let cases = self.cases.lock().unwrap();
        Ok(cases
            .order
            .iter()
            .filter_map(|id| cases.by_id.get(id))
            .filter(|c| c.involves(email))
            .cloned()
            .collect())
    }

    fn iter_cases(&self) -> Result<Vec<Case>, StoreError> {
        let cases = self.cases.lock().unwrap();
        Ok(cases
            .order
            .iter()
            .filter_map(|id| cases.by_id.get(id))
            .cloned()
            .collect())
    }

    fn case_count(&self) -> Result<u64, StoreError> {
        Ok(self.cases.lock().unwrap().by_id.len() as u64)
    }
}
