//! LMDB implementation of CaseStore.
//!
//! Cases are bincode values keyed by their 16-byte id. Two index databases
//! keep creation order: `case_sequence` for the full listing and
//! `party_index` (composite key `email ++ 0x00 ++ sequence`) for per-party
//! listings, which become prefix range-scans.

use std::ops::Bound;
use std::sync::Arc;

use heed::types::Bytes;
use heed::{Database, Env, RoTxn};
use tracing::debug;

use reunite_store::{apply_swap, CaseStore, Precondition, StoreError};
use reunite_types::identity::normalize_email;
use reunite_types::{Case, CaseId};

use crate::meta;
use crate::LmdbError;

#[derive(Clone)]
pub struct LmdbCaseStore {
    pub(crate) env: Arc<Env>,
    pub(crate) cases_db: Database<Bytes, Bytes>,
    pub(crate) sequence_db: Database<Bytes, Bytes>,
    pub(crate) party_db: Database<Bytes, Bytes>,
    pub(crate) meta_db: Database<Bytes, Bytes>,
}

/// Build `normalized_email ++ 0x00`.
fn party_prefix(email: &str) -> Vec<u8> {
    let mut key = normalize_email(email).into_bytes();
    key.push(0);
    key
}

/// Build `normalized_email ++ 0x00 ++ sequence_be`.
fn party_key(email: &str, sequence: u64) -> Vec<u8> {
    let mut key = party_prefix(email);
    key.extend_from_slice(&sequence.to_be_bytes());
    key
}

/// Turn a prefix into the smallest key greater than every key it prefixes.
pub(crate) fn increment_prefix(prefix: &mut Vec<u8>) {
    while let Some(last) = prefix.pop() {
        if last < u8::MAX {
            prefix.push(last + 1);
            return;
        }
    }
}

fn decode_case(bytes: &[u8]) -> Result<Case, LmdbError> {
    Ok(bincode::deserialize(bytes)?)
}

impl LmdbCaseStore {
    fn load(&self, rtxn: &RoTxn, id_bytes: &[u8]) -> Result<Case, LmdbError> {
        let bytes = self.cases_db.get(rtxn, id_bytes)?.ok_or_else(|| {
            LmdbError::Corruption(format!(
                "index points at missing case {}",
                CaseId::from_slice(id_bytes)
                    .map(|id| id.to_string())
                    .unwrap_or_else(|_| format!("{id_bytes:?}"))
            ))
        })?;
        decode_case(bytes)
    }
}

impl CaseStore for LmdbCaseStore {
    fn create(&self, case: &Case) -> Result<CaseId, StoreError> {
        let key = case.id.as_bytes();
        let bytes = bincode::serialize(case).map_err(LmdbError::from)?;

        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        if self
            .cases_db
            .get(&wtxn, key)
            .map_err(LmdbError::from)?
            .is_some()
        {
            return Err(StoreError::Duplicate(case.id.to_string()));
        }

        let sequence = meta::next_sequence(&self.meta_db, &mut wtxn)?;
        self.cases_db
            .put(&mut wtxn, key, &bytes)
            .map_err(LmdbError::from)?;
        self.sequence_db
            .put(&mut wtxn, &sequence.to_be_bytes(), key)
            .map_err(LmdbError::from)?;
        for party in [&case.finder, &case.claimant] {
            self.party_db
                .put(&mut wtxn, &party_key(&party.email, sequence), key)
                .map_err(LmdbError::from)?;
        }
        wtxn.commit().map_err(LmdbError::from)?;

        debug!(case = %case.id, sequence, "case stored");
        Ok(case.id)
    }

    fn get(&self, id: &CaseId) -> Result<Case, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let bytes = self
            .cases_db
            .get(&rtxn, id.as_bytes())
            .map_err(LmdbError::from)?
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        Ok(decode_case(bytes)?)
    }

    fn compare_and_swap(
        &self,
        id: &CaseId,
        expected: Precondition,
        mutator: &dyn Fn(&mut Case),
    ) -> Result<Case, StoreError> {
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        let current = {
            let bytes = self
                .cases_db
                .get(&wtxn, id.as_bytes())
                .map_err(LmdbError::from)?
                .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
            decode_case(bytes)?
        };

        // Dropping `wtxn` on error aborts the transaction.
        let next = apply_swap(&current, expected, mutator)?;
        let bytes = bincode::serialize(&next).map_err(LmdbError::from)?;
        self.cases_db
            .put(&mut wtxn, id.as_bytes(), &bytes)
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;

        debug!(case = %id, version = next.version, "case swapped");
        Ok(next)
    }

    fn list_for_party(&self, email: &str) -> Result<Vec<Case>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let prefix = party_prefix(email);
        let mut upper = prefix.clone();
        increment_prefix(&mut upper);
        let bounds = (
            Bound::Included(prefix.as_slice()),
            Bound::Excluded(upper.as_slice()),
        );

        let mut cases = Vec::new();
        let iter = self
            .party_db
            .range(&rtxn, &bounds)
            .map_err(LmdbError::from)?;
        for entry in iter {
            let (key, id_bytes) = entry.map_err(LmdbError::from)?;
            // An email with an embedded NUL sorts inside this range.
            if key.len() != prefix.len() + 8 {
                continue;
            }
            cases.push(self.load(&rtxn, id_bytes)?);
        }
        Ok(cases)
    }

    fn iter_cases(&self) -> Result<Vec<Case>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let mut cases = Vec::new();
        let iter = self.sequence_db.iter(&rtxn).map_err(LmdbError::from)?;
        for entry in iter {
            let (_seq, id_bytes) = entry.map_err(LmdbError::from)?;
            cases.push(self.load(&rtxn, id_bytes)?);
        }
        Ok(cases)
    }

    fn case_count(&self) -> Result<u64, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        Ok(self.cases_db.len(&rtxn).map_err(LmdbError::from)?)
    }
}
