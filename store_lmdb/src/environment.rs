//! LMDB environment setup.

use std::path::Path;
use std::sync::Arc;

use heed::types::Bytes;
use heed::{Database, Env, EnvOpenOptions};
use tracing::info;

use crate::meta;
use crate::{LmdbCaseStore, LmdbError};

/// Named databases inside the environment.
const MAX_DBS: u32 = 8;

/// Default map size: 1 GiB. LMDB only reserves address space, not disk.
pub const DEFAULT_MAP_SIZE: usize = 1 << 30;

/// Wraps the LMDB environment and all database handles.
pub struct LmdbEnvironment {
    env: Arc<Env>,
    /// case id (16 bytes) -> bincode `Case`
    pub(crate) cases_db: Database<Bytes, Bytes>,
    /// creation sequence (u64 BE) -> case id
    pub(crate) sequence_db: Database<Bytes, Bytes>,
    /// normalized email ++ 0x00 ++ sequence (u64 BE) -> case id
    pub(crate) party_db: Database<Bytes, Bytes>,
    /// schema version and counters
    pub(crate) meta_db: Database<Bytes, Bytes>,
}

impl LmdbEnvironment {
    /// Open or create an LMDB environment at the given directory.
    pub fn open(path: &Path, map_size: usize) -> Result<Self, LmdbError> {
        std::fs::create_dir_all(path)?;

        // SAFETY: the environment directory is owned by this process; the same
        // path is never opened twice within one process.
        let env = unsafe {
            EnvOpenOptions::new()
                .map_size(map_size)
                .max_dbs(MAX_DBS)
                .open(path)?
        };

        let (cases_db, sequence_db, party_db, meta_db) = {
            let mut wtxn = env.write_txn()?;
            let cases_db: Database<Bytes, Bytes> = env.create_database(&mut wtxn, Some("cases"))?;
            let sequence_db: Database<Bytes, Bytes> =
                env.create_database(&mut wtxn, Some("case_sequence"))?;
            let party_db: Database<Bytes, Bytes> =
                env.create_database(&mut wtxn, Some("party_index"))?;
            let meta_db: Database<Bytes, Bytes> = env.create_database(&mut wtxn, Some("meta"))?;
            meta::ensure_schema(&meta_db, &mut wtxn)?;
            wtxn.commit()?;
            (cases_db, sequence_db, party_db, meta_db)
        };

        info!(path = %path.display(), map_size, "opened LMDB environment");

        Ok(Self {
            env: Arc::new(env),
            cases_db,
            sequence_db,
            party_db,
            meta_db,
        })
    }

    /// A case store sharing this environment.
    pub fn case_store(&self) -> LmdbCaseStore {
        LmdbCaseStore {
            env: Arc::clone(&self.env),
            cases_db: self.cases_db,
            sequence_db: self.sequence_db,
            party_db: self.party_db,
            meta_db: self.meta_db,
        }
    }

    /// Schema version recorded in the environment.
    pub fn schema_version(&self) -> Result<u32, LmdbError> {
        let rtxn = self.env.read_txn()?;
        meta::read_schema_version(&self.meta_db, &rtxn)
    }
}
