//! Schema version and counters kept in the `meta` database.

use heed::types::Bytes;
use heed::{Database, RoTxn, RwTxn};

use crate::LmdbError;

/// Layout version written by this build.
pub const SCHEMA_VERSION: u32 = 1;

const SCHEMA_VERSION_KEY: &[u8] = b"schema_version";
const NEXT_SEQUENCE_KEY: &[u8] = b"next_sequence";

pub(crate) fn read_schema_version(
    db: &Database<Bytes, Bytes>,
    txn: &RoTxn,
) -> Result<u32, LmdbError> {
    match db.get(txn, SCHEMA_VERSION_KEY)? {
        Some(bytes) => {
            let arr: [u8; 4] = bytes.try_into().map_err(|_| {
                LmdbError::Corruption("schema_version has unexpected byte length".to_string())
            })?;
            Ok(u32::from_le_bytes(arr))
        }
        None => Ok(0),
    }
}

/// Stamp a fresh environment, or refuse one written by another layout.
pub(crate) fn ensure_schema(
    db: &Database<Bytes, Bytes>,
    wtxn: &mut RwTxn,
) -> Result<(), LmdbError> {
    match read_schema_version(db, wtxn)? {
        0 => {
            db.put(wtxn, SCHEMA_VERSION_KEY, &SCHEMA_VERSION.to_le_bytes())?;
            Ok(())
        }
        SCHEMA_VERSION => Ok(()),
        other => Err(LmdbError::Corruption(format!(
            "unsupported schema version {other}, expected {SCHEMA_VERSION}"
        ))),
    }
}

/// Reserve the next creation sequence number.
pub(crate) fn next_sequence(
    db: &Database<Bytes, Bytes>,
    wtxn: &mut RwTxn,
) -> Result<u64, LmdbError> {
    let current = match db.get(wtxn, NEXT_SEQUENCE_KEY)? {
        Some(bytes) => {
            let arr: [u8; 8] = bytes.try_into().map_err(|_| {
                LmdbError::Corruption("next_sequence has unexpected byte length".to_string())
            })?;
            u64::from_be_bytes(arr)
        }
        None => 0,
    };
    db.put(wtxn, NEXT_SEQUENCE_KEY, &(current + 1).to_be_bytes())?;
    Ok(current)
}
