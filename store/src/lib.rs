//! Abstract storage for verification cases.
//!
//! Every storage backend (LMDB, in-memory for testing) implements
//! [`CaseStore`]. The rest of the codebase depends only on the trait.
//!
//! There is no field-level write API: all mutation goes through
//! [`CaseStore::compare_and_swap`], which is the single synchronisation point
//! of the workflow.

pub mod case;
pub mod error;
pub mod swap;

pub use case::CaseStore;
pub use error::StoreError;
pub use swap::{apply_swap, Precondition};
