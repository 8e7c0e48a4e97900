//! LMDB storage backend for Reunite.
//!
//! Implements [`reunite_store::CaseStore`] using the `heed` LMDB bindings.
//! LMDB allows a single writer at a time, so every compare-and-swap runs in
//! its own write transaction and is linearised by the environment.

pub mod case;
pub mod environment;
pub mod error;
pub mod meta;

pub use case::LmdbCaseStore;
pub use environment::LmdbEnvironment;
pub use error::LmdbError;
