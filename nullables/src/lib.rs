//! Nullable infrastructure for deterministic testing.
//!
//! All external dependencies of the workflow (clock, case storage,
//! notification dispatch) are abstracted behind traits. This crate provides
//! implementations that:
//! - Return deterministic values
//! - Can be controlled and inspected programmatically
//! - Never touch the filesystem or network
//!
//! The daemon also uses [`NullCaseStore`] for `--storage memory`.

pub mod clock;
pub mod notifier;
pub mod store;

pub use clock::NullClock;
pub use notifier::NullNotifier;
pub use store::NullCaseStore;
