//! Shared utilities for the Reunite services.

pub mod logging;

pub use logging::{init_logging, LogFormat, LoggingError};
