//! HTTP JSON API for the Reunite verification workflow.
//!
//! Provides endpoints for:
//! - Opening cases and listing a user's cases
//! - Evidence submission and the finder's decision
//! - Disputes, admin rulings and the dispute queue
//! - The per-case chat channel
//!
//! Caller identity is taken from headers set by the identity gateway in
//! front of this service; see [`identity`].

pub mod error;
pub mod handlers;
pub mod identity;
pub mod pagination;
pub mod server;

pub use error::RpcError;
pub use server::{AppState, RpcServer};
