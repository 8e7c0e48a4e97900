//! Offset pagination for the chat endpoint.
//!
//! Page sizes are clamped by the workflow, so an oversized `count` is not an
//! error here.

use serde::{Deserialize, Serialize};

/// Query parameters accepted by `GET /cases/{id}/messages`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PaginationParams {
    /// Index of the first message to return (default 0).
    pub offset: Option<usize>,
    /// Number of messages per page.
    pub count: Option<usize>,
}

impl PaginationParams {
    pub fn offset(&self) -> usize {
        self.offset.unwrap_or(0)
    }
}

/// Pagination metadata included in list responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaginationMeta {
    pub offset: usize,
    pub total: usize,
    /// Offset to pass for the next page, or `null` on the last page.
    pub next_offset: Option<usize>,
}
