//! Tunable input limits for the workflow.

use serde::{Deserialize, Serialize};

use crate::error::VerificationError;

/// Size limits and retry budget. Loaded from the `[limits]` table of the
/// service config; every field has a default.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowLimits {
    /// Longest decision, dispute or ruling reason, in characters.
    #[serde(default = "default_max_reason_len")]
    pub max_reason_len: usize,

    /// Longest chat message, in characters.
    #[serde(default = "default_max_message_len")]
    pub max_message_len: usize,

    /// Longest free-text evidence or pet-description field, in characters.
    #[serde(default = "default_max_text_len")]
    pub max_text_len: usize,

    /// How many times a chat append is retried after losing a race.
    #[serde(default = "default_max_chat_append_retries")]
    pub max_chat_append_retries: u32,

    /// Largest chat page a reader can request.
    #[serde(default = "default_max_page_size")]
    pub max_page_size: usize,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_max_reason_len() -> usize {
    2_000
}

fn default_max_message_len() -> usize {
    4_000
}

fn default_max_text_len() -> usize {
    4_000
}

fn default_max_chat_append_retries() -> u32 {
    32
}

fn default_max_page_size() -> usize {
    500
}

impl Default for WorkflowLimits {
    fn default() -> Self {
        Self {
            max_reason_len: default_max_reason_len(),
            max_message_len: default_max_message_len(),
            max_text_len: default_max_text_len(),
            max_chat_append_retries: default_max_chat_append_retries(),
            max_page_size: default_max_page_size(),
        }
    }
}

impl WorkflowLimits {
    /// Trim `value` and require it to be non-empty and at most `max` characters.
    pub fn require_text(
        &self,
        field: &str,
        value: &str,
        max: usize,
    ) -> Result<String, VerificationError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(VerificationError::InvalidInput(format!("{field} must not be empty")));
        }
        if trimmed.chars().count() > max {
            return Err(VerificationError::InvalidInput(format!(
                "{field} is longer than {max} characters"
            )));
        }
        Ok(trimmed.to_string())
    }

    pub fn require_reason(&self, value: &str) -> Result<String, VerificationError> {
        self.require_text("reason", value, self.max_reason_len)
    }
}
