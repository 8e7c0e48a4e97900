//! Compare-and-swap rules shared by every backend.

use crate::StoreError;
use reunite_types::Case;

/// What a mutation expects of the stored case, and therefore which projection
/// of the record it is allowed to touch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Precondition {
    /// Whole record: `version` must match.
    Version(u64),
    /// Workflow projection: `workflow_revision` must match and the chat list
    /// must be left alone.
    Workflow { revision: u64 },
    /// Chat projection: the chat list must still have `len` entries, the case
    /// must still accept messages, and the workflow projection must be left
    /// alone.
    ChatAppend { len: usize },
}

/// Validate `expected` against `current`, run `mutator` on a copy, and return
/// the next stored state.
///
/// Enforced for every precondition:
/// - identity fields (id, parties, pet, method, created_at) never change;
/// - the chat list is append-only, and only grows while the status accepts
///   messages;
/// - `version` goes up by exactly 1; `workflow_revision` goes up by 1 when the
///   workflow projection changed.
///
/// On any error `current` is left untouched and nothing should be written.
pub fn apply_swap(
    current: &Case,
    expected: Precondition,
    mutator: &dyn Fn(&mut Case),
) -> Result<Case, StoreError> {
    match expected {
        Precondition::Version(v) if v != current.version => {
            return Err(StoreError::VersionConflict {
                expected: v,
                actual: current.version,
            });
        }
        Precondition::Workflow { revision } if revision != current.workflow_revision => {
            return Err(StoreError::VersionConflict {
                expected: revision,
                actual: current.workflow_revision,
            });
        }
        Precondition::ChatAppend { len } => {
            if !current.status.accepts_messages() {
                return Err(StoreError::ChannelFrozen(current.id.to_string()));
            }
            if len != current.chat_history.len() {
                return Err(StoreError::VersionConflict {
                    expected: len as u64,
                    actual: current.chat_history.len() as u64,
                });
            }
        }
        _ => {}
    }

    let before = current.workflow_projection();
    let mut next = current.clone();
    mutator(&mut next);

    if next.id != current.id
        || next.finder != current.finder
        || next.claimant != current.claimant
        || next.pet != current.pet
        || next.verification_method != current.verification_method
        || next.created_at != current.created_at
    {
        return Err(StoreError::UndeclaredMutation("identity"));
    }

    let old_len = current.chat_history.len();
    if next.chat_history.len() < old_len || next.chat_history[..old_len] != current.chat_history[..]
    {
        return Err(StoreError::UndeclaredMutation("chat history"));
    }
    let chat_grew = next.chat_history.len() > old_len;
    if chat_grew && !current.status.accepts_messages() {
        return Err(StoreError::ChannelFrozen(current.id.to_string()));
    }

    let after = next.workflow_projection();
    let workflow_changed = after != before;
    match expected {
        Precondition::Workflow { .. } if chat_grew => {
            return Err(StoreError::UndeclaredMutation("chat"));
        }
        Precondition::ChatAppend { .. } if workflow_changed => {
            return Err(StoreError::UndeclaredMutation("workflow"));
        }
        _ => {}
    }

    next.version = current.version + 1;
    next.workflow_revision = if workflow_changed {
        current.workflow_revision + 1
    } else {
        current.workflow_revision
    };
    Ok(next)
}
