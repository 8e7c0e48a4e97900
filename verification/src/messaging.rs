//! Per-case chat channel between finder and claimant.
//!
//! Appends go through the store with a `ChatAppend` precondition, so they
//! are ordered among themselves without ever racing a status transition.

use reunite_store::{Precondition, StoreError};
use reunite_types::{Caller, Case, CaseId, ChatMessage};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::VerificationError;
use crate::workflow::CaseWorkflow;

/// Page size when the reader does not ask for one.
pub const DEFAULT_PAGE_SIZE: usize = 50;

/// A slice of a case's chat history.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessagePage {
    pub case_id: CaseId,
    pub messages: Vec<ChatMessage>,
    pub offset: usize,
    /// Length of the whole history at read time.
    pub total: usize,
    /// Where the next page starts; `None` once the reader has caught up.
    pub next_offset: Option<usize>,
}

impl CaseWorkflow {
    /// Append a message as the caller. Parties only, and only while the case
    /// is still open.
    pub fn post_message(
        &self,
        caller: &Caller,
        id: &CaseId,
        body: &str,
    ) -> Result<Case, VerificationError> {
        const ACTION: &str = "post a message";

        let (mut case, role) = self.load(caller, id, ACTION)?;
        if !role.is_party() {
            return Err(VerificationError::Unauthorized {
                role,
                action: ACTION,
            });
        }
        let body = self
            .limits()
            .require_text("message", body, self.limits().max_message_len)?;

        let max_retries = self.limits().max_chat_append_retries;
        let mut attempt = 0;
        loop {
            if !case.status.accepts_messages() {
                return Err(VerificationError::ChannelFrozen(id.to_string()));
            }

            let message = ChatMessage {
                sender_role: role,
                sender: caller.identity.clone(),
                body: body.clone(),
                sent_at: self.now(),
            };
            let result = self.store().compare_and_swap(
                id,
                Precondition::ChatAppend {
                    len: case.chat_history.len(),
                },
                &|c| {
                    c.chat_history.push(message.clone());
                    c.updated_at = message.sent_at;
                },
            );

            match result {
                Ok(updated) => {
                    debug!(
                        case = %id,
                        %role,
                        messages = updated.chat_history.len(),
                        retries = attempt,
                        "message posted"
                    );
                    return Ok(updated);
                }
                Err(StoreError::VersionConflict { .. }) if attempt < max_retries => {
                    attempt += 1;
                    case = self.store().get(id)?;
                }
                Err(e @ StoreError::VersionConflict { .. }) => {
                    warn!(case = %id, retries = attempt, "chat append gave up after repeated conflicts");
                    return Err(e.into());
                }
                Err(e) => {
                    if matches!(e, StoreError::ChannelFrozen(_)) {
                        info!(case = %id, "chat closed while posting");
                    }
                    return Err(e.into());
                }
            }
        }
    }

    /// Read `count` messages starting at `offset`. Any role resolved on the
    /// case may read, admins included.
    pub fn read_messages(
        &self,
        caller: &Caller,
        id: &CaseId,
        offset: usize,
        count: Option<usize>,
    ) -> Result<MessagePage, VerificationError> {
        let (case, _role) = self.load(caller, id, "read messages")?;

        let count = count
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, self.limits().max_page_size.max(1));
        let total = case.chat_history.len();
        let start = offset.min(total);
        let end = start.saturating_add(count).min(total);

        Ok(MessagePage {
            case_id: case.id,
            messages: case.chat_history[start..end].to_vec(),
            offset: start,
            total,
            next_offset: (end < total).then_some(end),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use reunite_nullables::{NullCaseStore, NullClock, NullNotifier};
    use reunite_types::{
        CaseStatus, Evidence, Identity, PetSnapshot, Role, Timestamp, VerificationMethod,
    };

    use super::*;
    use crate::limits::WorkflowLimits;
    use crate::workflow::NewCase;

    fn finder() -> Caller {
        Caller::user(Identity::new("Fay", "fay@example.org"))
    }

    fn claimant() -> Caller {
        Caller::user(Identity::new("Cal", "cal@example.org").with_avatar("av/cal.png"))
    }

    fn admin() -> Caller {
        Caller::admin(Identity::new("Ada", "ada@example.org"))
    }

    fn setup() -> (CaseWorkflow, CaseId) {
        let wf = CaseWorkflow::new(
            Arc::new(NullCaseStore::new()),
            Arc::new(NullClock::new(500)),
            Arc::new(NullNotifier::new()),
            WorkflowLimits::default(),
        );
        let id = wf
            .create_case(
                &finder(),
                NewCase {
                    pet: PetSnapshot {
                        name: "Otis".into(),
                        species: "dog".into(),
                        image: None,
                        description: String::new(),
                        last_known_location: None,
                    },
                    finder: finder().identity,
                    claimant: Identity::new("Cal", "cal@example.org"),
                    verification_method: VerificationMethod::Microchip,
                },
            )
            .unwrap();
        (wf, id)
    }

    #[test]
    fn post_records_sender_and_leaves_workflow_alone() {
        let (wf, id) = setup();
        let case = wf.post_message(&claimant(), &id, "  is he eating ok? ").unwrap();

        assert_eq!(case.version, 2);
        assert_eq!(case.workflow_revision, 1);
        assert_eq!(case.status, CaseStatus::Pending);
        let msg = &case.chat_history[0];
        assert_eq!(msg.body, "is he eating ok?");
        assert_eq!(msg.sender_role, Role::Claimant);
        assert_eq!(msg.sender.avatar.as_deref(), Some("av/cal.png"));
        assert_eq!(msg.sent_at, Timestamp::new(500));
    }

    #[test]
    fn admin_reads_but_cannot_post() {
        let (wf, id) = setup();
        wf.post_message(&finder(), &id, "hello").unwrap();
        let err = wf.post_message(&admin(), &id, "hi all").unwrap_err();
        assert!(matches!(
            err,
            VerificationError::Unauthorized {
                role: Role::Admin,
                ..
            }
        ));
        let page = wf.read_messages(&admin(), &id, 0, None).unwrap();
        assert_eq!(page.total, 1);
    }

    #[test]
    fn empty_message_is_invalid() {
        let (wf, id) = setup();
        let err = wf.post_message(&finder(), &id, " \n ").unwrap_err();
        assert!(matches!(err, VerificationError::InvalidInput(_)));
    }

    #[test]
    fn verified_case_freezes_chat() {
        let (wf, id) = setup();
        wf.submit_evidence(
            &claimant(),
            &id,
            Evidence::Microchip {
                chip_number: "985121000000001".into(),
            },
        )
        .unwrap();
        wf.approve(&finder(), &id, "chip matches").unwrap();

        let err = wf.post_message(&claimant(), &id, "thanks!").unwrap_err();
        assert!(matches!(err, VerificationError::ChannelFrozen(_)));
    }

    #[test]
    fn pages_walk_the_history() {
        let (wf, id) = setup();
        for i in 0..5 {
            wf.post_message(&finder(), &id, &format!("msg {i}")).unwrap();
        }

        let first = wf.read_messages(&claimant(), &id, 0, Some(2)).unwrap();
        assert_eq!(first.messages.len(), 2);
        assert_eq!(first.next_offset, Some(2));

        let last = wf.read_messages(&claimant(), &id, 4, Some(2)).unwrap();
        assert_eq!(last.messages[0].body, "msg 4");
        assert_eq!(last.next_offset, None);

        let past_end = wf.read_messages(&claimant(), &id, 99, None).unwrap();
        assert!(past_end.messages.is_empty());
        assert_eq!(past_end.offset, 5);

        let clamped = wf.read_messages(&claimant(), &id, 0, Some(0)).unwrap();
        assert_eq!(clamped.messages.len(), 1);
    }
}
