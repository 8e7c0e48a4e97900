//! Notification dispatcher that writes to the log.

use reunite_types::{Notification, Notifier};
use tracing::info;

/// Logs every notification at `info` under the `reunite::notify` target.
///
/// Stands in for a real delivery channel; a mail or push bridge can tail
/// the JSON log and pick these up.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notification: Notification) {
        match &notification {
            Notification::EvidenceSubmitted { case_id, recipient } => {
                info!(target: "reunite::notify", case = %case_id, recipient = %recipient, "evidence submitted");
            }
            Notification::DecisionMade {
                case_id,
                recipient,
                outcome,
            } => {
                info!(target: "reunite::notify", case = %case_id, recipient = %recipient, %outcome, "finder decided");
            }
            Notification::DisputeRuled {
                case_id,
                recipient,
                outcome,
            } => {
                info!(target: "reunite::notify", case = %case_id, recipient = %recipient, %outcome, "dispute ruled");
            }
        }
    }
}
