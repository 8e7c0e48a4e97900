//! Nullable notifier: records notifications instead of delivering them.

use reunite_types::{Notification, Notifier};
use std::sync::Mutex;

#[derive(Default)]
pub struct NullNotifier {
    sent: Mutex<Vec<Notification>>,
}

impl NullNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything dispatched so far, in order.
    pub fn sent(&self) -> Vec<Notification> {
        self.sent.lock().unwrap().clone()
    }

    /// Notifications addressed to `recipient`.
    pub fn sent_to(&self, recipient: &str) -> Vec<Notification> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .filter(|n| n.recipient() == recipient)
            .cloned()
            .collect()
    }
}

impl Notifier for NullNotifier {
    fn notify(&self, notification: Notification) {
        self.sent.lock().unwrap().push(notification);
    }
}
