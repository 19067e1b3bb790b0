//! In-memory notification feed. Nothing here is persisted.
//!
//! `unread_count` is kept as a running counter so badge reads are O(1).
//! Every structural change adjusts it in pairs with the `is_read` flag it
//! affects, and it never goes below zero.

use tokio::sync::watch;

use uuid::Uuid;

use crate::models::notification::Notification;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NotificationState {
    /// Most recent first.
    pub notifications: Vec<Notification>,
    pub unread_count: usize,
}

pub struct NotificationStore {
    state: watch::Sender<NotificationState>,
}

impl Default for NotificationStore {
    fn default() -> Self {
        Self::new()
    }
}

impl NotificationStore {
    pub fn new() -> Self {
        Self {
            state: watch::Sender::new(NotificationState::default()),
        }
    }

    pub fn snapshot(&self) -> NotificationState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<NotificationState> {
        self.state.subscribe()
    }

    pub fn unread_count(&self) -> usize {
        self.state.borrow().unread_count
    }

    pub fn add_notification(&self, notification: Notification) {
        self.state.send_modify(|state| {
            if !notification.is_read {
                state.unread_count += 1;
            }
            state.notifications.insert(0, notification);
        });
    }

    /// Marking an already-read or unknown id leaves the counter alone.
    pub fn mark_as_read(&self, id: Uuid) {
        self.state.send_if_modified(|state| {
            let Some(entry) = state
                .notifications
                .iter_mut()
                .find(|entry| entry.id == id && !entry.is_read)
            else {
                return false;
            };

            entry.is_read = true;
            state.unread_count = state.unread_count.saturating_sub(1);
            true
        });
    }

    pub fn remove_notification(&self, id: Uuid) {
        self.state.send_if_modified(|state| {
            let Some(index) = state.notifications.iter().position(|entry| entry.id == id) else {
                return false;
            };

            let removed = state.notifications.remove(index);
            if !removed.is_read {
                state.unread_count = state.unread_count.saturating_sub(1);
            }
            true
        });
    }

    pub fn clear_all(&self) {
        self.state.send_replace(NotificationState::default());
    }

    /// Wholesale replace; the counter is recomputed from the new list.
    pub fn set_notifications(&self, notifications: Vec<Notification>) {
        let unread_count = notifications.iter().filter(|entry| !entry.is_read).count();
        self.state.send_replace(NotificationState {
            notifications,
            unread_count,
        });
    }
}
