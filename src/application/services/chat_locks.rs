//! Per-chat mutation locks.
//!
//! Roster mutations on the same chat are serialized so that capacity and
//! cascade checks observe a consistent snapshot. Mutations on different chats
//! never contend.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::domain::ChatId;

/// Registry of async mutexes keyed by chat id.
///
/// Entries are created on first use and dropped once the last holder or
/// waiter releases them.
#[derive(Default)]
pub struct ChatLocks {
    locks: DashMap<ChatId, Arc<Mutex<()>>>,
}

impl ChatLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `chat_id`.
    pub async fn lock(&self, chat_id: ChatId) -> ChatLockGuard<'_> {
        let mutex = Arc::clone(
            &self
                .locks
                .entry(chat_id)
                .or_insert_with(|| Arc::new(Mutex::new(()))),
        );

        let guard = mutex.lock_owned().await;

        ChatLockGuard {
            registry: self,
            chat_id,
            guard: Some(guard),
        }
    }

    /// Number of chats with a live lock entry.
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}

/// Exclusive access to one chat; released on drop.
pub struct ChatLockGuard<'a> {
    registry: &'a ChatLocks,
    chat_id: ChatId,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for ChatLockGuard<'_> {
    fn drop(&mut self) {
        drop(self.guard.take());

        // Only the map itself still references the mutex: nobody holds or waits.
        self.registry
            .locks
            .remove_if(&self.chat_id, |_, mutex| Arc::strong_count(mutex) == 1);
    }
}
