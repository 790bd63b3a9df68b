use std::collections::VecDeque;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::policy::{EventKind, PolicyEvent};

pub const DEFAULT_TOAST_CAPACITY: usize = 200;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Toast {
    pub seq: u64,
    pub kind: EventKind,
    pub item_id: Option<Uuid>,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

struct FeedState {
    next_seq: u64,
    entries: VecDeque<Toast>,
}

/// Bounded in-app notification feed. The oldest toasts fall off first.
pub struct ToastFeed {
    capacity: usize,
    state: Mutex<FeedState>,
}

impl ToastFeed {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            state: Mutex::new(FeedState {
                next_seq: 1,
                entries: VecDeque::new(),
            }),
        }
    }

    pub fn push(&self, event: &PolicyEvent, at: DateTime<Utc>) -> u64 {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        let seq = state.next_seq;
        state.next_seq += 1;

        if state.entries.len() == self.capacity {
            state.entries.pop_front();
        }
        state.entries.push_back(Toast {
            seq,
            kind: event.kind,
            item_id: event.item_id,
            message: event.message.clone(),
            created_at: at,
        });
        seq
    }

    /// Toasts with a sequence number above `after`, oldest first.
    pub fn since(&self, after: u64) -> Vec<Toast> {
        let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state
            .entries
            .iter()
            .filter(|t| t.seq > after)
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.state
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .entries
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for ToastFeed {
    fn default() -> Self {
        Self::new(DEFAULT_TOAST_CAPACITY)
    }
}
