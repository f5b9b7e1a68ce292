use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    PriceAlert,
    WeatherAlert,
}

impl NotificationKind {
    pub fn label(&self) -> &'static str {
        match self {
            Self::PriceAlert => "PRICE",
            Self::WeatherAlert => "WEATHER",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: String,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub read: bool,
}

/// Bounded notification list, newest first, with an incrementally maintained
/// unread counter.
///
/// Invariant: `unread_count` equals the number of items with `read == false`
/// after every public operation.
#[derive(Debug)]
pub struct NotificationStore {
    items: VecDeque<Notification>,
    unread_count: usize,
    capacity: usize,
    seq: u64,
}

impl NotificationStore {
    /// A capacity of 0 is raised to 1 so the newest notification always fits.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            items: VecDeque::with_capacity(capacity + 1),
            unread_count: 0,
            capacity,
            seq: 0,
        }
    }

    /// Inserts a new unread notification at the head and evicts from the tail
    /// past capacity. Returns the stored notification.
    pub fn add(
        &mut self,
        kind: NotificationKind,
        title: impl Into<String>,
        message: impl Into<String>,
        now: DateTime<Utc>,
    ) -> &Notification {
        self.seq += 1;
        let id = format!("{}-{}", now.timestamp_millis(), self.seq);

        self.items.push_front(Notification {
            id,
            kind,
            title: title.into(),
            message: message.into(),
            timestamp: now,
            read: false,
        });
        self.unread_count += 1;

        while self.items.len() > self.capacity {
            if let Some(evicted) = self.items.pop_back() {
                if !evicted.read {
                    self.unread_count -= 1;
                }
            }
        }

        &self.items[0]
    }

    /// Returns true if the item existed and was unread.
    pub fn mark_read(&mut self, id: &str) -> bool {
        match self.items.iter_mut().find(|n| n.id == id) {
            Some(item) if !item.read => {
                item.read = true;
                self.unread_count -= 1;
                true
            }
            _ => false,
        }
    }

    pub fn mark_all_read(&mut self) {
        for item in self.items.iter_mut() {
            item.read = true;
        }
        self.unread_count = 0;
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.unread_count = 0;
    }

    pub fn unread_count(&self) -> usize {
        self.unread_count
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Notification> {
        self.items.iter().find(|n| n.id == id)
    }

    /// Newest first.
    pub fn iter(&self) -> impl Iterator<Item = &Notification> {
        self.items.iter()
    }
}
