use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::day::DayKey;
use crate::timer::TimerState;

/// Every applied state change in the system produces an Event.
/// Display layers subscribe to the feed instead of polling state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    QuestsAssigned {
        date: DayKey,
        quest_ids: Vec<String>,
        at: DateTime<Utc>,
    },
    QuestCompleted {
        date: DayKey,
        quest_id: String,
        exp_gained: i64,
        at: DateTime<Utc>,
    },
    DaySettled {
        date: DayKey,
        /// Quests penalized by this settlement.
        penalized: Vec<String>,
        total_exp_lost: i64,
        net_exp: i64,
        at: DateTime<Utc>,
    },
    QuestEnqueued {
        quest_id: String,
        priority: u8,
        at: DateTime<Utc>,
    },
    QuestDequeued {
        quest_id: String,
        at: DateTime<Utc>,
    },
    QueueReordered {
        moved_id: String,
        target_id: String,
        at: DateTime<Utc>,
    },
    /// The current queue entry changed. `None` means the queue ran dry.
    CurrentChanged {
        quest_id: Option<String>,
        at: DateTime<Utc>,
    },
    TimerStarted {
        quest_id: Option<String>,
        duration_secs: u64,
        at: DateTime<Utc>,
    },
    TimerPaused {
        remaining_ms: u64,
        at: DateTime<Utc>,
    },
    TimerResumed {
        remaining_ms: u64,
        at: DateTime<Utc>,
    },
    TimerCompleted {
        quest_id: Option<String>,
        at: DateTime<Utc>,
    },
    TimerReset {
        at: DateTime<Utc>,
    },
    TimerSnapshot {
        state: TimerState,
        quest_id: Option<String>,
        remaining_ms: u64,
        total_ms: u64,
        progress: f64,
        at: DateTime<Utc>,
    },
}

pub const DEFAULT_FEED_CAPACITY: usize = 256;

/// Broadcast channel carrying [`Event`]s to any number of subscribers.
///
/// Clones publish into the same channel. Publishing with no subscribers is
/// not an error; slow subscribers observe `RecvError::Lagged`.
#[derive(Debug, Clone)]
pub struct EventFeed {
    tx: broadcast::Sender<Event>,
}

impl EventFeed {
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }

    pub fn publish(&self, event: Event) {
        // Err only means nobody is listening.
        let _ = self.tx.send(event);
    }

    /// Publish the event if there is one and hand it back to the caller.
    pub fn emit(&self, event: Option<Event>) -> Option<Event> {
        if let Some(ref e) = event {
            self.publish(e.clone());
        }
        event
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for EventFeed {
    fn default() -> Self {
        Self::new(DEFAULT_FEED_CAPACITY)
    }
}
