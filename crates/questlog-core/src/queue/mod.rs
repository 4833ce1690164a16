//! Quest priority queue.
//!
//! Holds a priority-ordered backlog of quests and a single "current" entry
//! that the focus timer works against.
//!
//! ## State Transitions
//!
//! ```text
//! absent -> pending -> current -> absent
//!           pending -> absent
//! ```
//!
//! The current entry is never also present in the pending sequence. Every
//! mutation re-sorts the pending sequence by descending priority except
//! [`QuestQueue::reorder`], whose manual order survives until the next
//! re-sort. Sorting is stable, so equal priorities keep their relative order.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::events::{Event, EventFeed};
use crate::quest::Quest;

/// A quest waiting in (or heading) the queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueEntry {
    pub quest: Quest,
    pub priority: u8,
}

impl QueueEntry {
    /// Entry with the difficulty-derived priority.
    pub fn new(quest: Quest) -> Self {
        let priority = quest.difficulty.priority();
        Self { quest, priority }
    }

    /// Entry with an explicit priority. 0 means "unset" and falls back to
    /// the difficulty-derived value.
    pub fn with_priority(quest: Quest, priority: u8) -> Self {
        if priority == 0 {
            return Self::new(quest);
        }
        Self { quest, priority }
    }

    pub fn id(&self) -> &str {
        &self.quest.id
    }
}

#[derive(Debug, Default)]
pub struct QuestQueue {
    pending: Vec<QueueEntry>,
    current: Option<QueueEntry>,
    feed: EventFeed,
}

impl QuestQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_feed(mut self, feed: EventFeed) -> Self {
        self.feed = feed;
        self
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn current(&self) -> Option<&QueueEntry> {
        self.current.as_ref()
    }

    pub fn pending(&self) -> &[QueueEntry] {
        &self.pending
    }

    pub fn pending_ids(&self) -> Vec<&str> {
        self.pending.iter().map(QueueEntry::id).collect()
    }

    pub fn contains(&self, quest_id: &str) -> bool {
        self.current.as_ref().is_some_and(|c| c.id() == quest_id)
            || self.pending.iter().any(|e| e.id() == quest_id)
    }

    pub fn is_empty(&self) -> bool {
        self.current.is_none() && self.pending.is_empty()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.feed.subscribe()
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Add `quest` with its difficulty-derived priority.
    pub fn enqueue(&mut self, quest: Quest) -> Option<Event> {
        self.insert(QueueEntry::new(quest))
    }

    /// Add `quest` with an explicit priority that overrides the derived one (0 keeps the derived one).
    pub fn enqueue_with_priority(&mut self, quest: Quest, priority: u8) -> Option<Event> {
        self.insert(QueueEntry::with_priority(quest, priority))
    }

    fn insert(&mut self, entry: QueueEntry) -> Option<Event> {
        if self.contains(entry.id()) {
            tracing::trace!(quest_id = entry.id(), "already queued");
            return None;
        }
        let quest_id = entry.id().to_string();
        let priority = entry.priority;

        // Promotion and the emptiness check happen together, before the entry
        // ever touches the pending sequence.
        if self.current.is_none() && self.pending.is_empty() {
            tracing::debug!(%quest_id, priority, "enqueued and started");
            self.current = Some(entry);
            self.feed.publish(Event::QuestEnqueued {
                quest_id: quest_id.clone(),
                priority,
                at: Utc::now(),
            });
            return self.feed.emit(Some(Event::CurrentChanged {
                quest_id: Some(quest_id),
                at: Utc::now(),
            }));
        }

        self.pending.push(entry);
        self.sort_pending();
        tracing::debug!(%quest_id, priority, pending = self.pending.len(), "enqueued");
        self.feed.emit(Some(Event::QuestEnqueued {
            quest_id,
            priority,
            at: Utc::now(),
        }))
    }

    /// Drop `quest_id` from the queue. Removing the current entry promotes
    /// the next one.
    pub fn remove(&mut self, quest_id: &str) -> Option<Event> {
        let before = self.pending.len();
        self.pending.retain(|e| e.id() != quest_id);
        let was_pending = self.pending.len() != before;
        let was_current = self.current.as_ref().is_some_and(|c| c.id() == quest_id);

        if !was_pending && !was_current {
            tracing::trace!(quest_id, "not queued");
            return None;
        }
        let event = Event::QuestDequeued {
            quest_id: quest_id.to_string(),
            at: Utc::now(),
        };
        self.feed.publish(event.clone());
        tracing::debug!(quest_id, was_current, "removed");
        if was_current {
            return self.advance();
        }
        Some(event)
    }

    /// Finish the current entry and promote the next. No-op without a current entry.
    pub fn complete_current(&mut self) -> Option<Event> {
        let done = self.current.take()?;
        tracing::debug!(quest_id = done.id(), "current completed");
        self.advance()
    }

    /// Re-sort pending and promote its head to current, replacing whatever
    /// was current. Current becomes absent when nothing is pending.
    pub fn advance(&mut self) -> Option<Event> {
        self.sort_pending();
        self.current = if self.pending.is_empty() {
            None
        } else {
            Some(self.pending.remove(0))
        };
        let quest_id = self.current.as_ref().map(|c| c.id().to_string());
        tracing::debug!(?quest_id, pending = self.pending.len(), "advanced");
        self.feed.emit(Some(Event::CurrentChanged {
            quest_id,
            at: Utc::now(),
        }))
    }

    /// Move `moved_id` to `target_id`'s index in the pending sequence,
    /// shifting the entries in between. Priorities are left untouched.
    pub fn reorder(&mut self, moved_id: &str, target_id: &str) -> Option<Event> {
        let from = self.pending.iter().position(|e| e.id() == moved_id)?;
        let to = self.pending.iter().position(|e| e.id() == target_id)?;
        if from == to {
            return None;
        }
        let entry = self.pending.remove(from);
        self.pending.insert(to, entry);
        tracing::debug!(moved_id, target_id, from, to, "reordered");
        self.feed.emit(Some(Event::QueueReordered {
            moved_id: moved_id.to_string(),
            target_id: target_id.to_string(),
            at: Utc::now(),
        }))
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn sort_pending(&mut self) {
        // Vec::sort_by is stable: ties keep arrival (or manual) order.
        self.pending.sort_by(|a, b| b.priority.cmp(&a.priority));
    }
}
