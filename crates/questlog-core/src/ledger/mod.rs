//! Daily tracking ledger.
//!
//! The ledger is the authoritative record of what was asked of the user each
//! day and what experience resulted. Records are created the first time a day
//! is touched and are only ever updated afterwards.
//!
//! ## Failure semantics
//!
//! Nothing here returns an error. Unknown dates, unknown quest ids, repeated
//! assignment, double completion and repeated settlement are all no-ops; a
//! mutating call returns `Some(Event)` only when it changed state.
//!
//! ## Usage
//!
//! ```ignore
//! let mut ledger = QuestLedger::new();
//! ledger.assign_quests_today(&daily_quests());
//! ledger.complete_quest_today("wake7am");
//! // Periodically:
//! ledger.settle_due(); // penalizes days that are over
//! ```

mod record;
mod settlement;
mod summary;

pub use record::{DailyQuestStatus, DailyRecord};
pub use settlement::{SettlementMode, SettlementPolicy};
pub use summary::{DayMark, DaySummary, MonthSummary};

use chrono::{DateTime, Local, Utc};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::broadcast;

use crate::day::{Clock, DayKey, SystemClock};
use crate::events::{Event, EventFeed};
use crate::quest::Quest;

/// Per-day quest records and experience accounting.
pub struct QuestLedger {
    records: BTreeMap<DayKey, DailyRecord>,
    clock: Arc<dyn Clock>,
    policy: SettlementPolicy,
    feed: EventFeed,
}

impl std::fmt::Debug for QuestLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QuestLedger")
            .field("records", &self.records.len())
            .field("policy", &self.policy)
            .finish()
    }
}

impl Default for QuestLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl QuestLedger {
    pub fn new() -> Self {
        Self {
            records: BTreeMap::new(),
            clock: Arc::new(SystemClock),
            policy: SettlementPolicy::default(),
            feed: EventFeed::default(),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_policy(mut self, policy: SettlementPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Publish into an existing feed instead of a private one.
    pub fn with_feed(mut self, feed: EventFeed) -> Self {
        self.feed = feed;
        self
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn today(&self) -> DayKey {
        self.clock.today()
    }

    pub fn policy(&self) -> SettlementPolicy {
        self.policy
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.feed.subscribe()
    }

    /// Read-only lookup. Never creates a record.
    pub fn get_daily_record(&self, date: impl Into<DayKey>) -> Option<&DailyRecord> {
        self.records.get(&date.into())
    }

    /// All records in date order.
    pub fn records(&self) -> impl Iterator<Item = &DailyRecord> {
        self.records.values()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Dates the automatic settlement would process at `now`.
    pub fn pending_settlement(&self, now: DateTime<Local>) -> Vec<DayKey> {
        self.records
            .values()
            .filter(|r| r.needs_settlement() && self.policy.is_due(r.date, now))
            .map(|r| r.date)
            .collect()
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Register `quests` as the tracked set for `date`. First assignment wins.
    pub fn assign_quests(&mut self, quests: &[Quest], date: impl Into<DayKey>) -> Option<Event> {
        let date = date.into();
        if self.records.contains_key(&date) {
            tracing::trace!(%date, "quests already assigned");
            return None;
        }
        let record = DailyRecord::new(date, quests);
        let quest_ids = record.quests.iter().map(|s| s.quest_id.clone()).collect();
        self.records.insert(date, record);
        tracing::debug!(%date, count = quests.len(), "assigned quests");
        self.feed.emit(Some(Event::QuestsAssigned {
            date,
            quest_ids,
            at: Utc::now(),
        }))
    }

    pub fn assign_quests_today(&mut self, quests: &[Quest]) -> Option<Event> {
        let today = self.today();
        self.assign_quests(quests, today)
    }

    /// Mark `quest_id` completed on `date` and award its experience once.
    ///
    /// No-op when the day or quest is not tracked, the quest is already
    /// completed, or the day was already settled against it.
    pub fn complete_quest(&mut self, quest_id: &str, date: impl Into<DayKey>) -> Option<Event> {
        let date = date.into();
        let completed_at = self.clock.now().with_timezone(&Utc);
        let Some(record) = self.records.get_mut(&date) else {
            tracing::trace!(%date, quest_id, "no record for date");
            return None;
        };
        let status = record.status_mut(quest_id)?;
        if status.completed || status.exp_lost != 0 {
            tracing::trace!(%date, quest_id, "quest already resolved");
            return None;
        }
        let exp_gained = status.quest.difficulty.exp_reward();
        status.completed = true;
        status.completed_at = Some(completed_at);
        status.exp_gained = exp_gained;
        record.recompute_totals();
        tracing::debug!(%date, quest_id, exp_gained, net = record.net_exp, "quest completed");
        self.feed.emit(Some(Event::QuestCompleted {
            date,
            quest_id: quest_id.to_string(),
            exp_gained,
            at: Utc::now(),
        }))
    }

    pub fn complete_quest_today(&mut self, quest_id: &str) -> Option<Event> {
        let today = self.today();
        self.complete_quest(quest_id, today)
    }

    /// Complete a quest that may not be part of the day's assignment.
    ///
    /// Appends a status for `quest` when the day does not track it yet (creating
    /// the day's record if needed), then completes it like [`Self::complete_quest`].
    pub fn log_completion(&mut self, quest: &Quest, date: impl Into<DayKey>) -> Option<Event> {
        let date = date.into();
        let record = self
            .records
            .entry(date)
            .or_insert_with(|| DailyRecord::new(date, &[]));
        if record.status(&quest.id).is_none() {
            record.quests.push(DailyQuestStatus::new(quest.clone()));
            tracing::debug!(%date, quest_id = %quest.id, "tracking ad-hoc quest");
        }
        self.complete_quest(&quest.id, date)
    }

    /// Penalize every unsettled, incomplete lifestyle quest of `date`.
    ///
    /// Safe to call repeatedly: statuses that already carry a penalty are
    /// skipped, so penalties never compound.
    pub fn process_end_of_day(&mut self, date: impl Into<DayKey>) -> Option<Event> {
        let date = date.into();
        let record = self.records.get_mut(&date)?;
        let mut penalized = Vec::new();
        for status in record.quests.iter_mut().filter(|s| s.awaits_settlement()) {
            status.exp_lost = status.quest.difficulty.exp_penalty();
            penalized.push(status.quest_id.clone());
        }
        if penalized.is_empty() {
            tracing::trace!(%date, "nothing to settle");
            return None;
        }
        record.recompute_totals();
        tracing::info!(
            %date,
            penalized = penalized.len(),
            total_exp_lost = record.total_exp_lost,
            "day settled"
        );
        let event = Event::DaySettled {
            date,
            penalized,
            total_exp_lost: record.total_exp_lost,
            net_exp: record.net_exp,
            at: Utc::now(),
        };
        self.feed.emit(Some(event))
    }

    /// Settle every day the policy considers over, using the ledger's clock.
    pub fn settle_due(&mut self) -> Vec<Event> {
        let now = self.clock.now();
        self.settle_due_at(now)
    }

    pub fn settle_due_at(&mut self, now: DateTime<Local>) -> Vec<Event> {
        self.pending_settlement(now)
            .into_iter()
            .filter_map(|date| self.process_end_of_day(date))
            .collect()
    }
}
