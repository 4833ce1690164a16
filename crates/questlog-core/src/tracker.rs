//! Quest tracker: the composition root.
//!
//! Owns the ledger, the queue and the focus timer, and implements the
//! control flow between them:
//!
//! ```text
//! enqueue -> queue promotes current -> timer loads it -> timer runs
//!         -> timer completes -> ledger logs completion -> queue advances
//! ```
//!
//! Time-based transitions (today's assignment, stale-day settlement, timer
//! expiry) only happen in [`QuestTracker::tick`], which the host calls on a
//! schedule. All methods take `&mut self`, so ticks and user actions on one
//! tracker are serialized; [`crate::registry::SharedTracker`] extends that
//! across threads.

use chrono::{DateTime, Local, Utc};
use std::sync::Arc;
use tokio::sync::broadcast;

use crate::config::Config;
use crate::day::{Clock, DayKey, SystemClock};
use crate::events::{Event, EventFeed};
use crate::ledger::QuestLedger;
use crate::queue::QuestQueue;
use crate::quest::Quest;
use crate::timer::FocusTimer;

pub struct QuestTracker {
    ledger: QuestLedger,
    queue: QuestQueue,
    timer: FocusTimer,
    config: Config,
    clock: Arc<dyn Clock>,
    feed: EventFeed,
}

impl std::fmt::Debug for QuestTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QuestTracker")
            .field("ledger", &self.ledger)
            .field("queue", &self.queue)
            .field("timer", &self.timer)
            .finish()
    }
}

impl QuestTracker {
    pub fn new(config: Config) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: Config, clock: Arc<dyn Clock>) -> Self {
        let feed = EventFeed::new(config.tracker.event_capacity);
        let ledger = QuestLedger::new()
            .with_clock(clock.clone())
            .with_policy(config.settlement_policy())
            .with_feed(feed.clone());
        let queue = QuestQueue::new().with_feed(feed.clone());
        let mut timer = FocusTimer::new();
        timer.load(None, config.timer.default_minutes);
        Self {
            ledger,
            queue,
            timer,
            config,
            clock,
            feed,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn ledger(&self) -> &QuestLedger {
        &self.ledger
    }

    pub fn queue(&self) -> &QuestQueue {
        &self.queue
    }

    pub fn timer(&self) -> &FocusTimer {
        &self.timer
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn today(&self) -> DayKey {
        self.clock.today()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.feed.subscribe()
    }

    // ── Periodic ─────────────────────────────────────────────────────

    /// Run every time-driven transition for the clock's current instant.
    pub fn tick(&mut self) -> Vec<Event> {
        let now = self.clock.now();
        self.tick_at(now)
    }

    /// Ensure today's record, settle finished days, and advance the timer.
    ///
    /// Idempotent for a fixed `now`.
    pub fn tick_at(&mut self, now: DateTime<Local>) -> Vec<Event> {
        let today = DayKey::from(now);
        let mut events = Vec::new();

        if self.config.tracker.auto_assign_today {
            let daily = self.config.daily_quests();
            events.extend(self.ledger.assign_quests(&daily, today));
        }
        events.extend(self.ledger.settle_due_at(now));

        if let Some(done) = self.feed.emit(self.timer.tick_at(now.with_timezone(&Utc))) {
            tracing::info!(quest_id = ?self.timer.quest_id(), "focus session completed");
            events.push(done);
            events.extend(self.finish_current(today));
        }
        events
    }

    // ── Queue ────────────────────────────────────────────────────────

    pub fn enqueue(&mut self, quest: Quest) -> Option<Event> {
        let event = self.queue.enqueue(quest);
        self.sync_timer();
        event
    }

    pub fn enqueue_with_priority(&mut self, quest: Quest, priority: u8) -> Option<Event> {
        let event = self.queue.enqueue_with_priority(quest, priority);
        self.sync_timer();
        event
    }

    pub fn remove(&mut self, quest_id: &str) -> Option<Event> {
        let event = self.queue.remove(quest_id);
        self.sync_timer();
        event
    }

    pub fn reorder(&mut self, moved_id: &str, target_id: &str) -> Option<Event> {
        self.queue.reorder(moved_id, target_id)
    }

    /// Drop the current quest without completing it and move to the next.
    pub fn skip(&mut self) -> Option<Event> {
        let event = self.queue.advance();
        self.sync_timer();
        event
    }

    // ── Ledger ───────────────────────────────────────────────────────

    pub fn complete_today(&mut self, quest_id: &str) -> Option<Event> {
        self.ledger.complete_quest_today(quest_id)
    }

    pub fn complete_quest(&mut self, quest_id: &str, date: impl Into<DayKey>) -> Option<Event> {
        self.ledger.complete_quest(quest_id, date)
    }

    pub fn settle(&mut self, date: impl Into<DayKey>) -> Option<Event> {
        self.ledger.process_end_of_day(date)
    }

    // ── Focus timer ──────────────────────────────────────────────────

    pub fn start_focus(&mut self) -> Option<Event> {
        let now = self.now_utc();
        self.feed.emit(self.timer.start_at(now))
    }

    pub fn pause_focus(&mut self) -> Option<Event> {
        let now = self.now_utc();
        self.feed.emit(self.timer.pause_at(now))
    }

    pub fn resume_focus(&mut self) -> Option<Event> {
        let now = self.now_utc();
        self.feed.emit(self.timer.resume_at(now))
    }

    pub fn reset_focus(&mut self) -> Option<Event> {
        self.feed.emit(self.timer.reset())
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn now_utc(&self) -> DateTime<Utc> {
        self.clock.now().with_timezone(&Utc)
    }

    /// Credit the current quest to `day` and move the queue along.
    fn finish_current(&mut self, day: DayKey) -> Vec<Event> {
        let mut events = Vec::new();
        if let Some(entry) = self.queue.current().cloned() {
            events.extend(self.ledger.log_completion(&entry.quest, day));
            events.extend(self.queue.complete_current());
        }
        self.sync_timer();
        events
    }

    /// Point the timer at the queue's current entry when they disagree.
    fn sync_timer(&mut self) {
        let current = self.queue.current();
        let current_id = current.map(|c| c.id().to_string());
        if self.timer.quest_id() == current_id.as_deref()
            && self.timer.state() != crate::timer::TimerState::Completed
        {
            return;
        }
        let minutes = current
            .and_then(|c| c.quest.duration_minutes())
            .filter(|m| *m > 0)
            .unwrap_or(self.config.timer.default_minutes);
        tracing::debug!(quest_id = ?current_id, minutes, "timer loaded");
        self.timer.load(current_id, minutes);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::day::FixedClock;
    use crate::quest::Difficulty;
    use crate::timer::TimerState;
    use chrono::Duration;

    fn tracker_at(y: i32, m: u32, d: u32) -> (QuestTracker, FixedClock) {
        let clock = FixedClock::at_noon(DayKey::from_ymd(y, m, d).unwrap());
        let tracker = QuestTracker::with_clock(Config::default(), Arc::new(clock.clone()));
        (tracker, clock)
    }

    #[test]
    fn tick_assigns_today_once() {
        let (mut tracker, _) = tracker_at(2024, 9, 1);
        let first = tracker.tick();
        assert!(matches!(first.first(), Some(Event::QuestsAssigned { .. })));
        assert!(tracker.tick().is_empty());
        let record = tracker.ledger().get_daily_record(tracker.today()).unwrap();
        assert_eq!(record.quests.len(), 5);
    }

    #[test]
    fn tick_settles_yesterday_after_midnight() {
        let (mut tracker, clock) = tracker_at(2024, 9, 1);
        tracker.tick();
        tracker.complete_today("wake7am");
        let day_one = tracker.today();

        clock.advance(Duration::hours(13));
        let events = tracker.tick();
        assert!(events.iter().any(|e| matches!(e, Event::DaySettled { .. })));

        let record = tracker.ledger().get_daily_record(day_one).unwrap();
        assert_eq!(record.total_exp_gained, 20);
        assert_eq!(record.total_exp_lost, -25 - 10 - 25 - 10);
        assert_eq!(record.net_exp, 20 - 70);
        assert!(tracker.tick().is_empty());
    }

    #[test]
    fn enqueue_loads_timer_with_quest_duration() {
        let (mut tracker, _) = tracker_at(2024, 9, 1);
        let quest = Quest::learning("python-intro", "Python", Difficulty::Easy)
            .with_time_estimate("45 min");
        tracker.enqueue(quest);
        assert_eq!(tracker.timer().quest_id(), Some("python-intro"));
        assert_eq!(tracker.timer().total_ms(), 45 * 60 * 1000);
    }

    #[test]
    fn quest_without_estimate_uses_default_minutes() {
        let (mut tracker, _) = tracker_at(2024, 9, 1);
        tracker.enqueue(Quest::learning("x", "X", Difficulty::Easy));
        assert_eq!(tracker.timer().total_ms(), 25 * 60 * 1000);
    }

    #[test]
    fn timer_expiry_credits_ledger_and_advances_queue() {
        let (mut tracker, clock) = tracker_at(2024, 9, 1);
        tracker.tick();
        tracker.enqueue(
            Quest::learning("python-intro", "Python", Difficulty::Easy).with_time_estimate("30 min"),
        );
        tracker.enqueue(Quest::learning("python-lists", "Lists", Difficulty::Normal));
        tracker.start_focus();

        clock.advance(Duration::minutes(31));
        let events = tracker.tick();
        assert!(events.iter().any(|e| matches!(e, Event::TimerCompleted { .. })));

        let today = tracker.today();
        let record = tracker.ledger().get_daily_record(today).unwrap();
        assert!(record.status("python-intro").unwrap().completed);
        assert_eq!(record.total_exp_gained, 20);

        assert_eq!(tracker.queue().current().map(|c| c.id()), Some("python-lists"));
        assert_eq!(tracker.timer().quest_id(), Some("python-lists"));
        assert_eq!(tracker.timer().state(), TimerState::Idle);
    }

    #[test]
    fn finishing_last_quest_leaves_idle_default_timer() {
        let (mut tracker, clock) = tracker_at(2024, 9, 1);
        tracker.enqueue(Quest::learning("x", "X", Difficulty::Easy).with_time_estimate("5 min"));
        tracker.start_focus();
        clock.advance(Duration::minutes(5));
        tracker.tick();
        assert!(tracker.queue().is_empty());
        assert_eq!(tracker.timer().quest_id(), None);
        assert_eq!(tracker.timer().state(), TimerState::Idle);
    }

    #[test]
    fn removing_current_reloads_timer() {
        let (mut tracker, _) = tracker_at(2024, 9, 1);
        tracker.enqueue(Quest::learning("a", "A", Difficulty::Easy));
        tracker.enqueue(Quest::learning("b", "B", Difficulty::Hard).with_time_estimate("1 hour"));
        tracker.start_focus();
        tracker.remove("a");
        assert_eq!(tracker.timer().quest_id(), Some("b"));
        assert_eq!(tracker.timer().state(), TimerState::Idle);
        assert_eq!(tracker.timer().total_ms(), 60 * 60 * 1000);
    }

    #[test]
    fn subscribers_see_tracker_events() {
        let (mut tracker, _) = tracker_at(2024, 9, 1);
        let mut rx = tracker.subscribe();
        tracker.tick();
        assert!(matches!(rx.try_recv(), Ok(Event::QuestsAssigned { .. })));
    }

    #[test]
    fn auto_assign_can_be_disabled() {
        let clock = FixedClock::at_noon(DayKey::from_ymd(2024, 9, 1).unwrap());
        let mut config = Config::default();
        config.tracker.auto_assign_today = false;
        let mut tracker = QuestTracker::with_clock(config, Arc::new(clock));
        tracker.tick();
        assert!(tracker.ledger().is_empty());
    }
}
