//! Focus timer engine.
//!
//! The focus timer is a wall-clock-based countdown for the quest at the head
//! of the queue. It does not use internal threads - the caller is responsible
//! for calling `tick()` periodically.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Running <-> Paused
//!         Running -> Completed -> (load) Idle
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let mut timer = FocusTimer::new();
//! timer.load(Some("python-intro".into()), 45);
//! timer.start();
//! // In a loop:
//! timer.tick(); // Returns Some(Event::TimerCompleted) when the countdown ends
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::events::Event;

pub const DEFAULT_FOCUS_MINUTES: u64 = 25;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerState {
    Idle,
    Running,
    Paused,
    Completed,
}

/// Countdown against a single quest.
///
/// Operates on wall-clock deltas -- no internal thread.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FocusTimer {
    state: TimerState,
    quest_id: Option<String>,
    /// Total session length in milliseconds.
    duration_ms: u64,
    /// Remaining time in milliseconds.
    remaining_ms: u64,
    /// Instant of the last start/resume/tick while running.
    #[serde(default)]
    last_tick: Option<DateTime<Utc>>,
}

impl Default for FocusTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl FocusTimer {
    /// Idle timer with the default session length and no quest.
    pub fn new() -> Self {
        let duration_ms = minutes_to_ms(DEFAULT_FOCUS_MINUTES);
        Self {
            state: TimerState::Idle,
            quest_id: None,
            duration_ms,
            remaining_ms: duration_ms,
            last_tick: None,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn quest_id(&self) -> Option<&str> {
        self.quest_id.as_deref()
    }

    pub fn remaining_ms(&self) -> u64 {
        self.remaining_ms
    }

    pub fn total_ms(&self) -> u64 {
        self.duration_ms
    }

    /// 0.0 .. 1.0 progress through the session.
    pub fn progress(&self) -> f64 {
        if self.duration_ms == 0 {
            return 0.0;
        }
        1.0 - (self.remaining_ms as f64 / self.duration_ms as f64)
    }

    pub fn snapshot(&self) -> Event {
        Event::TimerSnapshot {
            state: self.state,
            quest_id: self.quest_id.clone(),
            remaining_ms: self.remaining_ms,
            total_ms: self.duration_ms,
            progress: self.progress(),
            at: Utc::now(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Point the timer at a quest and session length. Always resets to Idle.
    pub fn load(&mut self, quest_id: Option<String>, minutes: u64) {
        self.quest_id = quest_id;
        self.duration_ms = minutes_to_ms(minutes);
        self.remaining_ms = self.duration_ms;
        self.state = TimerState::Idle;
        self.last_tick = None;
    }

    pub fn start(&mut self) -> Option<Event> {
        self.start_at(Utc::now())
    }

    pub fn start_at(&mut self, now: DateTime<Utc>) -> Option<Event> {
        match self.state {
            TimerState::Idle | TimerState::Completed => {
                if self.state == TimerState::Completed {
                    self.remaining_ms = self.duration_ms;
                }
                self.state = TimerState::Running;
                self.last_tick = Some(now);
                Some(Event::TimerStarted {
                    quest_id: self.quest_id.clone(),
                    duration_secs: self.duration_ms / 1000,
                    at: now,
                })
            }
            TimerState::Paused => self.resume_at(now),
            TimerState::Running => None,
        }
    }

    pub fn pause(&mut self) -> Option<Event> {
        self.pause_at(Utc::now())
    }

    pub fn pause_at(&mut self, now: DateTime<Utc>) -> Option<Event> {
        if self.state != TimerState::Running {
            return None;
        }
        // Flush elapsed time first.
        self.flush_elapsed(now);
        self.state = TimerState::Paused;
        self.last_tick = None;
        Some(Event::TimerPaused {
            remaining_ms: self.remaining_ms,
            at: now,
        })
    }

    pub fn resume(&mut self) -> Option<Event> {
        self.resume_at(Utc::now())
    }

    pub fn resume_at(&mut self, now: DateTime<Utc>) -> Option<Event> {
        if self.state != TimerState::Paused {
            return None;
        }
        self.state = TimerState::Running;
        self.last_tick = Some(now);
        Some(Event::TimerResumed {
            remaining_ms: self.remaining_ms,
            at: now,
        })
    }

    pub fn reset(&mut self) -> Option<Event> {
        self.state = TimerState::Idle;
        self.remaining_ms = self.duration_ms;
        self.last_tick = None;
        Some(Event::TimerReset { at: Utc::now() })
    }

    pub fn tick(&mut self) -> Option<Event> {
        self.tick_at(Utc::now())
    }

    /// Returns `Some(Event::TimerCompleted)` exactly once, when the countdown hits zero.
    pub fn tick_at(&mut self, now: DateTime<Utc>) -> Option<Event> {
        if self.state != TimerState::Running {
            return None;
        }
        self.flush_elapsed(now);
        if self.remaining_ms > 0 {
            return None;
        }
        self.state = TimerState::Completed;
        self.last_tick = None;
        Some(Event::TimerCompleted {
            quest_id: self.quest_id.clone(),
            at: now,
        })
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn flush_elapsed(&mut self, now: DateTime<Utc>) {
        if let Some(last) = self.last_tick {
            // A clock that went backwards counts as no time passing.
            let elapsed = u64::try_from((now - last).num_milliseconds()).unwrap_or(0);
            self.remaining_ms = self.remaining_ms.saturating_sub(elapsed);
            self.last_tick = Some(now.max(last));
        }
    }
}

fn minutes_to_ms(minutes: u64) -> u64 {
    minutes.saturating_mul(60).saturating_mul(1000)
}
