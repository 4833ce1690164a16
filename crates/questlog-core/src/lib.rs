//! # Questlog Core Library
//!
//! This library provides the core business logic for Questlog, a gamified
//! daily quest tracker. Habits and learning tasks are modelled as quests that
//! carry experience; completing them earns exp, missing a daily habit costs
//! exp once the day is over.
//!
//! ## Architecture
//!
//! - **Ledger**: Per-day quest records, experience accounting and
//!   end-of-day penalty settlement
//! - **Queue**: Priority-ordered backlog with a single current quest
//! - **Focus Timer**: A wall-clock countdown that requires the caller to
//!   periodically invoke `tick()`
//! - **Tracker**: Wires the three together behind one idempotent `tick()`
//!
//! State lives in memory only. Changes are observable through the
//! [`EventFeed`] broadcast channel.
//!
//! ## Key Components
//!
//! - [`QuestLedger`]: Daily tracking ledger
//! - [`QuestQueue`]: Quest priority queue
//! - [`FocusTimer`]: Countdown state machine
//! - [`QuestTracker`]: Composition root driven by `tick()`
//! - [`Config`]: Application configuration management

pub mod config;
pub mod day;
pub mod error;
pub mod events;
pub mod ledger;
pub mod queue;
pub mod quest;
pub mod registry;
pub mod timer;
pub mod tracker;

pub use config::Config;
pub use day::{Clock, DayKey, FixedClock, SystemClock};
pub use error::{ConfigError, CoreError, ValidationError};
pub use events::{Event, EventFeed};
pub use ledger::{
    DailyQuestStatus, DailyRecord, DayMark, DaySummary, MonthSummary, QuestLedger,
    SettlementMode, SettlementPolicy,
};
pub use queue::{QueueEntry, QuestQueue};
pub use quest::{Difficulty, Quest, QuestType};
pub use registry::SharedTracker;
pub use timer::{FocusTimer, TimerState};
pub use tracker::QuestTracker;
