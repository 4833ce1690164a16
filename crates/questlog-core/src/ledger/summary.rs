//! Read-only aggregates over ledger records for calendar and monthly views.

use serde::{Deserialize, Serialize};

use super::{DailyRecord, QuestLedger};
use crate::day::DayKey;

/// Calendar marker for a day's outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DayMark {
    Gain,
    Loss,
    Even,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaySummary {
    pub date: DayKey,
    pub completed: usize,
    pub total: usize,
    pub exp_gained: i64,
    pub exp_lost: i64,
    pub net_exp: i64,
    pub mark: DayMark,
}

impl From<&DailyRecord> for DaySummary {
    fn from(record: &DailyRecord) -> Self {
        let mark = match record.net_exp {
            n if n > 0 => DayMark::Gain,
            n if n < 0 => DayMark::Loss,
            _ => DayMark::Even,
        };
        Self {
            date: record.date,
            completed: record.completed_count(),
            total: record.quests.len(),
            exp_gained: record.total_exp_gained,
            exp_lost: record.total_exp_lost,
            net_exp: record.net_exp,
            mark,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthSummary {
    pub year: i32,
    pub month: u32,
    /// Days with a record.
    pub days_active: usize,
    pub quests_completed: usize,
    /// Sum of net exp across the month.
    pub total_exp: i64,
    /// Highest single-day net exp, floored at 0.
    pub best_day: i64,
}

impl QuestLedger {
    pub fn day_summaries(&self) -> Vec<DaySummary> {
        self.records().map(DaySummary::from).collect()
    }

    pub fn month_summary(&self, year: i32, month: u32) -> MonthSummary {
        let in_month: Vec<&DailyRecord> = self
            .records()
            .filter(|r| r.date.year() == year && r.date.month() == month)
            .collect();
        MonthSummary {
            year,
            month,
            days_active: in_month.len(),
            quests_completed: in_month.iter().map(|r| r.completed_count()).sum(),
            total_exp: in_month.iter().map(|r| r.net_exp).sum(),
            best_day: in_month.iter().map(|r| r.net_exp).max().unwrap_or(0).max(0),
        }
    }

    /// Consecutive fulfilled days ending at `today`.
    ///
    /// A day is fulfilled when every lifestyle quest it tracks was completed.
    /// An unfulfilled `today` does not break the streak; it just isn't counted.
    pub fn current_streak(&self, today: DayKey) -> u32 {
        let fulfilled = |day: DayKey| {
            self.get_daily_record(day)
                .is_some_and(DailyRecord::lifestyle_fulfilled)
        };
        let mut cursor = if fulfilled(today) {
            Some(today)
        } else {
            today.pred()
        };
        let mut streak = 0;
        while let Some(day) = cursor {
            if !fulfilled(day) {
                break;
            }
            streak += 1;
            cursor = day.pred();
        }
        streak
    }
}
