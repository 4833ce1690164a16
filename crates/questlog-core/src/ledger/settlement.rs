//! When a past day becomes eligible for automatic settlement.

use chrono::{DateTime, Duration, Local};
use serde::{Deserialize, Serialize};

use crate::day::DayKey;

/// How "the day is over" is decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SettlementMode {
    /// A day is due as soon as the local calendar moves past it.
    #[default]
    CalendarDay,
    /// A day is due once `hours` have elapsed since its local midnight.
    ElapsedHours,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementPolicy {
    pub mode: SettlementMode,
    pub hours: u32,
}

impl Default for SettlementPolicy {
    fn default() -> Self {
        Self {
            mode: SettlementMode::CalendarDay,
            hours: 24,
        }
    }
}

impl SettlementPolicy {
    pub fn calendar_day() -> Self {
        Self::default()
    }

    pub fn elapsed_hours(hours: u32) -> Self {
        Self {
            mode: SettlementMode::ElapsedHours,
            hours,
        }
    }

    /// Whether `date` may be settled at `now`. Today is never due.
    pub fn is_due(&self, date: DayKey, now: DateTime<Local>) -> bool {
        let today = DayKey::from(now);
        if date >= today {
            return false;
        }
        match self.mode {
            SettlementMode::CalendarDay => true,
            SettlementMode::ElapsedHours => match date.start_local() {
                Some(start) => now - start >= Duration::hours(i64::from(self.hours)),
                None => true,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn local(y: i32, m: u32, d: u32, h: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(y, m, d, h, 0, 0).earliest().unwrap()
    }

    #[test]
    fn today_is_never_due() {
        let now = local(2024, 3, 10, 23);
        let today = DayKey::from(now);
        assert!(!SettlementPolicy::calendar_day().is_due(today, now));
        assert!(!SettlementPolicy::elapsed_hours(0).is_due(today, now));
    }

    #[test]
    fn calendar_day_settles_yesterday_right_after_midnight() {
        let now = local(2024, 3, 11, 0);
        let yesterday = DayKey::from_ymd(2024, 3, 10).unwrap();
        assert!(SettlementPolicy::calendar_day().is_due(yesterday, now));
    }

    #[test]
    fn elapsed_hours_waits_for_threshold() {
        let yesterday = DayKey::from_ymd(2024, 3, 10).unwrap();
        let policy = SettlementPolicy::elapsed_hours(36);
        assert!(!policy.is_due(yesterday, local(2024, 3, 11, 6)));
        assert!(policy.is_due(yesterday, local(2024, 3, 11, 13)));
    }

    #[test]
    fn future_dates_are_not_due() {
        let now = local(2024, 3, 10, 12);
        let tomorrow = DayKey::from_ymd(2024, 3, 11).unwrap();
        assert!(!SettlementPolicy::calendar_day().is_due(tomorrow, now));
    }
}
