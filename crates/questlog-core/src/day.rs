//! Calendar-day keys and the clock abstraction.
//!
//! Every ledger lookup goes through a [`DayKey`], so two instants on the same
//! calendar day always resolve to the same record.

use chrono::{DateTime, Datelike, Local, NaiveDate, NaiveDateTime, TimeZone};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, Mutex, PoisonError};

use crate::error::ValidationError;

/// Day-granularity key, formatted as `YYYY-MM-DD`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DayKey(NaiveDate);

impl DayKey {
    pub fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(Self)
    }

    pub fn date(self) -> NaiveDate {
        self.0
    }

    pub fn year(self) -> i32 {
        self.0.year()
    }

    pub fn month(self) -> u32 {
        self.0.month()
    }

    pub fn pred(self) -> Option<Self> {
        self.0.pred_opt().map(Self)
    }

    pub fn succ(self) -> Option<Self> {
        self.0.succ_opt().map(Self)
    }

    /// Local midnight at the start of this day.
    ///
    /// Falls back to the earliest valid local time when midnight is skipped
    /// by a DST transition.
    pub fn start_local(self) -> Option<DateTime<Local>> {
        let midnight = self.0.and_hms_opt(0, 0, 0)?;
        Local.from_local_datetime(&midnight).earliest()
    }
}

impl fmt::Display for DayKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

impl FromStr for DayKey {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
            .map(Self)
            .map_err(|_| ValidationError::InvalidDate(s.to_string()))
    }
}

impl From<NaiveDate> for DayKey {
    fn from(date: NaiveDate) -> Self {
        Self(date)
    }
}

impl From<NaiveDateTime> for DayKey {
    fn from(dt: NaiveDateTime) -> Self {
        Self(dt.date())
    }
}

/// The calendar date in the zone the instant carries.
impl<Tz: TimeZone> From<DateTime<Tz>> for DayKey {
    fn from(dt: DateTime<Tz>) -> Self {
        Self(dt.date_naive())
    }
}

impl<Tz: TimeZone> From<&DateTime<Tz>> for DayKey {
    fn from(dt: &DateTime<Tz>) -> Self {
        Self(dt.date_naive())
    }
}

/// Source of "now" for everything that needs a wall clock.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Local>;

    fn today(&self) -> DayKey {
        DayKey::from(self.now())
    }
}

/// The real local clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// Manually driven clock for tests and simulations.
///
/// Clones share the same instant.
#[derive(Debug, Clone)]
pub struct FixedClock {
    now: Arc<Mutex<DateTime<Local>>>,
}

impl FixedClock {
    pub fn new(now: DateTime<Local>) -> Self {
        Self {
            now: Arc::new(Mutex::new(now)),
        }
    }

    /// Clock fixed at local noon of the given day.
    pub fn at_noon(day: DayKey) -> Self {
        let noon = day
            .date()
            .and_hms_opt(12, 0, 0)
            .and_then(|dt| Local.from_local_datetime(&dt).earliest())
            .unwrap_or_else(Local::now);
        Self::new(noon)
    }

    pub fn set(&self, now: DateTime<Local>) {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner) = now;
    }

    pub fn advance(&self, by: chrono::Duration) {
        let mut guard = self.now.lock().unwrap_or_else(PoisonError::into_inner);
        *guard += by;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Local> {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn parses_and_displays_iso_dates() {
        let key: DayKey = "2024-03-09".parse().unwrap();
        assert_eq!(key.to_string(), "2024-03-09");
        assert_eq!(key, DayKey::from_ymd(2024, 3, 9).unwrap());
        assert!("2024-3-9x".parse::<DayKey>().is_err());
        assert!("2024-02-30".parse::<DayKey>().is_err());
    }

    #[test]
    fn different_times_same_day_share_a_key() {
        let date = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let morning = date.and_hms_opt(0, 5, 0).unwrap();
        let night = date.and_hms_opt(23, 59, 59).unwrap();
        assert_eq!(DayKey::from(morning), DayKey::from(night));
    }

    #[test]
    fn serializes_as_plain_string() {
        let key = DayKey::from_ymd(2025, 1, 31).unwrap();
        assert_eq!(serde_json::to_string(&key).unwrap(), "\"2025-01-31\"");
    }

    #[test]
    fn fixed_clock_advances_shared_instant() {
        let clock = FixedClock::at_noon(DayKey::from_ymd(2024, 5, 10).unwrap());
        let other = clock.clone();
        clock.advance(Duration::hours(13));
        assert_eq!(other.today(), DayKey::from_ymd(2024, 5, 11).unwrap());
    }
}
