//! Integration tests for the daily tracking ledger.

use std::sync::Arc;

use chrono::Duration;
use questlog_core::{
    Clock, DayKey, Difficulty, FixedClock, Quest, QuestLedger, SettlementPolicy,
};

fn day(d: u32) -> DayKey {
    DayKey::from_ymd(2024, 10, d).unwrap()
}

fn wake() -> Quest {
    Quest::lifestyle("wake7am", "Wake up at 7 AM", Difficulty::Easy).with_exp(20)
}

#[test]
fn test_missed_easy_habit_costs_ten_exp() {
    let mut ledger = QuestLedger::new();
    ledger.assign_quests(&[wake()], day(1));
    ledger.process_end_of_day(day(1));

    let record = ledger.get_daily_record(day(1)).unwrap();
    assert_eq!(record.total_exp_gained, 0);
    assert_eq!(record.total_exp_lost, -10);
    assert_eq!(record.net_exp, -10);
}

#[test]
fn test_assignment_is_first_call_wins() {
    let mut ledger = QuestLedger::new();
    ledger.assign_quests(&[wake()], day(1));
    ledger.assign_quests(
        &[
            Quest::lifestyle("gym-workout", "Gym", Difficulty::Normal),
            Quest::lifestyle("meditation", "Meditate", Difficulty::Easy),
        ],
        day(1),
    );
    let ids: Vec<&str> = ledger
        .get_daily_record(day(1))
        .unwrap()
        .quests
        .iter()
        .map(|s| s.quest_id.as_str())
        .collect();
    assert_eq!(ids, vec!["wake7am"]);
}

#[test]
fn test_double_completion_awards_once() {
    let mut ledger = QuestLedger::new();
    ledger.assign_quests(&[wake()], day(1));
    ledger.complete_quest("wake7am", day(1));
    let after_first = ledger.get_daily_record(day(1)).unwrap().clone();
    ledger.complete_quest("wake7am", day(1));
    let after_second = ledger.get_daily_record(day(1)).unwrap();
    assert_eq!(&after_first, after_second);
    assert_eq!(after_second.total_exp_gained, 20);
}

#[test]
fn test_settlement_twice_equals_once() {
    let mut ledger = QuestLedger::new();
    ledger.assign_quests(
        &[
            wake(),
            Quest::lifestyle("gym-workout", "Gym", Difficulty::VeryHard),
        ],
        day(1),
    );
    ledger.process_end_of_day(day(1));
    let once = ledger.get_daily_record(day(1)).unwrap().total_exp_lost;
    ledger.process_end_of_day(day(1));
    let twice = ledger.get_daily_record(day(1)).unwrap().total_exp_lost;
    assert_eq!(once, -110);
    assert_eq!(once, twice);
}

#[test]
fn test_learning_quest_is_never_penalized() {
    let mut ledger = QuestLedger::new();
    let learning = Quest::learning("linear-algebra", "Linear Algebra", Difficulty::Hard);
    ledger.assign_quests(&[learning], day(1));
    ledger.process_end_of_day(day(1));
    let record = ledger.get_daily_record(day(1)).unwrap();
    assert_eq!(record.status("linear-algebra").unwrap().exp_lost, 0);
    assert_eq!(record.net_exp, 0);
}

#[test]
fn test_reading_never_creates_records() {
    let ledger = QuestLedger::new();
    assert!(ledger.get_daily_record(day(1)).is_none());
    assert!(ledger.is_empty());
}

#[test]
fn test_times_on_same_day_share_record() {
    let mut ledger = QuestLedger::new();
    let morning = day(3).date().and_hms_opt(6, 0, 0).unwrap();
    let evening = day(3).date().and_hms_opt(22, 30, 0).unwrap();
    ledger.assign_quests(&[wake()], morning);
    ledger.complete_quest("wake7am", evening);
    assert!(ledger.get_daily_record(day(3)).unwrap().status("wake7am").unwrap().completed);
}

#[test]
fn test_automatic_settlement_after_days_away() {
    let clock = FixedClock::at_noon(day(1));
    let mut ledger = QuestLedger::new().with_clock(Arc::new(clock.clone()));
    ledger.assign_quests_today(&[wake()]);
    clock.advance(Duration::days(1));
    ledger.assign_quests_today(&[wake()]);
    ledger.complete_quest_today("wake7am");

    // Four days pass without the app being opened.
    clock.advance(Duration::days(4));
    let events = ledger.settle_due();
    assert_eq!(events.len(), 1);
    assert_eq!(ledger.get_daily_record(day(1)).unwrap().net_exp, -10);
    assert_eq!(ledger.get_daily_record(day(2)).unwrap().net_exp, 20);
    assert!(ledger.settle_due().is_empty());
}

#[test]
fn test_elapsed_hours_policy_delays_settlement() {
    let clock = FixedClock::at_noon(day(1));
    let mut ledger = QuestLedger::new()
        .with_clock(Arc::new(clock.clone()))
        .with_policy(SettlementPolicy::elapsed_hours(48));
    ledger.assign_quests_today(&[wake()]);

    clock.advance(Duration::days(1));
    assert!(ledger.settle_due().is_empty());
    assert!(ledger.pending_settlement(clock.now()).is_empty());

    clock.advance(Duration::days(1));
    assert_eq!(ledger.settle_due().len(), 1);
}
