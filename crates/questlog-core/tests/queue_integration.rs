//! Integration tests for the quest priority queue.

use questlog_core::{Difficulty, Quest, QuestQueue};

fn quest(id: &str, difficulty: Difficulty) -> Quest {
    Quest::learning(id, id, difficulty)
}

fn current(queue: &QuestQueue) -> Option<String> {
    queue.current().map(|c| c.id().to_string())
}

#[test]
fn test_advance_follows_priority() {
    let mut queue = QuestQueue::new();
    queue.enqueue(quest("warmup", Difficulty::Normal));
    queue.enqueue(quest("easy", Difficulty::Easy));
    queue.enqueue(quest("extreme", Difficulty::Extreme));
    queue.enqueue(quest("normal", Difficulty::Normal));

    queue.advance();
    assert_eq!(current(&queue).as_deref(), Some("extreme"));
    queue.advance();
    assert_eq!(current(&queue).as_deref(), Some("normal"));
    assert_eq!(queue.pending_ids(), vec!["easy"]);
}

#[test]
fn test_first_quest_auto_starts() {
    let mut queue = QuestQueue::new();
    queue.enqueue(quest("only", Difficulty::Hard));
    assert_eq!(current(&queue).as_deref(), Some("only"));
    assert!(queue.pending().is_empty());
}

#[test]
fn test_manual_order_survives_stable_resort() {
    let mut queue = QuestQueue::new();
    queue.enqueue(quest("warmup", Difficulty::Easy));
    queue.enqueue(quest("a", Difficulty::Hard));
    queue.enqueue(quest("b", Difficulty::Hard));
    assert_eq!(queue.pending_ids(), vec!["a", "b"]);

    queue.reorder("b", "a");
    assert_eq!(queue.pending_ids(), vec!["b", "a"]);

    queue.enqueue(quest("c", Difficulty::Easy));
    assert_eq!(queue.pending_ids(), vec!["b", "a", "c"]);
}

#[test]
fn test_manual_order_against_priority_is_resorted_later() {
    let mut queue = QuestQueue::new();
    queue.enqueue(quest("warmup", Difficulty::Easy));
    queue.enqueue(quest("high", Difficulty::Extreme));
    queue.enqueue(quest("low", Difficulty::Easy));
    queue.reorder("low", "high");
    assert_eq!(queue.pending_ids(), vec!["low", "high"]);

    queue.enqueue(quest("mid", Difficulty::Normal));
    assert_eq!(queue.pending_ids(), vec!["high", "mid", "low"]);
}

#[test]
fn test_removing_current_promotes_next() {
    let mut queue = QuestQueue::new();
    queue.enqueue(quest("a", Difficulty::Easy));
    queue.enqueue(quest("b", Difficulty::Normal));
    queue.enqueue(quest("c", Difficulty::Hard));
    assert_eq!(queue.pending_ids(), vec!["c", "b"]);

    queue.remove("a");
    assert_eq!(current(&queue).as_deref(), Some("c"));
    assert_eq!(queue.pending_ids(), vec!["b"]);
}

#[test]
fn test_current_is_never_pending() {
    let mut queue = QuestQueue::new();
    for (i, difficulty) in [Difficulty::Easy, Difficulty::Extreme, Difficulty::Hard, Difficulty::Normal]
        .into_iter()
        .enumerate()
    {
        queue.enqueue(quest(&format!("q{i}"), difficulty));
        let cur = current(&queue).unwrap();
        assert!(!queue.pending_ids().contains(&cur.as_str()));
    }
    while queue.current().is_some() {
        queue.complete_current();
        if let Some(cur) = current(&queue) {
            assert!(!queue.pending_ids().contains(&cur.as_str()));
        }
    }
    assert!(queue.is_empty());
}

#[test]
fn test_completed_quest_can_be_enqueued_again() {
    let mut queue = QuestQueue::new();
    queue.enqueue(quest("a", Difficulty::Easy));
    queue.complete_current();
    assert!(queue.enqueue(quest("a", Difficulty::Easy)).is_some());
    assert_eq!(current(&queue).as_deref(), Some("a"));
}
