use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::day::DayKey;
use crate::quest::Quest;

/// Completion state of one quest on one day.
///
/// `exp_gained` and `exp_lost` are never both nonzero: settlement skips
/// completed quests and completion skips penalized ones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyQuestStatus {
    pub quest_id: String,
    pub quest: Quest,
    pub completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
    /// >= 0, set once on completion.
    pub exp_gained: i64,
    /// <= 0, set at most once at settlement.
    pub exp_lost: i64,
}

impl DailyQuestStatus {
    pub fn new(quest: Quest) -> Self {
        Self {
            quest_id: quest.id.clone(),
            quest,
            completed: false,
            completed_at: None,
            exp_gained: 0,
            exp_lost: 0,
        }
    }

    /// Incomplete lifestyle quest that settlement has not touched yet.
    pub fn awaits_settlement(&self) -> bool {
        !self.completed && self.quest.quest_type.is_penalized() && self.exp_lost == 0
    }
}

/// One calendar day of quest tracking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyRecord {
    pub date: DayKey,
    pub quests: Vec<DailyQuestStatus>,
    pub total_exp_gained: i64,
    pub total_exp_lost: i64,
    pub net_exp: i64,
    pub lifestyle_quests_assigned: Vec<Quest>,
}

impl DailyRecord {
    /// Build a fresh record; duplicate quest ids keep their first occurrence.
    pub fn new(date: DayKey, quests: &[Quest]) -> Self {
        let mut statuses: Vec<DailyQuestStatus> = Vec::with_capacity(quests.len());
        for quest in quests {
            if statuses.iter().any(|s| s.quest_id == quest.id) {
                continue;
            }
            statuses.push(DailyQuestStatus::new(quest.clone()));
        }
        let lifestyle_quests_assigned = statuses
            .iter()
            .filter(|s| s.quest.is_lifestyle())
            .map(|s| s.quest.clone())
            .collect();
        Self {
            date,
            quests: statuses,
            total_exp_gained: 0,
            total_exp_lost: 0,
            net_exp: 0,
            lifestyle_quests_assigned,
        }
    }

    pub fn status(&self, quest_id: &str) -> Option<&DailyQuestStatus> {
        self.quests.iter().find(|s| s.quest_id == quest_id)
    }

    pub(crate) fn status_mut(&mut self, quest_id: &str) -> Option<&mut DailyQuestStatus> {
        self.quests.iter_mut().find(|s| s.quest_id == quest_id)
    }

    pub fn completed_count(&self) -> usize {
        self.quests.iter().filter(|s| s.completed).count()
    }

    pub fn needs_settlement(&self) -> bool {
        self.quests.iter().any(DailyQuestStatus::awaits_settlement)
    }

    /// Every lifestyle quest of the day was completed (and there was at least one).
    pub fn lifestyle_fulfilled(&self) -> bool {
        let mut lifestyle = self.quests.iter().filter(|s| s.quest.is_lifestyle()).peekable();
        lifestyle.peek().is_some() && lifestyle.all(|s| s.completed)
    }

    pub(crate) fn recompute_totals(&mut self) {
        self.total_exp_gained = self.quests.iter().map(|s| s.exp_gained).sum();
        self.total_exp_lost = self.quests.iter().map(|s| s.exp_lost).sum();
        self.net_exp = self.total_exp_gained + self.total_exp_lost;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quest::Difficulty;

    fn day() -> DayKey {
        DayKey::from_ymd(2024, 4, 2).unwrap()
    }

    #[test]
    fn new_record_tracks_all_quests_and_lists_lifestyle_ones() {
        let quests = vec![
            Quest::lifestyle("wake7am", "Wake", Difficulty::Easy),
            Quest::learning("python-intro", "Python", Difficulty::Easy),
        ];
        let record = DailyRecord::new(day(), &quests);
        assert_eq!(record.quests.len(), 2);
        assert_eq!(record.lifestyle_quests_assigned.len(), 1);
        assert_eq!(record.lifestyle_quests_assigned[0].id, "wake7am");
        assert!(record.needs_settlement());
    }

    #[test]
    fn duplicate_ids_keep_first() {
        let quests = vec![
            Quest::lifestyle("a", "First", Difficulty::Easy),
            Quest::lifestyle("a", "Second", Difficulty::Hard),
        ];
        let record = DailyRecord::new(day(), &quests);
        assert_eq!(record.quests.len(), 1);
        assert_eq!(record.quests[0].quest.title, "First");
    }

    #[test]
    fn only_penalized_types_await_settlement() {
        let habit = DailyQuestStatus::new(Quest::lifestyle("wake7am", "Wake", Difficulty::Easy));
        let study = DailyQuestStatus::new(Quest::learning("python-intro", "Python", Difficulty::Easy));
        assert!(habit.awaits_settlement());
        assert!(!study.awaits_settlement());
    }

    #[test]
    fn fulfilled_requires_a_lifestyle_quest() {
        let record = DailyRecord::new(
            day(),
            &[Quest::learning("python-intro", "Python", Difficulty::Easy)],
        );
        assert!(!record.lifestyle_fulfilled());
    }
}
