//! Quest definitions.
//!
//! A [`Quest`] is an immutable unit of work or habit. Its [`Difficulty`]
//! drives everything the rest of the crate derives from it: the experience
//! awarded on completion, the penalty for a missed lifestyle quest, and the
//! default queue priority.

mod catalog;

pub use catalog::{daily_quests, learning_quests, find_quest};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;

/// Ordered difficulty scale. `Easy < Normal < Hard < VeryHard < Extreme`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    Normal,
    Hard,
    #[serde(rename = "Very Hard")]
    VeryHard,
    Extreme,
}

impl Difficulty {
    pub const ALL: [Difficulty; 5] = [
        Difficulty::Easy,
        Difficulty::Normal,
        Difficulty::Hard,
        Difficulty::VeryHard,
        Difficulty::Extreme,
    ];

    /// Experience awarded when a quest of this difficulty is completed.
    pub fn exp_reward(self) -> i64 {
        match self {
            Difficulty::Easy => 20,
            Difficulty::Normal => 50,
            Difficulty::Hard => 100,
            Difficulty::VeryHard => 200,
            Difficulty::Extreme => 400,
        }
    }

    /// Experience removed when a lifestyle quest is left incomplete at settlement.
    pub fn exp_penalty(self) -> i64 {
        match self {
            Difficulty::Easy => -10,
            Difficulty::Normal => -25,
            Difficulty::Hard => -50,
            Difficulty::VeryHard => -100,
            Difficulty::Extreme => -200,
        }
    }

    /// Default queue priority (1..=5).
    pub fn priority(self) -> u8 {
        match self {
            Difficulty::Easy => 1,
            Difficulty::Normal => 2,
            Difficulty::Hard => 3,
            Difficulty::VeryHard => 4,
            Difficulty::Extreme => 5,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Normal => "Normal",
            Difficulty::Hard => "Hard",
            Difficulty::VeryHard => "Very Hard",
            Difficulty::Extreme => "Extreme",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Difficulty {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '-' && *c != '_')
            .collect::<String>()
            .to_lowercase();
        match normalized.as_str() {
            "easy" => Ok(Difficulty::Easy),
            "normal" => Ok(Difficulty::Normal),
            "hard" => Ok(Difficulty::Hard),
            "veryhard" => Ok(Difficulty::VeryHard),
            "extreme" => Ok(Difficulty::Extreme),
            _ => Err(ValidationError::UnknownDifficulty(s.to_string())),
        }
    }
}

/// Whether a quest is a recurring daily obligation or a one-off learning task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestType {
    /// Recurring habit; penalized when left incomplete at the end of the day.
    Lifestyle,
    /// Penalty-exempt; tracked only for completion and reward.
    #[serde(alias = "aiml")]
    Learning,
}

impl QuestType {
    pub fn is_penalized(self) -> bool {
        matches!(self, QuestType::Lifestyle)
    }
}

impl fmt::Display for QuestType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuestType::Lifestyle => f.write_str("lifestyle"),
            QuestType::Learning => f.write_str("learning"),
        }
    }
}

impl FromStr for QuestType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "lifestyle" => Ok(QuestType::Lifestyle),
            "learning" | "aiml" => Ok(QuestType::Learning),
            _ => Err(ValidationError::UnknownQuestType(s.to_string())),
        }
    }
}

/// Immutable quest definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quest {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub difficulty: Difficulty,
    /// Base experience value shown to the user. Rewards are computed from
    /// `difficulty`, not from this field.
    pub exp: i64,
    #[serde(rename = "type")]
    pub quest_type: QuestType,
    #[serde(default)]
    pub category: String,
    /// Free text such as "45 min" or "1 hour".
    #[serde(default)]
    pub time_estimate: Option<String>,
}

impl Quest {
    /// A lifestyle quest whose base exp matches its difficulty reward.
    pub fn lifestyle(id: impl Into<String>, title: impl Into<String>, difficulty: Difficulty) -> Self {
        Self::new(id, title, difficulty, QuestType::Lifestyle)
    }

    /// A learning quest whose base exp matches its difficulty reward.
    pub fn learning(id: impl Into<String>, title: impl Into<String>, difficulty: Difficulty) -> Self {
        Self::new(id, title, difficulty, QuestType::Learning)
    }

    fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        difficulty: Difficulty,
        quest_type: QuestType,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: String::new(),
            difficulty,
            exp: difficulty.exp_reward(),
            quest_type,
            category: String::new(),
            time_estimate: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn with_exp(mut self, exp: i64) -> Self {
        self.exp = exp;
        self
    }

    pub fn with_time_estimate(mut self, estimate: impl Into<String>) -> Self {
        self.time_estimate = Some(estimate.into());
        self
    }

    pub fn is_lifestyle(&self) -> bool {
        self.quest_type == QuestType::Lifestyle
    }

    /// Parse the time estimate into minutes.
    ///
    /// Recognizes the first `<N> min` or `<N> hour` occurrence, case-insensitive,
    /// with optional whitespace between the number and the unit.
    pub fn duration_minutes(&self) -> Option<u64> {
        self.time_estimate.as_deref().and_then(parse_duration_minutes)
    }
}

/// Parse "<N> min" / "<N> hour" style text into minutes.
pub fn parse_duration_minutes(text: &str) -> Option<u64> {
    let lower = text.to_lowercase();
    let bytes = lower.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if !bytes[i].is_ascii_digit() {
            i += 1;
            continue;
        }
        let start = i;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        let number: u64 = lower[start..i].parse().ok()?;
        let rest = lower[i..].trim_start();
        if rest.starts_with("hour") {
            return Some(number.saturating_mul(60));
        }
        if rest.starts_with("min") {
            return Some(number);
        }
    }
    None
}
