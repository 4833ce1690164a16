//! TOML-based application configuration.
//!
//! Stores user preferences including:
//! - How past days are settled
//! - Default focus session length
//! - Tick cadence for the host loop
//! - An optional override of the daily lifestyle quests
//!
//! Configuration is stored at `<config dir>/questlog/config.toml`
//! (`questlog-dev` when `QUESTLOG_ENV=dev`). Tracker state itself is never
//! written to disk.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{ConfigError, Result};
use crate::ledger::{SettlementMode, SettlementPolicy};
use crate::quest::{daily_quests, Quest};
use crate::timer::DEFAULT_FOCUS_MINUTES;

/// Ledger configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerConfig {
    #[serde(default)]
    pub settlement: SettlementMode,
    /// Only used with `settlement = "elapsed_hours"`.
    #[serde(default = "default_settlement_hours")]
    pub settlement_hours: u32,
}

/// Focus timer configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimerConfig {
    /// Session length for quests without a parseable time estimate.
    #[serde(default = "default_focus_minutes")]
    pub default_minutes: u64,
}

/// Host loop configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackerConfig {
    #[serde(default = "default_tick_interval")]
    pub tick_interval_secs: u64,
    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,
    /// Assign the daily quests to today on every tick.
    #[serde(default = "default_true")]
    pub auto_assign_today: bool,
}

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub ledger: LedgerConfig,
    #[serde(default)]
    pub timer: TimerConfig,
    #[serde(default)]
    pub tracker: TrackerConfig,
    /// Replaces the built-in daily quest set when present.
    #[serde(default)]
    pub daily_quests: Option<Vec<Quest>>,
}

// Default functions
fn default_settlement_hours() -> u32 {
    24
}
fn default_focus_minutes() -> u64 {
    DEFAULT_FOCUS_MINUTES
}
fn default_tick_interval() -> u64 {
    60
}
fn default_event_capacity() -> usize {
    crate::events::DEFAULT_FEED_CAPACITY
}
/// Upper bound for `tracker.event_capacity`; the feed preallocates every slot.
pub const MAX_EVENT_CAPACITY: usize = 65_536;

fn default_true() -> bool {
    true
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            settlement: SettlementMode::default(),
            settlement_hours: default_settlement_hours(),
        }
    }
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            default_minutes: default_focus_minutes(),
        }
    }
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            tick_interval_secs: default_tick_interval(),
            event_capacity: default_event_capacity(),
            auto_assign_today: true,
        }
    }
}

/// Returns `<config dir>/questlog[-dev]/` based on QUESTLOG_ENV.
///
/// Set QUESTLOG_ENV=dev to use the development directory.
pub fn config_dir() -> Result<PathBuf> {
    let base = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
    let env = std::env::var("QUESTLOG_ENV").unwrap_or_else(|_| "production".to_string());
    Ok(if env == "dev" {
        base.join("questlog-dev")
    } else {
        base.join("questlog")
    })
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::InvalidValue {
            key: key.to_string(),
            message: "unknown config key".into(),
        };
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if parts.peek().is_none() || key.is_empty() {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            if parts.peek().is_some() {
                current = current.get_mut(part).ok_or_else(unknown)?;
                continue;
            }
            let obj = current.as_object_mut().ok_or_else(unknown)?;
            let existing = obj.get(part).ok_or_else(unknown)?;

            let new_value = match existing {
                serde_json::Value::Bool(_) => serde_json::Value::Bool(
                    value
                        .parse::<bool>()
                        .map_err(|e| invalid(e.to_string()))?,
                ),
                serde_json::Value::Number(_) => serde_json::Value::Number(
                    value
                        .parse::<u64>()
                        .map_err(|_| invalid(format!("cannot parse '{value}' as number")))?
                        .into(),
                ),
                serde_json::Value::Object(_)
                | serde_json::Value::Array(_)
                | serde_json::Value::Null => {
                    serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
                }
                serde_json::Value::String(_) => serde_json::Value::String(value.into()),
            };

            obj.insert(part.to_string(), new_value);
            return Ok(());
        }

        Err(unknown())
    }

    pub fn path() -> Result<PathBuf> {
        Ok(config_dir()?.join("config.toml"))
    }

    /// Load from the default location, or defaults when no file exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be read or parsed.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::LoadFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let cfg: Config = toml::from_str(&content).map_err(ConfigError::from)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Load from disk, returning default on error.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "falling back to default configuration");
            Self::default()
        })
    }

    /// Persist to `path`, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| save_failed(e.to_string()))?;
        }
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timer.default_minutes == 0 {
            return Err(ConfigError::InvalidValue {
                key: "timer.default_minutes".into(),
                message: "must be at least 1".into(),
            });
        }
        if self.tracker.tick_interval_secs == 0 {
            return Err(ConfigError::InvalidValue {
                key: "tracker.tick_interval_secs".into(),
                message: "must be at least 1".into(),
            });
        }
        if self.tracker.event_capacity == 0 || self.tracker.event_capacity > MAX_EVENT_CAPACITY {
            return Err(ConfigError::InvalidValue {
                key: "tracker.event_capacity".into(),
                message: format!("must be between 1 and {MAX_EVENT_CAPACITY}"),
            });
        }
        if let Some(quests) = &self.daily_quests {
            if let Some(q) = quests.iter().find(|q| !q.is_lifestyle()) {
                return Err(ConfigError::InvalidValue {
                    key: "daily_quests".into(),
                    message: format!("'{}' is not a lifestyle quest", q.id),
                });
            }
        }
        Ok(())
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by dot-separated key. Does not persist.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let mut json = serde_json::to_value(&*self)?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Config = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    pub fn settlement_policy(&self) -> SettlementPolicy {
        SettlementPolicy {
            mode: self.ledger.settlement,
            hours: self.ledger.settlement_hours,
        }
    }

    /// The lifestyle quests assigned to each day.
    pub fn daily_quests(&self) -> Vec<Quest> {
        self.daily_quests.clone().unwrap_or_else(daily_quests)
    }
}
