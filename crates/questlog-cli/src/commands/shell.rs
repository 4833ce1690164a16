//! Interactive session: one tracker, driven by stdin lines and a periodic tick.
//!
//! Every line is a command parsed with clap. Responses and tick events are
//! written to stdout as one JSON object per line.

use std::time::Duration;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use questlog_core::quest::find_quest;
use questlog_core::registry::{self, SharedTracker};
use questlog_core::{Config, DayKey, Event, Quest, QuestTracker};
use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::MissedTickBehavior;

#[derive(Parser)]
#[command(name = "questlog", no_binary_name = true, disable_version_flag = true)]
struct ShellLine {
    #[command(subcommand)]
    command: ShellCommand,
}

#[derive(Subcommand)]
enum ShellCommand {
    /// Add a quest to the queue
    Enqueue {
        id: String,
        /// Override the difficulty-derived priority
        #[arg(long)]
        priority: Option<u8>,
    },
    /// Remove a quest from the queue
    Remove { id: String },
    /// Move a pending quest to another pending quest's position
    Reorder { moved: String, target: String },
    /// Drop the current quest and promote the next one
    Advance,
    /// Show the queue
    Queue,
    /// Mark a quest completed (today unless --date is given)
    Complete {
        id: String,
        #[arg(long)]
        date: Option<DayKey>,
    },
    /// Run end-of-day settlement for a date
    Settle { date: DayKey },
    /// Show the record for a date (today by default)
    Record { date: Option<DayKey> },
    /// Monthly summary (YYYY-MM, current month by default)
    Month { month: Option<String> },
    /// Focus timer control
    Focus {
        #[command(subcommand)]
        action: FocusAction,
    },
    /// Run one tick now
    Tick,
    /// End the session
    Quit,
}

#[derive(Subcommand)]
enum FocusAction {
    Start,
    Pause,
    Resume,
    Reset,
    Status,
}

enum Flow {
    Reply(Value),
    Quit,
}

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(session(config))
}

async fn session(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    let extra = config.daily_quests();
    let period = Duration::from_secs(config.tracker.tick_interval_secs);
    let tracker = SharedTracker::new(QuestTracker::new(config));
    let _scope = tracker.enter();

    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            biased;
            _ = ticker.tick() => {
                for event in tracker.with(|t| t.tick()) {
                    print_event(&event)?;
                }
            }
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match handle_line(&line, &extra) {
                    Ok(Some(Flow::Reply(value))) => println!("{value}"),
                    Ok(Some(Flow::Quit)) => break,
                    Ok(None) => {}
                    Err(message) => println!("{}", json!({ "error": message })),
                }
            }
        }
    }
    tracing::debug!("shell session ended");
    Ok(())
}

fn print_event(event: &Event) -> Result<(), serde_json::Error> {
    println!("{}", json!({ "event": serde_json::to_value(event)? }));
    Ok(())
}

fn handle_line(line: &str, extra: &[Quest]) -> Result<Option<Flow>, String> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.is_empty() {
        return Ok(None);
    }
    let parsed = ShellLine::try_parse_from(tokens).map_err(|e| e.to_string().trim().to_string())?;
    if let ShellCommand::Quit = parsed.command {
        return Ok(Some(Flow::Quit));
    }
    let tracker = registry::current();
    tracker
        .with(|t| execute(t, parsed.command, extra))
        .map(|value| Some(Flow::Reply(value)))
}

fn execute(t: &mut QuestTracker, command: ShellCommand, extra: &[Quest]) -> Result<Value, String> {
    let value = match command {
        ShellCommand::Enqueue { id, priority } => {
            let quest = find_quest(&id, extra).ok_or_else(|| format!("unknown quest: {id}"))?;
            let event = match priority {
                Some(p) => t.enqueue_with_priority(quest, p),
                None => t.enqueue(quest),
            };
            json!({ "event": event, "queue": queue_view(t) })
        }
        ShellCommand::Remove { id } => {
            let event = t.remove(&id);
            json!({ "event": event, "queue": queue_view(t) })
        }
        ShellCommand::Reorder { moved, target } => {
            let event = t.reorder(&moved, &target);
            json!({ "event": event, "queue": queue_view(t) })
        }
        ShellCommand::Advance => {
            let event = t.skip();
            json!({ "event": event, "queue": queue_view(t) })
        }
        ShellCommand::Queue => queue_view(t),
        ShellCommand::Complete { id, date } => {
            let date = date.unwrap_or_else(|| t.today());
            let event = t.complete_quest(&id, date);
            json!({ "event": event, "record": t.ledger().get_daily_record(date) })
        }
        ShellCommand::Settle { date } => {
            let event = t.settle(date);
            json!({ "event": event, "record": t.ledger().get_daily_record(date) })
        }
        ShellCommand::Record { date } => {
            let date = date.unwrap_or_else(|| t.today());
            json!({ "record": t.ledger().get_daily_record(date) })
        }
        ShellCommand::Month { month } => {
            let today = t.today();
            let (year, month) = match month {
                Some(text) => parse_month(&text)?,
                None => (today.year(), today.month()),
            };
            json!({
                "summary": t.ledger().month_summary(year, month),
                "streak": t.ledger().current_streak(today),
            })
        }
        ShellCommand::Focus { action } => {
            let event = match action {
                FocusAction::Start => t.start_focus(),
                FocusAction::Pause => t.pause_focus(),
                FocusAction::Resume => t.resume_focus(),
                FocusAction::Reset => t.reset_focus(),
                FocusAction::Status => Some(t.timer().snapshot()),
            };
            json!({ "event": event })
        }
        ShellCommand::Tick => json!({ "events": t.tick() }),
        ShellCommand::Quit => Value::Null,
    };
    Ok(value)
}

fn queue_view(t: &QuestTracker) -> Value {
    json!({
        "current": t.queue().current(),
        "pending": t.queue().pending(),
    })
}

fn parse_month(text: &str) -> Result<(i32, u32), String> {
    let first = NaiveDate::parse_from_str(&format!("{}-01", text.trim()), "%Y-%m-%d")
        .map_err(|_| format!("invalid month '{text}', expected YYYY-MM"))?;
    let day = DayKey::new(first);
    Ok((day.year(), day.month()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_enqueue_with_priority() {
        let line = ShellLine::try_parse_from(["enqueue", "python-intro", "--priority", "9"]).unwrap();
        assert!(matches!(
            line.command,
            ShellCommand::Enqueue { ref id, priority: Some(9) } if id == "python-intro"
        ));
    }

    #[test]
    fn parses_dates() {
        let line = ShellLine::try_parse_from(["settle", "2024-10-01"]).unwrap();
        match line.command {
            ShellCommand::Settle { date } => assert_eq!(date, DayKey::from_ymd(2024, 10, 1).unwrap()),
            _ => panic!("expected settle"),
        }
        assert!(ShellLine::try_parse_from(["settle", "yesterday"]).is_err());
    }

    #[test]
    fn month_parsing() {
        assert_eq!(parse_month("2024-02").unwrap(), (2024, 2));
        assert!(parse_month("2024-13").is_err());
        assert!(parse_month("feb").is_err());
    }

    #[test]
    fn blank_line_is_ignored() {
        assert!(matches!(handle_line("   ", &[]), Ok(None)));
    }

    #[test]
    fn quit_does_not_need_a_scope() {
        assert!(matches!(handle_line("quit", &[]), Ok(Some(Flow::Quit))));
    }

    #[test]
    fn commands_run_against_the_active_tracker() {
        let tracker = SharedTracker::new(QuestTracker::new(Config::default()));
        let _scope = tracker.enter();
        let reply = handle_line("enqueue python-intro", &[]).unwrap();
        let Some(Flow::Reply(value)) = reply else { panic!("expected reply") };
        assert_eq!(value["queue"]["current"]["quest"]["id"], "python-intro");

        let err = handle_line("enqueue nope", &[]).err().unwrap();
        assert!(err.contains("unknown quest"));
    }
}
