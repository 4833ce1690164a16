use questlog_core::quest::learning_quests;
use questlog_core::{Config, Quest};

pub fn run(json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let daily = config.daily_quests();
    let learning = learning_quests();

    if json {
        let out = serde_json::json!({
            "daily": daily,
            "learning": learning,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    print_section("Daily quests", &daily);
    print_section("Learning quests", &learning);
    Ok(())
}

fn print_section(heading: &str, quests: &[Quest]) {
    println!("{heading}:");
    for quest in quests {
        println!(
            "  {:<16} {:<10} {:>4} exp  {}",
            quest.id,
            quest.difficulty.label(),
            quest.exp,
            quest.title
        );
    }
}
