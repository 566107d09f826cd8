//! The `bondify stats` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use super::{api_error, open, wants_json};

pub async fn execute(format: String, config_path: Option<PathBuf>) -> Result<()> {
    let json = wants_json(&format)?;
    let (_, queries) = open(config_path)?;

    let (srs, wordlist) = futures::try_join!(queries.srs_stats(), queries.wordlist_stats())
        .map_err(api_error)?;

    if json {
        let combined = serde_json::json!({ "srs": srs, "wordlist": wordlist });
        println!("{}", serde_json::to_string_pretty(&combined)?);
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["Metric", "Value"]);
    let rows = [
        ("Total cards", srs.total_cards.to_string()),
        ("Due today", srs.due_today.to_string()),
        ("New", srs.new_cards.to_string()),
        ("Learning", srs.learning_cards.to_string()),
        ("Review", srs.review_cards.to_string()),
        ("Relearning", srs.relearning_cards.to_string()),
        (
            "Average retention",
            format!("{:.0}%", srs.average_retention * 100.0),
        ),
        ("Words mastered", wordlist.words_mastered.to_string()),
        ("Words learning", wordlist.words_learning.to_string()),
        ("Average mastery", format!("{:.1}", wordlist.average_mastery)),
    ];
    for (metric, value) in rows {
        table.add_row(vec![Cell::new(metric), Cell::new(value)]);
    }

    println!("{table}");
    Ok(())
}
