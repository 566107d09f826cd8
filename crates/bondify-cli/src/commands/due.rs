//! The `bondify due` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use super::{api_error, open};

pub async fn execute(limit: Option<u32>, config_path: Option<PathBuf>) -> Result<()> {
    let (config, queries) = open(config_path)?;
    let limit = limit.unwrap_or(config.review.batch_size);

    let due = queries.due_words(limit).await.map_err(api_error)?;
    if due.words.is_empty() {
        println!("No words due for review.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["Word", "State", "Part of speech", "Definition"]);
    for word in &due.words {
        table.add_row(vec![
            Cell::new(&word.word),
            Cell::new(word.state),
            Cell::new(&word.part_of_speech),
            Cell::new(&word.definition),
        ]);
    }

    println!("{table}");
    println!("{} word(s) due.", due.total);
    Ok(())
}
