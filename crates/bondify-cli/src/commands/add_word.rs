//! The `bondify add-word` command.

use std::path::PathBuf;

use anyhow::Result;

use super::{api_error, open};

pub async fn execute(word: String, notes: Option<String>, config_path: Option<PathBuf>) -> Result<()> {
    let word = word.trim();
    anyhow::ensure!(!word.is_empty(), "word must not be empty");
    anyhow::ensure!(word.chars().count() <= 100, "word must be at most 100 characters");

    let (_, queries) = open(config_path)?;
    match queries.add_to_wordlist(word, notes).await {
        Ok(entry) => {
            println!("Added '{}' to your word list.", entry.word);
            if !entry.definition.is_empty() {
                println!("  {}", entry.definition);
            }
            Ok(())
        }
        Err(e) if e.is_already_exists() => {
            println!("'{word}' is already in your word list.");
            Ok(())
        }
        Err(e) => Err(api_error(e)),
    }
}
