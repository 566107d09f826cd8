//! The `bondify review` command.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};

use bondify_core::model::{DueWord, Rating};
use bondify_core::session::SessionSnapshot;
use bondify_core::{ReviewSession, SessionError, SessionPhase};

use super::{api_error, open};

pub async fn execute(
    limit: Option<u32>,
    summary_out: Option<PathBuf>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let (config, queries) = open(config_path)?;
    let limit = limit.unwrap_or(config.review.batch_size);
    anyhow::ensure!(limit >= 1, "limit must be at least 1");

    let session = ReviewSession::new(queries, limit);
    let stdin = io::stdin();
    let stdout = io::stdout();
    run(&session, stdin.lock(), stdout.lock()).await?;

    // Each restart begins a fresh summary; only the last pass is written.
    if let Some(path) = summary_out {
        session.summary().save_json(&path)?;
        eprintln!("Session summary saved to: {}", path.display());
    }
    Ok(())
}

/// Drive a session from line-based input until the user quits or input ends.
pub async fn run<R: BufRead, W: Write>(session: &ReviewSession, input: R, mut out: W) -> Result<()> {
    session.start().await.map_err(session_error)?;
    let mut lines = input.lines();

    loop {
        let snapshot = session.snapshot();
        match snapshot.phase {
            SessionPhase::Loading => break,
            SessionPhase::Empty => {
                writeln!(out, "No words due for review. Come back later!")?;
                break;
            }
            SessionPhase::Reviewing { revealed, .. } => {
                let Some(word) = session.current() else { break };
                if !revealed {
                    print_front(&mut out, &snapshot, &word)?;
                    write!(out, "Press Enter to show the answer (q to quit) > ")?;
                    out.flush()?;
                    match next_line(&mut lines)? {
                        Some(line) if line.eq_ignore_ascii_case("q") => break,
                        Some(_) => session.reveal().map_err(session_error)?,
                        None => break,
                    }
                } else {
                    print_back(&mut out, &word)?;
                    write!(out, "Rate: 1) again  2) hard  3) good  4) easy  (q to quit) > ")?;
                    out.flush()?;
                    let Some(line) = next_line(&mut lines)? else { break };
                    if line.eq_ignore_ascii_case("q") {
                        break;
                    }
                    let rating = match line.parse::<Rating>() {
                        Ok(rating) => rating,
                        Err(e) => {
                            writeln!(out, "{e}")?;
                            continue;
                        }
                    };
                    if let Err(e) = session.submit_rating(rating).await {
                        writeln!(out, "Could not save rating: {e}. Try again.")?;
                    }
                }
            }
            SessionPhase::Finished => {
                writeln!(
                    out,
                    "\nSession complete: {}/{} reviewed",
                    snapshot.reviewed, snapshot.total
                )?;
                write!(out, "r to review again, q to quit > ")?;
                out.flush()?;
                match next_line(&mut lines)? {
                    Some(line) if line.eq_ignore_ascii_case("r") => {
                        session.restart().await.map_err(session_error)?;
                    }
                    _ => break,
                }
            }
        }
    }

    let summary = session.summary();
    if let Some(rate) = summary.ratings.recall_rate() {
        writeln!(
            out,
            "\nReviewed {} words, recall {:.0}% (again {}, hard {}, good {}, easy {})",
            summary.reviewed,
            rate * 100.0,
            summary.ratings.again,
            summary.ratings.hard,
            summary.ratings.good,
            summary.ratings.easy,
        )?;
    }
    for achievement in &summary.new_achievements {
        writeln!(out, "Achievement unlocked: {achievement}")?;
    }
    Ok(())
}

fn next_line<B: BufRead>(lines: &mut io::Lines<B>) -> Result<Option<String>> {
    match lines.next() {
        Some(line) => Ok(Some(line.context("failed to read input")?.trim().to_string())),
        None => Ok(None),
    }
}

fn print_front<W: Write>(out: &mut W, snapshot: &SessionSnapshot, word: &DueWord) -> Result<()> {
    let position = snapshot.reviewed as usize + 1;
    writeln!(out, "\n[{position}/{}] {}  ({})", snapshot.total, word.word, word.state)?;
    Ok(())
}

fn print_back<W: Write>(out: &mut W, word: &DueWord) -> Result<()> {
    match &word.pronunciation {
        Some(p) => writeln!(out, "  {} {}", word.word, p)?,
        None => writeln!(out, "  {}", word.word)?,
    }
    if !word.part_of_speech.is_empty() {
        writeln!(out, "  ({})", word.part_of_speech)?;
    }
    writeln!(out, "  {}", word.definition)?;
    for example in &word.examples {
        writeln!(out, "    - {example}")?;
    }
    Ok(())
}

fn session_error(e: SessionError) -> anyhow::Error {
    match e {
        SessionError::Api(api) => api_error(api),
        other => other.into(),
    }
}
