//! The `bondify forecast` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use super::{api_error, open, wants_json};

const BAR_WIDTH: u32 = 30;

pub async fn execute(
    days: Option<u32>,
    format: String,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let json = wants_json(&format)?;
    let (config, queries) = open(config_path)?;
    let days = days.unwrap_or(config.review.forecast_days);
    anyhow::ensure!((1..=365).contains(&days), "days must be between 1 and 365");

    let forecast = queries.review_forecast(days).await.map_err(api_error)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&forecast)?);
        return Ok(());
    }

    let peak = forecast.forecast.iter().map(|d| d.count).max().unwrap_or(0);
    let mut table = Table::new();
    table.set_header(vec!["Date", "Due", ""]);
    for day in &forecast.forecast {
        let bar_len = if peak == 0 {
            0
        } else {
            (day.count * BAR_WIDTH).div_ceil(peak)
        };
        table.add_row(vec![
            Cell::new(day.date.format("%a %Y-%m-%d")),
            Cell::new(day.count),
            Cell::new("#".repeat(bar_len as usize)),
        ]);
    }

    println!("{table}");
    println!("{} review(s) in the next {days} day(s).", forecast.total());
    Ok(())
}
