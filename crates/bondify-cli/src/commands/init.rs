//! The `bondify init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    if std::path::Path::new("bondify.toml").exists() {
        println!("bondify.toml already exists, skipping.");
    } else {
        std::fs::write("bondify.toml", SAMPLE_CONFIG)?;
        println!("Created bondify.toml");
    }

    println!("\nNext steps:");
    println!("  1. Set api.base_url in bondify.toml");
    println!("  2. Run: bondify login --email you@example.com");
    println!("  3. Run: bondify review");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# bondify configuration

[api]
# ${VAR} references are read from the environment.
base_url = "http://localhost:8000"
timeout_secs = 30

[review]
batch_size = 20
forecast_days = 7

# Seconds a cached query stays fresh.
[cache]
due_words_secs = 30
srs_stats_secs = 60
forecast_secs = 300
wordlist_stats_secs = 60
"#;
