pub mod add_word;
pub mod due;
pub mod forecast;
pub mod init;
pub mod login;
pub mod review;
pub mod stats;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;

use bondify_client::{load_config_from, BondifyConfig};
use bondify_core::{ApiError, SrsQueries};

/// Load config and wrap an authenticated HTTP backend in cached queries.
pub fn open(config_path: Option<PathBuf>) -> Result<(BondifyConfig, Arc<SrsQueries>)> {
    let config = load_config_from(config_path.as_deref())?;
    let backend = bondify_client::connect(&config)?;
    let queries = Arc::new(SrsQueries::new(Arc::new(backend), config.cache));
    Ok((config, queries))
}

/// Turn an API error into a CLI error, with a hint for auth failures.
pub fn api_error(e: ApiError) -> anyhow::Error {
    if e.is_auth() {
        anyhow::anyhow!("{e} (run `bondify login` first)")
    } else {
        e.into()
    }
}

pub fn wants_json(format: &str) -> Result<bool> {
    match format {
        "json" => Ok(true),
        "text" => Ok(false),
        other => anyhow::bail!("unknown format: '{other}' (expected text or json)"),
    }
}
