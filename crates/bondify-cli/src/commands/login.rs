//! The `bondify login` and `bondify logout` commands.

use std::path::PathBuf;

use anyhow::{Context, Result};

use bondify_client::auth::{clear_credentials, save_credentials};
use bondify_client::{load_config_from, HttpBackend};

pub async fn execute(
    email: String,
    password: Option<String>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let password = match password {
        Some(p) => p,
        None => std::env::var("BONDIFY_PASSWORD")
            .context("no password given: pass --password or set BONDIFY_PASSWORD")?,
    };

    let config = load_config_from(config_path.as_deref())?;
    let backend = HttpBackend::new(&config.api.base_url, config.api.timeout_secs)?;
    let credentials = backend.login(&email, &password).await?;

    let path = config.credentials_path();
    save_credentials(&path, &credentials)?;
    println!("Logged in as {email}");
    tracing::debug!(path = %path.display(), "credentials stored");
    Ok(())
}

pub fn logout(config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    if clear_credentials(&config.credentials_path())? {
        println!("Logged out.");
    } else {
        println!("Not logged in.");
    }
    Ok(())
}
