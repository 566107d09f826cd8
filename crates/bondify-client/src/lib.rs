//! bondify-client — HTTP access to the bondify API.
//!
//! Implements the `SrsBackend` trait over reqwest, stores bearer
//! credentials, and loads the TOML configuration shared by the CLI.

pub mod auth;
pub mod config;
pub mod http;

pub use auth::Credentials;
pub use config::{load_config, load_config_from, BondifyConfig};
pub use http::HttpBackend;

/// Build an HTTP backend from configuration and stored credentials.
pub fn connect(config: &BondifyConfig) -> anyhow::Result<HttpBackend> {
    let credentials = auth::load_credentials(&config.credentials_path())?;
    if credentials.is_none() {
        tracing::debug!("no stored credentials, requests will be unauthenticated");
    }
    let backend = HttpBackend::new(&config.api.base_url, config.api.timeout_secs)?
        .with_credentials(credentials);
    Ok(backend)
}
