//! Bearer credentials and their on-disk store.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Tokens issued by `POST /api/auth/login`.
///
/// Note: Custom Debug impl masks tokens to prevent accidental exposure in logs.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default = "default_token_type")]
    pub token_type: String,
}

fn default_token_type() -> String {
    "bearer".to_string()
}

impl Credentials {
    /// Credentials holding only an access token.
    pub fn from_token(token: impl Into<String>) -> Self {
        Self {
            access_token: token.into(),
            refresh_token: None,
            token_type: default_token_type(),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("access_token", &"***")
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "***"))
            .field("token_type", &self.token_type)
            .finish()
    }
}

/// Load credentials, preferring the `BONDIFY_TOKEN` environment variable.
///
/// A missing file is not an error: the user simply has not logged in.
pub fn load_credentials(path: &Path) -> Result<Option<Credentials>> {
    if let Ok(token) = std::env::var("BONDIFY_TOKEN") {
        if !token.is_empty() {
            return Ok(Some(Credentials::from_token(token)));
        }
    }
    if !path.exists() {
        return Ok(None);
    }
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read credentials: {}", path.display()))?;
    let credentials = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse credentials: {}", path.display()))?;
    Ok(Some(credentials))
}

pub fn save_credentials(path: &Path, credentials: &Credentials) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(credentials)?;
    std::fs::write(path, json)
        .with_context(|| format!("failed to write credentials: {}", path.display()))?;
    restrict_permissions(path)?;
    Ok(())
}

/// Delete stored credentials. Returns `false` if there were none.
pub fn clear_credentials(path: &Path) -> Result<bool> {
    if !path.exists() {
        return Ok(false);
    }
    std::fs::remove_file(path)
        .with_context(|| format!("failed to remove credentials: {}", path.display()))?;
    Ok(true)
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
    Ok(())
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> Result<()> {
    Ok(())
}
