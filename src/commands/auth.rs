//! Authentication command handlers for OAuth flow.
//!
//! This module implements the CLI commands for:
//! - `bookwheel auth` - Initial OAuth consent flow
//! - `bookwheel auth --verify` - Verify and refresh authentication

use crate::api::{self, Mode, TokenProvider};
use crate::commands::Out;
use crate::{Config, Result};
use anyhow::Context;

/// Handles the `bookwheel auth` command - runs the OAuth consent flow
///
/// This is the only command that waits on the user to grant consent in a browser. The
/// authorization URL is logged and the token is saved to token.json once Google redirects back.
///
/// # Errors
/// Returns an error if OAuth flow fails or if client_secret.json is missing
pub async fn auth(config: &Config) -> Result<Out<()>> {
    let _ = TokenProvider::initialize(config.client_secret_path(), config.token_path()).await?;
    Ok(format!("Saved the OAuth token to {}", config.token_path().display()).into())
}

/// Handles the `bookwheel auth --verify` command - verifies authentication
///
/// This command never triggers an interactive OAuth flow. It:
/// 1. Checks that credentials and tokens exist and have the correct scopes
/// 2. Refreshes the access token
/// 3. Reads the configured sheet, if there is one, to prove access
///
/// If the token is missing, invalid, or has the wrong scopes, this command will
/// fail with an error message telling the user to run `bookwheel auth`.
pub async fn auth_verify(config: &Config, mode: Mode) -> Result<Out<()>> {
    if mode == Mode::Google {
        let mut token_provider =
            TokenProvider::load(config.client_secret_path(), config.token_path())
                .await
                .context(
                    "Unable to use the existing tokens found in the token JSON file. \n\n\
                    You should run 'bookwheel auth' (without the --verify flag).",
                )?;
        token_provider
            .refresh()
            .await
            .context("Unable to refresh the token")?;
    }

    if config.spreadsheet_id().is_empty() {
        return Ok("Your OAuth token is valid! No sheet is configured yet.".into());
    }
    let mut sheet = api::sheet(config, mode).await?;
    let rows = sheet
        .get(config.sheet_name())
        .await
        .with_context(|| format!("Unable to read the '{}' tab", config.sheet_name()))?;
    Ok(format!(
        "Your OAuth token is valid! The '{}' tab has {} rows.",
        config.sheet_name(),
        rows.len()
    )
    .into())
}
