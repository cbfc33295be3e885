//! Command handlers for the bookwheel CLI.
//!
//! This module contains implementations for all CLI subcommands.

mod active;
mod auth;
mod curate;
mod init;
mod timeline;
mod weigh;

use crate::source::CsvFile;
use crate::{api, Config, Mode, Result};
use anyhow::Context;
use serde::Serialize;
use std::fmt::Debug;
use std::path::Path;
use tracing::{debug, info};

pub use active::active;
pub use auth::{auth, auth_verify};
pub use curate::curate;
pub use init::init;
pub use timeline::timeline;
pub use weigh::{weigh, WeighReport};

/// The output type for a command. This allows the command to return a consistent message and,
/// optionally, structured data.
#[derive(Debug, Clone, Serialize)]
pub struct Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// A message that can be printed to the user regarding the outcome of the command execution.
    message: String,

    /// Any structured data that needs to be output from the call.
    structure: Option<T>,
}

impl<T, S> From<S> for Out<T>
where
    T: Debug + Clone + Serialize,
    S: Into<String>,
{
    fn from(value: S) -> Self {
        Out::new_message(value)
    }
}

impl<T> Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// Create a new `Out` object that has `Some(structure)`.
    pub fn new<S>(message: S, structure: T) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure: Some(structure),
        }
    }

    /// Create a new `Out` object that has `None` for `structure`.
    pub fn new_message<S>(message: S) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure: None,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn structure(&self) -> Option<&T> {
        self.structure.as_ref()
    }

    /// Print the message to `info!` and the structured data (if it exists) as JSON to `debug!`.
    pub fn print(&self) {
        info!("{}", self.message);
        if let Some(structure) = self.structure() {
            if let Ok(json) = serde_json::to_string_pretty(structure) {
                debug!("Command output:\n\n{json}\n\n");
            }
        }
    }
}

/// Picks the Goodreads export: `csv` when given, otherwise the `csv_path` from the config in
/// `home`.
async fn library(home: &Path, csv: Option<&Path>) -> Result<CsvFile> {
    if let Some(csv) = csv {
        return Ok(CsvFile::new(csv));
    }
    let config = Config::load(home)
        .await
        .context("No --csv was given and the bookwheel config could not be loaded")?;
    let path = config.csv_path().with_context(|| {
        format!(
            "No --csv was given and no csv_path is set in {}",
            config.config_path().display()
        )
    })?;
    debug!("Using the Goodreads export from config: {}", path.display());
    Ok(CsvFile::new(path))
}

/// Loads the config for publishing, pointing it at `sheet_url` first when one is given. When no
/// sheet is configured at all, a new spreadsheet is created and remembered in the config.
async fn upload_config(home: &Path, sheet_url: Option<&str>, mode: Mode) -> Result<Config> {
    let mut config = Config::load(home)
        .await
        .context("Publishing requires 'bookwheel init' to have been run")?;
    if let Some(url) = sheet_url {
        config.set_sheet_url(url).await?;
    }
    if config.spreadsheet_id().is_empty() {
        let url = api::create_spreadsheet(&config, mode).await?;
        config.set_sheet_url(&url).await?;
    }
    Ok(config)
}
