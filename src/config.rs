//! Configuration file handling for bookwheel.
//!
//! The configuration file is stored at `$BOOKWHEEL_HOME/config.json` and records which Google
//! Sheet to publish to, where the OAuth files live and, optionally, the Goodreads export to read
//! when no `--csv` is given.

use crate::{utils, Result};
use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

const APP_NAME: &str = "bookwheel";
const CONFIG_VERSION: u8 = 1;
const SECRETS: &str = ".secrets";
const CLIENT_SECRET_JSON: &str = "client_secret.json";
const TOKEN_JSON: &str = "token.json";
const CONFIG_JSON: &str = "config.json";
const DEFAULT_SHEET_NAME: &str = "Sheet1";

/// The `Config` object represents the configuration of the app. You instantiate it by providing
/// the path to `$BOOKWHEEL_HOME` and from there it loads `$BOOKWHEEL_HOME/config.json`. It
/// provides paths to other items that are either configurable or are expected in a certain
/// location within the home directory.
#[derive(Debug, Clone)]
pub struct Config {
    root: PathBuf,
    secrets: PathBuf,
    config_path: PathBuf,
    config_file: ConfigFile,
    spreadsheet_id: String,
}

impl Config {
    /// Creates the data directory, its subdirectories and:
    /// - Creates an initial `config.json` file using `sheet_url` along with default settings
    /// - Copies `secret_file` into its default location in the data dir.
    ///
    /// # Arguments
    /// - `dir` - The directory that will be the root of data directory, e.g. `$HOME/bookwheel`
    /// - `secret_file` - The downloaded OAuth 2.0 client credentials JSON needed to start the
    ///   Google OAuth workflow.
    /// - `sheet_url` - The URL of the Google Sheet the weighted list is published to, e.g.
    ///   https://docs.google.com/spreadsheets/d/1a7Km9FxQwRbPt82JvN4LzYpH5OcGnWsT6iDuE3VhMjX
    /// - `csv_path` - The Goodreads export to use when a command is not given `--csv`.
    ///
    /// # Errors
    /// - Returns an error if any file operations fail or the sheet URL cannot be understood.
    pub async fn create(
        dir: impl Into<PathBuf>,
        secret_file: &Path,
        sheet_url: &str,
        csv_path: Option<&Path>,
    ) -> Result<Self> {
        // Validate before touching the filesystem
        let spreadsheet_id = extract_spreadsheet_id(sheet_url)
            .context("Failed to extract spreadsheet ID from sheet URL")?
            .to_string();

        let maybe_relative = dir.into();
        utils::make_dir(&maybe_relative)
            .await
            .context("Unable to create the bookwheel home directory")?;
        let root = utils::canonicalize(&maybe_relative).await?;

        let secrets_dir = root.join(SECRETS);
        utils::make_dir(&secrets_dir).await?;
        utils::copy(secret_file, secrets_dir.join(CLIENT_SECRET_JSON)).await?;

        let csv_path = match csv_path {
            Some(p) => Some(
                utils::canonicalize(p)
                    .await
                    .context("The Goodreads export could not be found")?,
            ),
            None => None,
        };

        let config_path = root.join(CONFIG_JSON);
        let config_file = ConfigFile {
            sheet_url: sheet_url.to_string(),
            csv_path,
            ..ConfigFile::default()
        };
        config_file.save(&config_path).await?;
        debug!("Created {}", config_path.display());

        Ok(Self {
            root,
            secrets: secrets_dir,
            config_path,
            config_file,
            spreadsheet_id,
        })
    }

    /// This will
    /// - validate that `bookwheel_home` and its config file exist
    /// - load the config file
    /// - validate that the secrets directory exists
    pub async fn load(bookwheel_home: impl Into<PathBuf>) -> Result<Self> {
        let maybe_relative = bookwheel_home.into();
        let root = utils::canonicalize(&maybe_relative)
            .await
            .context("The bookwheel home directory is missing, run 'bookwheel init' first")?;

        let config_path = root.join(CONFIG_JSON);
        if !config_path.is_file() {
            bail!("The config file is missing '{}'", config_path.display())
        }
        let config_file = ConfigFile::load(&config_path).await?;
        let spreadsheet_id = extract_spreadsheet_id(&config_file.sheet_url)
            .context("Failed to extract spreadsheet ID from sheet URL")?
            .to_string();

        let secrets = root.join(SECRETS);
        if !secrets.is_dir() {
            bail!("The secrets directory is missing '{}'", secrets.display())
        }
        Ok(Self {
            root,
            secrets,
            config_path,
            config_file,
            spreadsheet_id,
        })
    }

    /// Points the config at a different sheet and saves `config.json`.
    pub async fn set_sheet_url(&mut self, sheet_url: &str) -> Result<()> {
        self.spreadsheet_id = extract_spreadsheet_id(sheet_url)
            .context("Failed to extract spreadsheet ID from sheet URL")?
            .to_string();
        self.config_file.sheet_url = sheet_url.to_string();
        self.config_file.save(&self.config_path).await
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn secrets(&self) -> &Path {
        &self.secrets
    }

    pub fn sheet_url(&self) -> &str {
        &self.config_file.sheet_url
    }

    /// Empty when no sheet URL has been configured.
    pub fn spreadsheet_id(&self) -> &str {
        &self.spreadsheet_id
    }

    /// The tab that results are written to.
    pub fn sheet_name(&self) -> &str {
        &self.config_file.sheet_name
    }

    /// The default Goodreads export, resolved against the home directory if relative.
    pub fn csv_path(&self) -> Option<PathBuf> {
        self.config_file
            .csv_path
            .clone()
            .map(|p| self.resolve_path(p))
    }

    /// Returns the stored `client_secret_path` if it is absolute, otherwise resolves it.
    pub fn client_secret_path(&self) -> PathBuf {
        self.resolve_path(self.config_file.client_secret_path())
    }

    /// Returns the stored `token_path` if it is absolute, otherwise resolves it.
    pub fn token_path(&self) -> PathBuf {
        self.resolve_path(self.config_file.token_path())
    }

    fn resolve_path(&self, p: PathBuf) -> PathBuf {
        if p.is_absolute() {
            return p;
        }
        self.root.join(p)
    }
}

/// Represents the serialization and deserialization format of the configuration file.
///
/// Example configuration:
/// ```json
/// {
///   "app_name": "bookwheel",
///   "config_version": 1,
///   "sheet_url": "https://docs.google.com/spreadsheets/d/7KpXm2RfZwNJgs84QhVYno5DU6iM9Wlr3bCzAv1txRpL",
///   "sheet_name": "Sheet1",
///   "csv_path": "/home/me/Downloads/goodreads_library_export.csv",
///   "client_secret_path": ".secrets/client_secret.json",
///   "token_path": ".secrets/token.json"
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
struct ConfigFile {
    /// Application name, should always be "bookwheel"
    app_name: String,

    config_version: u8,

    /// URL of the Google Sheet to publish to. May be empty until the first upload.
    #[serde(default)]
    sheet_url: String,

    /// The tab to write to.
    #[serde(default = "default_sheet_name")]
    sheet_name: String,

    /// The Goodreads export to read when no `--csv` is given (relative to the home dir or absolute)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    csv_path: Option<PathBuf>,

    /// Defaults to $BOOKWHEEL_HOME/.secrets/client_secret.json if not specified
    #[serde(default, skip_serializing_if = "Option::is_none")]
    client_secret_path: Option<PathBuf>,

    /// Defaults to $BOOKWHEEL_HOME/.secrets/token.json if not specified
    #[serde(default, skip_serializing_if = "Option::is_none")]
    token_path: Option<PathBuf>,
}

fn default_sheet_name() -> String {
    DEFAULT_SHEET_NAME.to_string()
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            app_name: APP_NAME.to_string(),
            config_version: CONFIG_VERSION,
            sheet_url: String::new(),
            sheet_name: default_sheet_name(),
            csv_path: None,
            client_secret_path: None,
            token_path: None,
        }
    }
}

impl ConfigFile {
    async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let config: ConfigFile = utils::deserialize(path)
            .await
            .with_context(|| format!("Failed to load config file at {}", path.display()))?;

        anyhow::ensure!(
            config.app_name == APP_NAME,
            "Invalid app_name in config file: expected '{}', got '{}'",
            APP_NAME,
            config.app_name
        );

        Ok(config)
    }

    async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let data = serde_json::to_string_pretty(self).context("Unable to serialize config")?;
        utils::write(path, data)
            .await
            .context("Unable to write config file")
    }

    fn client_secret_path(&self) -> PathBuf {
        self.client_secret_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(SECRETS).join(CLIENT_SECRET_JSON))
    }

    fn token_path(&self) -> PathBuf {
        self.token_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(SECRETS).join(TOKEN_JSON))
    }
}

/// Extracts the spreadsheet ID from a Google Sheets URL such as
/// `https://docs.google.com/spreadsheets/d/SPREADSHEET_ID/edit`. An empty URL gives an empty ID.
fn extract_spreadsheet_id(url: &str) -> Result<&str> {
    if url.is_empty() {
        return Ok(url);
    }
    let mut parts = url.split('/').skip_while(|part| *part != "d").skip(1);
    match parts.next() {
        Some(id_part) => Ok(id_part
            .split(['?', '#'])
            .next()
            .unwrap_or(id_part)),
        None => bail!(
            "Invalid Google Sheets URL format. Expected: \
            https://docs.google.com/spreadsheets/d/SPREADSHEET_ID"
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const URL: &str =
        "https://docs.google.com/spreadsheets/d/7KpXm2RfZwNJgs84QhVYno5DU6iM9Wlr3bCzAv1txRpL/edit";

    #[tokio::test]
    async fn test_config_create_and_load() {
        let dir = TempDir::new().unwrap();
        let home_dir = dir.path().join("bookwheel_home");
        let secret_source_file = dir.path().join("x.json");
        let csv = dir.path().join("export.csv");
        utils::write(&secret_source_file, "12345").await.unwrap();
        utils::write(&csv, "Title,Author\n").await.unwrap();

        let config = Config::create(&home_dir, &secret_source_file, URL, Some(&csv))
            .await
            .unwrap();
        assert_eq!(URL, config.sheet_url());
        assert_eq!(
            "7KpXm2RfZwNJgs84QhVYno5DU6iM9Wlr3bCzAv1txRpL",
            config.spreadsheet_id()
        );
        assert_eq!(config.sheet_name(), "Sheet1");
        assert_eq!(
            utils::read(&config.client_secret_path()).await.unwrap(),
            "12345"
        );
        assert!(secret_source_file.is_file(), "the secret is copied, not moved");
        assert!(config.secrets().is_dir());

        let loaded = Config::load(&home_dir).await.unwrap();
        assert_eq!(loaded.spreadsheet_id(), config.spreadsheet_id());
        assert_eq!(loaded.csv_path(), Some(utils::canonicalize(&csv).await.unwrap()));
        assert_eq!(loaded.root(), config.root());
    }

    #[tokio::test]
    async fn test_config_create_rejects_bad_url() {
        let dir = TempDir::new().unwrap();
        let secret = dir.path().join("x.json");
        utils::write(&secret, "{}").await.unwrap();
        let result = Config::create(dir.path().join("home"), &secret, "https://example.com", None);
        assert!(result.await.is_err());
        assert!(!dir.path().join("home").exists());
    }

    #[tokio::test]
    async fn test_set_sheet_url() {
        let dir = TempDir::new().unwrap();
        let secret = dir.path().join("x.json");
        utils::write(&secret, "{}").await.unwrap();
        let home = dir.path().join("home");
        let mut config = Config::create(&home, &secret, "", None).await.unwrap();
        assert_eq!(config.spreadsheet_id(), "");
        assert_eq!(config.csv_path(), None);

        config
            .set_sheet_url("https://docs.google.com/spreadsheets/d/ABC123?foo=bar")
            .await
            .unwrap();
        assert_eq!(config.spreadsheet_id(), "ABC123");
        assert_eq!(Config::load(&home).await.unwrap().spreadsheet_id(), "ABC123");
        assert!(config.set_sheet_url("not a sheet").await.is_err());
    }

    #[tokio::test]
    async fn test_load_missing_home() {
        let dir = TempDir::new().unwrap();
        let err = Config::load(dir.path().join("nope")).await.unwrap_err();
        assert!(format!("{err:?}").contains("bookwheel init"));
    }

    #[tokio::test]
    async fn test_config_file_load_with_minimal_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.json");
        let json = r#"{
            "app_name": "bookwheel",
            "config_version": 1
        }"#;
        utils::write(&config_path, json).await.unwrap();

        let config = ConfigFile::load(&config_path).await.unwrap();
        assert_eq!(config.sheet_url, "");
        assert_eq!(config.sheet_name, "Sheet1");
        assert_eq!(
            config.client_secret_path(),
            PathBuf::from(SECRETS).join(CLIENT_SECRET_JSON)
        );
        assert_eq!(config.token_path(), PathBuf::from(SECRETS).join(TOKEN_JSON));
    }

    #[tokio::test]
    async fn test_config_file_load_invalid_app_name() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.json");
        let json = r#"{
            "app_name": "bookshelf",
            "config_version": 1,
            "sheet_url": "https://docs.google.com/spreadsheets/d/test"
        }"#;
        utils::write(&config_path, json).await.unwrap();

        let result = ConfigFile::load(&config_path).await;
        assert!(result.unwrap_err().to_string().contains("Invalid app_name"));
    }

    #[test]
    fn test_config_file_serialization_omits_none_fields() {
        let json = serde_json::to_string(&ConfigFile::default()).unwrap();
        assert!(!json.contains("client_secret_path"));
        assert!(!json.contains("token_path"));
        assert!(!json.contains("csv_path"));
    }

    #[test]
    fn test_extract_spreadsheet_id() {
        assert_eq!(
            extract_spreadsheet_id(URL).unwrap(),
            "7KpXm2RfZwNJgs84QhVYno5DU6iM9Wlr3bCzAv1txRpL"
        );
        assert_eq!(
            extract_spreadsheet_id("https://docs.google.com/spreadsheets/d/ABC123").unwrap(),
            "ABC123"
        );
        assert_eq!(
            extract_spreadsheet_id("https://docs.google.com/spreadsheets/d/ABC#gid=0").unwrap(),
            "ABC"
        );
        assert!(extract_spreadsheet_id("https://example.com/invalid").is_err());
        assert_eq!(extract_spreadsheet_id("").unwrap(), "");
    }
}
