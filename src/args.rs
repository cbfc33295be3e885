//! These structs provide the CLI interface for the bookwheel CLI.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::error;
use tracing_subscriber::filter::LevelFilter;

/// bookwheel: decides what to read next from your Goodreads library.
///
/// Export your library from Goodreads (My Books > Import and export) and point bookwheel at the
/// CSV. It works out which series you are in the middle of and weights your to-read shelf so that
/// the next book of each active series comes first. The weighted list can be published to a
/// Google sheet.
///
/// Publishing needs a Google OAuth client. Run `bookwheel init` with the downloaded client
/// credentials and then `bookwheel auth` once.
#[derive(Debug, Parser, Clone)]
pub struct Args {
    #[clap(flatten)]
    common: Common,

    #[command(subcommand)]
    command: Command,
}

impl Args {
    pub fn new(common: Common, command: Command) -> Self {
        Self { common, command }
    }

    pub fn common(&self) -> &Common {
        &self.common
    }

    pub fn command(&self) -> &Command {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Create the data directory and initialize the configuration files.
    ///
    /// You only need this for publishing to a Google sheet or for remembering the location of
    /// your Goodreads export.
    ///
    /// - Decide what directory you want to store data in and pass this as --bookwheel-home. By
    ///   default, it will be $HOME/bookwheel.
    ///
    /// - Create a Google Sheet and pass its URL as --sheet-url.
    ///
    /// - Create OAuth client credentials of type "Desktop app" in the Google Cloud console,
    ///   download them and pass the file as --client-secret.
    Init(InitArgs),
    /// Authenticate with Google Sheets via OAuth.
    Auth(AuthArgs),
    /// Weight your to-read shelf and show the weight distribution.
    Weigh(WeighArgs),
    /// Show how far you are through every series you have started.
    Timeline(SourceArgs),
    /// List the series you are actively reading.
    Active(SourceArgs),
    /// Narrow the weighted list to standalones, series openers and next-in-series books.
    Curate(WeighArgs),
}

/// Arguments common to all subcommands.
#[derive(Debug, Parser, Clone)]
pub struct Common {
    /// The logging verbosity. One of, from least to most verbose:
    /// off, error, warn, info, debug, trace
    ///
    /// This can be overridden by RUST_LOG.
    #[arg(long, default_value_t = LevelFilter::INFO)]
    log_level: LevelFilter,

    /// The directory where bookwheel configuration is held. Defaults to ~/bookwheel
    #[arg(long, env = "BOOKWHEEL_HOME", default_value_t = default_bookwheel_home())]
    bookwheel_home: DisplayPath,

    /// Evaluate "recently read" relative to this date (YYYY-MM-DD) instead of today.
    #[arg(long)]
    as_of: Option<NaiveDate>,
}

impl Common {
    pub fn new(log_level: LevelFilter, bookwheel_home: PathBuf) -> Self {
        Self {
            log_level,
            bookwheel_home: bookwheel_home.into(),
            as_of: None,
        }
    }

    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    pub fn bookwheel_home(&self) -> &DisplayPath {
        &self.bookwheel_home
    }

    pub fn as_of(&self) -> Option<NaiveDate> {
        self.as_of
    }
}

/// (Not shown): Args for the `bookwheel init` command.
#[derive(Debug, Parser, Clone)]
pub struct InitArgs {
    /// The URL to the Google sheet results are published to. It looks like this:
    /// https://docs.google.com/spreadsheets/d/1a7Km9FxQwRbPt82JvN4LzYpH5OcGnWsT6iDuE3VhMjX
    #[arg(long, default_value = "")]
    sheet_url: String,

    /// The path to your downloaded OAuth client credentials. This file will be copied to the
    /// default secrets location in the main data directory.
    #[arg(long)]
    client_secret: PathBuf,

    /// The Goodreads library export to use when a command is not given --csv.
    #[arg(long)]
    csv: Option<PathBuf>,
}

impl InitArgs {
    pub fn new(
        sheet_url: impl Into<String>,
        client_secret: impl Into<PathBuf>,
        csv: Option<PathBuf>,
    ) -> Self {
        Self {
            sheet_url: sheet_url.into(),
            client_secret: client_secret.into(),
            csv,
        }
    }

    pub fn sheet_url(&self) -> &str {
        &self.sheet_url
    }

    pub fn client_secret(&self) -> &Path {
        &self.client_secret
    }

    pub fn csv(&self) -> Option<&Path> {
        self.csv.as_deref()
    }
}

/// (Not shown): Args for the `bookwheel auth` command.
#[derive(Debug, Parser, Clone)]
pub struct AuthArgs {
    /// Verify and refresh authentication.
    #[arg(long)]
    verify: bool,
}

impl AuthArgs {
    pub fn new(verify: bool) -> Self {
        Self { verify }
    }

    pub fn verify(&self) -> bool {
        self.verify
    }
}

/// (Not shown): Args for commands that only read the library.
#[derive(Debug, Default, Parser, Clone)]
pub struct SourceArgs {
    /// The Goodreads library export. Defaults to the csv_path in config.json.
    #[arg(long)]
    csv: Option<PathBuf>,
}

impl SourceArgs {
    pub fn new(csv: Option<PathBuf>) -> Self {
        Self { csv }
    }

    pub fn csv(&self) -> Option<&Path> {
        self.csv.as_deref()
    }
}

/// (Not shown): Args for the `bookwheel weigh` and `bookwheel curate` commands.
#[derive(Debug, Default, Parser, Clone)]
pub struct WeighArgs {
    #[clap(flatten)]
    source: SourceArgs,

    /// Publish the result to the configured Google sheet.
    #[arg(long)]
    upload: bool,

    /// Publish to this sheet instead, and remember it in config.json. Implies --upload.
    #[arg(long)]
    sheet_url: Option<String>,
}

impl WeighArgs {
    pub fn new(csv: Option<PathBuf>, upload: bool, sheet_url: Option<String>) -> Self {
        Self {
            source: SourceArgs::new(csv),
            upload,
            sheet_url,
        }
    }

    pub fn csv(&self) -> Option<&Path> {
        self.source.csv()
    }

    pub fn upload(&self) -> bool {
        self.upload || self.sheet_url.is_some()
    }

    pub fn sheet_url(&self) -> Option<&str> {
        self.sheet_url.as_deref()
    }
}

fn default_bookwheel_home() -> DisplayPath {
    DisplayPath(match dirs::home_dir() {
        Some(home) => home.join("bookwheel"),
        None => {
            error!(
                "There was an error when trying to get your home directory. You can get around \
                this by providing --bookwheel-home or BOOKWHEEL_HOME instead of relying on the \
                default bookwheel home directory.",
            );
            PathBuf::from("bookwheel")
        }
    })
}

#[derive(Debug, Default, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct DisplayPath(PathBuf);

impl From<PathBuf> for DisplayPath {
    fn from(value: PathBuf) -> Self {
        DisplayPath(value)
    }
}

impl Deref for DisplayPath {
    type Target = Path;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<Path> for DisplayPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl Display for DisplayPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_string_lossy())
    }
}

impl FromStr for DisplayPath {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(PathBuf::from(s)))
    }
}

impl DisplayPath {
    pub fn path(&self) -> &Path {
        &self.0
    }
}
