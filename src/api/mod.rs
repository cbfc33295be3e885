//! Publishing results to a Google sheet.
//!
//! The rest of the crate talks to the [`Sheet`] trait. In [`Mode::Google`] it is backed by the
//! Google Sheets API, in [`Mode::Testing`] by an in-memory store.

mod files;
mod oauth;
mod sheet;
mod test_sheet;

use crate::model::{CuratedBook, WeightedBook};
use crate::{Config, Result};
use anyhow::ensure;
use sheet::GoogleSheet;
use tracing::info;

pub(crate) use oauth::TokenProvider;
pub(crate) use test_sheet::TestSheet;
#[cfg(test)]
pub(crate) use test_sheet::TestSheetState;

const OAUTH_SCOPES: &[&str] = &["https://www.googleapis.com/auth/spreadsheets"];

/// Set this environment variable to a non-empty value to use the in-memory sheet.
pub const TEST_MODE_ENV: &str = "BOOKWHEEL_IN_TEST_MODE";

pub(crate) const WEIGHTED_HEADER: [&str; 4] =
    ["Book Title by Author", "Bookshelves", "Weight", "Reason"];
pub(crate) const CURATED_HEADER: [&str; 7] = [
    "Book Title by Author",
    "Bookshelves",
    "Weight",
    "Reason",
    "Series",
    "Book #",
    "Type",
];

/// Whether we talk to Google or to the in-memory test sheet.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq)]
pub enum Mode {
    #[default]
    Google,
    Testing,
}

impl Mode {
    pub fn from_env() -> Self {
        match std::env::var(TEST_MODE_ENV) {
            Ok(value) if !value.is_empty() => Mode::Testing,
            _ => Mode::Google,
        }
    }
}

/// A block of rows to write, starting at the top-left cell of `range`, e.g. `Sheet1!A1`.
#[derive(Debug, Clone, Eq, PartialEq)]
pub(crate) struct SheetRange {
    pub(crate) range: String,
    pub(crate) values: Vec<Vec<String>>,
}

impl SheetRange {
    pub(crate) fn new(range: impl Into<String>, values: Vec<Vec<String>>) -> Self {
        Self {
            range: range.into(),
            values,
        }
    }
}

#[async_trait::async_trait]
pub(crate) trait Sheet: Send {
    /// Gets the values of every row in the `sheet_name` tab.
    async fn get(&mut self, sheet_name: &str) -> Result<Vec<Vec<String>>>;

    async fn clear_ranges(&mut self, ranges: &[&str]) -> Result<()>;

    async fn write_ranges(&mut self, data: &[SheetRange]) -> Result<()>;
}

/// Creates the `Sheet` for the spreadsheet in `config`.
pub(crate) async fn sheet(config: &Config, mode: Mode) -> Result<Box<dyn Sheet>> {
    ensure!(
        !config.spreadsheet_id().is_empty(),
        "No sheet URL is configured. Pass --sheet-url or set sheet_url in {}",
        config.config_path().display()
    );
    Ok(match mode {
        Mode::Google => {
            let token_provider =
                TokenProvider::load(config.client_secret_path(), config.token_path()).await?;
            Box::new(GoogleSheet::new(config.clone(), token_provider).await?)
        }
        Mode::Testing => Box::new(TestSheet::new(config.spreadsheet_id())),
    })
}

/// Title given to spreadsheets that bookwheel creates itself.
pub(crate) const SPREADSHEET_TITLE: &str = "GoodReads Books";

/// Creates a spreadsheet with the configured tab and returns its URL.
pub(crate) async fn create_spreadsheet(config: &Config, mode: Mode) -> Result<String> {
    let url = match mode {
        Mode::Google => {
            let token_provider =
                TokenProvider::load(config.client_secret_path(), config.token_path()).await?;
            sheet::create_spreadsheet(token_provider, SPREADSHEET_TITLE, config.sheet_name())
                .await?
        }
        Mode::Testing => TestSheet::create(config.sheet_name()),
    };
    info!("Created a new spreadsheet at {url}");
    Ok(url)
}

/// Replaces the contents of the `tab` with the header and one row per weighted book.
pub(crate) async fn write_weighted_books(
    sheet: &mut dyn Sheet,
    tab: &str,
    books: &[WeightedBook],
) -> Result<()> {
    let rows = books.iter().map(|wb| {
        vec![
            title_by_author(wb.book.title(), wb.book.author()),
            wb.book.bookshelves().to_string(),
            wb.weight.to_string(),
            wb.reason.clone(),
        ]
    });
    replace_tab(sheet, tab, &WEIGHTED_HEADER, rows).await?;
    info!("Wrote {} books to the '{tab}' tab", books.len());
    Ok(())
}

/// Like [`write_weighted_books`], with the series, book number and type of each curated book.
pub(crate) async fn write_curated_books(
    sheet: &mut dyn Sheet,
    tab: &str,
    books: &[CuratedBook],
) -> Result<()> {
    let rows = books.iter().map(|cb| {
        vec![
            title_by_author(cb.book.title(), cb.book.author()),
            cb.book.bookshelves().to_string(),
            cb.weight.to_string(),
            cb.reason.clone(),
            cb.series_name.clone().unwrap_or_default(),
            cb.book_number.map(|n| n.to_string()).unwrap_or_default(),
            cb.book_type.to_string(),
        ]
    });
    replace_tab(sheet, tab, &CURATED_HEADER, rows).await?;
    info!("Wrote {} curated books to the '{tab}' tab", books.len());
    Ok(())
}

fn title_by_author(title: &str, author: &str) -> String {
    format!("{title} by {author}")
}

async fn replace_tab(
    sheet: &mut dyn Sheet,
    tab: &str,
    header: &[&str],
    rows: impl Iterator<Item = Vec<String>>,
) -> Result<()> {
    let values: Vec<Vec<String>> = std::iter::once(header.iter().map(|h| h.to_string()).collect())
        .chain(rows)
        .collect();
    sheet.clear_ranges(&[tab]).await?;
    sheet
        .write_ranges(&[SheetRange::new(format!("{tab}!A1"), values)])
        .await
}
