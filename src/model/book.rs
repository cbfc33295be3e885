use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Date layouts found in the `Date Read` column of a Goodreads export.
const DATE_FORMATS: &[&str] = &["%Y/%m/%d", "%Y-%m-%d", "%m/%d/%Y"];

/// One row of a Goodreads library export. Only the columns used for weighting are kept, anything
/// else in the CSV is ignored.
#[derive(Default, Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct Book {
    #[serde(rename = "Title")]
    title: String,

    #[serde(rename = "Author", default)]
    author: String,

    /// Free-text list of every shelf the book is on. Passed through to the sheet as-is.
    #[serde(rename = "Bookshelves", default)]
    bookshelves: String,

    #[serde(rename = "Exclusive Shelf", default)]
    exclusive_shelf: String,

    #[serde(rename = "Date Read", default)]
    date_read: String,

    #[serde(rename = "Original Publication Year", default)]
    original_publication_year: String,

    #[serde(rename = "Year Published", default)]
    year_published: String,
}

impl Book {
    pub fn new(title: impl Into<String>, author: impl Into<String>, shelf: Shelf) -> Self {
        Self {
            title: title.into(),
            author: author.into(),
            bookshelves: shelf.to_string(),
            exclusive_shelf: shelf.to_string(),
            ..Default::default()
        }
    }

    /// Sets the `Date Read` column, e.g. `2024/03/15`.
    pub fn with_date_read(mut self, date_read: impl Into<String>) -> Self {
        self.date_read = date_read.into();
        self
    }

    /// Sets the `Original Publication Year` column.
    pub fn with_publication_year(mut self, year: i32) -> Self {
        self.original_publication_year = year.to_string();
        self
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn author(&self) -> &str {
        &self.author
    }

    pub fn bookshelves(&self) -> &str {
        &self.bookshelves
    }

    pub fn shelf(&self) -> Shelf {
        Shelf::from_label(&self.exclusive_shelf)
    }

    /// The date the book was finished, if the export carries one in a recognizable layout.
    pub fn date_read(&self) -> Option<NaiveDate> {
        let raw = self.date_read.trim();
        if raw.is_empty() {
            return None;
        }
        DATE_FORMATS
            .iter()
            .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
    }

    /// The original publication year, falling back to the year of this edition. A zero or
    /// unparseable year counts as missing.
    pub fn publication_year(&self) -> Option<i32> {
        parse_year(&self.original_publication_year).or_else(|| parse_year(&self.year_published))
    }
}

/// Parses the leading digits of `s` as a year.
fn parse_year(s: &str) -> Option<i32> {
    let digits: String = s
        .trim()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse::<i32>().ok().filter(|&year| year != 0)
}

/// The Goodreads exclusive shelf, i.e. the reading status of a book.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Shelf {
    ToRead,
    CurrentlyReading,
    ReadingNext,
    Read,
    #[default]
    Other,
}

serde_plain::derive_display_from_serialize!(Shelf);
serde_plain::derive_fromstr_from_deserialize!(Shelf);

impl Shelf {
    /// Interprets a raw shelf label. Labels are compared trimmed and lowercased, anything that is
    /// not one of the known shelves is `Other`.
    pub fn from_label(label: &str) -> Self {
        label.trim().to_lowercase().parse().unwrap_or(Shelf::Other)
    }

    /// Whether the book has been started, i.e. it is read or being read.
    pub fn is_started(self) -> bool {
        matches!(
            self,
            Shelf::Read | Shelf::CurrentlyReading | Shelf::ReadingNext
        )
    }
}
