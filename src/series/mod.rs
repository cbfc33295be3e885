//! The series engine: title parsing, progression tracking, active-series detection and the
//! weighting and curation built on top of them.
//!
//! Everything in here is synchronous and works on an in-memory slice of [`Book`]s.

pub mod active;
pub mod continuation;
pub mod curate;
pub mod format;
pub mod progressive;
pub mod timeline;
pub mod title;
pub mod weight;

use crate::model::Book;

/// Identifies a series: the lowercased series name together with the normalized author. Two
/// series with the same name by different authors are different series.
#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct SeriesKey {
    pub series: String,
    pub author: String,
}

impl SeriesKey {
    pub fn new(series_name: &str, author: &str) -> Self {
        Self {
            series: series_name.to_lowercase(),
            author: title::normalize_author(author),
        }
    }

    /// The key of the series `book` belongs to, if its title names one.
    pub fn of(book: &Book) -> Option<Self> {
        let series_name = title::extract(book.title()).series_name?;
        Some(Self::new(&series_name, book.author()))
    }

    pub(crate) fn matches(&self, series_name: &str, normalized_author: &str) -> bool {
        self.author == normalized_author && self.series == series_name.to_lowercase()
    }
}
