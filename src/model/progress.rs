use crate::model::Shelf;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// The series name and position parsed out of a book title.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesInfo {
    pub series_name: Option<String>,
    pub book_number: Option<f64>,
}

impl SeriesInfo {
    pub fn new(series_name: impl Into<String>, book_number: Option<f64>) -> Self {
        Self {
            series_name: Some(series_name.into()),
            book_number,
        }
    }

    /// The series name and number when both are present.
    pub fn numbered(&self) -> Option<(&str, f64)> {
        Some((self.series_name.as_deref()?, self.book_number?))
    }
}

/// The reading status of a book within a series.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BookProgressStatus {
    Read,
    CurrentlyReading,
    ReadingNext,
    ToRead,
    #[default]
    NotStarted,
}

serde_plain::derive_display_from_serialize!(BookProgressStatus);

impl BookProgressStatus {
    pub fn label(self) -> &'static str {
        match self {
            BookProgressStatus::Read => "Read",
            BookProgressStatus::CurrentlyReading => "Currently Reading",
            BookProgressStatus::ReadingNext => "Reading Next",
            BookProgressStatus::ToRead => "To Read",
            BookProgressStatus::NotStarted => "Not Started",
        }
    }

    pub fn is_in_progress(self) -> bool {
        matches!(
            self,
            BookProgressStatus::CurrentlyReading | BookProgressStatus::ReadingNext
        )
    }

    pub fn is_started(self) -> bool {
        self == BookProgressStatus::Read || self.is_in_progress()
    }
}

impl From<Shelf> for BookProgressStatus {
    fn from(shelf: Shelf) -> Self {
        match shelf {
            Shelf::Read => BookProgressStatus::Read,
            Shelf::CurrentlyReading => BookProgressStatus::CurrentlyReading,
            Shelf::ReadingNext => BookProgressStatus::ReadingNext,
            Shelf::ToRead => BookProgressStatus::ToRead,
            Shelf::Other => BookProgressStatus::NotStarted,
        }
    }
}

/// One position in a series. There is at most one entry per book number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookProgress {
    pub title: String,
    pub book_number: f64,
    pub status: BookProgressStatus,
    pub date_read: Option<NaiveDate>,
    pub author: String,
}

/// Reading progress through a single series by a single author.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesProgress {
    pub series_name: String,
    pub author: String,
    pub normalized_author: String,
    /// Sorted by `book_number` once the timeline is built.
    pub books: Vec<BookProgress>,
    pub highest_book_number: f64,
    pub books_read: usize,
    pub books_in_progress: usize,
    pub books_to_read: usize,
    /// `books_read` over the number of tracked books, in the range `0..=100`.
    pub completion_percentage: f64,
    pub current_book_number: Option<f64>,
    pub first_read_date: Option<NaiveDate>,
    pub last_read_date: Option<NaiveDate>,
}

impl SeriesProgress {
    pub fn is_incomplete(&self) -> bool {
        self.books_to_read > 0 || self.books_in_progress > 0
    }
}

/// All series that have been started and are not yet finished.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesProgressionTimeline {
    pub series: Vec<SeriesProgress>,
    pub total_series: usize,
    pub total_books_read: usize,
    pub total_books_in_progress: usize,
}

/// A series the reader is currently moving through, along with the book they are on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveSeries {
    pub series_name: String,
    pub author: String,
    pub current_book: String,
    pub current_book_number: f64,
    pub normalized_author: String,
}
