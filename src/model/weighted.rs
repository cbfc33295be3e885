use crate::model::Book;
use serde::{Deserialize, Serialize};

/// A book along with the priority it was given.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeightedBook {
    pub book: Book,
    /// Always at least 1.
    pub weight: u32,
    pub reason: String,
}

/// Why a book made it into the curated set.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum BookType {
    Standalone,
    #[serde(rename = "First Book")]
    FirstBook,
    #[serde(rename = "Next in Series")]
    NextInSeries,
}

serde_plain::derive_display_from_serialize!(BookType);
serde_plain::derive_fromstr_from_deserialize!(BookType);

/// A weighted book that is worth reading now.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CuratedBook {
    pub book: Book,
    pub weight: u32,
    pub reason: String,
    pub series_name: Option<String>,
    pub book_number: Option<f64>,
    pub book_type: BookType,
}
