//! Pulls a series name and book number out of a free-text title.
//!
//! Titles are tried against a fixed list of shapes, and the first shape that matches wins. Shapes
//! without a number are only accepted when the candidate name passes [`looks_like_series`].

use crate::model::SeriesInfo;
use once_cell::sync::Lazy;
use regex_lite::{Captures, Regex};

/// A parenthetical or prefix this short, with no comma, is taken to be a series name.
pub const SHORT_SERIES_NAME_MAX_CHARS: usize = 20;

/// `Title (Series, #N)` and `Title (Series #N)`.
static HASH_IN_PARENS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(.+?)\s*\((.+?),?\s*#(\d+(?:\.\d+)?)\)").expect("valid regex")
});

/// `Title (Series, Book N)` and `Title (Series, N)`.
static BOOK_IN_PARENS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(.+?)\s*\((.+?),?\s+(?:Book\s+)?(\d+(?:\.\d+)?)\)").expect("valid regex")
});

/// `Series #N` and `Series #N: Title`.
static LEADING_HASH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(.+?)\s*#(\d+(?:\.\d+)?)(?::\s*(.+))?").expect("valid regex")
});

/// `Title (Series)`.
static BARE_PARENS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(.+?)\s*\((.+?)\)$").expect("valid regex"));

/// `Series: Title`.
static COLON_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(.+?):\s*(.+)").expect("valid regex"));

static SERIES_KEYWORD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(series|saga|chronicles|trilogy|cycle|book)\b").expect("valid regex")
});

/// The title shapes we recognize, in the order they are tried.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum TitlePattern {
    HashInParens,
    BookInParens,
    LeadingHash,
    BareParens,
    ColonPrefix,
}

pub const PATTERN_ORDER: [TitlePattern; 5] = [
    TitlePattern::HashInParens,
    TitlePattern::BookInParens,
    TitlePattern::LeadingHash,
    TitlePattern::BareParens,
    TitlePattern::ColonPrefix,
];

impl TitlePattern {
    /// Matches `title` against this shape alone.
    pub fn try_match(self, title: &str) -> Option<SeriesInfo> {
        match self {
            TitlePattern::HashInParens => numbered(HASH_IN_PARENS.captures(title)?, 2, 3),
            TitlePattern::BookInParens => numbered(BOOK_IN_PARENS.captures(title)?, 2, 3),
            TitlePattern::LeadingHash => numbered(LEADING_HASH.captures(title)?, 1, 2),
            TitlePattern::BareParens => unnumbered(BARE_PARENS.captures(title)?, 2),
            TitlePattern::ColonPrefix => unnumbered(COLON_PREFIX.captures(title)?, 1),
        }
    }
}

fn numbered(caps: Captures<'_>, name: usize, number: usize) -> Option<SeriesInfo> {
    let series_name = caps.get(name)?.as_str().trim();
    let book_number = caps.get(number)?.as_str().parse::<f64>().ok()?;
    Some(SeriesInfo::new(series_name, Some(book_number)))
}

fn unnumbered(caps: Captures<'_>, name: usize) -> Option<SeriesInfo> {
    let series_name = caps.get(name)?.as_str().trim();
    looks_like_series(series_name).then(|| SeriesInfo::new(series_name, None))
}

/// Extracts the series name and book number from `title`. Titles that do not look like part of a
/// series give an empty `SeriesInfo`.
pub fn extract(title: &str) -> SeriesInfo {
    PATTERN_ORDER
        .iter()
        .find_map(|pattern| pattern.try_match(title))
        .unwrap_or_default()
}

/// Whether `name` is plausibly a series name: it contains a word like "series" or "saga", or it
/// is short and has no comma.
pub fn looks_like_series(name: &str) -> bool {
    SERIES_KEYWORD.is_match(name)
        || (name.chars().count() <= SHORT_SERIES_NAME_MAX_CHARS && !name.contains(','))
}

/// Lowercases `author` and collapses whitespace so that the same author matches across rows.
pub fn normalize_author(author: &str) -> String {
    author
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}
