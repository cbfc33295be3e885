//! Decides whether a book is the one to read next in a series that is already underway.

use crate::model::{ActiveSeries, Book};
use crate::series::progressive::{self, VariantState};
use crate::series::{title, SeriesKey};

/// How close a parsed number must be to `current + 1` to count as the next book.
pub const NEXT_BOOK_TOLERANCE: f64 = 0.1;

/// Finds the active series matching `series_name` (case-insensitively) and `normalized_author`.
pub fn find_active<'a>(
    active: &'a [ActiveSeries],
    series_name: &str,
    normalized_author: &str,
) -> Option<&'a ActiveSeries> {
    let key = SeriesKey {
        series: series_name.to_lowercase(),
        author: normalized_author.to_string(),
    };
    active
        .iter()
        .find(|a| key.matches(&a.series_name, &a.normalized_author))
}

/// Returns the active series that `book` is the next entry of, if any.
pub fn next_in<'a>(book: &Book, active: &'a [ActiveSeries]) -> Option<&'a ActiveSeries> {
    let info = title::extract(book.title());
    let (series_name, number) = info.numbered()?;
    let series = find_active(active, series_name, &title::normalize_author(book.author()))?;
    let expected = series.current_book_number + 1.0;
    ((number - expected).abs() < NEXT_BOOK_TOLERANCE).then_some(series)
}

/// True when `book` is exactly one past the current book of its active series.
pub fn is_next(book: &Book, active: &[ActiveSeries]) -> bool {
    next_in(book, active).is_some()
}

/// Like [`is_next`], but book #1 of a series is held back while a Progressive variant of the
/// series by the same author still has books to read, and allowed once that variant is done.
pub fn is_next_considering_progressive(
    book: &Book,
    active: &[ActiveSeries],
    all_books: &[Book],
) -> bool {
    let info = title::extract(book.title());
    let Some((series_name, number)) = info.numbered() else {
        return false;
    };
    if progressive::detect_progressive(series_name).is_progressive || !is_first(number) {
        return is_next(book, active);
    }
    let key = SeriesKey::new(series_name, book.author());
    match progressive::variant_state(&key, all_books) {
        VariantState::Pending => false,
        VariantState::Exhausted => true,
        VariantState::Absent => is_next(book, active),
    }
}

pub(crate) fn is_first(number: f64) -> bool {
    (number - 1.0).abs() < f64::EPSILON
}
