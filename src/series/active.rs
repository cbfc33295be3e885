//! Works out which series the reader is in the middle of, and which book they are on.

use crate::model::{ActiveSeries, Book, BookProgressStatus, SeriesProgressionTimeline, Shelf};
use crate::series::{title, SeriesKey};
use chrono::{Datelike, NaiveDate};
use tracing::{debug, trace};

/// A book finished this many calendar years before the reference date still counts as recent.
pub const RECENT_READ_YEARS: i32 = 1;

/// Merges currently-reading, recently read and reading-next books with the incomplete series of
/// `timeline` into one entry per series. `today` is the reference date for recency.
pub fn detect(
    all_books: &[Book],
    timeline: &SeriesProgressionTimeline,
    today: NaiveDate,
) -> Vec<ActiveSeries> {
    let mut tracker = Tracker::default();

    for (book, number) in numbered_on_shelf(all_books, Shelf::CurrentlyReading) {
        tracker.add(book, number);
    }

    let oldest_recent_year = today.year() - RECENT_READ_YEARS;
    let recent = numbered_on_shelf(all_books, Shelf::Read).filter(|(book, _)| {
        book.date_read()
            .is_some_and(|date| date.year() >= oldest_recent_year)
    });
    for (book, number) in recent {
        tracker.add_or_bump(book, number);
    }

    for (book, number) in numbered_on_shelf(all_books, Shelf::ReadingNext) {
        tracker.add(book, number);
    }

    for series in timeline.series.iter().filter(|s| s.is_incomplete()) {
        let highest_read = series
            .books
            .iter()
            .rev()
            .find(|b| b.status == BookProgressStatus::Read);
        let key = SeriesKey::new(&series.series_name, &series.author);
        match tracker.find_mut(&key) {
            Some(existing) => {
                if let Some(read) = highest_read {
                    if read.book_number > existing.current_book_number {
                        trace!("Bumping {} to #{}", existing.series_name, read.book_number);
                        existing.current_book = read.title.clone();
                        existing.current_book_number = read.book_number;
                    }
                }
            }
            None => {
                let marker = highest_read
                    .or_else(|| {
                        series
                            .books
                            .iter()
                            .find(|b| b.status == BookProgressStatus::CurrentlyReading)
                    })
                    .or_else(|| {
                        series
                            .books
                            .iter()
                            .find(|b| b.status == BookProgressStatus::ReadingNext)
                    });
                if let Some(marker) = marker {
                    tracker.active.push(ActiveSeries {
                        series_name: series.series_name.clone(),
                        author: series.author.clone(),
                        current_book: marker.title.clone(),
                        current_book_number: marker.book_number,
                        normalized_author: series.normalized_author.clone(),
                    });
                }
            }
        }
    }

    debug!("Detected {} active series", tracker.active.len());
    tracker.active
}

/// Books on `shelf` whose title carries both a series name and a number.
fn numbered_on_shelf(books: &[Book], shelf: Shelf) -> impl Iterator<Item = (&Book, f64)> {
    books
        .iter()
        .filter(move |book| book.shelf() == shelf)
        .filter_map(|book| {
            let number = title::extract(book.title()).book_number?;
            Some((book, number))
        })
}

#[derive(Default)]
struct Tracker {
    active: Vec<ActiveSeries>,
}

impl Tracker {
    fn find_mut(&mut self, key: &SeriesKey) -> Option<&mut ActiveSeries> {
        self.active
            .iter_mut()
            .find(|a| key.matches(&a.series_name, &a.normalized_author))
    }

    /// Adds `book` unless its series is already tracked.
    fn add(&mut self, book: &Book, number: f64) {
        let Some(key) = SeriesKey::of(book) else {
            return;
        };
        if self.find_mut(&key).is_none() {
            self.active.push(new_active(book, number));
        }
    }

    /// Adds `book`, or moves an already tracked series forward to it.
    fn add_or_bump(&mut self, book: &Book, number: f64) {
        let Some(key) = SeriesKey::of(book) else {
            return;
        };
        match self.find_mut(&key) {
            Some(existing) => {
                if number > existing.current_book_number {
                    existing.current_book = book.title().to_string();
                    existing.current_book_number = number;
                }
            }
            None => self.active.push(new_active(book, number)),
        }
    }
}

fn new_active(book: &Book, number: f64) -> ActiveSeries {
    let info = title::extract(book.title());
    ActiveSeries {
        series_name: info.series_name.unwrap_or_default(),
        author: book.author().to_string(),
        current_book: book.title().to_string(),
        current_book_number: number,
        normalized_author: title::normalize_author(book.author()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::timeline;
    use crate::test::{book, today};

    fn run(books: &[Book]) -> Vec<ActiveSeries> {
        detect(books, &timeline::build(books), today())
    }

    #[test]
    fn test_currently_reading_first_wins() {
        let books = vec![
            book("Dawn (Unholy Trinity, #1)", "Maria Lewis", Shelf::CurrentlyReading),
            book("Twilight (Unholy Trinity, #2)", "Maria Lewis", Shelf::CurrentlyReading),
        ];
        let active = run(&books);
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].series_name, "Unholy Trinity");
        assert_eq!(active[0].current_book_number, 1.0);
        assert_eq!(active[0].normalized_author, "maria lewis");
    }

    #[test]
    fn test_recent_read_window() {
        let last_year = format!("{}/06/01", today().year() - 1);
        let two_years_ago = format!("{}/06/01", today().year() - 2);
        let books = vec![
            book("Recent (Recent Saga, #1)", "A", Shelf::Read).with_date_read(&last_year),
            book("Stale (Stale Saga, #1)", "B", Shelf::Read).with_date_read(&two_years_ago),
        ];
        let active = run(&books);
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].series_name, "Recent Saga");
    }

    #[test]
    fn test_recent_read_bumps_upward_only() {
        let date = format!("{}/01/01", today().year());
        let books = vec![
            book("Three (Wayfarers, #3)", "Becky Chambers", Shelf::CurrentlyReading),
            book("Two (Wayfarers, #2)", "Becky Chambers", Shelf::Read).with_date_read(&date),
            book("Four (Wayfarers, #4)", "becky  chambers", Shelf::Read).with_date_read(&date),
        ];
        let active = run(&books);
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].current_book_number, 4.0);
        assert_eq!(active[0].current_book, "Four (Wayfarers, #4)");
    }

    #[test]
    fn test_reading_next_never_overrides() {
        let books = vec![
            book("One (Expanse, #1)", "Corey", Shelf::CurrentlyReading),
            book("Five (Expanse, #5)", "Corey", Shelf::ReadingNext),
            book("Solo (Murderbot, #1)", "Martha Wells", Shelf::ReadingNext),
        ];
        let active = run(&books);
        assert_eq!(active.len(), 2);
        assert_eq!(active[0].current_book_number, 1.0);
        assert_eq!(active[1].series_name, "Murderbot");
        assert_eq!(active[1].current_book_number, 1.0);
    }

    #[test]
    fn test_incomplete_series_from_timeline() {
        let books = vec![
            book("One (Old Saga, #1)", "A", Shelf::Read).with_date_read("2001/01/01"),
            book("Two (Old Saga, #2)", "A", Shelf::Read).with_date_read("2001/02/01"),
            book("Three (Old Saga, #3)", "A", Shelf::ToRead),
        ];
        let active = run(&books);
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].series_name, "Old Saga");
        assert_eq!(active[0].current_book_number, 2.0);
        assert_eq!(active[0].current_book, "Two (Old Saga, #2)");
    }

    #[test]
    fn test_timeline_bumps_tracked_series() {
        let books = vec![
            book("One (Old Saga, #1)", "A", Shelf::ReadingNext),
            book("Two (Old Saga, #2)", "A", Shelf::Read).with_date_read("2001/02/01"),
            book("Three (Old Saga, #3)", "A", Shelf::ToRead),
        ];
        let active = run(&books);
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].current_book_number, 2.0);
    }

    #[test]
    fn test_unnumbered_books_are_ignored() {
        let books = vec![
            book("Some Standalone", "A", Shelf::CurrentlyReading),
            book("Dune: Messiah", "Frank Herbert", Shelf::CurrentlyReading),
        ];
        assert!(run(&books).is_empty());
    }
}
