//! Reconstructs how far the reader has got through every series in their library.
//!
//! Books are grouped by [`SeriesKey`] and run through four stages: titles with an explicit number
//! are placed first, then unnumbered books of a known series are placed by publication year, then
//! gaps in the numbering are filled with same-author books that carry no series marker at all, and
//! finally each series is summarized. Series that were never started, or that are fully read, are
//! left out.

use crate::model::{
    Book, BookProgress, BookProgressStatus, SeriesInfo, SeriesProgress, SeriesProgressionTimeline,
};
use crate::series::{title, SeriesKey};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use tracing::{debug, trace};

/// Books with no publication year sort after everything else.
pub const UNKNOWN_YEAR: i32 = 9999;

const ADJACENCY_EPSILON: f64 = 1e-9;

type SeriesMap = BTreeMap<SeriesKey, SeriesProgress>;

/// A book from the library along with what its title tells us.
struct Parsed<'a> {
    book: &'a Book,
    info: SeriesInfo,
    author: String,
}

impl Parsed<'_> {
    fn year(&self) -> i32 {
        self.book.publication_year().unwrap_or(UNKNOWN_YEAR)
    }

    fn key(&self) -> Option<SeriesKey> {
        let series_name = self.info.series_name.as_deref()?;
        Some(SeriesKey {
            series: series_name.to_lowercase(),
            author: self.author.clone(),
        })
    }
}

/// Builds the progression timeline for the whole library.
pub fn build(all_books: &[Book]) -> SeriesProgressionTimeline {
    let parsed: Vec<Parsed<'_>> = all_books
        .iter()
        .map(|book| Parsed {
            book,
            info: title::extract(book.title()),
            author: title::normalize_author(book.author()),
        })
        .collect();

    let mut map = SeriesMap::new();
    direct_pass(&parsed, &mut map);
    infer_unnumbered(&parsed, &mut map);
    fill_gaps(&parsed, &mut map);
    let timeline = finalize(map);
    debug!(
        "Built a timeline of {} series from {} books",
        timeline.total_series,
        all_books.len()
    );
    timeline
}

/// Places every book whose title carries a series number.
fn direct_pass(parsed: &[Parsed<'_>], map: &mut SeriesMap) {
    for p in parsed {
        let (Some(key), Some(number)) = (p.key(), p.info.book_number) else {
            continue;
        };
        let series = map.entry(key).or_insert_with(|| SeriesProgress {
            series_name: p.info.series_name.clone().unwrap_or_default(),
            author: p.book.author().to_string(),
            normalized_author: p.author.clone(),
            ..Default::default()
        });
        let progress = book_progress(p.book, number);
        match series.books.iter_mut().find(|b| b.book_number == number) {
            Some(existing) => {
                if should_replace(existing.status, progress.status) {
                    trace!(
                        "'{}' replaces '{}' at #{number}",
                        progress.title,
                        existing.title
                    );
                    *existing = progress;
                }
            }
            None => series.books.push(progress),
        }
    }
}

/// When the same number shows up twice, a book being read beats a read one, which beats anything
/// else. Among equals the later row wins, except that unstarted rows never displace each other.
fn should_replace(existing: BookProgressStatus, incoming: BookProgressStatus) -> bool {
    fn rank(status: BookProgressStatus) -> u8 {
        match status {
            BookProgressStatus::CurrentlyReading | BookProgressStatus::ReadingNext => 2,
            BookProgressStatus::Read => 1,
            BookProgressStatus::ToRead | BookProgressStatus::NotStarted => 0,
        }
    }
    let (old, new) = (rank(existing), rank(incoming));
    new > old || (new == old && new > 0)
}

/// Gives leading numbers to unnumbered books of a series when they were published no later than
/// the earliest numbered book, and that book is not already #1.
fn infer_unnumbered(parsed: &[Parsed<'_>], map: &mut SeriesMap) {
    for (key, series) in map.iter_mut() {
        let mut unnumbered: Vec<&Parsed<'_>> = parsed
            .iter()
            .filter(|p| p.info.book_number.is_none() && p.key().as_ref() == Some(key))
            .collect();
        if unnumbered.is_empty() {
            continue;
        }
        unnumbered.sort_by_key(|p| p.year());

        let mut numbered: Vec<(f64, i32)> = series
            .books
            .iter()
            .map(|b| {
                let year = source_of(parsed, key, b.book_number).map_or(UNKNOWN_YEAR, Parsed::year);
                (b.book_number, year)
            })
            .collect();
        numbered.sort_by_key(|&(_, year)| year);
        let Some(&(earliest_number, earliest_year)) = numbered.first() else {
            continue;
        };
        if earliest_number <= 1.0 {
            continue;
        }

        let mut assigned = 1.0;
        for p in unnumbered.iter().filter(|p| p.year() <= earliest_year) {
            if !has_number(series, assigned) {
                debug!(
                    "Inferred '{}' as #{assigned} of {}",
                    p.book.title(),
                    series.series_name
                );
                series.books.push(book_progress(p.book, assigned));
            }
            assigned += 1.0;
            if assigned >= earliest_number {
                break;
            }
        }
    }
}

/// Fills numbering gaps (e.g. #5 then #7) with books by the same author that have no series
/// marker in their title and were published between the two bounding books.
fn fill_gaps(parsed: &[Parsed<'_>], map: &mut SeriesMap) {
    for (key, series) in map.iter_mut() {
        if series.books.len() < 2 {
            continue;
        }
        let mut bounds: Vec<(f64, i32)> = series
            .books
            .iter()
            .filter_map(|b| {
                source_of(parsed, key, b.book_number).map(|p| (b.book_number, p.year()))
            })
            .collect();
        bounds.sort_by(|a, b| a.0.total_cmp(&b.0));

        for pair in bounds.windows(2) {
            let ((low, low_year), (high, high_year)) = (pair[0], pair[1]);
            if high - low <= 1.0 {
                continue;
            }
            // A gap can span billions of numbers, only as many as there are candidates are used.
            let missing = (1u64..)
                .map(|step| low + step as f64)
                .take_while(|number| *number < high);

            let mut candidates: Vec<&Parsed<'_>> = parsed
                .iter()
                .filter(|p| p.author == key.author && p.info.series_name.is_none())
                .filter(|p| !series.books.iter().any(|b| b.title == p.book.title()))
                .filter(|p| {
                    p.book
                        .publication_year()
                        .is_some_and(|year| year >= low_year && year <= high_year)
                })
                .collect();
            candidates.sort_by_key(|p| p.year());

            for (p, number) in candidates.into_iter().zip(missing) {
                if !has_number(series, number) {
                    debug!(
                        "Filled gap #{number} of {} with '{}'",
                        series.series_name,
                        p.book.title()
                    );
                    series.books.push(book_progress(p.book, number));
                }
            }
        }
    }
}

/// Sorts, filters and summarizes the series.
fn finalize(map: SeriesMap) -> SeriesProgressionTimeline {
    let mut all_series = Vec::new();
    for (key, mut series) in map {
        series
            .books
            .sort_by(|a, b| a.book_number.total_cmp(&b.book_number));

        let first = series
            .books
            .iter()
            .find(|b| b.book_number == 1.0)
            .or_else(|| series.books.first());
        if !first.is_some_and(|b| b.status.is_started()) {
            trace!("Skipping {key:?}, the first book has not been started");
            continue;
        }

        let count = |f: fn(BookProgressStatus) -> bool| {
            series.books.iter().filter(|b| f(b.status)).count()
        };
        series.books_read = count(|s| s == BookProgressStatus::Read);
        series.books_in_progress = count(BookProgressStatus::is_in_progress);
        series.books_to_read = count(|s| s == BookProgressStatus::ToRead);

        let total = series.books.len();
        if series.books_read == total && !series.is_incomplete() {
            trace!("Skipping {key:?}, every book has been read");
            continue;
        }

        series.completion_percentage =
            (series.books_read as f64 / total as f64 * 100.0).min(100.0);
        series.highest_book_number = series.books.last().map_or(0.0, |b| b.book_number);

        let read_dates = series
            .books
            .iter()
            .filter(|b| b.status == BookProgressStatus::Read)
            .filter_map(|b| b.date_read);
        series.first_read_date = read_dates.clone().min();
        series.last_read_date = read_dates.max();

        series.current_book_number = series
            .books
            .iter()
            .find(|b| b.status == BookProgressStatus::CurrentlyReading)
            .map(|b| b.book_number);

        all_series.push(series);
    }

    all_series.sort_by(compare_recency);

    SeriesProgressionTimeline {
        total_series: all_series.len(),
        total_books_read: all_series.iter().map(|s| s.books_read).sum(),
        total_books_in_progress: all_series.iter().map(|s| s.books_in_progress).sum(),
        series: all_series,
    }
}

/// Most recently read first, then series nobody has finished a book of yet, alphabetically.
fn compare_recency(a: &SeriesProgress, b: &SeriesProgress) -> Ordering {
    let by_name = || {
        a.series_name
            .to_lowercase()
            .cmp(&b.series_name.to_lowercase())
    };
    match (a.last_read_date, b.last_read_date) {
        (Some(x), Some(y)) => y.cmp(&x).then_with(by_name),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => by_name(),
    }
}

fn book_progress(book: &Book, book_number: f64) -> BookProgress {
    let status = BookProgressStatus::from(book.shelf());
    BookProgress {
        title: book.title().to_string(),
        book_number,
        status,
        date_read: match status {
            BookProgressStatus::Read => book.date_read(),
            _ => None,
        },
        author: book.author().to_string(),
    }
}

fn has_number(series: &SeriesProgress, number: f64) -> bool {
    series.books.iter().any(|b| b.book_number == number)
}

/// The library book whose title places it at `number` in the series identified by `key`.
fn source_of<'a, 'b>(
    parsed: &'a [Parsed<'b>],
    key: &SeriesKey,
    number: f64,
) -> Option<&'a Parsed<'b>> {
    parsed
        .iter()
        .find(|p| p.info.book_number == Some(number) && p.key().as_ref() == Some(key))
}

/// Whether `next` directly follows `prev` when rendering a run of books: a step of one, a step of
/// 0.1 after a fractional number, or a half step within the same whole number.
pub fn is_adjacent(prev: f64, next: f64) -> bool {
    let diff = next - prev;
    let near = |target: f64| (diff - target).abs() < ADJACENCY_EPSILON;
    near(1.0)
        || (near(0.1) && prev.fract() != 0.0)
        || (near(0.5) && prev.floor() == next.floor())
}
