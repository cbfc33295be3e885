//! Entry points that load a library from a [`BookSource`] and run the series engine over it.

use crate::model::{ActiveSeries, Book, CuratedBook, SeriesProgressionTimeline, WeightedBook};
use crate::series::{active, curate, timeline, weight};
use crate::source::BookSource;
use crate::Result;
use chrono::NaiveDate;
use tracing::info;

/// Weighs `to_read` against the series that are active in the library held by `source`.
pub async fn compute_weighted_books<S>(
    to_read: &[Book],
    source: &S,
    today: NaiveDate,
) -> Result<Vec<WeightedBook>>
where
    S: BookSource + ?Sized,
{
    let active = detect_active_series(source, today).await?;
    let weighted = weight::assign(to_read, &active);
    let prioritized = weighted
        .iter()
        .filter(|w| w.weight > weight::STANDARD_WEIGHT)
        .count();
    info!(
        "Weighted {} books, {prioritized} continue an active series",
        weighted.len()
    );
    Ok(weighted)
}

pub async fn build_timeline<S>(source: &S) -> Result<SeriesProgressionTimeline>
where
    S: BookSource + ?Sized,
{
    let all_books = source.load_books().await?;
    Ok(timeline::build(&all_books))
}

/// Filters `weighted` down to standalones, series openers and next-in-series books.
pub async fn select_curated_set<S>(
    weighted: &[WeightedBook],
    source: &S,
    today: NaiveDate,
) -> Result<Vec<CuratedBook>>
where
    S: BookSource + ?Sized,
{
    let all_books = source.load_books().await?;
    let active = active::detect(&all_books, &timeline::build(&all_books), today);
    Ok(curate::select(weighted, &active, &all_books))
}

pub async fn detect_active_series<S>(source: &S, today: NaiveDate) -> Result<Vec<ActiveSeries>>
where
    S: BookSource + ?Sized,
{
    let all_books = source.load_books().await?;
    let timeline = timeline::build(&all_books);
    Ok(active::detect(&all_books, &timeline, today))
}
