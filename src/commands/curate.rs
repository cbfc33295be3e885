use crate::args::WeighArgs;
use crate::commands::{library, upload_config, Out};
use crate::model::{BookType, CuratedBook, Shelf};
use crate::source::BookSource;
use crate::{api, engine, Mode, Result};
use chrono::NaiveDate;
use std::path::Path;

/// Handles `bookwheel curate`: the weighted list narrowed to books worth starting now.
pub async fn curate(
    home: &Path,
    args: &WeighArgs,
    mode: Mode,
    today: NaiveDate,
) -> Result<Out<Vec<CuratedBook>>> {
    let source = library(home, args.csv()).await?;
    let to_read = source.load_books_by_shelf(Shelf::ToRead).await?;
    let weighted = engine::compute_weighted_books(&to_read, &source, today).await?;
    let curated = engine::select_curated_set(&weighted, &source, today).await?;

    let mut lines = vec![format!(
        "Curated {} of {} to-read books",
        curated.len(),
        weighted.len()
    )];
    for book_type in [
        BookType::NextInSeries,
        BookType::FirstBook,
        BookType::Standalone,
    ] {
        let books: Vec<&CuratedBook> = curated
            .iter()
            .filter(|cb| cb.book_type == book_type)
            .collect();
        if books.is_empty() {
            continue;
        }
        lines.push(String::new());
        lines.push(format!("{book_type} ({}):", books.len()));
        lines.extend(books.iter().map(|cb| {
            format!(
                "  {} by {} ({}x)",
                cb.book.title(),
                cb.book.author(),
                cb.weight
            )
        }));
    }

    if args.upload() {
        let config = upload_config(home, args.sheet_url(), mode).await?;
        let mut sheet = api::sheet(&config, mode).await?;
        api::write_curated_books(sheet.as_mut(), config.sheet_name(), &curated).await?;
        lines.push(String::new());
        lines.push(format!(
            "Published {} books to {}",
            curated.len(),
            config.sheet_url()
        ));
    }

    Ok(Out::new(lines.join("\n"), curated))
}
