use crate::args::WeighArgs;
use crate::commands::{library, upload_config, Out};
use crate::model::{Shelf, WeightedBook};
use crate::series::weight::STANDARD_WEIGHT;
use crate::source::BookSource;
use crate::{api, engine, Mode, Result};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;

/// The structured output of `bookwheel weigh`.
#[derive(Debug, Clone, Serialize)]
pub struct WeighReport {
    pub books: Vec<WeightedBook>,
    /// Number of books per weight.
    pub distribution: BTreeMap<u32, usize>,
    /// `"<title> by <author>"` of every book weighted above the standard weight.
    pub high_priority: Vec<String>,
}

impl WeighReport {
    fn new(books: Vec<WeightedBook>) -> Self {
        let mut distribution = BTreeMap::new();
        for wb in &books {
            *distribution.entry(wb.weight).or_insert(0) += 1;
        }
        let high_priority = books
            .iter()
            .filter(|wb| wb.weight > STANDARD_WEIGHT)
            .map(|wb| format!("{} by {}", wb.book.title(), wb.book.author()))
            .collect();
        Self {
            books,
            distribution,
            high_priority,
        }
    }

    fn summary(&self) -> String {
        let mut lines = vec![
            format!("Weighted {} books from your to-read shelf", self.books.len()),
            String::new(),
            "Weight distribution:".to_string(),
        ];
        lines.extend(
            self.distribution
                .iter()
                .rev()
                .map(|(weight, count)| format!("  {weight}x weight: {count} books")),
        );
        let high: Vec<&WeightedBook> = self
            .books
            .iter()
            .filter(|wb| wb.weight > STANDARD_WEIGHT)
            .collect();
        if !high.is_empty() {
            lines.push(String::new());
            lines.push("High-priority books (series continuations):".to_string());
            for wb in high {
                lines.push(format!(
                    "  {} by {} ({}x)",
                    wb.book.title(),
                    wb.book.author(),
                    wb.weight
                ));
                lines.push(format!("    Reason: {}", wb.reason));
            }
        }
        lines.join("\n")
    }
}

/// Handles `bookwheel weigh`: weights the to-read shelf and, with `--upload`, publishes it.
pub async fn weigh(
    home: &Path,
    args: &WeighArgs,
    mode: Mode,
    today: NaiveDate,
) -> Result<Out<WeighReport>> {
    let source = library(home, args.csv()).await?;
    let to_read = source.load_books_by_shelf(Shelf::ToRead).await?;
    let books = engine::compute_weighted_books(&to_read, &source, today).await?;
    let report = WeighReport::new(books);
    let mut message = report.summary();

    if args.upload() {
        let config = upload_config(home, args.sheet_url(), mode).await?;
        let mut sheet = api::sheet(&config, mode).await?;
        api::write_weighted_books(sheet.as_mut(), config.sheet_name(), &report.books).await?;
        message.push_str(&format!(
            "\n\nPublished {} books to {}",
            report.books.len(),
            config.sheet_url()
        ));
    }

    Ok(Out::new(message, report))
}
