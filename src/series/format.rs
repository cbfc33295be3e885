//! Renders a [`SeriesProgressionTimeline`] as a plain-text report for the terminal.

use crate::model::{BookProgress, SeriesProgress, SeriesProgressionTimeline};
use crate::series::timeline::is_adjacent;

pub fn format_timeline(timeline: &SeriesProgressionTimeline) -> String {
    let mut lines = vec![
        "Series Progression Timeline".to_string(),
        "===========================".to_string(),
        String::new(),
    ];

    if timeline.series.is_empty() {
        lines.push("  No series found in your library.".to_string());
    } else {
        lines.push("Overview:".to_string());
        lines.push(format!("  Total Series: {}", timeline.total_series));
        lines.push(format!("  Books Read: {}", timeline.total_books_read));
        lines.push(format!(
            "  Books In Progress: {}",
            timeline.total_books_in_progress
        ));
        lines.push(String::new());

        for (ix, series) in timeline.series.iter().enumerate() {
            lines.extend(format_series(ix + 1, series));
            lines.push(String::new());
        }
    }

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

fn format_series(position: usize, series: &SeriesProgress) -> Vec<String> {
    let mut lines = vec![
        format!("{position}. {} by {}", series.series_name, series.author),
        format!(
            "   Progress: {} read, {} in progress, {} to read",
            series.books_read, series.books_in_progress, series.books_to_read
        ),
        format!("   Completion: {:.1}%", series.completion_percentage),
    ];
    if let Some(current) = series.current_book_number {
        lines.push(format!("   Currently on: Book #{current}"));
    }
    match (series.first_read_date, series.last_read_date) {
        (Some(first), Some(last)) if first == last => lines.push(format!("   Dates: {first}")),
        (Some(first), Some(last)) => lines.push(format!("   Dates: {first} - {last}")),
        _ => {}
    }

    if series.books.is_empty() {
        return lines;
    }
    lines.push("   Timeline:".to_string());
    lines.extend(runs(&series.books).into_iter().filter_map(|run| match run {
        [single] => {
            let date = single
                .date_read
                .map(|d| format!(" ({d})"))
                .unwrap_or_default();
            Some(format!(
                "      Book #{}: {}{date}",
                single.book_number,
                single.status.label()
            ))
        }
        [first, .., last] => Some(format!(
            "      Books #{}-#{}: {}",
            first.book_number,
            last.book_number,
            first.status.label()
        )),
        [] => None,
    }));
    lines
}

/// Splits `books` into runs of adjacent numbers that share a status.
fn runs(books: &[BookProgress]) -> Vec<&[BookProgress]> {
    let mut runs = Vec::new();
    let mut start = 0;
    for ix in 1..=books.len() {
        let breaks = match (books.get(ix - 1), books.get(ix)) {
            (Some(prev), Some(next)) => {
                prev.status != next.status || !is_adjacent(prev.book_number, next.book_number)
            }
            _ => true,
        };
        if breaks {
            runs.push(&books[start..ix]);
            start = ix;
        }
    }
    runs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Shelf;
    use crate::series::timeline;
    use crate::test::book;

    #[test]
    fn test_empty_timeline() {
        let text = format_timeline(&SeriesProgressionTimeline::default());
        assert!(text.contains("No series found in your library."));
        assert!(!text.contains("Overview"));
    }

    #[test]
    fn test_runs_and_dates() {
        let author = "Maria Lewis";
        let books = vec![
            book("Dawn (Unholy Trinity, #1)", author, Shelf::Read).with_date_read("2024/01/02"),
            book("Noon (Unholy Trinity, #2)", author, Shelf::Read).with_date_read("2024/03/04"),
            book("Dusk (Unholy Trinity, #3)", author, Shelf::CurrentlyReading),
            book("Night (Unholy Trinity, #5)", author, Shelf::ToRead),
            book("Later (Unholy Trinity, #6)", author, Shelf::ToRead),
        ];
        let text = format_timeline(&timeline::build(&books));
        assert!(text.contains("Total Series: 1"));
        assert!(text.contains("1. Unholy Trinity by Maria Lewis"));
        assert!(text.contains("Progress: 2 read, 1 in progress, 2 to read"));
        assert!(text.contains("Completion: 40.0%"));
        assert!(text.contains("Currently on: Book #3"));
        assert!(text.contains("Dates: 2024-01-02 - 2024-03-04"));
        assert!(text.contains("Books #1-#2: Read"));
        assert!(text.contains("Book #3: Currently Reading"));
        assert!(text.contains("Books #5-#6: To Read"));
    }

    #[test]
    fn test_gap_breaks_run() {
        let author = "A";
        let books = vec![
            book("One (Saga, #1)", author, Shelf::Read).with_date_read("2024/01/02"),
            book("Three (Saga, #3)", author, Shelf::Read),
            book("Four (Saga, #4)", author, Shelf::ToRead),
        ];
        let text = format_timeline(&timeline::build(&books));
        assert!(text.contains("Book #1: Read (2024-01-02)"));
        assert!(text.contains("Book #3: Read\n"));
        assert!(text.contains("Dates: 2024-01-02\n"));
    }
}
