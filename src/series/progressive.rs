//! "Progressive" series are an alternate numbering track of a base series, e.g.
//! `Sword Art Online: Progressive` alongside `Sword Art Online`. While the reader still has
//! Progressive books queued up, the base series should not be opened at book #1.

use crate::model::{Book, Shelf};
use crate::series::{title, SeriesKey};
use once_cell::sync::Lazy;
use regex_lite::Regex;

static PROGRESSIVE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(.+?)\s*:\s*progressive(?:\W.*)?$").expect("valid regex")
});

#[derive(Debug, Default, Clone, Eq, PartialEq)]
pub struct ProgressiveInfo {
    pub is_progressive: bool,
    pub base_series: Option<String>,
}

/// Detects `<Base>: Progressive`, optionally followed by a qualifier such as `Light Novel`.
pub fn detect_progressive(series_name: &str) -> ProgressiveInfo {
    match PROGRESSIVE.captures(series_name.trim()) {
        Some(caps) => ProgressiveInfo {
            is_progressive: true,
            base_series: caps.get(1).map(|m| m.as_str().trim().to_string()),
        },
        None => ProgressiveInfo::default(),
    }
}

/// True when `series_name` is a Progressive variant of `candidate_base`.
pub fn is_base_series(candidate_base: &str, series_name: &str) -> bool {
    detect_progressive(series_name)
        .base_series
        .is_some_and(|base| base.eq_ignore_ascii_case(candidate_base.trim()))
}

/// Where the reader stands with the Progressive variants of a base series.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub(crate) enum VariantState {
    /// The author has no Progressive variant of this series in the library.
    Absent,
    /// A variant book is still waiting to be read.
    Pending,
    /// Every variant book is finished, or at least off the to-read pile.
    Exhausted,
}

/// Looks through `all_books` for Progressive variants of `base` by the author in `base`.
pub(crate) fn variant_state(base: &SeriesKey, all_books: &[Book]) -> VariantState {
    let mut state = VariantState::Absent;
    for book in all_books {
        if title::normalize_author(book.author()) != base.author {
            continue;
        }
        let Some(series_name) = title::extract(book.title()).series_name else {
            continue;
        };
        if !is_base_series(&base.series, &series_name) {
            continue;
        }
        if matches!(
            book.shelf(),
            Shelf::ToRead | Shelf::CurrentlyReading | Shelf::ReadingNext
        ) {
            return VariantState::Pending;
        }
        state = VariantState::Exhausted;
    }
    state
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::book;

    #[test]
    fn test_detect_progressive() {
        let info = detect_progressive("Sword Art Online: Progressive");
        assert!(info.is_progressive);
        assert_eq!(info.base_series.as_deref(), Some("Sword Art Online"));

        let info = detect_progressive("Sword Art Online: Progressive Light Novel");
        assert!(info.is_progressive);
        assert_eq!(info.base_series.as_deref(), Some("Sword Art Online"));

        let info = detect_progressive("sword art online : PROGRESSIVE");
        assert_eq!(info.base_series.as_deref(), Some("sword art online"));
    }

    #[test]
    fn test_not_progressive() {
        assert_eq!(
            detect_progressive("Sword Art Online"),
            ProgressiveInfo::default()
        );
        assert!(!detect_progressive("Progressive Rock: A History").is_progressive);
        assert!(!detect_progressive("Sword Art Online: Progressives").is_progressive);
        assert!(!detect_progressive("Sword Art Online Progressive").is_progressive);
    }

    #[test]
    fn test_is_base_series() {
        assert!(is_base_series(
            "sword art online",
            "Sword Art Online: Progressive"
        ));
        assert!(!is_base_series("Sword Art", "Sword Art Online: Progressive"));
        assert!(!is_base_series("Sword Art Online", "Sword Art Online"));
    }

    #[test]
    fn test_variant_state() {
        let base = SeriesKey::new("Sword Art Online", "Reki Kawahara");
        let pending = vec![
            book("Aria (Sword Art Online: Progressive, #1)", "Reki Kawahara", Shelf::Read),
            book("Barcarolle (Sword Art Online: Progressive, #2)", "Reki Kawahara", Shelf::ToRead),
        ];
        assert_eq!(variant_state(&base, &pending), VariantState::Pending);

        let exhausted = vec![
            book("Aria (Sword Art Online: Progressive, #1)", "Reki Kawahara", Shelf::Read),
            book("Barcarolle (Sword Art Online: Progressive, #2)", "Reki Kawahara", Shelf::Read),
        ];
        assert_eq!(variant_state(&base, &exhausted), VariantState::Exhausted);

        let other_author = vec![book(
            "Aria (Sword Art Online: Progressive, #1)",
            "Someone Else",
            Shelf::ToRead,
        )];
        assert_eq!(variant_state(&base, &other_author), VariantState::Absent);
    }
}
