//! Turns the continuation decision into a priority weight.

use crate::model::{ActiveSeries, Book, WeightedBook};
use crate::series::continuation;

/// Weight given to the next book of an active series.
pub const NEXT_IN_SERIES_WEIGHT: u32 = 5;
/// Weight given to every other book.
pub const STANDARD_WEIGHT: u32 = 1;
pub const STANDARD_REASON: &str = "Standard weight";

/// Weighs each of `books` against `active`.
pub fn assign(books: &[Book], active: &[ActiveSeries]) -> Vec<WeightedBook> {
    books.iter().map(|book| weigh(book, active)).collect()
}

pub fn weigh(book: &Book, active: &[ActiveSeries]) -> WeightedBook {
    match continuation::next_in(book, active) {
        Some(series) => WeightedBook {
            book: book.clone(),
            weight: NEXT_IN_SERIES_WEIGHT,
            reason: format!("Next book in {} series", series.series_name),
        },
        None => WeightedBook {
            book: book.clone(),
            weight: STANDARD_WEIGHT,
            reason: STANDARD_REASON.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Shelf;
    use crate::series::{active, timeline};
    use crate::test::{book, today};

    #[test]
    fn test_next_in_series_gets_priority() {
        let author = "Maria Lewis";
        let all = vec![
            book("Witch's Dawn (Unholy Trinity, #1)", author, Shelf::CurrentlyReading),
            book("Witch's Twilight (Unholy Trinity, #2)", author, Shelf::ToRead),
            book("A Standalone Novel", "Someone", Shelf::ToRead),
        ];
        let active = active::detect(&all, &timeline::build(&all), today());
        let weighted = assign(&all[1..], &active);

        assert_eq!(weighted[0].weight, NEXT_IN_SERIES_WEIGHT);
        assert!(weighted[0].reason.contains("Next book"));
        assert_eq!(weighted[0].reason, "Next book in Unholy Trinity series");

        assert_eq!(weighted[1].weight, STANDARD_WEIGHT);
        assert_eq!(weighted[1].reason, "Standard weight");
    }

    #[test]
    fn test_weights_are_never_zero() {
        let all = vec![
            book("Far Ahead (Unholy Trinity, #9)", "Maria Lewis", Shelf::ToRead),
            book("", "", Shelf::ToRead),
        ];
        assert!(assign(&all, &[]).iter().all(|w| w.weight >= 1));
    }
}
