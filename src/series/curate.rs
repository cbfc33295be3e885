//! Narrows a weighted list down to the books that make sense to pick up right now: standalones,
//! the first book of a series, and the next book of a series already underway.

use crate::model::{ActiveSeries, Book, BookType, CuratedBook, SeriesInfo, WeightedBook};
use crate::series::continuation::{self, is_first};
use crate::series::progressive::{self, VariantState};
use crate::series::{title, SeriesKey};
use tracing::trace;

pub fn select(
    weighted: &[WeightedBook],
    active: &[ActiveSeries],
    all_books: &[Book],
) -> Vec<CuratedBook> {
    weighted
        .iter()
        .filter_map(|wb| {
            let info = title::extract(wb.book.title());
            let book_type = classify(&wb.book, &info, active, all_books)?;
            Some(CuratedBook {
                book: wb.book.clone(),
                weight: wb.weight,
                reason: wb.reason.clone(),
                series_name: info.series_name,
                book_number: info.book_number,
                book_type,
            })
        })
        .collect()
}

fn classify(
    book: &Book,
    info: &SeriesInfo,
    active: &[ActiveSeries],
    all_books: &[Book],
) -> Option<BookType> {
    let Some(series_name) = info.series_name.as_deref() else {
        return Some(BookType::Standalone);
    };
    let number = info.book_number?;
    if is_first(number) {
        let key = SeriesKey::new(series_name, book.author());
        if progressive::variant_state(&key, all_books) == VariantState::Pending {
            trace!("Holding back '{}' for its Progressive variant", book.title());
            return None;
        }
        return Some(BookType::FirstBook);
    }
    continuation::is_next_considering_progressive(book, active, all_books)
        .then_some(BookType::NextInSeries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Shelf;
    use crate::series::{active, timeline, weight};
    use crate::test::{book, today};

    fn curate(all: &[Book]) -> Vec<CuratedBook> {
        let to_read: Vec<Book> = all
            .iter()
            .filter(|b| b.shelf() == Shelf::ToRead)
            .cloned()
            .collect();
        let active = active::detect(all, &timeline::build(all), today());
        let weighted = weight::assign(&to_read, &active);
        select(&weighted, &active, all)
    }

    fn titles(curated: &[CuratedBook]) -> Vec<&str> {
        curated.iter().map(|c| c.book.title()).collect()
    }

    #[test]
    fn test_select() {
        let all = vec![
            book("A Standalone Novel", "Someone", Shelf::ToRead),
            book("Leviathan Wakes (Expanse, #1)", "Corey", Shelf::ToRead),
            book("Dawn (Unholy Trinity, #1)", "Maria Lewis", Shelf::CurrentlyReading),
            book("Twilight (Unholy Trinity, #2)", "Maria Lewis", Shelf::ToRead),
            book("Night (Unholy Trinity, #3)", "Maria Lewis", Shelf::ToRead),
            book("Red Rising (Red Rising Saga)", "Pierce Brown", Shelf::ToRead),
        ];
        let curated = curate(&all);
        assert_eq!(
            titles(&curated),
            vec![
                "A Standalone Novel",
                "Leviathan Wakes (Expanse, #1)",
                "Twilight (Unholy Trinity, #2)"
            ]
        );
        assert_eq!(curated[0].book_type, BookType::Standalone);
        assert_eq!(curated[0].series_name, None);
        assert_eq!(curated[1].book_type, BookType::FirstBook);
        assert_eq!(curated[1].weight, 1);
        assert_eq!(curated[2].book_type, BookType::NextInSeries);
        assert_eq!(curated[2].weight, 5);
        assert_eq!(curated[2].book_number, Some(2.0));
    }

    #[test]
    fn test_progressive_holds_back_base_first_book() {
        let author = "Reki Kawahara";
        let mut all = vec![
            book("Aria (Sword Art Online: Progressive, #1)", author, Shelf::Read),
            book("Barcarolle (Sword Art Online: Progressive, #2)", author, Shelf::ToRead),
            book("Aincrad (Sword Art Online, #1)", author, Shelf::ToRead),
        ];
        assert_eq!(
            titles(&curate(&all)),
            vec!["Barcarolle (Sword Art Online: Progressive, #2)"]
        );

        all[1] = book("Barcarolle (Sword Art Online: Progressive, #2)", author, Shelf::Read);
        assert_eq!(
            titles(&curate(&all)),
            vec!["Aincrad (Sword Art Online, #1)"]
        );
    }
}
