//! Where books come from. The series engine only needs a [`BookSource`]; a Goodreads CSV export is
//! the usual one.

use crate::model::{Book, Shelf};
use crate::{utils, Result};
use anyhow::Context;
use std::path::{Path, PathBuf};
use tracing::debug;

/// A collection of books that can be loaded in full or by shelf.
#[async_trait::async_trait]
pub trait BookSource: Send + Sync {
    async fn load_books(&self) -> Result<Vec<Book>>;

    async fn load_books_by_shelf(&self, shelf: Shelf) -> Result<Vec<Book>> {
        Ok(self
            .load_books()
            .await?
            .into_iter()
            .filter(|book| book.shelf() == shelf)
            .collect())
    }
}

/// A Goodreads library export on disk.
#[derive(Debug, Clone)]
pub struct CsvFile {
    path: PathBuf,
}

impl CsvFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait::async_trait]
impl BookSource for CsvFile {
    async fn load_books(&self) -> Result<Vec<Book>> {
        let data = utils::read_bytes(&self.path).await?;
        let books = parse_csv(&data)
            .with_context(|| format!("Unable to parse the CSV file at {}", self.path.display()))?;
        debug!("Loaded {} books from {}", books.len(), self.path.display());
        Ok(books)
    }
}

/// Parses the rows of a Goodreads export. Columns other than the ones on [`Book`] are ignored.
pub fn parse_csv(data: &[u8]) -> Result<Vec<Book>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(data);
    let mut books = Vec::new();
    for (ix, record) in reader.deserialize::<Book>().enumerate() {
        // Row 1 is the header.
        let book = record.with_context(|| format!("Invalid book at row {}", ix + 2))?;
        books.push(book);
    }
    Ok(books)
}

/// Books that are already in memory.
#[derive(Debug, Default, Clone)]
pub struct Books(Vec<Book>);

impl Books {
    pub fn new(books: Vec<Book>) -> Self {
        Self(books)
    }
}

impl From<Vec<Book>> for Books {
    fn from(books: Vec<Book>) -> Self {
        Self(books)
    }
}

#[async_trait::async_trait]
impl BookSource for Books {
    async fn load_books(&self) -> Result<Vec<Book>> {
        Ok(self.0.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const EXPORT: &str = "\
Book Id,Title,Author,Author l-f,ISBN,My Rating,Year Published,Original Publication Year,Date Read,Bookshelves,Exclusive Shelf
1,\"Witch's Dawn (Unholy Trinity, #1)\",Maria Lewis,\"Lewis, Maria\",,4,2019,2019,2024/05/01,,read
2,\"Witch's Twilight (Unholy Trinity, #2)\",Maria Lewis,\"Lewis, Maria\",,0,2020,,,\"to-read, fantasy\",to-read
3,A Standalone Novel,Someone,\"Someone\",,0,,,,currently-reading,currently-reading

";

    #[tokio::test]
    async fn test_csv_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("goodreads_library_export.csv");
        utils::write(&path, EXPORT).await.unwrap();

        let source = CsvFile::new(&path);
        let books = source.load_books().await.unwrap();
        assert_eq!(books.len(), 3);
        assert_eq!(books[0].title(), "Witch's Dawn (Unholy Trinity, #1)");
        assert_eq!(books[0].shelf(), Shelf::Read);
        assert_eq!(
            books[0].date_read(),
            chrono::NaiveDate::from_ymd_opt(2024, 5, 1)
        );
        assert_eq!(books[1].publication_year(), Some(2020));
        assert_eq!(books[1].bookshelves(), "to-read, fantasy");

        let to_read = source.load_books_by_shelf(Shelf::ToRead).await.unwrap();
        assert_eq!(to_read.len(), 1);
        assert_eq!(to_read[0].author(), "Maria Lewis");
    }

    #[tokio::test]
    async fn test_missing_file_names_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing.csv");
        let err = CsvFile::new(&path).load_books().await.unwrap_err();
        assert!(format!("{err:?}").contains("missing.csv"));
    }

    #[test]
    fn test_minimal_columns() {
        let books = parse_csv(b"Title,Author\nOnly A Title,Nobody\n").unwrap();
        assert_eq!(books.len(), 1);
        assert_eq!(books[0].shelf(), Shelf::Other);
        assert_eq!(books[0].date_read(), None);
    }

    #[tokio::test]
    async fn test_books_source() {
        let source = Books::new(vec![
            Book::new("One", "A", Shelf::Read),
            Book::new("Two", "A", Shelf::ToRead),
        ]);
        assert_eq!(source.load_books().await.unwrap().len(), 2);
        assert_eq!(
            source
                .load_books_by_shelf(Shelf::Read)
                .await
                .unwrap()
                .len(),
            1
        );
    }
}
