//! Implements the `Sheet` trait with an in-memory store for testing.
//!
//! This is compiled into the release binary too so that the whole app can run, top-to-bottom,
//! without Google Sheets when `BOOKWHEEL_IN_TEST_MODE` is set.

use crate::api::{Sheet, SheetRange};
use crate::Result;
use anyhow::Context;
use once_cell::sync::Lazy;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};

/// The rows of every tab in one spreadsheet, keyed by tab name.
pub(crate) type TestSheetState = BTreeMap<String, Vec<Vec<String>>>;

/// Spreadsheets by id. Each `TestSheet` for the same id sees the same data.
static STORE: Lazy<Mutex<HashMap<String, TestSheetState>>> =
    Lazy::new(|| Mutex::new(HashMap::new()));

fn store() -> MutexGuard<'static, HashMap<String, TestSheetState>> {
    STORE.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

pub(crate) struct TestSheet {
    spreadsheet_id: String,
}

impl TestSheet {
    pub(crate) fn new(spreadsheet_id: impl Into<String>) -> Self {
        Self {
            spreadsheet_id: spreadsheet_id.into(),
        }
    }

    /// Registers a new spreadsheet with an empty `tab` and returns its URL.
    pub(crate) fn create(tab: &str) -> String {
        static CREATED: AtomicUsize = AtomicUsize::new(0);
        let id = format!(
            "created-{}-{}",
            std::process::id(),
            CREATED.fetch_add(1, Ordering::Relaxed)
        );
        store()
            .entry(id.clone())
            .or_default()
            .insert(tab.to_string(), Vec::new());
        format!("https://docs.google.com/spreadsheets/d/{id}/edit")
    }

    pub(crate) fn get_state(&self) -> TestSheetState {
        store()
            .get(&self.spreadsheet_id)
            .cloned()
            .unwrap_or_default()
    }
}

#[async_trait::async_trait]
impl Sheet for TestSheet {
    async fn get(&mut self, sheet_name: &str) -> Result<Vec<Vec<String>>> {
        self.get_state()
            .remove(sheet_name)
            .with_context(|| format!("Sheet '{sheet_name}' not found"))
    }

    async fn clear_ranges(&mut self, ranges: &[&str]) -> Result<()> {
        let mut store = store();
        let state = store.entry(self.spreadsheet_id.clone()).or_default();
        for range in ranges {
            let (tab, _) = split_range(range);
            state.insert(tab.to_string(), Vec::new());
        }
        Ok(())
    }

    async fn write_ranges(&mut self, data: &[SheetRange]) -> Result<()> {
        let mut store = store();
        let state = store.entry(self.spreadsheet_id.clone()).or_default();
        for sheet_range in data {
            let (tab, anchor) = split_range(&sheet_range.range);
            let (row, col) = parse_anchor(anchor)
                .with_context(|| format!("Unsupported range '{}'", sheet_range.range))?;
            let rows = state.entry(tab.to_string()).or_default();
            for (ix, values) in sheet_range.values.iter().enumerate() {
                if rows.len() <= row + ix {
                    rows.resize(row + ix + 1, Vec::new());
                }
                let target = &mut rows[row + ix];
                if target.len() < col + values.len() {
                    target.resize(col + values.len(), String::new());
                }
                target[col..col + values.len()].clone_from_slice(values);
            }
        }
        Ok(())
    }
}

/// Splits `Tab!A1` into `("Tab", "A1")`. A bare tab name anchors at `A1`.
fn split_range(range: &str) -> (&str, &str) {
    range.split_once('!').unwrap_or((range, "A1"))
}

/// Parses a cell reference such as `B3` into zero-based `(row, column)`.
fn parse_anchor(anchor: &str) -> Option<(usize, usize)> {
    let letters_end = anchor.find(|c: char| c.is_ascii_digit())?;
    let (letters, digits) = anchor.split_at(letters_end);
    if letters.is_empty() || !letters.chars().all(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    let col = letters
        .chars()
        .fold(0usize, |acc, c| acc * 26 + (c.to_ascii_uppercase() as usize - 'A' as usize + 1));
    let row: usize = digits.parse().ok()?;
    Some((row.checked_sub(1)?, col - 1))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(data: &[&[&str]]) -> Vec<Vec<String>> {
        data.iter()
            .map(|r| r.iter().map(|s| s.to_string()).collect())
            .collect()
    }

    #[test]
    fn test_parse_anchor() {
        assert_eq!(parse_anchor("A1"), Some((0, 0)));
        assert_eq!(parse_anchor("c4"), Some((3, 2)));
        assert_eq!(parse_anchor("AA10"), Some((9, 26)));
        assert_eq!(parse_anchor("A0"), None);
        assert_eq!(parse_anchor("12"), None);
        assert_eq!(parse_anchor("A:Z"), None);
    }

    #[tokio::test]
    async fn test_write_clear_and_share_state() {
        let id = uuid::Uuid::new_v4().to_string();
        let mut sheet = TestSheet::new(&id);
        assert!(sheet.get("Sheet1").await.is_err());

        sheet
            .write_ranges(&[SheetRange::new("Sheet1!A1", rows(&[&["a", "b"], &["c", "d"]]))])
            .await
            .unwrap();
        sheet
            .write_ranges(&[SheetRange::new("Sheet1!B3", rows(&[&["e"]]))])
            .await
            .unwrap();

        let mut other = TestSheet::new(&id);
        assert_eq!(
            other.get("Sheet1").await.unwrap(),
            rows(&[&["a", "b"], &["c", "d"], &["", "e"]])
        );

        other.clear_ranges(&["Sheet1"]).await.unwrap();
        assert!(sheet.get("Sheet1").await.unwrap().is_empty());
    }
}
