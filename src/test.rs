//! Shared test utilities for creating test environments.
//!
//! This module is only compiled when running tests (`#[cfg(test)]`).

use crate::api::{TestSheet, TestSheetState};
use crate::model::{Book, Shelf};
use crate::Config;
use chrono::NaiveDate;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use uuid::Uuid;

/// A small Goodreads export: one series underway on the currently-reading shelf, one continued
/// from a recent read, one untouched series opener and one standalone.
pub const LIBRARY_CSV: &str = r#"Book Id,Title,Author,Bookshelves,Exclusive Shelf,Date Read,Original Publication Year,Year Published
1,"Witch's Dawn (Unholy Trinity, #1)",Jane Doe,currently-reading,currently-reading,,2020,2020
2,"Witch's Twilight (Unholy Trinity, #2)",Jane Doe,to-read,to-read,,2021,2021
3,The Hobbit,J.R.R. Tolkien,"to-read, classics",to-read,,1937,2012
4,"Leviathan Wakes (The Expanse, #1)",James S.A. Corey,read,read,2025/03/01,2011,2011
5,"Caliban's War (The Expanse, #2)",James S.A. Corey,to-read,to-read,,2012,2012
6,"Dune (Dune, #1)",Frank Herbert,to-read,to-read,,1965,1990
"#;

/// A book with no read date.
pub(crate) fn book(title: &str, author: &str, shelf: Shelf) -> Book {
    Book::new(title, author, shelf)
}

/// The fixed reference date tests measure recency against.
pub(crate) fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 15).unwrap()
}

/// Test environment that sets up a bookwheel home directory with a Config and a library export.
/// Holds TempDir to keep the directory alive for the duration of the test.
pub struct TestEnv {
    _temp_dir: TempDir,
    home: PathBuf,
    csv_path: PathBuf,
    config: Config,
}

impl TestEnv {
    /// Creates a home directory whose config points at a unique sheet and at [`LIBRARY_CSV`].
    pub async fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        let home = temp_dir.path().join("bookwheel");
        let secret_path = temp_dir.path().join("client_secret.json");

        // Create minimal client_secret.json
        let secret_content = r#"{
            "installed": {
                "client_id": "test-client-id",
                "client_secret": "test-secret",
                "redirect_uris": ["http://localhost"],
                "auth_uri": "https://accounts.google.com/o/oauth2/auth",
                "token_uri": "https://oauth2.googleapis.com/token"
            }
        }"#;
        std::fs::write(&secret_path, secret_content).unwrap();

        let csv_path = temp_dir.path().join("goodreads_library_export.csv");
        std::fs::write(&csv_path, LIBRARY_CSV).unwrap();

        let rand = Uuid::new_v4().to_string().replace('-', "");
        let sheet_url = format!("https://docs.google.com/spreadsheets/d/{}/edit", rand);
        let config = Config::create(&home, &secret_path, &sheet_url, Some(&csv_path))
            .await
            .unwrap();
        let csv_path = config.csv_path().unwrap();

        Self {
            _temp_dir: temp_dir,
            home,
            csv_path,
            config,
        }
    }

    /// Returns a clone of the Config.
    pub fn config(&self) -> Config {
        self.config.clone()
    }

    pub fn home(&self) -> &Path {
        &self.home
    }

    /// The canonical path of the library export.
    pub fn csv_path(&self) -> &Path {
        &self.csv_path
    }

    /// Gets the current state of the TestSheet associated with this environment.
    pub fn get_state(&self) -> TestSheetState {
        TestSheet::new(self.config.spreadsheet_id()).get_state()
    }
}
