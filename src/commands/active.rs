use crate::args::SourceArgs;
use crate::commands::{library, Out};
use crate::model::ActiveSeries;
use crate::{engine, Result};
use chrono::NaiveDate;
use std::path::Path;

/// Handles `bookwheel active`.
pub async fn active(
    home: &Path,
    args: &SourceArgs,
    today: NaiveDate,
) -> Result<Out<Vec<ActiveSeries>>> {
    let source = library(home, args.csv()).await?;
    let active = engine::detect_active_series(&source, today).await?;
    if active.is_empty() {
        return Ok(Out::new("You are not reading any series right now", active));
    }
    let lines: Vec<String> = std::iter::once(format!("Active series ({}):", active.len()))
        .chain(active.iter().map(|series| {
            format!(
                "  {} by {}: on Book #{} ({})",
                series.series_name,
                series.author,
                series.current_book_number,
                series.current_book
            )
        }))
        .collect();
    Ok(Out::new(lines.join("\n"), active))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::{today, TestEnv};

    #[tokio::test]
    async fn test_active() {
        let env = TestEnv::new().await;
        let out = active(env.home(), &SourceArgs::default(), today())
            .await
            .unwrap();
        let names: Vec<&str> = out
            .structure()
            .unwrap()
            .iter()
            .map(|a| a.series_name.as_str())
            .collect();
        assert_eq!(names, vec!["Unholy Trinity", "The Expanse"]);
        assert!(out
            .message()
            .contains("The Expanse by James S.A. Corey: on Book #1"));
    }

    #[tokio::test]
    async fn test_active_with_explicit_csv() {
        let env = TestEnv::new().await;
        let dir = tempfile::TempDir::new().unwrap();
        let csv = dir.path().join("empty.csv");
        std::fs::write(&csv, "Title,Author,Exclusive Shelf\n").unwrap();
        let out = active(env.home(), &SourceArgs::new(Some(csv)), today())
            .await
            .unwrap();
        assert!(out.structure().unwrap().is_empty());
    }
}
