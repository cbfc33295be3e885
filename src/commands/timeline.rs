use crate::args::SourceArgs;
use crate::commands::{library, Out};
use crate::model::SeriesProgressionTimeline;
use crate::series::format::format_timeline;
use crate::{engine, Result};
use std::path::Path;

/// Handles `bookwheel timeline`.
pub async fn timeline(home: &Path, args: &SourceArgs) -> Result<Out<SeriesProgressionTimeline>> {
    let source = library(home, args.csv()).await?;
    let timeline = engine::build_timeline(&source).await?;
    Ok(Out::new(format_timeline(&timeline), timeline))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::TestEnv;

    #[tokio::test]
    async fn test_timeline() {
        let env = TestEnv::new().await;
        let out = timeline(env.home(), &SourceArgs::default()).await.unwrap();
        let timeline = out.structure().unwrap();
        assert_eq!(timeline.total_series, 2);
        assert_eq!(timeline.total_books_read, 1);
        assert_eq!(timeline.total_books_in_progress, 1);
        assert!(out.message().contains("The Expanse by James S.A. Corey"));
        assert!(out.message().contains("Completion: 50.0%"));
    }
}
