use crate::commands::Out;
use crate::{Config, Result};
use anyhow::Context;
use std::path::Path;

/// Creates the data directory and its config. See [`Config::create`].
pub async fn init(
    bookwheel_home: &Path,
    secret_file: &Path,
    url: &str,
    csv: Option<&Path>,
) -> Result<Out<()>> {
    let config = Config::create(bookwheel_home, secret_file, url, csv)
        .await
        .context("Unable to create the data directory and configs")?;
    Ok(format!(
        "Successfully created the bookwheel directory and config at {}",
        config.root().display()
    )
    .into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_init() {
        let dir = TempDir::new().unwrap();
        let secret = dir.path().join("secret.json");
        utils::write(&secret, "{}").await.unwrap();
        let home = dir.path().join("home");

        let out = init(&home, &secret, "", None).await.unwrap();
        assert!(out.message().starts_with("Successfully created"));
        assert!(home.join("config.json").is_file());
        assert!(home.join(".secrets").join("client_secret.json").is_file());
    }

    #[tokio::test]
    async fn test_init_missing_secret() {
        let dir = TempDir::new().unwrap();
        let result = init(&dir.path().join("home"), &dir.path().join("nope.json"), "", None).await;
        assert!(result.is_err());
    }
}
