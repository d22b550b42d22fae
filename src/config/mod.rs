// src/config/mod.rs
mod models;

pub use models::*;

use anyhow::{Context, Result};
use std::path::Path;

/// Load configuration from a file (YAML or JSON)
pub async fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let path = path.as_ref();
    let contents = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read config file {}", path.display()))?;

    let config: Config = match path.extension().and_then(|s| s.to_str()) {
        Some("yaml") | Some("yml") => {
            serde_yaml::from_str(&contents).context("Failed to parse YAML config")?
        }
        _ => serde_json::from_str(&contents).context("Failed to parse JSON config")?,
    };

    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn write_temp(name: &str, contents: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!("api-status-{}-{}", std::process::id(), name));
        tokio::fs::write(&path, contents).await.unwrap();
        path
    }

    #[tokio::test]
    async fn loads_yaml_by_extension() {
        let path = write_temp(
            "config.yaml",
            "api_base_url: http://127.0.0.1:9000\ndisplay_version: 2.0.0\n",
        )
        .await;

        let config = load_config(&path).await.unwrap();
        assert_eq!(config.api_base_url.as_str(), "http://127.0.0.1:9000/");
        assert_eq!(config.display_version, "2.0.0");

        let _ = tokio::fs::remove_file(path).await;
    }

    #[tokio::test]
    async fn loads_json_otherwise() {
        let path = write_temp("config.json", r#"{"request_timeout_secs": 3}"#).await;

        let config = load_config(&path).await.unwrap();
        assert_eq!(config.request_timeout_secs, Some(3));

        let _ = tokio::fs::remove_file(path).await;
    }

    #[tokio::test]
    async fn invalid_config_is_rejected() {
        let path = write_temp("bad.yaml", "poll_interval_secs: 0\n").await;
        assert!(load_config(&path).await.is_err());
        let _ = tokio::fs::remove_file(path).await;
    }

    #[tokio::test]
    async fn missing_file_is_an_error() {
        assert!(load_config("/nonexistent/api-status.yaml").await.is_err());
    }
}
