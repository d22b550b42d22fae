// src/config/models.rs
use anyhow::{bail, Result};
use serde::Deserialize;
use std::time::Duration;
use url::Url;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "default_api_base_url")]
    pub api_base_url: Url,

    /// Version shown before the info endpoint reports one.
    #[serde(default = "default_display_version")]
    pub display_version: String,

    #[serde(default)]
    pub request_timeout_secs: Option<u64>,

    #[serde(default)]
    pub poll_interval_secs: Option<u64>,
}

fn default_api_base_url() -> Url {
    Url::parse("http://localhost:5000").expect("default base url is valid")
}

fn default_display_version() -> String {
    "1.0.0".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            display_version: default_display_version(),
            request_timeout_secs: None,
            poll_interval_secs: None,
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        match self.api_base_url.scheme() {
            "http" | "https" => {}
            other => bail!("api_base_url must use http or https, got {}", other),
        }
        if self.request_timeout_secs == Some(0) {
            bail!("request_timeout_secs must be greater than zero");
        }
        if self.poll_interval_secs == Some(0) {
            bail!("poll_interval_secs must be greater than zero");
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    pub fn poll_interval(&self) -> Option<Duration> {
        self.poll_interval_secs.map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_local_backend() {
        let config = Config::default();
        assert_eq!(config.api_base_url.as_str(), "http://localhost:5000/");
        assert_eq!(config.display_version, "1.0.0");
        assert!(config.request_timeout().is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_yaml_falls_back_to_defaults() {
        let config: Config = serde_yaml::from_str("poll_interval_secs: 15\n").unwrap();
        assert_eq!(config.poll_interval(), Some(Duration::from_secs(15)));
        assert_eq!(config.display_version, "1.0.0");
    }

    #[test]
    fn rejects_zero_durations_and_odd_schemes() {
        let mut config = Config::default();
        config.poll_interval_secs = Some(0);
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.request_timeout_secs = Some(0);
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.api_base_url = Url::parse("ftp://example.com").unwrap();
        assert!(config.validate().is_err());
    }
}
