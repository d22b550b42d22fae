// src/health/client.rs
use super::result::{HealthResult, ProbeError};
use crate::config::Config;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{header::ACCEPT, Client, Response};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

const HEALTH_PATH: &str = "/api/health";
const INFO_PATH: &str = "/api/info";

/// Source of health and version data for the status controller.
#[async_trait]
pub trait HealthProbe: Send + Sync {
    /// Never fails: every fault is folded into `HealthResult::Failure`.
    async fn check_health(&self, base_url: &Url) -> HealthResult;

    /// `None` on any fault; the fault is only logged.
    async fn fetch_info(&self, base_url: &Url) -> Option<String>;
}

#[derive(Debug, Clone)]
pub struct HealthClient {
    client: Client,
}

impl HealthClient {
    /// No timeout unless one is given; the transport's own limits apply.
    pub fn new(timeout: Option<Duration>) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().context("Failed to create HTTP client")?;

        Ok(Self { client })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(config.request_timeout())
    }

    async fn get_json(&self, url: String) -> Result<Value, ProbeError> {
        let response = self
            .client
            .get(url)
            .header(ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProbeError::Status(status));
        }

        decode(response).await
    }

    /// Parses the body whatever the status code; only transport and decode
    /// errors count.
    async fn get_json_any_status(&self, url: String) -> Result<Value, ProbeError> {
        let response = self.client.get(url).send().await?;
        decode(response).await
    }
}

async fn decode(response: Response) -> Result<Value, ProbeError> {
    let body = response.bytes().await?;
    Ok(serde_json::from_slice(&body)?)
}

#[async_trait]
impl HealthProbe for HealthClient {
    async fn check_health(&self, base_url: &Url) -> HealthResult {
        let url = endpoint(base_url, HEALTH_PATH);
        let result = self.get_json(url).await;

        if let Err(e) = &result {
            warn!("API error from {}: {}", base_url, e);
        }
        result.into()
    }

    async fn fetch_info(&self, base_url: &Url) -> Option<String> {
        let url = endpoint(base_url, INFO_PATH);

        match self.get_json_any_status(url).await {
            Ok(body) => {
                let version = version_of(&body);
                if version.is_none() {
                    debug!("Info response from {} has no version", base_url);
                }
                version
            }
            Err(e) => {
                debug!("Could not fetch app info from {}: {}", base_url, e);
                None
            }
        }
    }
}

/// `{base}{route}` with any trailing slash on the base dropped, so a path
/// prefix on the base survives.
fn endpoint(base_url: &Url, route: &str) -> String {
    format!("{}{}", base_url.as_str().trim_end_matches('/'), route)
}

/// Any truthy `version` counts: `null`, `false`, `0` and `""` do not.
fn version_of(body: &Value) -> Option<String> {
    match body.get("version")? {
        Value::Null | Value::Bool(false) => None,
        Value::String(v) if v.is_empty() => None,
        Value::String(v) => Some(v.clone()),
        Value::Number(n) if n.as_f64() == Some(0.0) => None,
        other => Some(other.to_string()),
    }
}
