// src/health/result.rs
use reqwest::StatusCode;
use serde_json::Value;

/// Outcome of a single health request, consumed as soon as the controller
/// has derived its state from it.
#[derive(Debug, Clone, PartialEq)]
pub enum HealthResult {
    Success(Value),
    Failure(String),
}

impl HealthResult {
    pub fn is_success(&self) -> bool {
        matches!(self, HealthResult::Success(_))
    }
}

impl From<Result<Value, ProbeError>> for HealthResult {
    fn from(result: Result<Value, ProbeError>) -> Self {
        match result {
            Ok(payload) => HealthResult::Success(payload),
            Err(e) => HealthResult::Failure(e.to_string()),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    #[error("{0}")]
    Transport(#[from] reqwest::Error),

    #[error("HTTP error! status: {}", .0.as_u16())]
    Status(StatusCode),

    #[error("Invalid JSON in response body: {0}")]
    Decode(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn status_errors_carry_the_code() {
        let err = ProbeError::Status(StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(err.to_string(), "HTTP error! status: 503");
    }

    #[test]
    fn conversion_keeps_the_error_text() {
        let result: HealthResult = Err(ProbeError::Status(StatusCode::NOT_FOUND)).into();
        assert_eq!(result, HealthResult::Failure("HTTP error! status: 404".into()));

        let result: HealthResult = Ok(json!({"status": "ok"})).into();
        assert!(result.is_success());
    }

    #[test]
    fn decode_errors_mention_json() {
        let err: ProbeError = serde_json::from_str::<Value>("<html>").unwrap_err().into();
        assert!(err.to_string().starts_with("Invalid JSON"));
    }
}
