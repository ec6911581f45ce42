//! Retry strategy policy types.
//!
//! Typed surface for upstream retry behavior attached to proxy routes. The
//! bootstrap renderer never reads these; they ride alongside the metrics
//! policy in the same documents.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::errors::Error;

/// Protocol family a retry strategy applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProtocolType {
    Http,
    Grpc,
}

/// Retry behavior applied to matching routes.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RetryStrategy {
    /// Protocol family this strategy applies to.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub strategy_type: Option<ProtocolType>,

    /// HTTP-specific retry conditions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http: Option<HttpRetry>,

    /// gRPC-specific retry conditions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grpc: Option<GrpcRetry>,

    /// Attempt budget per request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 1, max = 100, message = "numRetries must be between 1 and 100"))]
    pub num_retries: Option<u32>,

    /// Timing knobs applied to each attempt.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(nested)]
    pub per_retry: Option<PerRetryPolicy>,

    /// Concurrency cap on outstanding retries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(nested)]
    pub retry_limit: Option<RetryLimitPolicy>,
}

impl RetryStrategy {
    /// Validate the strategy shape, mapping failures onto the crate error type.
    pub fn validate_model(&self) -> Result<(), Error> {
        self.validate()
            .map_err(|e| Error::validation(format!("Invalid retry strategy: {}", e)))?;

        match self.strategy_type {
            Some(ProtocolType::Http) if self.http.is_none() => Err(Error::validation(
                "Retry strategy type is Http but no http conditions are set",
            )),
            Some(ProtocolType::Grpc) if self.grpc.is_none() => Err(Error::validation(
                "Retry strategy type is Grpc but no grpc conditions are set",
            )),
            _ => Ok(()),
        }
    }
}

/// HTTP retry conditions.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpRetry {
    /// Comma-separated retry-on conditions, e.g. "5xx,reset".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry_on: Option<String>,

    /// Response codes retried when retry-on includes retriable-status-codes.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub retriable_status_codes: Vec<u16>,
}

/// gRPC retry conditions.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GrpcRetry {
    /// Comma-separated retry-on conditions, e.g. "cancelled,unavailable".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry_on: Option<String>,
}

/// Per-attempt timing policy.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PerRetryPolicy {
    /// Upper bound on a single attempt, in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 1, message = "timeoutSeconds must be positive"))]
    pub timeout_seconds: Option<u64>,

    /// Idle cutoff for a single attempt, in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 1, message = "idleTimeoutSeconds must be positive"))]
    pub idle_timeout_seconds: Option<u64>,

    /// Exponential back-off between attempts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(nested)]
    pub back_off: Option<BackOffPolicy>,
}

/// Exponential back-off bounds.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct BackOffPolicy {
    /// Base interval between attempts, in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 1, message = "baseIntervalSeconds must be positive"))]
    pub base_interval_seconds: Option<u64>,

    /// Cap on the computed interval, in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 1, message = "maxIntervalSeconds must be positive"))]
    pub max_interval_seconds: Option<u64>,
}

/// How the retry concurrency cap is expressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RetryLimitType {
    Static,
    RetryBudget,
}

/// Concurrency cap on outstanding retries across a cluster.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RetryLimitPolicy {
    /// Which cap below is in effect.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub limit_type: Option<RetryLimitType>,

    /// Fixed cap on parallel retries.
    #[serde(rename = "static", default, skip_serializing_if = "Option::is_none")]
    #[validate(nested)]
    pub static_limit: Option<StaticPolicy>,

    /// Cap proportional to active request volume.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(nested)]
    pub retry_budget: Option<RetryBudgetPolicy>,
}

/// Fixed retry concurrency cap.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct StaticPolicy {
    /// Maximum retries in flight at once.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 1, message = "maxParallel must be positive"))]
    pub max_parallel: Option<u32>,
}

/// Budget-based retry concurrency cap.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RetryBudgetPolicy {
    /// Retries allowed as a percentage of active requests.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(range(max = 100, message = "activeRequestPercent must be a percentage"))]
    pub active_request_percent: Option<u32>,

    /// Floor on concurrent retries regardless of volume.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_concurrent: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_http_strategy() {
        let yaml = r#"
type: Http
http:
  retryOn: "5xx,reset"
  retriableStatusCodes: [502, 503]
numRetries: 3
perRetry:
  timeoutSeconds: 5
  backOff:
    baseIntervalSeconds: 1
    maxIntervalSeconds: 10
retryLimit:
  type: Static
  static:
    maxParallel: 8
"#;
        let strategy: RetryStrategy = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(strategy.strategy_type, Some(ProtocolType::Http));
        let http = strategy.http.as_ref().unwrap();
        assert_eq!(http.retry_on.as_deref(), Some("5xx,reset"));
        assert_eq!(http.retriable_status_codes, vec![502, 503]);
        assert_eq!(strategy.num_retries, Some(3));
        let limit = strategy.retry_limit.as_ref().unwrap();
        assert_eq!(limit.limit_type, Some(RetryLimitType::Static));
        assert_eq!(
            limit.static_limit.as_ref().unwrap().max_parallel,
            Some(8)
        );
        assert!(strategy.validate_model().is_ok());
    }

    #[test]
    fn test_grpc_strategy_requires_grpc_conditions() {
        let strategy = RetryStrategy {
            strategy_type: Some(ProtocolType::Grpc),
            ..Default::default()
        };
        let err = strategy.validate_model().unwrap_err();
        assert!(err.to_string().contains("no grpc conditions"));
    }

    #[test]
    fn test_num_retries_bounds() {
        let strategy = RetryStrategy {
            num_retries: Some(0),
            ..Default::default()
        };
        assert!(strategy.validate_model().is_err());

        let strategy = RetryStrategy {
            num_retries: Some(101),
            ..Default::default()
        };
        assert!(strategy.validate_model().is_err());
    }

    #[test]
    fn test_retry_budget_percent_bounds() {
        let strategy = RetryStrategy {
            retry_limit: Some(RetryLimitPolicy {
                limit_type: Some(RetryLimitType::RetryBudget),
                retry_budget: Some(RetryBudgetPolicy {
                    active_request_percent: Some(120),
                    min_concurrent: None,
                }),
                ..Default::default()
            }),
            ..Default::default()
        };
        assert!(strategy.validate_model().is_err());
    }

    #[test]
    fn test_serialize_round_trips_field_names() {
        let strategy = RetryStrategy {
            strategy_type: Some(ProtocolType::Http),
            http: Some(HttpRetry {
                retry_on: Some("5xx".to_string()),
                retriable_status_codes: Vec::new(),
            }),
            ..Default::default()
        };
        let yaml = serde_yaml::to_string(&strategy).unwrap();
        assert!(yaml.contains("type: Http"));
        assert!(yaml.contains("retryOn: 5xx"));
        let back: RetryStrategy = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(back.strategy_type, Some(ProtocolType::Http));
    }
}
