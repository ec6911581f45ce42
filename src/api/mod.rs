//! Policy API types consumed by the control plane.
//!
//! These are the document shapes external collaborators feed into bootplane.
//! Shape validation lives here (`validate_model` on the root types); the
//! bootstrap renderer assumes its input already passed it and never fails on
//! policy content.

pub mod metrics;
pub mod retry;

pub use metrics::{
    MetricSinkType, OpenTelemetrySink, PrometheusProvider, ProxyMetricSink, ProxyMetrics,
    ProxyStatsMatcher,
};
pub use retry::{
    BackOffPolicy, GrpcRetry, HttpRetry, PerRetryPolicy, ProtocolType, RetryBudgetPolicy,
    RetryLimitPolicy, RetryLimitType, RetryStrategy, StaticPolicy,
};
