//! Metrics policy types.
//!
//! Wire shapes for the telemetry section of a proxy policy. These mirror the
//! policy documents external collaborators hand to bootplane: a Prometheus
//! toggle, a list of metric sinks, and optional stats-visibility overrides.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::errors::Error;

/// Default OTLP gRPC port used when a sink omits one.
const DEFAULT_OTEL_SINK_PORT: u32 = 4317;

fn default_otel_sink_port() -> u32 {
    DEFAULT_OTEL_SINK_PORT
}

/// Telemetry policy for a managed proxy fleet.
///
/// All fields are optional; an entirely absent policy renders the same
/// document as an empty one.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProxyMetrics {
    /// Enables the Prometheus scrape endpoint when present. The value carries
    /// no settings of its own; presence is the switch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prometheus: Option<PrometheusProvider>,

    /// Push-based metric sinks, in caller order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    #[validate(nested)]
    pub sinks: Vec<ProxyMetricSink>,

    /// Additional stats-name patterns to expose beyond the mandatory set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proxy_stats_matcher: Option<ProxyStatsMatcher>,
}

impl ProxyMetrics {
    /// Validate the policy shape, mapping failures onto the crate error type.
    pub fn validate_model(&self) -> Result<(), Error> {
        self.validate()
            .map_err(|e| Error::validation(format!("Invalid metrics policy: {}", e)))
    }
}

/// Marker enabling the Prometheus scrape endpoint on the readiness listener.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PrometheusProvider {}

/// Supported metric sink kinds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MetricSinkType {
    #[default]
    OpenTelemetry,
}

/// A single push-based metric sink entry.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProxyMetricSink {
    /// Sink kind. Only OpenTelemetry sinks exist today.
    #[serde(rename = "type", default)]
    pub sink_type: MetricSinkType,

    /// Target collector. Entries without one are tolerated and ignored by
    /// the renderer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(nested)]
    pub open_telemetry: Option<OpenTelemetrySink>,
}

impl ProxyMetricSink {
    /// Convenience constructor for an OpenTelemetry sink.
    pub fn open_telemetry<S: Into<String>>(host: S, port: u32) -> Self {
        Self {
            sink_type: MetricSinkType::OpenTelemetry,
            open_telemetry: Some(OpenTelemetrySink {
                host: host.into(),
                port,
            }),
        }
    }
}

/// OTLP gRPC collector coordinates.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct OpenTelemetrySink {
    /// Collector host name or address.
    #[validate(length(min = 1, message = "Sink host cannot be empty"))]
    pub host: String,

    /// Collector port, defaults to the OTLP gRPC port.
    #[serde(default = "default_otel_sink_port")]
    #[validate(range(min = 1, max = 65535, message = "Sink port must be between 1 and 65535"))]
    pub port: u32,
}

/// Caller-supplied stats-visibility overrides.
///
/// Pattern lists are carried through verbatim: order preserved, duplicates
/// kept. Syntactic validity of regex entries is the proxy's concern.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProxyStatsMatcher {
    /// Expose stats whose name starts with any of these.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub inclusion_prefixes: Vec<String>,

    /// Expose stats whose name ends with any of these.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub inclusion_suffixes: Vec<String>,

    /// Expose stats whose name matches any of these RE2 expressions.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub inclusion_regexps: Vec<String>,
}
