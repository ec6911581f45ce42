//! Parameter assembly for the bootstrap document.
//!
//! [`BootstrapParameters::from_proxy_metrics`] is the single funnel between
//! policy input and the renderer. It is total: any policy value, including an
//! absent one, folds into a complete aggregate without error.

use std::collections::HashSet;

use crate::api::ProxyMetrics;
use crate::errors::Result;

use super::renderer;
use super::{
    ADMIN_ACCESS_LOG_PATH, ADMIN_ADDRESS, ADMIN_PORT, DEFAULT_XDS_SERVER_PORT, READINESS_ADDRESS,
    READINESS_PATH, READINESS_PORT, REQUIRED_STATS_INCLUSION_PREFIXES, XDS_SERVER_HOST,
};

/// Discovery service endpoint the rendered proxy will dial.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XdsServerParameters {
    pub address: String,
    pub port: u32,
}

impl Default for XdsServerParameters {
    fn default() -> Self {
        Self {
            address: XDS_SERVER_HOST.to_string(),
            port: DEFAULT_XDS_SERVER_PORT,
        }
    }
}

/// Admin interface binding for the rendered proxy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminServerParameters {
    pub address: String,
    pub port: u32,
    pub access_log_path: String,
}

impl Default for AdminServerParameters {
    fn default() -> Self {
        Self {
            address: ADMIN_ADDRESS.to_string(),
            port: ADMIN_PORT,
            access_log_path: ADMIN_ACCESS_LOG_PATH.to_string(),
        }
    }
}

/// Readiness listener binding for the rendered proxy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadyServerParameters {
    pub address: String,
    pub port: u32,
    pub readiness_path: String,
}

impl Default for ReadyServerParameters {
    fn default() -> Self {
        Self {
            address: READINESS_ADDRESS.to_string(),
            port: READINESS_PORT,
            readiness_path: READINESS_PATH.to_string(),
        }
    }
}

/// A metric sink destination surviving deduplication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricSink {
    pub address: String,
    pub port: u32,
}

impl MetricSink {
    /// Composite identity used for deduplication: the exact `address:port`
    /// string. No case folding, name resolution or address normalization.
    pub fn address_key(&self) -> String {
        format!("{}:{}", self.address, self.port)
    }
}

/// Stats-visibility pattern lists carried into the document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProxyStatsMatcherParameters {
    pub inclusion_prefixes: Vec<String>,
    pub inclusion_suffixes: Vec<String>,
    pub inclusion_regexps: Vec<String>,
}

/// Everything the renderer needs to emit one bootstrap document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootstrapParameters {
    pub xds_server: XdsServerParameters,
    pub admin_server: AdminServerParameters,
    pub ready_server: ReadyServerParameters,
    pub enable_prometheus: bool,
    pub otel_metric_sinks: Vec<MetricSink>,
    pub proxy_stats_matcher: ProxyStatsMatcherParameters,
}

impl BootstrapParameters {
    /// Fold a metrics policy into a render-ready aggregate.
    ///
    /// Sink entries without an OpenTelemetry target are skipped. Surviving
    /// sinks are deduplicated by `address:port`, first occurrence winning.
    /// The mandatory stats prefixes are appended after any caller-supplied
    /// ones, without deduplication between the two groups.
    pub fn from_proxy_metrics(metrics: Option<&ProxyMetrics>) -> Self {
        let mut enable_prometheus = false;
        let mut sinks = Vec::new();
        let mut stats_matcher = ProxyStatsMatcherParameters::default();

        if let Some(metrics) = metrics {
            enable_prometheus = metrics.prometheus.is_some();

            for sink in &metrics.sinks {
                if let Some(otel) = &sink.open_telemetry {
                    sinks.push(MetricSink {
                        address: otel.host.clone(),
                        port: otel.port,
                    });
                }
            }

            if let Some(matcher) = &metrics.proxy_stats_matcher {
                stats_matcher.inclusion_prefixes = matcher.inclusion_prefixes.clone();
                stats_matcher.inclusion_suffixes = matcher.inclusion_suffixes.clone();
                stats_matcher.inclusion_regexps = matcher.inclusion_regexps.clone();
            }
        }

        stats_matcher
            .inclusion_prefixes
            .extend(required_inclusion_prefixes());

        Self {
            xds_server: XdsServerParameters::default(),
            admin_server: AdminServerParameters::default(),
            ready_server: ReadyServerParameters::default(),
            enable_prometheus,
            otel_metric_sinks: dedupe_metric_sinks(sinks),
            proxy_stats_matcher: stats_matcher,
        }
    }

    /// Serialize this aggregate into the bootstrap document.
    pub fn render(&self) -> Result<String> {
        renderer::render(self)
    }
}

/// The mandatory stats prefixes, split out of the comma-separated constant.
pub(crate) fn required_inclusion_prefixes() -> Vec<String> {
    REQUIRED_STATS_INCLUSION_PREFIXES
        .split(',')
        .map(str::to_string)
        .collect()
}

/// Drop repeated sink destinations, keeping the first occurrence of each
/// `address:port` key. Relative order of survivors is the input order.
pub(crate) fn dedupe_metric_sinks(sinks: Vec<MetricSink>) -> Vec<MetricSink> {
    let mut seen = HashSet::with_capacity(sinks.len());
    sinks
        .into_iter()
        .filter(|sink| seen.insert(sink.address_key()))
        .collect()
}
