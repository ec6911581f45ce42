//! Proxy bootstrap configuration rendering.
//!
//! A managed proxy needs a bootstrap document before it can reach the
//! discovery service, so everything in it must be decided statically. This
//! module turns the telemetry section of a proxy policy into that document:
//! `render_bootstrap_config` folds the policy into a [`BootstrapParameters`]
//! aggregate (applying infrastructure defaults, sink deduplication and the
//! mandatory stats prefixes) and serializes it over a fixed document template.
//!
//! Rendering is total over its input: every policy that reaches this module
//! produces a document, and the only failure mode is serialization itself.
//! Identical parameters render byte-identical output.

mod params;
mod renderer;
mod schema;

pub use params::{
    AdminServerParameters, BootstrapParameters, MetricSink, ProxyStatsMatcherParameters,
    ReadyServerParameters, XdsServerParameters,
};

use crate::api::ProxyMetrics;
use crate::errors::Result;

/// File name the rendered document is conventionally written to.
pub const BOOTSTRAP_FILE_NAME: &str = "bootstrap.yaml";

/// DNS name of the discovery service, the bootplane service itself.
pub const XDS_SERVER_HOST: &str = "bootplane";

/// Port the discovery service listens on.
pub const DEFAULT_XDS_SERVER_PORT: u32 = 18000;

/// Loopback address the proxy admin interface binds to.
pub const ADMIN_ADDRESS: &str = "127.0.0.1";

/// Port of the proxy admin interface.
pub const ADMIN_PORT: u32 = 19000;

/// Admin access-log destination; admin traffic is not recorded.
pub const ADMIN_ACCESS_LOG_PATH: &str = "/dev/null";

/// Address the readiness listener binds to.
pub const READINESS_ADDRESS: &str = "0.0.0.0";

/// Port of the readiness listener.
pub const READINESS_PORT: u32 = 19001;

/// Request path answered by the readiness probe.
pub const READINESS_PATH: &str = "/ready";

/// Stats prefixes required by readiness checks, comma separated.
pub const REQUIRED_STATS_INCLUSION_PREFIXES: &str =
    "cluster_manager,listener_manager,server,cluster.xds-grpc";

/// Name of the discovery cluster referenced throughout the document.
pub const XDS_CLUSTER_NAME: &str = "xds_cluster";

/// Name shared by the Prometheus scrape cluster and its virtual host.
pub const PROMETHEUS_CLUSTER_NAME: &str = "prometheus_stats";

/// Route prefix the Prometheus scrape route matches on.
pub const PROMETHEUS_STATS_PATH: &str = "/stats/prometheus";

/// Name prefix of per-sink metric clusters; the sink position is appended.
pub const OTEL_SINK_CLUSTER_PREFIX: &str = "otel_metric_sink_";

/// Name of the single dynamically delivered runtime layer.
pub const RUNTIME_LAYER_NAME: &str = "runtime-0";

/// SDS resource name of the client certificate for the discovery connection.
pub const XDS_CERTIFICATE_SECRET_NAME: &str = "xds_certificate";

/// SDS resource name of the CA bundle validating the discovery connection.
pub const XDS_TRUSTED_CA_SECRET_NAME: &str = "xds_trusted_ca";

/// Mounted path the client certificate secret is delivered at.
pub const XDS_CERTIFICATE_SDS_PATH: &str = "/sds/xds-certificate.json";

/// Mounted path the CA bundle secret is delivered at.
pub const XDS_TRUSTED_CA_SDS_PATH: &str = "/sds/xds-trusted-ca.json";

/// Cluster name for the metric sink at a given position in the deduplicated
/// sink sequence.
pub fn otel_sink_cluster_name(position: usize) -> String {
    format!("{}{}", OTEL_SINK_CLUSTER_PREFIX, position)
}

/// Render the bootstrap document for a proxy governed by the given metrics
/// policy. `None` renders the infrastructure defaults.
pub fn render_bootstrap_config(metrics: Option<&ProxyMetrics>) -> Result<String> {
    BootstrapParameters::from_proxy_metrics(metrics).render()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sink_cluster_names_are_positional() {
        assert_eq!(otel_sink_cluster_name(0), "otel_metric_sink_0");
        assert_eq!(otel_sink_cluster_name(7), "otel_metric_sink_7");
    }

    #[test]
    fn test_required_prefixes_constant_shape() {
        let prefixes: Vec<&str> = REQUIRED_STATS_INCLUSION_PREFIXES.split(',').collect();
        assert_eq!(
            prefixes,
            vec!["cluster_manager", "listener_manager", "server", "cluster.xds-grpc"]
        );
    }
}
