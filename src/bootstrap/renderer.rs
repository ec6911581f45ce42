//! Bootstrap document assembly and serialization.
//!
//! The invariant sections (discovery wiring, xDS transport security, runtime
//! layer) are compiled once per process into [`BootstrapTemplate`] and cloned
//! into every render. Everything else is derived from the parameter aggregate
//! on each call. No section iterates an unordered collection, so identical
//! parameters always serialize to identical bytes.

use once_cell::sync::Lazy;
use tracing::debug;

use crate::errors::Result;

use super::params::{
    AdminServerParameters, BootstrapParameters, MetricSink, ProxyStatsMatcherParameters,
    ReadyServerParameters, XdsServerParameters,
};
use super::schema::{
    Address, Admin, AdsConfig, AdsConfigSource, Bootstrap, Cluster, ClusterLoadAssignment,
    CommonTlsContext, DynamicResources, Filter, FilterChain, GrpcService, HeaderMatcher,
    HealthCheckConfig, HttpConnectionManager, HttpFilter, HttpFilterConfig, LayeredRuntime,
    ListStringMatcher, Listener, OtelStatsSinkConfig, Route, RouteAction, RouteConfiguration,
    RouteMatch, RouterConfig, RtdsLayer, RuntimeLayer, SafeRegexMatcher, SdsSecretConfig,
    StaticResources, StatsConfig, StatsMatcher, StatsSink, StringMatch, StringMatchPattern,
    TlsParams, TransportSocket, TypedExtensionProtocolOptions, UpstreamTlsContext, VirtualHost,
    HCM_FILTER_NAME, HCM_TYPE_URL, HEALTH_CHECK_FILTER_NAME, HEALTH_CHECK_TYPE_URL,
    OTEL_STATS_SINK_NAME, OTEL_STATS_SINK_TYPE_URL, ROUTER_FILTER_NAME, ROUTER_TYPE_URL,
    TLS_TRANSPORT_SOCKET_NAME, UPSTREAM_TLS_TYPE_URL,
};
use super::{
    otel_sink_cluster_name, PROMETHEUS_CLUSTER_NAME, PROMETHEUS_STATS_PATH, RUNTIME_LAYER_NAME,
    XDS_CERTIFICATE_SDS_PATH, XDS_CERTIFICATE_SECRET_NAME, XDS_CLUSTER_NAME,
    XDS_TRUSTED_CA_SDS_PATH, XDS_TRUSTED_CA_SECRET_NAME,
};

/// Connect timeout for the telemetry clusters.
const TELEMETRY_CONNECT_TIMEOUT: &str = "0.250s";

/// Connect timeout for the discovery cluster.
const XDS_CONNECT_TIMEOUT: &str = "10s";

/// PING keepalive cadence on the discovery connection.
const XDS_KEEPALIVE_INTERVAL: &str = "30s";
const XDS_KEEPALIVE_TIMEOUT: &str = "5s";

/// Name of the readiness listener's route configuration.
const READY_ROUTE_CONFIG_NAME: &str = "local_route";

/// Stat prefix of the readiness listener's connection manager.
const READY_STAT_PREFIX: &str = "bp-ready-http";

/// Name prefix of the readiness listener; bind address and port are appended.
const READY_LISTENER_NAME_PREFIX: &str = "bootplane-proxy-ready";

static BOOTSTRAP_TEMPLATE: Lazy<BootstrapTemplate> = Lazy::new(BootstrapTemplate::compile);

/// Invariant document sections, compiled once and cloned into each render.
struct BootstrapTemplate {
    dynamic_resources: DynamicResources,
    xds_transport_socket: TransportSocket,
    layered_runtime: LayeredRuntime,
}

impl BootstrapTemplate {
    fn compile() -> Self {
        Self {
            dynamic_resources: DynamicResources {
                ads_config: AdsConfig {
                    api_type: "DELTA_GRPC".to_string(),
                    transport_api_version: "V3".to_string(),
                    grpc_services: vec![GrpcService::envoy_grpc(XDS_CLUSTER_NAME)],
                    set_node_on_first_message_only: true,
                },
                lds_config: AdsConfigSource::v3(),
                cds_config: AdsConfigSource::v3(),
            },
            xds_transport_socket: TransportSocket {
                name: TLS_TRANSPORT_SOCKET_NAME.to_string(),
                typed_config: UpstreamTlsContext {
                    type_url: UPSTREAM_TLS_TYPE_URL.to_string(),
                    common_tls_context: CommonTlsContext {
                        tls_params: TlsParams {
                            tls_maximum_protocol_version: "TLSv1_3".to_string(),
                        },
                        tls_certificate_sds_secret_configs: vec![SdsSecretConfig::path_backed(
                            XDS_CERTIFICATE_SECRET_NAME,
                            XDS_CERTIFICATE_SDS_PATH,
                        )],
                        validation_context_sds_secret_config: SdsSecretConfig::path_backed(
                            XDS_TRUSTED_CA_SECRET_NAME,
                            XDS_TRUSTED_CA_SDS_PATH,
                        ),
                    },
                },
            },
            layered_runtime: LayeredRuntime {
                layers: vec![RuntimeLayer {
                    name: RUNTIME_LAYER_NAME.to_string(),
                    rtds_layer: RtdsLayer {
                        rtds_config: AdsConfigSource::v3(),
                        name: RUNTIME_LAYER_NAME.to_string(),
                    },
                }],
            },
        }
    }
}

/// Assemble and serialize the bootstrap document for one parameter aggregate.
pub(crate) fn render(params: &BootstrapParameters) -> Result<String> {
    let template = Lazy::force(&BOOTSTRAP_TEMPLATE);

    let bootstrap = Bootstrap {
        admin: build_admin(&params.admin_server),
        dynamic_resources: template.dynamic_resources.clone(),
        stats_sinks: build_stats_sinks(&params.otel_metric_sinks),
        stats_config: build_stats_config(&params.proxy_stats_matcher),
        static_resources: StaticResources {
            listeners: vec![build_ready_listener(
                &params.ready_server,
                params.enable_prometheus,
            )],
            clusters: build_clusters(params, template),
        },
        layered_runtime: template.layered_runtime.clone(),
    };

    let rendered = serde_yaml::to_string(&bootstrap)?;
    debug!(
        prometheus = params.enable_prometheus,
        sink_clusters = params.otel_metric_sinks.len(),
        bytes = rendered.len(),
        "Rendered proxy bootstrap configuration"
    );
    Ok(rendered)
}

fn build_admin(admin: &AdminServerParameters) -> Admin {
    Admin {
        access_log_path: admin.access_log_path.clone(),
        address: Address::socket(admin.address.clone(), admin.port),
    }
}

/// One stats sink per surviving metric sink, wired to the cluster of the same
/// position. The sink destination itself lives on the cluster.
fn build_stats_sinks(sinks: &[MetricSink]) -> Vec<StatsSink> {
    sinks
        .iter()
        .enumerate()
        .map(|(position, _)| StatsSink {
            name: OTEL_STATS_SINK_NAME.to_string(),
            typed_config: OtelStatsSinkConfig {
                type_url: OTEL_STATS_SINK_TYPE_URL.to_string(),
                grpc_service: GrpcService::envoy_grpc(otel_sink_cluster_name(position)),
            },
        })
        .collect()
}

/// Inclusion patterns in fixed group order: prefixes, suffixes, regexes.
fn build_stats_config(matcher: &ProxyStatsMatcherParameters) -> StatsConfig {
    let mut patterns = Vec::with_capacity(
        matcher.inclusion_prefixes.len()
            + matcher.inclusion_suffixes.len()
            + matcher.inclusion_regexps.len(),
    );

    for prefix in &matcher.inclusion_prefixes {
        patterns.push(StringMatchPattern::Prefix {
            prefix: prefix.clone(),
        });
    }
    for suffix in &matcher.inclusion_suffixes {
        patterns.push(StringMatchPattern::Suffix {
            suffix: suffix.clone(),
        });
    }
    for regex in &matcher.inclusion_regexps {
        patterns.push(StringMatchPattern::SafeRegex {
            safe_regex: SafeRegexMatcher::re2(regex.clone()),
        });
    }

    StatsConfig {
        stats_matcher: StatsMatcher {
            inclusion_list: ListStringMatcher { patterns },
        },
    }
}

/// The readiness listener, with the Prometheus scrape route mounted on its
/// route configuration when enabled.
fn build_ready_listener(ready: &ReadyServerParameters, enable_prometheus: bool) -> Listener {
    let virtual_hosts = if enable_prometheus {
        vec![VirtualHost {
            name: PROMETHEUS_CLUSTER_NAME.to_string(),
            domains: vec!["*".to_string()],
            routes: vec![Route {
                route_match: RouteMatch {
                    prefix: PROMETHEUS_STATS_PATH.to_string(),
                },
                route: RouteAction {
                    cluster: PROMETHEUS_CLUSTER_NAME.to_string(),
                },
            }],
        }]
    } else {
        Vec::new()
    };

    Listener {
        name: format!(
            "{}-{}-{}",
            READY_LISTENER_NAME_PREFIX, ready.address, ready.port
        ),
        address: Address::tcp(ready.address.clone(), ready.port),
        filter_chains: vec![FilterChain {
            filters: vec![Filter {
                name: HCM_FILTER_NAME.to_string(),
                typed_config: HttpConnectionManager {
                    type_url: HCM_TYPE_URL.to_string(),
                    stat_prefix: READY_STAT_PREFIX.to_string(),
                    route_config: RouteConfiguration {
                        name: READY_ROUTE_CONFIG_NAME.to_string(),
                        virtual_hosts,
                    },
                    http_filters: vec![
                        HttpFilter {
                            name: HEALTH_CHECK_FILTER_NAME.to_string(),
                            typed_config: HttpFilterConfig::HealthCheck(HealthCheckConfig {
                                type_url: HEALTH_CHECK_TYPE_URL.to_string(),
                                pass_through_mode: false,
                                headers: vec![HeaderMatcher {
                                    name: ":path".to_string(),
                                    string_match: StringMatch {
                                        exact: ready.readiness_path.clone(),
                                    },
                                }],
                            }),
                        },
                        HttpFilter {
                            name: ROUTER_FILTER_NAME.to_string(),
                            typed_config: HttpFilterConfig::Router(RouterConfig {
                                type_url: ROUTER_TYPE_URL.to_string(),
                            }),
                        },
                    ],
                },
            }],
        }],
    }
}

/// Cluster list in document order: Prometheus scrape cluster when enabled,
/// one cluster per metric sink in sequence order, then the discovery cluster.
fn build_clusters(params: &BootstrapParameters, template: &BootstrapTemplate) -> Vec<Cluster> {
    let mut clusters = Vec::with_capacity(params.otel_metric_sinks.len() + 2);

    if params.enable_prometheus {
        clusters.push(build_prometheus_cluster(&params.admin_server));
    }

    for (position, sink) in params.otel_metric_sinks.iter().enumerate() {
        clusters.push(build_otel_sink_cluster(position, sink));
    }

    clusters.push(build_xds_cluster(
        &params.xds_server,
        template.xds_transport_socket.clone(),
    ));

    clusters
}

/// Scrape cluster pointing back at the admin interface.
fn build_prometheus_cluster(admin: &AdminServerParameters) -> Cluster {
    Cluster {
        name: PROMETHEUS_CLUSTER_NAME.to_string(),
        connect_timeout: TELEMETRY_CONNECT_TIMEOUT.to_string(),
        discovery_type: Some("STATIC".to_string()),
        lb_policy: Some("ROUND_ROBIN".to_string()),
        typed_extension_protocol_options: None,
        load_assignment: ClusterLoadAssignment::single(
            PROMETHEUS_CLUSTER_NAME,
            admin.address.clone(),
            admin.port,
        ),
        transport_socket: None,
    }
}

fn build_otel_sink_cluster(position: usize, sink: &MetricSink) -> Cluster {
    let name = otel_sink_cluster_name(position);
    Cluster {
        name: name.clone(),
        connect_timeout: TELEMETRY_CONNECT_TIMEOUT.to_string(),
        discovery_type: Some("STRICT_DNS".to_string()),
        lb_policy: Some("ROUND_ROBIN".to_string()),
        typed_extension_protocol_options: Some(TypedExtensionProtocolOptions::http2()),
        load_assignment: ClusterLoadAssignment::single(name, sink.address.clone(), sink.port),
        transport_socket: None,
    }
}

fn build_xds_cluster(xds: &XdsServerParameters, transport_socket: TransportSocket) -> Cluster {
    Cluster {
        name: XDS_CLUSTER_NAME.to_string(),
        connect_timeout: XDS_CONNECT_TIMEOUT.to_string(),
        discovery_type: None,
        lb_policy: None,
        typed_extension_protocol_options: Some(TypedExtensionProtocolOptions::http2_with_keepalive(
            XDS_KEEPALIVE_INTERVAL,
            XDS_KEEPALIVE_TIMEOUT,
        )),
        load_assignment: ClusterLoadAssignment::single(
            XDS_CLUSTER_NAME,
            xds.address.clone(),
            xds.port,
        ),
        transport_socket: Some(transport_socket),
    }
}
