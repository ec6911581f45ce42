//! Typed shape of the emitted bootstrap document.
//!
//! Serialization order follows struct field order, so the declaration order
//! here is the document layout. Optional sections carry `skip_serializing_if`
//! and disappear from the output entirely rather than rendering empty.

use serde::Serialize;

pub(crate) const HCM_FILTER_NAME: &str = "envoy.filters.network.http_connection_manager";
pub(crate) const HEALTH_CHECK_FILTER_NAME: &str = "envoy.filters.http.health_check";
pub(crate) const ROUTER_FILTER_NAME: &str = "envoy.filters.http.router";
pub(crate) const TLS_TRANSPORT_SOCKET_NAME: &str = "envoy.transport_sockets.tls";
pub(crate) const OTEL_STATS_SINK_NAME: &str = "envoy.stat_sinks.open_telemetry";

pub(crate) const HCM_TYPE_URL: &str =
    "type.googleapis.com/envoy.extensions.filters.network.http_connection_manager.v3.HttpConnectionManager";
pub(crate) const HEALTH_CHECK_TYPE_URL: &str =
    "type.googleapis.com/envoy.extensions.filters.http.health_check.v3.HealthCheck";
pub(crate) const ROUTER_TYPE_URL: &str =
    "type.googleapis.com/envoy.extensions.filters.http.router.v3.Router";
pub(crate) const OTEL_STATS_SINK_TYPE_URL: &str =
    "type.googleapis.com/envoy.extensions.stat_sinks.open_telemetry.v3.SinkConfig";
pub(crate) const HTTP_PROTOCOL_OPTIONS_TYPE_URL: &str =
    "type.googleapis.com/envoy.extensions.upstreams.http.v3.HttpProtocolOptions";
pub(crate) const UPSTREAM_TLS_TYPE_URL: &str =
    "type.googleapis.com/envoy.extensions.transport_sockets.tls.v3.UpstreamTlsContext";

/// Root of the bootstrap document.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct Bootstrap {
    pub admin: Admin,
    pub dynamic_resources: DynamicResources,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub stats_sinks: Vec<StatsSink>,
    pub stats_config: StatsConfig,
    pub static_resources: StaticResources,
    pub layered_runtime: LayeredRuntime,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct Admin {
    pub access_log_path: String,
    pub address: Address,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct Address {
    pub socket_address: SocketAddress,
}

impl Address {
    pub fn socket<S: Into<String>>(address: S, port: u32) -> Self {
        Self {
            socket_address: SocketAddress {
                address: address.into(),
                port_value: port,
                protocol: None,
            },
        }
    }

    pub fn tcp<S: Into<String>>(address: S, port: u32) -> Self {
        let mut addr = Self::socket(address, port);
        addr.socket_address.protocol = Some("TCP".to_string());
        addr
    }
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct SocketAddress {
    pub address: String,
    pub port_value: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,
}

/// Empty mapping, rendered as `{}`.
#[derive(Debug, Clone, Default, Serialize)]
pub(crate) struct Empty {}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct DynamicResources {
    pub ads_config: AdsConfig,
    pub lds_config: AdsConfigSource,
    pub cds_config: AdsConfigSource,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct AdsConfig {
    pub api_type: String,
    pub transport_api_version: String,
    pub grpc_services: Vec<GrpcService>,
    pub set_node_on_first_message_only: bool,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct GrpcService {
    pub envoy_grpc: EnvoyGrpc,
}

impl GrpcService {
    pub fn envoy_grpc<S: Into<String>>(cluster_name: S) -> Self {
        Self {
            envoy_grpc: EnvoyGrpc {
                cluster_name: cluster_name.into(),
            },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct EnvoyGrpc {
    pub cluster_name: String,
}

/// Config source pointing at the aggregated discovery stream.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct AdsConfigSource {
    pub ads: Empty,
    pub resource_api_version: String,
}

impl AdsConfigSource {
    pub fn v3() -> Self {
        Self {
            ads: Empty {},
            resource_api_version: "V3".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct StatsSink {
    pub name: String,
    pub typed_config: OtelStatsSinkConfig,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct OtelStatsSinkConfig {
    #[serde(rename = "@type")]
    pub type_url: String,
    pub grpc_service: GrpcService,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct StatsConfig {
    pub stats_matcher: StatsMatcher,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct StatsMatcher {
    pub inclusion_list: ListStringMatcher,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct ListStringMatcher {
    pub patterns: Vec<StringMatchPattern>,
}

/// One entry of the stats inclusion list. Untagged, so each variant's single
/// field name is the key of the emitted mapping.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub(crate) enum StringMatchPattern {
    Prefix { prefix: String },
    Suffix { suffix: String },
    SafeRegex { safe_regex: SafeRegexMatcher },
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct SafeRegexMatcher {
    pub google_re2: Empty,
    pub regex: String,
}

impl SafeRegexMatcher {
    pub fn re2<S: Into<String>>(regex: S) -> Self {
        Self {
            google_re2: Empty {},
            regex: regex.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct StaticResources {
    pub listeners: Vec<Listener>,
    pub clusters: Vec<Cluster>,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct Listener {
    pub name: String,
    pub address: Address,
    pub filter_chains: Vec<FilterChain>,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct FilterChain {
    pub filters: Vec<Filter>,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct Filter {
    pub name: String,
    pub typed_config: HttpConnectionManager,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct HttpConnectionManager {
    #[serde(rename = "@type")]
    pub type_url: String,
    pub stat_prefix: String,
    pub route_config: RouteConfiguration,
    pub http_filters: Vec<HttpFilter>,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct RouteConfiguration {
    pub name: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub virtual_hosts: Vec<VirtualHost>,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct VirtualHost {
    pub name: String,
    pub domains: Vec<String>,
    pub routes: Vec<Route>,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct Route {
    #[serde(rename = "match")]
    pub route_match: RouteMatch,
    pub route: RouteAction,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct RouteMatch {
    pub prefix: String,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct RouteAction {
    pub cluster: String,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct HttpFilter {
    pub name: String,
    pub typed_config: HttpFilterConfig,
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub(crate) enum HttpFilterConfig {
    HealthCheck(HealthCheckConfig),
    Router(RouterConfig),
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct HealthCheckConfig {
    #[serde(rename = "@type")]
    pub type_url: String,
    pub pass_through_mode: bool,
    pub headers: Vec<HeaderMatcher>,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct HeaderMatcher {
    pub name: String,
    pub string_match: StringMatch,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct StringMatch {
    pub exact: String,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct RouterConfig {
    #[serde(rename = "@type")]
    pub type_url: String,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct Cluster {
    pub name: String,
    pub connect_timeout: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub discovery_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lb_policy: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub typed_extension_protocol_options: Option<TypedExtensionProtocolOptions>,
    pub load_assignment: ClusterLoadAssignment,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transport_socket: Option<TransportSocket>,
}

/// The `typed_extension_protocol_options` map keyed by the extension name.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct TypedExtensionProtocolOptions {
    #[serde(rename = "envoy.extensions.upstreams.http.v3.HttpProtocolOptions")]
    pub http: HttpProtocolOptions,
}

impl TypedExtensionProtocolOptions {
    /// Plain HTTP/2 upstream, no keepalive.
    pub fn http2() -> Self {
        Self {
            http: HttpProtocolOptions {
                type_url: HTTP_PROTOCOL_OPTIONS_TYPE_URL.to_string(),
                explicit_http_config: ExplicitHttpConfig {
                    http2_protocol_options: Http2ProtocolOptions {
                        connection_keepalive: None,
                    },
                },
            },
        }
    }

    /// HTTP/2 upstream probed with PING keepalives.
    pub fn http2_with_keepalive<S: Into<String>>(interval: S, timeout: S) -> Self {
        let mut options = Self::http2();
        options
            .http
            .explicit_http_config
            .http2_protocol_options
            .connection_keepalive = Some(ConnectionKeepalive {
            interval: interval.into(),
            timeout: timeout.into(),
        });
        options
    }
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct HttpProtocolOptions {
    #[serde(rename = "@type")]
    pub type_url: String,
    pub explicit_http_config: ExplicitHttpConfig,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct ExplicitHttpConfig {
    pub http2_protocol_options: Http2ProtocolOptions,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct Http2ProtocolOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connection_keepalive: Option<ConnectionKeepalive>,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct ConnectionKeepalive {
    pub interval: String,
    pub timeout: String,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct ClusterLoadAssignment {
    pub cluster_name: String,
    pub endpoints: Vec<LocalityLbEndpoints>,
}

impl ClusterLoadAssignment {
    /// Single-endpoint assignment, the only form this document uses.
    pub fn single<S: Into<String>, A: Into<String>>(
        cluster_name: S,
        address: A,
        port: u32,
    ) -> Self {
        Self {
            cluster_name: cluster_name.into(),
            endpoints: vec![LocalityLbEndpoints {
                lb_endpoints: vec![LbEndpoint {
                    endpoint: Endpoint {
                        address: Address::socket(address, port),
                    },
                }],
            }],
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct LocalityLbEndpoints {
    pub lb_endpoints: Vec<LbEndpoint>,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct LbEndpoint {
    pub endpoint: Endpoint,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct Endpoint {
    pub address: Address,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct TransportSocket {
    pub name: String,
    pub typed_config: UpstreamTlsContext,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct UpstreamTlsContext {
    #[serde(rename = "@type")]
    pub type_url: String,
    pub common_tls_context: CommonTlsContext,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct CommonTlsContext {
    pub tls_params: TlsParams,
    pub tls_certificate_sds_secret_configs: Vec<SdsSecretConfig>,
    pub validation_context_sds_secret_config: SdsSecretConfig,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct TlsParams {
    pub tls_maximum_protocol_version: String,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct SdsSecretConfig {
    pub name: String,
    pub sds_config: SdsConfigSource,
}

impl SdsSecretConfig {
    /// Secret delivered through a file watched at `path`.
    pub fn path_backed<S: Into<String>, P: Into<String>>(name: S, path: P) -> Self {
        Self {
            name: name.into(),
            sds_config: SdsConfigSource {
                path_config_source: PathConfigSource { path: path.into() },
                resource_api_version: "V3".to_string(),
            },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct SdsConfigSource {
    pub path_config_source: PathConfigSource,
    pub resource_api_version: String,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct PathConfigSource {
    pub path: String,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct LayeredRuntime {
    pub layers: Vec<RuntimeLayer>,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct RuntimeLayer {
    pub name: String,
    pub rtds_layer: RtdsLayer,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct RtdsLayer {
    pub rtds_config: AdsConfigSource,
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_serializes_as_flow_mapping() {
        let yaml = serde_yaml::to_string(&Empty {}).unwrap();
        assert_eq!(yaml.trim(), "{}");
    }

    #[test]
    fn test_patterns_serialize_as_single_key_mappings() {
        let list = ListStringMatcher {
            patterns: vec![
                StringMatchPattern::Prefix {
                    prefix: "http".to_string(),
                },
                StringMatchPattern::Suffix {
                    suffix: "rq_total".to_string(),
                },
                StringMatchPattern::SafeRegex {
                    safe_regex: SafeRegexMatcher::re2("a.*b"),
                },
            ],
        };
        let yaml = serde_yaml::to_string(&list).unwrap();
        assert!(yaml.contains("- prefix: http"));
        assert!(yaml.contains("- suffix: rq_total"));
        assert!(yaml.contains("- safe_regex:"));
        assert!(yaml.contains("google_re2: {}"));
        assert!(yaml.contains("regex: a.*b"));
        // No YAML application tags on any entry.
        assert!(!yaml.contains('!'));
    }

    #[test]
    fn test_type_url_key_is_at_type() {
        let router = RouterConfig {
            type_url: ROUTER_TYPE_URL.to_string(),
        };
        let yaml = serde_yaml::to_string(&router).unwrap();
        assert!(yaml.contains("'@type'"));
        assert!(yaml.contains(ROUTER_TYPE_URL));
    }

    #[test]
    fn test_route_match_key_is_match() {
        let route = Route {
            route_match: RouteMatch {
                prefix: "/stats/prometheus".to_string(),
            },
            route: RouteAction {
                cluster: "prometheus_stats".to_string(),
            },
        };
        let yaml = serde_yaml::to_string(&route).unwrap();
        assert!(yaml.contains("match:"));
        assert!(yaml.contains("prefix: /stats/prometheus"));
        assert!(yaml.contains("cluster: prometheus_stats"));
    }

    #[test]
    fn test_tcp_address_carries_protocol() {
        let yaml = serde_yaml::to_string(&Address::tcp("0.0.0.0", 19001)).unwrap();
        assert!(yaml.contains("protocol: TCP"));

        let yaml = serde_yaml::to_string(&Address::socket("127.0.0.1", 19000)).unwrap();
        assert!(!yaml.contains("protocol"));
    }

    #[test]
    fn test_protocol_options_keyed_by_extension_name() {
        let yaml =
            serde_yaml::to_string(&TypedExtensionProtocolOptions::http2_with_keepalive("30s", "5s"))
                .unwrap();
        assert!(yaml.contains("envoy.extensions.upstreams.http.v3.HttpProtocolOptions"));
        assert!(yaml.contains("interval: 30s"));
        assert!(yaml.contains("timeout: 5s"));

        let yaml = serde_yaml::to_string(&TypedExtensionProtocolOptions::http2()).unwrap();
        assert!(!yaml.contains("connection_keepalive"));
        assert!(yaml.contains("http2_protocol_options: {}"));
    }

    #[test]
    fn test_single_load_assignment_shape() {
        let assignment = ClusterLoadAssignment::single("xds_cluster", "bootplane", 18000);
        let yaml = serde_yaml::to_string(&assignment).unwrap();
        assert!(yaml.contains("cluster_name: xds_cluster"));
        assert!(yaml.contains("address: bootplane"));
        assert!(yaml.contains("port_value: 18000"));
        assert_eq!(assignment.endpoints.len(), 1);
        assert_eq!(assignment.endpoints[0].lb_endpoints.len(), 1);
    }
}
