//! Property-based checks over arbitrary telemetry policies.

use std::collections::HashSet;

use bootplane::api::{PrometheusProvider, ProxyMetricSink, ProxyMetrics, ProxyStatsMatcher};
use bootplane::render_bootstrap_config;
use proptest::prelude::*;
use serde_yaml::Value;

fn policy(prometheus: bool, sinks: &[(String, u32)], prefixes: &[String]) -> ProxyMetrics {
    ProxyMetrics {
        prometheus: prometheus.then(PrometheusProvider::default),
        sinks: sinks
            .iter()
            .map(|(host, port)| ProxyMetricSink::open_telemetry(host.clone(), *port))
            .collect(),
        proxy_stats_matcher: if prefixes.is_empty() {
            None
        } else {
            Some(ProxyStatsMatcher {
                inclusion_prefixes: prefixes.to_vec(),
                ..Default::default()
            })
        },
    }
}

fn parse(metrics: &ProxyMetrics) -> Value {
    let rendered = render_bootstrap_config(Some(metrics)).expect("rendering is total");
    serde_yaml::from_str(&rendered).expect("output parses as YAML")
}

fn sink_endpoints(doc: &Value) -> Vec<(String, u64)> {
    doc["static_resources"]["clusters"]
        .as_sequence()
        .unwrap()
        .iter()
        .filter(|c| c["name"].as_str().unwrap().starts_with("otel_metric_sink_"))
        .map(|c| {
            let socket = &c["load_assignment"]["endpoints"][0]["lb_endpoints"][0]["endpoint"]
                ["address"]["socket_address"];
            (
                socket["address"].as_str().unwrap().to_string(),
                socket["port_value"].as_u64().unwrap(),
            )
        })
        .collect()
}

// Small alphabet and port range so duplicate destinations are common.
fn sink_inputs() -> impl Strategy<Value = Vec<(String, u32)>> {
    prop::collection::vec(("[a-e]{1,4}", 4315u32..4320), 0..8)
}

fn prefix_inputs() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec("[a-z_]{1,12}", 0..5)
}

proptest! {
    #[test]
    fn sink_clusters_match_first_occurrence_of_each_destination(sinks in sink_inputs()) {
        let metrics = policy(false, &sinks, &[]);
        let doc = parse(&metrics);

        let mut seen = HashSet::new();
        let expected: Vec<(String, u64)> = sinks
            .iter()
            .filter(|(host, port)| seen.insert(format!("{}:{}", host, port)))
            .map(|(host, port)| (host.clone(), u64::from(*port)))
            .collect();

        prop_assert_eq!(sink_endpoints(&doc), expected);
    }

    #[test]
    fn sink_cluster_positions_are_gapless(sinks in sink_inputs()) {
        let metrics = policy(false, &sinks, &[]);
        let doc = parse(&metrics);

        let names: Vec<String> = doc["static_resources"]["clusters"]
            .as_sequence()
            .unwrap()
            .iter()
            .map(|c| c["name"].as_str().unwrap().to_string())
            .filter(|name| name.starts_with("otel_metric_sink_"))
            .collect();
        let expected: Vec<String> = (0..names.len())
            .map(|position| format!("otel_metric_sink_{}", position))
            .collect();
        prop_assert_eq!(names, expected);
    }

    #[test]
    fn mandatory_prefixes_always_terminate_the_prefix_group(prefixes in prefix_inputs()) {
        let metrics = policy(false, &[], &prefixes);
        let doc = parse(&metrics);

        let rendered_prefixes: Vec<String> = doc["stats_config"]["stats_matcher"]
            ["inclusion_list"]["patterns"]
            .as_sequence()
            .unwrap()
            .iter()
            .filter_map(|p| p.get("prefix"))
            .map(|p| p.as_str().unwrap().to_string())
            .collect();

        let mut expected = prefixes.clone();
        expected.extend(
            ["cluster_manager", "listener_manager", "server", "cluster.xds-grpc"]
                .map(String::from),
        );
        prop_assert_eq!(rendered_prefixes, expected);
    }

    #[test]
    fn every_policy_renders_and_keeps_the_fixed_skeleton(
        prometheus in any::<bool>(),
        sinks in sink_inputs(),
        prefixes in prefix_inputs(),
    ) {
        let metrics = policy(prometheus, &sinks, &prefixes);
        let doc = parse(&metrics);

        let clusters: Vec<String> = doc["static_resources"]["clusters"]
            .as_sequence()
            .unwrap()
            .iter()
            .map(|c| c["name"].as_str().unwrap().to_string())
            .collect();
        prop_assert_eq!(clusters.last().map(String::as_str), Some("xds_cluster"));
        prop_assert_eq!(
            clusters.iter().filter(|name| name.as_str() == "prometheus_stats").count(),
            usize::from(prometheus)
        );

        let listeners = doc["static_resources"]["listeners"].as_sequence().unwrap();
        prop_assert_eq!(listeners.len(), 1);
        prop_assert_eq!(
            doc["layered_runtime"]["layers"][0]["name"].as_str(),
            Some("runtime-0")
        );
    }

    #[test]
    fn rendering_is_deterministic_for_any_policy(
        prometheus in any::<bool>(),
        sinks in sink_inputs(),
        prefixes in prefix_inputs(),
    ) {
        let metrics = policy(prometheus, &sinks, &prefixes);
        let first = render_bootstrap_config(Some(&metrics)).unwrap();
        let second = render_bootstrap_config(Some(&metrics)).unwrap();
        prop_assert_eq!(first, second);
    }
}
