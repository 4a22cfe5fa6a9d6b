//! Unit tests for the desired-state mapper and eligibility filters

use neg_types::{NetworkEndpoint, PodRef};

use crate::error::ControllerError;
use crate::syncer::endpoints::{
    pod_matches_subset, should_pod_be_in_neg, to_zone_network_endpoint_map,
};
use crate::test_utils::*;

fn endpoint(ip: &str, port: &str, node: &str) -> NetworkEndpoint {
    NetworkEndpoint {
        ip: ip.to_string(),
        port: port.to_string(),
        node: node.to_string(),
    }
}

#[test]
fn test_named_target_port_resolves_across_zones() {
    let zone_getter = FakeZoneGetter::new(&[("n1", "us-central1-a"), ("n2", "us-central1-b")]);
    let mut pod_lister = FakePodLister::default();
    pod_lister.add(create_test_pod("default", "pod-ready", false, &[]));
    pod_lister.add(create_test_pod("default", "pod-starting", false, &[]));

    let endpoints = create_test_endpoints(
        "default",
        "web",
        &[("http", 8080)],
        &[("10.0.0.1", Some("n1"), Some("pod-ready"))],
        &[("10.0.1.1", Some("n2"), Some("pod-starting"))],
    );

    let (zone_map, pod_map) =
        to_zone_network_endpoint_map(Some(&endpoints), &zone_getter, "http", &pod_lister, "")
            .unwrap();

    assert_eq!(zone_map.len(), 2);
    assert!(zone_map["us-central1-a"].contains(&endpoint("10.0.0.1", "8080", "n1")));
    assert!(zone_map["us-central1-b"].contains(&endpoint("10.0.1.1", "8080", "n2")));
    assert_eq!(
        pod_map[&endpoint("10.0.1.1", "8080", "n2")],
        PodRef::new("default", "pod-starting")
    );
}

#[test]
fn test_not_ready_address_of_terminating_pod_is_excluded() {
    let zone_getter = FakeZoneGetter::new(&[("n1", "us-central1-a"), ("n2", "us-central1-b")]);
    let mut pod_lister = FakePodLister::default();
    pod_lister.add(create_test_pod("default", "pod-ready", false, &[]));
    pod_lister.add(create_test_pod("default", "pod-dying", true, &[]));

    let endpoints = create_test_endpoints(
        "default",
        "web",
        &[("http", 8080)],
        &[("10.0.0.1", Some("n1"), Some("pod-ready"))],
        &[("10.0.1.1", Some("n2"), Some("pod-dying"))],
    );

    let (zone_map, _) =
        to_zone_network_endpoint_map(Some(&endpoints), &zone_getter, "http", &pod_lister, "")
            .unwrap();

    assert_eq!(zone_map["us-central1-a"].len(), 1);
    // The zone is still represented, just empty.
    assert!(zone_map["us-central1-b"].is_empty());
}

#[test]
fn test_numeric_target_port_matches_by_value() {
    let zone_getter = FakeZoneGetter::new(&[("n1", "us-central1-a")]);
    let mut pod_lister = FakePodLister::default();
    pod_lister.add(create_test_pod("default", "pod-1", false, &[]));

    let endpoints = create_test_endpoints(
        "default",
        "web",
        &[("", 9376)],
        &[("10.0.0.1", Some("n1"), Some("pod-1"))],
        &[],
    );

    let (zone_map, _) =
        to_zone_network_endpoint_map(Some(&endpoints), &zone_getter, "9376", &pod_lister, "")
            .unwrap();
    assert!(zone_map["us-central1-a"].contains(&endpoint("10.0.0.1", "9376", "n1")));
}

#[test]
fn test_subset_without_matching_port_is_skipped() {
    let zone_getter = FakeZoneGetter::new(&[("n1", "us-central1-a")]);
    let mut pod_lister = FakePodLister::default();
    pod_lister.add(create_test_pod("default", "pod-1", false, &[]));

    let endpoints = create_test_endpoints(
        "default",
        "web",
        &[("metrics", 9090)],
        &[("10.0.0.1", Some("n1"), Some("pod-1"))],
        &[],
    );

    let (zone_map, pod_map) =
        to_zone_network_endpoint_map(Some(&endpoints), &zone_getter, "http", &pod_lister, "")
            .unwrap();
    assert!(zone_map.is_empty());
    assert!(pod_map.is_empty());
}

#[test]
fn test_address_without_node_or_pod_is_skipped() {
    let zone_getter = FakeZoneGetter::new(&[("n1", "us-central1-a")]);
    let mut pod_lister = FakePodLister::default();
    pod_lister.add(create_test_pod("default", "pod-1", false, &[]));

    let endpoints = create_test_endpoints(
        "default",
        "web",
        &[("http", 8080)],
        &[
            ("10.0.0.1", None, Some("pod-1")),
            ("10.0.0.2", Some("n1"), None),
            ("10.0.0.3", Some("n1"), Some("pod-1")),
        ],
        &[],
    );

    let (zone_map, _) =
        to_zone_network_endpoint_map(Some(&endpoints), &zone_getter, "http", &pod_lister, "")
            .unwrap();
    assert_eq!(zone_map["us-central1-a"].len(), 1);
    assert!(zone_map["us-central1-a"].contains(&endpoint("10.0.0.3", "8080", "n1")));
}

#[test]
fn test_zone_lookup_failure_aborts_the_pass() {
    let zone_getter = FakeZoneGetter::new(&[]);
    let mut pod_lister = FakePodLister::default();
    pod_lister.add(create_test_pod("default", "pod-1", false, &[]));

    let endpoints = create_test_endpoints(
        "default",
        "web",
        &[("http", 8080)],
        &[("10.0.0.1", Some("unknown-node"), Some("pod-1"))],
        &[],
    );

    let result =
        to_zone_network_endpoint_map(Some(&endpoints), &zone_getter, "http", &pod_lister, "");
    assert!(matches!(result, Err(ControllerError::Store(_))));
}

#[test]
fn test_absent_endpoints_object_yields_empty_state() {
    let zone_getter = FakeZoneGetter::new(&[("n1", "us-central1-a")]);
    let pod_lister = FakePodLister::default();

    let (zone_map, pod_map) =
        to_zone_network_endpoint_map(None, &zone_getter, "http", &pod_lister, "").unwrap();
    assert!(zone_map.is_empty());
    assert!(pod_map.is_empty());
}

#[test]
fn test_subset_filter_excludes_pod_without_label() {
    let zone_getter = FakeZoneGetter::new(&[("n1", "us-central1-a")]);
    let mut pod_lister = FakePodLister::default();
    pod_lister.add(create_test_pod("default", "pod-stable", false, &[("track", "stable")]));
    pod_lister.add(create_test_pod("default", "pod-canary", false, &[("track", "canary")]));

    let endpoints = create_test_endpoints(
        "default",
        "web",
        &[("http", 8080)],
        &[
            ("10.0.0.1", Some("n1"), Some("pod-stable")),
            ("10.0.0.2", Some("n1"), Some("pod-canary")),
        ],
        &[],
    );

    let (zone_map, _) = to_zone_network_endpoint_map(
        Some(&endpoints),
        &zone_getter,
        "http",
        &pod_lister,
        "track=canary",
    )
    .unwrap();

    assert_eq!(zone_map["us-central1-a"].len(), 1);
    assert!(zone_map["us-central1-a"].contains(&endpoint("10.0.0.2", "8080", "n1")));
}

#[test]
fn test_should_pod_be_in_neg_fails_closed() {
    let mut pod_lister = FakePodLister::default();
    pod_lister.add(create_test_pod("default", "alive", false, &[]));
    pod_lister.add(create_test_pod("default", "dying", true, &[]));

    assert!(should_pod_be_in_neg(&pod_lister, "default", "alive"));
    assert!(!should_pod_be_in_neg(&pod_lister, "default", "dying"));
    assert!(!should_pod_be_in_neg(&pod_lister, "default", "missing"));
}

#[test]
fn test_pod_matches_subset_fails_closed() {
    let mut pod_lister = FakePodLister::default();
    pod_lister.add(create_test_pod("default", "canary", false, &[("track", "canary")]));

    assert!(pod_matches_subset(&pod_lister, "default", "canary", "track=canary"));
    assert!(!pod_matches_subset(&pod_lister, "default", "canary", "track=stable"));
    assert!(!pod_matches_subset(&pod_lister, "default", "missing", "track=canary"));
    // Unparseable selector expressions never match.
    assert!(!pod_matches_subset(&pod_lister, "default", "canary", "track in (canary"));
}
