//! Desired-state mapping from Endpoints objects.
//!
//! Translates a service's Endpoints subsets into the zone-partitioned
//! endpoint sets the NEG should converge to, together with the
//! endpoint-to-pod attribution map consumers use for readiness handling.

use k8s_openapi::api::core::v1::{EndpointAddress, Endpoints};
use kube::core::{Selector, SelectorExt};
use neg_types::{
    EndpointPodMap, NetworkEndpoint, NetworkEndpointSet, PodLister, PodRef, ZoneEndpointMap,
    ZoneGetter,
};
use tracing::{debug, warn};

use crate::error::ControllerError;

/// Returns true if the pod exists and is not in graceful termination.
///
/// Absence from the store and lookup errors both resolve to false: a pod we
/// cannot account for must not be registered as an endpoint.
pub fn should_pod_be_in_neg(pod_lister: &dyn PodLister, namespace: &str, name: &str) -> bool {
    match pod_lister.get_pod(namespace, name) {
        Ok(Some(pod)) => pod.metadata.deletion_timestamp.is_none(),
        Ok(None) => false,
        Err(err) => {
            warn!("failed to retrieve pod {}/{}: {}", namespace, name, err);
            false
        }
    }
}

/// Returns true if the pod's labels satisfy the subset selector expression.
///
/// A parse failure, lookup error or missing pod all resolve to false.
/// Callers disable subset filtering by skipping this call for an empty
/// expression, not by passing one in.
pub fn pod_matches_subset(
    pod_lister: &dyn PodLister,
    namespace: &str,
    name: &str,
    subset_labels: &str,
) -> bool {
    let pod = match pod_lister.get_pod(namespace, name) {
        Ok(Some(pod)) => pod,
        Ok(None) => return false,
        Err(err) => {
            warn!("failed to retrieve pod {}/{}: {}", namespace, name, err);
            return false;
        }
    };

    let selector: Selector = match subset_labels.parse() {
        Ok(selector) => selector,
        Err(err) => {
            warn!("failed to parse subset selector {:?}: {}", subset_labels, err);
            return false;
        }
    };

    let labels = pod.metadata.labels.clone().unwrap_or_default();
    selector.matches(&labels)
}

/// Translates an Endpoints object into a zone to endpoint-set map plus the
/// endpoint to pod map.
///
/// The target port may be a literal number or a named port; a subset whose
/// port list has no match is skipped whole. Ready addresses are included
/// unconditionally; not-ready addresses only while their pod is not
/// terminating, so endpoints survive slow starts without resurrecting
/// pods on their way out. A zone-lookup failure aborts the pass.
pub fn to_zone_network_endpoint_map(
    endpoints: Option<&Endpoints>,
    zone_getter: &dyn ZoneGetter,
    target_port: &str,
    pod_lister: &dyn PodLister,
    subset_labels: &str,
) -> Result<(ZoneEndpointMap<NetworkEndpoint>, EndpointPodMap), ControllerError> {
    let mut zone_map: ZoneEndpointMap<NetworkEndpoint> = ZoneEndpointMap::new();
    let mut pod_map = EndpointPodMap::new();

    let Some(endpoints) = endpoints else {
        warn!("endpoints object is absent, desired state is empty");
        return Ok((zone_map, pod_map));
    };
    let endpoints_namespace = endpoints.metadata.namespace.as_deref().unwrap_or_default();
    let endpoints_name = endpoints.metadata.name.as_deref().unwrap_or_default();

    let target_port_number: i32 = target_port.parse().unwrap_or(0);

    for subset in endpoints.subsets.as_deref().unwrap_or_default() {
        // The service spec allows the target port to be a named port;
        // support both the explicit number and the name.
        let mut match_port = String::new();
        for port in subset.ports.as_deref().unwrap_or_default() {
            if target_port_number != 0 {
                if port.port == target_port_number {
                    match_port = target_port.to_string();
                }
            } else if port.name.as_deref() == Some(target_port) {
                match_port = port.port.to_string();
            }
            if !match_port.is_empty() {
                break;
            }
        }

        // Subset does not expose the target port.
        if match_port.is_empty() {
            continue;
        }

        let address_lists = [
            (subset.addresses.as_deref().unwrap_or_default(), true),
            (subset.not_ready_addresses.as_deref().unwrap_or_default(), false),
        ];
        for (addresses, include_all) in address_lists {
            process_addresses(
                addresses,
                include_all,
                &match_port,
                endpoints_namespace,
                endpoints_name,
                zone_getter,
                pod_lister,
                subset_labels,
                &mut zone_map,
                &mut pod_map,
            )?;
        }
    }

    Ok((zone_map, pod_map))
}

/// Adds the qualified endpoints from one address list to the zone map.
#[allow(clippy::too_many_arguments)]
fn process_addresses(
    addresses: &[EndpointAddress],
    include_all: bool,
    match_port: &str,
    endpoints_namespace: &str,
    endpoints_name: &str,
    zone_getter: &dyn ZoneGetter,
    pod_lister: &dyn PodLister,
    subset_labels: &str,
    zone_map: &mut ZoneEndpointMap<NetworkEndpoint>,
    pod_map: &mut EndpointPodMap,
) -> Result<(), ControllerError> {
    for address in addresses {
        // Apply the selector when a traffic-policy subset is configured.
        if !subset_labels.is_empty() {
            let pod_ref = address.target_ref.as_ref();
            if pod_ref.and_then(|r| r.kind.as_deref()) != Some("Pod") {
                debug!(
                    "endpoint {} in {}/{} does not have a pod as its target, skipping",
                    address.ip, endpoints_namespace, endpoints_name
                );
                continue;
            }
            let target = pod_ref.map(|r| {
                (
                    r.namespace.clone().unwrap_or_default(),
                    r.name.clone().unwrap_or_default(),
                )
            });
            let Some((pod_namespace, pod_name)) = target else {
                continue;
            };
            if !pod_matches_subset(pod_lister, &pod_namespace, &pod_name, subset_labels) {
                continue;
            }
        }

        let Some(node_name) = address.node_name.as_deref() else {
            debug!(
                "endpoint {} in {}/{} does not have an associated node, skipping",
                address.ip, endpoints_namespace, endpoints_name
            );
            continue;
        };
        let Some(target_ref) = address.target_ref.as_ref() else {
            debug!(
                "endpoint {} in {}/{} does not have an associated pod, skipping",
                address.ip, endpoints_namespace, endpoints_name
            );
            continue;
        };
        let pod_namespace = target_ref.namespace.clone().unwrap_or_default();
        let pod_name = target_ref.name.clone().unwrap_or_default();

        // An unknown node means the zone cache and the endpoints object
        // disagree; the whole pass is retried rather than silently
        // dropping the endpoint.
        let zone = zone_getter.get_zone_for_node(node_name)?;
        let zone_set = zone_map.entry(zone).or_insert_with(NetworkEndpointSet::new);

        if include_all || should_pod_be_in_neg(pod_lister, &pod_namespace, &pod_name) {
            let endpoint = NetworkEndpoint {
                ip: address.ip.clone(),
                port: match_port.to_string(),
                node: node_name.to_string(),
            };
            zone_set.insert(endpoint.clone());
            pod_map.insert(endpoint, PodRef::new(pod_namespace, pod_name));
        }
    }
    Ok(())
}
