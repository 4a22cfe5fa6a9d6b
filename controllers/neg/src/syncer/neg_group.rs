//! Backend group lifecycle and actual-state retrieval.

use gce_neg_client::{
    NEG_IP_PORT_ENDPOINT_TYPE, NEG_PRIVATE_IP_PORT_ENDPOINT_TYPE, NetworkEndpointGroup,
    NetworkEndpointGroupCloud, equal_resource_ids,
};
use neg_types::{
    EventSeverity, EventSink, NetworkEndpoint, NetworkEndpointSet, ServiceLister, ZoneEndpointMap,
    ZoneGetter,
};
use tracing::{debug, info};

use crate::error::ControllerError;

/// Ensures the NEG exists in the zone and matches the cluster's network
/// configuration.
///
/// Three convergent outcomes per call: no-op when the group exists and
/// matches, create when it is absent, delete-then-create when its
/// network or subnetwork drifted. Groups are never mutated in place for
/// configuration changes. Safe to call repeatedly.
#[allow(clippy::too_many_arguments)]
pub async fn ensure_network_endpoint_group(
    svc_namespace: &str,
    svc_name: &str,
    neg_name: &str,
    zone: &str,
    service_port_name: &str,
    cloud: &dyn NetworkEndpointGroupCloud,
    service_lister: Option<&dyn ServiceLister>,
    recorder: Option<&dyn EventSink>,
    hybrid: bool,
) -> Result<(), ControllerError> {
    let existing = match cloud.get_network_endpoint_group(neg_name, zone).await {
        Ok(neg) => Some(neg),
        Err(err) => {
            // Most likely the NEG simply does not exist yet.
            debug!("error while retrieving {:?} in zone {:?}: {}", neg_name, zone, err);
            None
        }
    };

    let mut need_create = existing.is_none();
    if let Some(neg) = existing {
        if !equal_resource_ids(&neg.network, cloud.network_url())
            || !equal_resource_ids(&neg.subnetwork, cloud.subnetwork_url())
        {
            need_create = true;
            info!(
                "NEG {:?} in {:?} does not match network and subnetwork of the cluster, deleting NEG",
                neg_name, zone
            );
            cloud.delete_network_endpoint_group(neg_name, zone).await?;
            emit_service_event(
                service_lister,
                recorder,
                svc_namespace,
                svc_name,
                "Delete",
                format!("Deleted NEG {neg_name:?} for {service_port_name} in {zone:?}."),
            );
        }
    }

    if need_create {
        info!("creating NEG {:?} for {} in {:?}", neg_name, service_port_name, zone);
        let (endpoint_type, subnetwork) = if hybrid {
            (NEG_PRIVATE_IP_PORT_ENDPOINT_TYPE, String::new())
        } else {
            (NEG_IP_PORT_ENDPOINT_TYPE, cloud.subnetwork_url().to_string())
        };
        let neg = NetworkEndpointGroup {
            name: neg_name.to_string(),
            network_endpoint_type: endpoint_type.to_string(),
            network: cloud.network_url().to_string(),
            subnetwork,
            ..NetworkEndpointGroup::default()
        };
        cloud.create_network_endpoint_group(&neg, zone).await?;
        emit_service_event(
            service_lister,
            recorder,
            svc_namespace,
            svc_name,
            "Create",
            format!("Created NEG {neg_name:?} for {service_port_name} in {zone:?}."),
        );
    }

    Ok(())
}

/// Emits a lifecycle notification attributed to the owning service, when
/// both the service store and the recorder were provided and the service
/// still exists.
fn emit_service_event(
    service_lister: Option<&dyn ServiceLister>,
    recorder: Option<&dyn EventSink>,
    namespace: &str,
    name: &str,
    reason: &str,
    message: String,
) {
    let (Some(service_lister), Some(recorder)) = (service_lister, recorder) else {
        return;
    };
    if let Some(service) = service_lister.get_service(namespace, name) {
        recorder.emit(&service, EventSeverity::Normal, reason, message);
    }
}

/// Lists the endpoints currently registered in the NEG, per zone.
///
/// Every known zone is represented, with an empty set when the zone holds
/// no endpoints; the difference computation needs those entries to detect
/// removals. Any listing error aborts the pass.
pub async fn retrieve_existing_zone_network_endpoint_map(
    neg_name: &str,
    zone_getter: &dyn ZoneGetter,
    cloud: &dyn NetworkEndpointGroupCloud,
) -> Result<ZoneEndpointMap<NetworkEndpoint>, ControllerError> {
    let zones = zone_getter.list_zones()?;

    let mut zone_map = ZoneEndpointMap::new();
    for zone in zones {
        let mut endpoint_set = NetworkEndpointSet::new();
        let registered = cloud.list_network_endpoints(neg_name, &zone, false).await?;
        for entry in registered {
            endpoint_set.insert(NetworkEndpoint {
                ip: entry.network_endpoint.ip_address,
                port: entry.network_endpoint.port.to_string(),
                node: entry.network_endpoint.instance.unwrap_or_default(),
            });
        }
        zone_map.insert(zone, endpoint_set);
    }
    Ok(zone_map)
}
