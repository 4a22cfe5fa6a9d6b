//! Test utilities for unit testing the sync core
//!
//! In-memory collaborator implementations and builders for the Kubernetes
//! objects the mapper consumes.

#[cfg(test)]
use std::collections::{BTreeMap, HashMap};
#[cfg(test)]
use std::sync::{Arc, Mutex};

#[cfg(test)]
use k8s_openapi::api::core::v1::{
    EndpointAddress, EndpointPort, EndpointSubset, Endpoints, Pod, Service,
};
#[cfg(test)]
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{ObjectMeta, Time};
#[cfg(test)]
use k8s_openapi::api::core::v1::ObjectReference;
#[cfg(test)]
use neg_types::{EventSeverity, EventSink, PodLister, ServiceLister, StoreError, ZoneGetter};

/// Node-to-zone map standing in for the node informer cache.
#[cfg(test)]
#[derive(Default)]
pub struct FakeZoneGetter {
    zones: HashMap<String, String>,
}

#[cfg(test)]
impl FakeZoneGetter {
    pub fn new(entries: &[(&str, &str)]) -> Self {
        Self {
            zones: entries
                .iter()
                .map(|(node, zone)| ((*node).to_string(), (*zone).to_string()))
                .collect(),
        }
    }
}

#[cfg(test)]
impl ZoneGetter for FakeZoneGetter {
    fn get_zone_for_node(&self, node_name: &str) -> Result<String, StoreError> {
        self.zones
            .get(node_name)
            .cloned()
            .ok_or_else(|| StoreError::NodeNotFound(node_name.to_string()))
    }

    fn list_zones(&self) -> Result<Vec<String>, StoreError> {
        let mut zones: Vec<String> = self.zones.values().cloned().collect();
        zones.sort();
        zones.dedup();
        Ok(zones)
    }
}

/// Keyed pod store.
#[cfg(test)]
#[derive(Default)]
pub struct FakePodLister {
    pods: HashMap<(String, String), Arc<Pod>>,
}

#[cfg(test)]
impl FakePodLister {
    pub fn add(&mut self, pod: Pod) {
        let namespace = pod.metadata.namespace.clone().unwrap_or_default();
        let name = pod.metadata.name.clone().unwrap_or_default();
        self.pods.insert((namespace, name), Arc::new(pod));
    }
}

#[cfg(test)]
impl PodLister for FakePodLister {
    fn get_pod(&self, namespace: &str, name: &str) -> Result<Option<Arc<Pod>>, StoreError> {
        Ok(self
            .pods
            .get(&(namespace.to_string(), name.to_string()))
            .cloned())
    }
}

/// Keyed service store.
#[cfg(test)]
#[derive(Default)]
pub struct FakeServiceLister {
    services: HashMap<(String, String), Arc<Service>>,
}

#[cfg(test)]
impl FakeServiceLister {
    pub fn add(&mut self, namespace: &str, name: &str) {
        let service = Service {
            metadata: ObjectMeta {
                namespace: Some(namespace.to_string()),
                name: Some(name.to_string()),
                ..ObjectMeta::default()
            },
            ..Service::default()
        };
        self.services
            .insert((namespace.to_string(), name.to_string()), Arc::new(service));
    }
}

#[cfg(test)]
impl ServiceLister for FakeServiceLister {
    fn get_service(&self, namespace: &str, name: &str) -> Option<Arc<Service>> {
        self.services
            .get(&(namespace.to_string(), name.to_string()))
            .cloned()
    }
}

/// Event sink that records (reason, message) pairs for assertions.
#[cfg(test)]
#[derive(Default, Clone)]
pub struct RecordingEventSink {
    events: Arc<Mutex<Vec<(String, String)>>>,
}

#[cfg(test)]
impl RecordingEventSink {
    pub fn reasons(&self) -> Vec<String> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .map(|(reason, _)| reason.clone())
            .collect()
    }
}

#[cfg(test)]
impl EventSink for RecordingEventSink {
    fn emit(&self, _service: &Service, _severity: EventSeverity, reason: &str, message: String) {
        self.events
            .lock()
            .unwrap()
            .push((reason.to_string(), message));
    }
}

/// Helper to create a test pod, optionally terminating, with labels.
#[cfg(test)]
pub fn create_test_pod(
    namespace: &str,
    name: &str,
    terminating: bool,
    labels: &[(&str, &str)],
) -> Pod {
    let label_map: BTreeMap<String, String> = labels
        .iter()
        .map(|(key, value)| ((*key).to_string(), (*value).to_string()))
        .collect();
    Pod {
        metadata: ObjectMeta {
            namespace: Some(namespace.to_string()),
            name: Some(name.to_string()),
            labels: (!label_map.is_empty()).then_some(label_map),
            deletion_timestamp: terminating.then(|| Time(chrono::Utc::now())),
            ..ObjectMeta::default()
        },
        ..Pod::default()
    }
}

/// Address spec for [`create_test_endpoints`]: (ip, node, pod name).
#[cfg(test)]
pub type AddressSpec<'a> = (&'a str, Option<&'a str>, Option<&'a str>);

/// Helper to create an Endpoints object with one subset.
#[cfg(test)]
pub fn create_test_endpoints(
    namespace: &str,
    name: &str,
    ports: &[(&str, i32)],
    ready: &[AddressSpec<'_>],
    not_ready: &[AddressSpec<'_>],
) -> Endpoints {
    let build_addresses = |specs: &[AddressSpec<'_>]| -> Option<Vec<EndpointAddress>> {
        if specs.is_empty() {
            return None;
        }
        Some(
            specs
                .iter()
                .map(|(ip, node, pod)| EndpointAddress {
                    ip: (*ip).to_string(),
                    node_name: node.map(str::to_string),
                    target_ref: pod.map(|pod_name| ObjectReference {
                        kind: Some("Pod".to_string()),
                        namespace: Some(namespace.to_string()),
                        name: Some(pod_name.to_string()),
                        ..ObjectReference::default()
                    }),
                    ..EndpointAddress::default()
                })
                .collect(),
        )
    };

    Endpoints {
        metadata: ObjectMeta {
            namespace: Some(namespace.to_string()),
            name: Some(name.to_string()),
            ..ObjectMeta::default()
        },
        subsets: Some(vec![EndpointSubset {
            ports: Some(
                ports
                    .iter()
                    .map(|(port_name, port)| EndpointPort {
                        name: (!port_name.is_empty()).then(|| (*port_name).to_string()),
                        port: *port,
                        ..EndpointPort::default()
                    })
                    .collect(),
            ),
            addresses: build_addresses(ready),
            not_ready_addresses: build_addresses(not_ready),
        }]),
    }
}
