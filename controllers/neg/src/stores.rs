//! Production collaborator implementations backed by reflector caches.
//!
//! The sync core is written against the traits in `neg_types`; this module
//! binds them to `kube_runtime` reflector stores and the event recorder so
//! reconciliation reads cluster state from local caches instead of hitting
//! the API server on every pass.

use std::sync::Arc;

use k8s_openapi::api::core::v1::{Node, Pod, Service};
use k8s_openapi::api::core::v1::ObjectReference;
use kube::runtime::events::{Event, EventType, Recorder};
use kube::runtime::reflector::{ObjectRef, Store};
use neg_types::{EventSeverity, EventSink, PodLister, ServiceLister, StoreError, ZoneGetter};
use tracing::warn;

/// Well-known node label carrying the zone.
const ZONE_LABEL: &str = "topology.kubernetes.io/zone";

/// Zone lookups against the node reflector cache.
pub struct NodeZoneGetter {
    nodes: Store<Node>,
}

impl NodeZoneGetter {
    pub fn new(nodes: Store<Node>) -> Self {
        Self { nodes }
    }
}

impl ZoneGetter for NodeZoneGetter {
    fn get_zone_for_node(&self, node_name: &str) -> Result<String, StoreError> {
        let node = self
            .nodes
            .get(&ObjectRef::new(node_name))
            .ok_or_else(|| StoreError::NodeNotFound(node_name.to_string()))?;
        node.metadata
            .labels
            .as_ref()
            .and_then(|labels| labels.get(ZONE_LABEL))
            .cloned()
            .ok_or_else(|| StoreError::ZoneMissing(node_name.to_string()))
    }

    fn list_zones(&self) -> Result<Vec<String>, StoreError> {
        let mut zones: Vec<String> = self
            .nodes
            .state()
            .iter()
            .filter_map(|node| {
                node.metadata
                    .labels
                    .as_ref()
                    .and_then(|labels| labels.get(ZONE_LABEL))
                    .cloned()
            })
            .collect();
        zones.sort();
        zones.dedup();
        Ok(zones)
    }
}

/// Pod lookups against the pod reflector cache.
pub struct StorePodLister {
    pods: Store<Pod>,
}

impl StorePodLister {
    pub fn new(pods: Store<Pod>) -> Self {
        Self { pods }
    }
}

impl PodLister for StorePodLister {
    fn get_pod(&self, namespace: &str, name: &str) -> Result<Option<Arc<Pod>>, StoreError> {
        Ok(self.pods.get(&ObjectRef::new(name).within(namespace)))
    }
}

/// Service lookups against the service reflector cache.
pub struct StoreServiceLister {
    services: Store<Service>,
}

impl StoreServiceLister {
    pub fn new(services: Store<Service>) -> Self {
        Self { services }
    }
}

impl ServiceLister for StoreServiceLister {
    fn get_service(&self, namespace: &str, name: &str) -> Option<Arc<Service>> {
        self.services.get(&ObjectRef::new(name).within(namespace))
    }
}

/// Publishes NEG lifecycle notifications as Kubernetes events on the
/// owning service.
pub struct RecorderEventSink {
    recorder: Recorder,
}

impl RecorderEventSink {
    pub fn new(recorder: Recorder) -> Self {
        Self { recorder }
    }
}

impl EventSink for RecorderEventSink {
    fn emit(&self, service: &Service, severity: EventSeverity, reason: &str, message: String) {
        let reference = ObjectReference {
            api_version: Some("v1".to_string()),
            kind: Some("Service".to_string()),
            namespace: service.metadata.namespace.clone(),
            name: service.metadata.name.clone(),
            uid: service.metadata.uid.clone(),
            ..ObjectReference::default()
        };
        let event = Event {
            type_: match severity {
                EventSeverity::Normal => EventType::Normal,
                EventSeverity::Warning => EventType::Warning,
            },
            reason: reason.to_string(),
            note: Some(message),
            action: "Sync".to_string(),
            secondary: None,
        };
        // Event publication must never block or fail a sync pass.
        let recorder = self.recorder.clone();
        tokio::spawn(async move {
            if let Err(err) = recorder.publish(&event, &reference).await {
                warn!("failed to publish event {:?}: {}", event.reason, err);
            }
        });
    }
}
