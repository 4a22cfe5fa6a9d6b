//! Collaborator traits the sync core is written against.
//!
//! The sync core never owns cluster state. Zone membership, pods and
//! services come from keyed-lookup stores (informer caches in production),
//! and operator-visible notifications go through an event sink. All of
//! these are injected at construction so the core stays testable without a
//! live cluster.

use std::sync::Arc;

use k8s_openapi::api::core::v1::{Pod, Service};
use thiserror::Error;

/// Errors surfaced by the cluster-state stores.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The named node is not present in the store (deleted, or the cache
    /// is stale).
    #[error("node not found: {0}")]
    NodeNotFound(String),

    /// The node exists but carries no zone label.
    #[error("node {0} has no zone")]
    ZoneMissing(String),

    /// The store itself failed (cache not yet synced, lookup error).
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Resolves nodes to zones and enumerates the zones the cluster spans.
pub trait ZoneGetter: Send + Sync {
    /// Returns the zone of the named node.
    fn get_zone_for_node(&self, node_name: &str) -> Result<String, StoreError>;

    /// Returns every zone with at least one known node. Needed by the
    /// actual-state retriever so zones with zero registered endpoints are
    /// still represented.
    fn list_zones(&self) -> Result<Vec<String>, StoreError>;
}

/// Keyed pod lookup.
pub trait PodLister: Send + Sync {
    /// Returns the pod, or `None` when it is not in the store.
    fn get_pod(&self, namespace: &str, name: &str) -> Result<Option<Arc<Pod>>, StoreError>;
}

/// Keyed service lookup, used only to enrich event messages.
pub trait ServiceLister: Send + Sync {
    fn get_service(&self, namespace: &str, name: &str) -> Option<Arc<Service>>;
}

/// Severity of an emitted event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventSeverity {
    Normal,
    Warning,
}

/// Fire-and-forget operator notifications, attributed to a service.
///
/// No error path: a dropped event must never fail a reconciliation pass.
pub trait EventSink: Send + Sync {
    fn emit(&self, service: &Service, severity: EventSeverity, reason: &str, message: String);
}
