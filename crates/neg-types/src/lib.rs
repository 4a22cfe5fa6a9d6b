//! Shared types for the NEG controller
//!
//! Value types describing network endpoints and the collaborator traits
//! the sync core is written against. The controller binary injects
//! production implementations (informer-cache stores, the GCE client,
//! an event recorder); tests inject in-memory ones.

pub mod endpoint;
pub mod set;
pub mod stores;

pub use endpoint::{NetworkEndpoint, PodRef, decode_endpoint, encode_endpoint};
pub use set::{EndpointPodMap, EndpointSet, NetworkEndpointSet, ZoneEndpointMap};
pub use stores::{EventSeverity, EventSink, PodLister, ServiceLister, StoreError, ZoneGetter};
