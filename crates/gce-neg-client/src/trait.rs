//! Cloud collaborator trait for NEG operations
//!
//! Abstracts the concrete GCE client so the sync core can be unit tested
//! against an in-memory mock. All async methods must be `Send` to work
//! with Tokio's work-stealing runtime.

use crate::error::CloudError;
use crate::models::{GceNetworkEndpoint, NetworkEndpointGroup, NetworkEndpointWithHealth};

/// Operations the sync core needs from the cloud backend.
#[async_trait::async_trait]
pub trait NetworkEndpointGroupCloud: Send + Sync {
    /// Resource URL of the cluster's network.
    fn network_url(&self) -> &str;

    /// Resource URL of the cluster's subnetwork.
    fn subnetwork_url(&self) -> &str;

    /// Fetches a group by name and zone. Returns `CloudError::NotFound`
    /// when the group does not exist.
    async fn get_network_endpoint_group(
        &self,
        name: &str,
        zone: &str,
    ) -> Result<NetworkEndpointGroup, CloudError>;

    /// Creates a group in the given zone.
    async fn create_network_endpoint_group(
        &self,
        neg: &NetworkEndpointGroup,
        zone: &str,
    ) -> Result<(), CloudError>;

    /// Deletes a group from the given zone.
    async fn delete_network_endpoint_group(&self, name: &str, zone: &str)
    -> Result<(), CloudError>;

    /// Lists every endpoint registered in the group, optionally with
    /// health status.
    async fn list_network_endpoints(
        &self,
        name: &str,
        zone: &str,
        show_health: bool,
    ) -> Result<Vec<NetworkEndpointWithHealth>, CloudError>;

    /// Registers a batch of endpoints in the group.
    async fn attach_network_endpoints(
        &self,
        name: &str,
        zone: &str,
        endpoints: Vec<GceNetworkEndpoint>,
    ) -> Result<(), CloudError>;

    /// Deregisters a batch of endpoints from the group.
    async fn detach_network_endpoints(
        &self,
        name: &str,
        zone: &str,
        endpoints: Vec<GceNetworkEndpoint>,
    ) -> Result<(), CloudError>;
}
