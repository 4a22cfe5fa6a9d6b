//! Serde models for the GCE zonal NEG API surface.

use serde::{Deserialize, Serialize};

/// Endpoint type for VM-hosted workloads addressed by IP, port and
/// instance.
pub const NEG_IP_PORT_ENDPOINT_TYPE: &str = "GCE_VM_IP_PORT";

/// Endpoint type for hybrid (non-GCP) workloads addressed by IP and port
/// only, with no instance reference and no subnetwork.
pub const NEG_PRIVATE_IP_PORT_ENDPOINT_TYPE: &str = "NON_GCP_PRIVATE_IP_PORT";

/// A zonal network endpoint group resource.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NetworkEndpointGroup {
    pub name: String,
    pub network_endpoint_type: String,
    pub network: String,
    /// Empty under hybrid mode; omitted from the wire when empty.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub subnetwork: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub self_link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
}

/// The cloud-side representation of a single endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GceNetworkEndpoint {
    pub ip_address: String,
    pub port: i64,
    /// Omitted under hybrid mode.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance: Option<String>,
}

/// Health of one endpoint as reported by an attached backend service.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EndpointHealth {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub health_state: Option<String>,
}

/// A registered endpoint together with its (optional) health statuses.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NetworkEndpointWithHealth {
    pub network_endpoint: GceNetworkEndpoint,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub healths: Option<Vec<EndpointHealth>>,
}

/// Request body for the listNetworkEndpoints call.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListNetworkEndpointsRequest {
    pub health_status: &'static str,
}

/// One page of a listNetworkEndpoints response.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ListNetworkEndpointsPage {
    pub items: Option<Vec<NetworkEndpointWithHealth>>,
    pub next_page_token: Option<String>,
}

/// Request body for attach/detachNetworkEndpoints calls.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkEndpointsMutationRequest {
    pub network_endpoints: Vec<GceNetworkEndpoint>,
}

/// Minimal view of a compute Operation. Mutations return one; waiting on
/// it is the transport layer's concern, not this client's.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Operation {
    pub name: String,
    pub status: Option<String>,
    pub error: Option<serde_json::Value>,
}
