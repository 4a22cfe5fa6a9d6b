//! GCE Compute API client
//!
//! Implements the zonal NEG operations against
//! `https://compute.googleapis.com/compute/v1`. Mutations return a compute
//! Operation; this client treats HTTP acceptance as success and leaves
//! operation waiting to the surrounding transport layer.

use std::time::Duration;

use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::cloud_trait::NetworkEndpointGroupCloud;
use crate::error::CloudError;
use crate::models::{
    GceNetworkEndpoint, ListNetworkEndpointsPage, ListNetworkEndpointsRequest,
    NetworkEndpointGroup, NetworkEndpointWithHealth, NetworkEndpointsMutationRequest, Operation,
};

const DEFAULT_BASE_URL: &str = "https://compute.googleapis.com/compute/v1";

/// Client for the zonal NEG surface of the GCE Compute API.
pub struct GceNegClient {
    client: Client,
    base_url: String,
    project: String,
    token: String,
    network_url: String,
    subnetwork_url: String,
}

impl GceNegClient {
    /// Create a new client.
    ///
    /// # Arguments
    /// * `project` - GCE project id
    /// * `token` - OAuth bearer token
    /// * `network_url` - resource URL of the cluster's network
    /// * `subnetwork_url` - resource URL of the cluster's subnetwork
    pub fn new(
        project: String,
        token: String,
        network_url: String,
        subnetwork_url: String,
    ) -> Result<Self, CloudError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(CloudError::Http)?;

        Ok(Self {
            client,
            base_url: DEFAULT_BASE_URL.to_string(),
            project,
            token,
            network_url,
            subnetwork_url,
        })
    }

    /// Override the API base URL (test servers, private endpoints).
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    fn group_url(&self, zone: &str) -> String {
        format!(
            "{}/projects/{}/zones/{}/networkEndpointGroups",
            self.base_url, self.project, zone
        )
    }

    fn auth_header(&self) -> String {
        format!("Bearer {}", self.token)
    }

    /// Maps a non-success response to the matching `CloudError`.
    async fn check_status(response: Response, context: &str) -> Result<Response, CloudError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        match status {
            StatusCode::NOT_FOUND => Err(CloudError::NotFound(context.to_string())),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(CloudError::Authentication(
                format!("{}: {} - {}", context, status, body),
            )),
            _ => Err(CloudError::Api(format!(
                "{}: {} - {}",
                context, status, body
            ))),
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str, context: &str) -> Result<T, CloudError> {
        debug!("GET {}", url);
        let response = self
            .client
            .get(url)
            .header("Authorization", self.auth_header())
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(CloudError::Http)?;
        let response = Self::check_status(response, context).await?;
        let text = response.text().await.map_err(CloudError::Http)?;
        serde_json::from_str(&text).map_err(CloudError::Serialization)
    }

    async fn post_json<B: serde::Serialize, T: DeserializeOwned>(
        &self,
        url: &str,
        body: &B,
        context: &str,
    ) -> Result<T, CloudError> {
        debug!("POST {}", url);
        let response = self
            .client
            .post(url)
            .header("Authorization", self.auth_header())
            .header("Accept", "application/json")
            .json(body)
            .send()
            .await
            .map_err(CloudError::Http)?;
        let response = Self::check_status(response, context).await?;
        let text = response.text().await.map_err(CloudError::Http)?;
        serde_json::from_str(&text).map_err(CloudError::Serialization)
    }
}

#[async_trait::async_trait]
impl NetworkEndpointGroupCloud for GceNegClient {
    fn network_url(&self) -> &str {
        &self.network_url
    }

    fn subnetwork_url(&self) -> &str {
        &self.subnetwork_url
    }

    async fn get_network_endpoint_group(
        &self,
        name: &str,
        zone: &str,
    ) -> Result<NetworkEndpointGroup, CloudError> {
        let url = format!("{}/{}", self.group_url(zone), name);
        self.get_json(&url, &format!("networkEndpointGroups/{name}"))
            .await
    }

    async fn create_network_endpoint_group(
        &self,
        neg: &NetworkEndpointGroup,
        zone: &str,
    ) -> Result<(), CloudError> {
        let url = self.group_url(zone);
        let _op: Operation = self
            .post_json(&url, neg, &format!("create networkEndpointGroups/{}", neg.name))
            .await?;
        Ok(())
    }

    async fn delete_network_endpoint_group(
        &self,
        name: &str,
        zone: &str,
    ) -> Result<(), CloudError> {
        let url = format!("{}/{}", self.group_url(zone), name);
        debug!("DELETE {}", url);
        let response = self
            .client
            .delete(&url)
            .header("Authorization", self.auth_header())
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(CloudError::Http)?;
        Self::check_status(response, &format!("delete networkEndpointGroups/{name}")).await?;
        Ok(())
    }

    async fn list_network_endpoints(
        &self,
        name: &str,
        zone: &str,
        show_health: bool,
    ) -> Result<Vec<NetworkEndpointWithHealth>, CloudError> {
        let base = format!("{}/{}/listNetworkEndpoints", self.group_url(zone), name);
        let body = ListNetworkEndpointsRequest {
            health_status: if show_health { "SHOW" } else { "SKIP" },
        };

        let mut endpoints = Vec::new();
        let mut page_token: Option<String> = None;
        loop {
            let url = match &page_token {
                Some(token) => format!("{base}?pageToken={token}"),
                None => base.clone(),
            };
            let page: ListNetworkEndpointsPage = self
                .post_json(&url, &body, &format!("listNetworkEndpoints {name}"))
                .await?;
            endpoints.extend(page.items.unwrap_or_default());
            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }
        Ok(endpoints)
    }

    async fn attach_network_endpoints(
        &self,
        name: &str,
        zone: &str,
        endpoints: Vec<GceNetworkEndpoint>,
    ) -> Result<(), CloudError> {
        let url = format!("{}/{}/attachNetworkEndpoints", self.group_url(zone), name);
        let body = NetworkEndpointsMutationRequest {
            network_endpoints: endpoints,
        };
        let _op: Operation = self
            .post_json(&url, &body, &format!("attachNetworkEndpoints {name}"))
            .await?;
        Ok(())
    }

    async fn detach_network_endpoints(
        &self,
        name: &str,
        zone: &str,
        endpoints: Vec<GceNetworkEndpoint>,
    ) -> Result<(), CloudError> {
        let url = format!("{}/{}/detachNetworkEndpoints", self.group_url(zone), name);
        let body = NetworkEndpointsMutationRequest {
            network_endpoints: endpoints,
        };
        let _op: Operation = self
            .post_json(&url, &body, &format!("detachNetworkEndpoints {name}"))
            .await?;
        Ok(())
    }
}
