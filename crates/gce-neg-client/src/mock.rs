//! Mock cloud backend for unit testing
//!
//! In-memory implementation of `NetworkEndpointGroupCloud` so reconciler
//! tests run without a GCE project. Stores groups and their endpoints per
//! (zone, name) key and can be inspected after the code under test ran.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::cloud_trait::NetworkEndpointGroupCloud;
use crate::error::CloudError;
use crate::models::{
    GceNetworkEndpoint, NetworkEndpointGroup, NetworkEndpointWithHealth,
};

type GroupKey = (String, String);

/// Mock cloud backend for testing.
#[derive(Clone)]
pub struct MockNegCloud {
    network_url: String,
    subnetwork_url: String,
    groups: Arc<Mutex<HashMap<GroupKey, NetworkEndpointGroup>>>,
    endpoints: Arc<Mutex<HashMap<GroupKey, Vec<GceNetworkEndpoint>>>>,
}

impl MockNegCloud {
    /// Create a mock with the given cluster network/subnetwork URLs.
    pub fn new(network_url: impl Into<String>, subnetwork_url: impl Into<String>) -> Self {
        Self {
            network_url: network_url.into(),
            subnetwork_url: subnetwork_url.into(),
            groups: Arc::new(Mutex::new(HashMap::new())),
            endpoints: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    fn key(name: &str, zone: &str) -> GroupKey {
        (zone.to_string(), name.to_string())
    }

    /// Seed a group (for test setup).
    pub fn add_network_endpoint_group(&self, neg: NetworkEndpointGroup, zone: &str) {
        self.groups
            .lock()
            .unwrap()
            .insert(Self::key(&neg.name, zone), neg);
    }

    /// Seed registered endpoints for a group (for test setup).
    pub fn set_endpoints(&self, name: &str, zone: &str, endpoints: Vec<GceNetworkEndpoint>) {
        self.endpoints
            .lock()
            .unwrap()
            .insert(Self::key(name, zone), endpoints);
    }

    /// Current state of a group, if it exists (for assertions).
    pub fn network_endpoint_group(&self, name: &str, zone: &str) -> Option<NetworkEndpointGroup> {
        self.groups.lock().unwrap().get(&Self::key(name, zone)).cloned()
    }

    /// Currently registered endpoints of a group (for assertions).
    pub fn registered_endpoints(&self, name: &str, zone: &str) -> Vec<GceNetworkEndpoint> {
        self.endpoints
            .lock()
            .unwrap()
            .get(&Self::key(name, zone))
            .cloned()
            .unwrap_or_default()
    }
}

#[async_trait::async_trait]
impl NetworkEndpointGroupCloud for MockNegCloud {
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
        self.groups
            .lock()
            .unwrap()
            .get(&Self::key(name, zone))
            .cloned()
            .ok_or_else(|| CloudError::NotFound(format!("networkEndpointGroups/{name}")))
    }

    async fn create_network_endpoint_group(
        &self,
        neg: &NetworkEndpointGroup,
        zone: &str,
    ) -> Result<(), CloudError> {
        let key = Self::key(&neg.name, zone);
        self.groups.lock().unwrap().insert(key.clone(), neg.clone());
        self.endpoints.lock().unwrap().entry(key).or_default();
        Ok(())
    }

    async fn delete_network_endpoint_group(
        &self,
        name: &str,
        zone: &str,
    ) -> Result<(), CloudError> {
        let key = Self::key(name, zone);
        if self.groups.lock().unwrap().remove(&key).is_none() {
            return Err(CloudError::NotFound(format!("networkEndpointGroups/{name}")));
        }
        self.endpoints.lock().unwrap().remove(&key);
        Ok(())
    }

    async fn list_network_endpoints(
        &self,
        name: &str,
        zone: &str,
        _show_health: bool,
    ) -> Result<Vec<NetworkEndpointWithHealth>, CloudError> {
        let key = Self::key(name, zone);
        if !self.groups.lock().unwrap().contains_key(&key) {
            return Err(CloudError::NotFound(format!("networkEndpointGroups/{name}")));
        }
        Ok(self
            .endpoints
            .lock()
            .unwrap()
            .get(&key)
            .cloned()
            .unwrap_or_default()
            .into_iter()
            .map(|network_endpoint| NetworkEndpointWithHealth {
                network_endpoint,
                healths: None,
            })
            .collect())
    }

    async fn attach_network_endpoints(
        &self,
        name: &str,
        zone: &str,
        endpoints: Vec<GceNetworkEndpoint>,
    ) -> Result<(), CloudError> {
        let key = Self::key(name, zone);
        if !self.groups.lock().unwrap().contains_key(&key) {
            return Err(CloudError::NotFound(format!("networkEndpointGroups/{name}")));
        }
        let mut store = self.endpoints.lock().unwrap();
        let registered = store.entry(key).or_default();
        for endpoint in endpoints {
            if !registered.contains(&endpoint) {
                registered.push(endpoint);
            }
        }
        Ok(())
    }

    async fn detach_network_endpoints(
        &self,
        name: &str,
        zone: &str,
        endpoints: Vec<GceNetworkEndpoint>,
    ) -> Result<(), CloudError> {
        let key = Self::key(name, zone);
        if !self.groups.lock().unwrap().contains_key(&key) {
            return Err(CloudError::NotFound(format!("networkEndpointGroups/{name}")));
        }
        let mut store = self.endpoints.lock().unwrap();
        if let Some(registered) = store.get_mut(&key) {
            registered.retain(|existing| !endpoints.contains(existing));
        }
        Ok(())
    }
}
