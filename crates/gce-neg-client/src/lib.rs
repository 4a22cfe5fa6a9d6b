//! GCE network endpoint group API client
//!
//! A client for the zonal network endpoint group (NEG) surface of the GCE
//! Compute API: group lifecycle (get/create/delete), endpoint listing with
//! pagination, and attach/detach mutations.
//!
//! # Example
//!
//! ```no_run
//! use gce_neg_client::{GceNegClient, NetworkEndpointGroupCloud};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = GceNegClient::new(
//!     "my-project".to_string(),
//!     "oauth-token".to_string(),
//!     "projects/my-project/global/networks/default".to_string(),
//!     "projects/my-project/regions/us-central1/subnetworks/default".to_string(),
//! )?;
//!
//! let neg = client.get_network_endpoint_group("k8s-neg", "us-central1-a").await?;
//! let endpoints = client.list_network_endpoints("k8s-neg", "us-central1-a", false).await?;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod error;
pub mod models;
pub mod resource_id;
#[path = "trait.rs"]
pub mod cloud_trait;
#[cfg(feature = "test-util")]
pub mod mock;

pub use client::GceNegClient;
pub use cloud_trait::NetworkEndpointGroupCloud;
pub use error::CloudError;
#[cfg(feature = "test-util")]
pub use mock::MockNegCloud;
pub use models::*;
pub use resource_id::equal_resource_ids;
