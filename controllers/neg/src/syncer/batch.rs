//! Mutation batching.
//!
//! The attach/detach API rejects oversized payloads, so mutations are
//! drained out of the pending set in bounded batches. The input set is
//! destructively consumed; whatever a call does not take stays behind for
//! the next one.

use std::collections::HashMap;

use gce_neg_client::GceNetworkEndpoint;
use neg_types::{NetworkEndpoint, NetworkEndpointSet};

use crate::error::ControllerError;

/// Maximum endpoints accepted by one attach/detach call.
pub const MAX_NETWORK_ENDPOINTS_PER_BATCH: usize = 500;

/// Drains up to [`MAX_NETWORK_ENDPOINTS_PER_BATCH`] endpoints from the set
/// into their cloud representation, keyed by the internal identity.
///
/// A port that does not decode to a number is a fatal encoding error for
/// the call. Under hybrid mode the instance field is omitted; hybrid
/// endpoints are addressed by IP and port only.
pub fn make_endpoint_batch(
    endpoints: &mut NetworkEndpointSet,
    hybrid: bool,
) -> Result<HashMap<NetworkEndpoint, GceNetworkEndpoint>, ControllerError> {
    let mut batch = HashMap::new();

    for _ in 0..MAX_NETWORK_ENDPOINTS_PER_BATCH {
        let Some(endpoint) = endpoints.pop_any() else {
            break;
        };

        let port: i64 =
            endpoint
                .port
                .parse()
                .map_err(|_| ControllerError::InvalidEndpointPort {
                    endpoint: endpoint.to_string(),
                    port: endpoint.port.clone(),
                })?;

        let cloud_endpoint = GceNetworkEndpoint {
            ip_address: endpoint.ip.clone(),
            port,
            instance: (!hybrid).then(|| endpoint.node.clone()),
        };
        batch.insert(endpoint, cloud_endpoint);
    }

    Ok(batch)
}
