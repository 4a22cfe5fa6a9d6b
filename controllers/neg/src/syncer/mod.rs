//! NEG sync core.
//!
//! One [`Syncer`] owns the reconciliation of a single NEG (one service
//! port): ensure the group resource exists, derive the desired endpoint
//! set from the Endpoints object, read the actual set from the cloud,
//! and converge the two through batched attach/detach calls.
//!
//! The syncer holds no shared mutable state and performs no locking; the
//! scheduling layer guarantees at most one pass in flight per NEG key.

pub mod batch;
pub mod diff;
pub mod endpoints;
#[cfg(test)]
mod endpoints_test;
pub mod neg_group;

use std::sync::Arc;

use gce_neg_client::NetworkEndpointGroupCloud;
use k8s_openapi::api::core::v1::Endpoints;
use neg_types::{EventSink, PodLister, ServiceLister, ZoneGetter};
use tracing::{debug, info};

use crate::error::ControllerError;

/// Identity and behavior knobs for one NEG.
#[derive(Debug, Clone)]
pub struct SyncerConfig {
    /// Namespace of the owning service.
    pub namespace: String,
    /// Name of the owning service.
    pub name: String,
    /// Name of the NEG resource in the cloud.
    pub neg_name: String,
    /// Target port spec: a port number or a named port.
    pub target_port: String,
    /// Human-readable port label used in event messages.
    pub service_port_name: String,
    /// Optional label-selector expression restricting desired endpoints
    /// to a traffic-policy subset. Empty disables subset filtering.
    pub subset_labels: String,
    /// Hybrid addressing: endpoints are IP+port only, no instance, no
    /// subnetwork on the group.
    pub hybrid: bool,
}

/// Reconciles one NEG against the cluster's endpoint state.
pub struct Syncer {
    config: SyncerConfig,
    cloud: Arc<dyn NetworkEndpointGroupCloud>,
    zone_getter: Arc<dyn ZoneGetter>,
    pod_lister: Arc<dyn PodLister>,
    service_lister: Option<Arc<dyn ServiceLister>>,
    recorder: Option<Arc<dyn EventSink>>,
}

impl Syncer {
    pub fn new(
        config: SyncerConfig,
        cloud: Arc<dyn NetworkEndpointGroupCloud>,
        zone_getter: Arc<dyn ZoneGetter>,
        pod_lister: Arc<dyn PodLister>,
        service_lister: Option<Arc<dyn ServiceLister>>,
        recorder: Option<Arc<dyn EventSink>>,
    ) -> Self {
        Self {
            config,
            cloud,
            zone_getter,
            pod_lister,
            service_lister,
            recorder,
        }
    }

    /// Runs one reconciliation pass.
    ///
    /// Any error aborts the pass; the scheduler retries it under the
    /// backoff budget in [`crate::backoff`].
    pub async fn sync(&self, endpoints: Option<&Endpoints>) -> Result<(), ControllerError> {
        let config = &self.config;
        debug!(
            "syncing NEG {:?} for service {}/{}",
            config.neg_name, config.namespace, config.name
        );

        // Precondition: a correctly configured group in every known zone.
        for zone in self.zone_getter.list_zones()? {
            neg_group::ensure_network_endpoint_group(
                &config.namespace,
                &config.name,
                &config.neg_name,
                &zone,
                &config.service_port_name,
                &*self.cloud,
                self.service_lister.as_deref(),
                self.recorder.as_deref(),
                config.hybrid,
            )
            .await?;
        }

        let (target, pod_map) = endpoints::to_zone_network_endpoint_map(
            endpoints,
            &*self.zone_getter,
            &config.target_port,
            &*self.pod_lister,
            &config.subset_labels,
        )?;
        debug!(
            "desired state for {:?} spans {} zone(s), {} pod-backed endpoint(s)",
            config.neg_name,
            target.len(),
            pod_map.len()
        );

        let current = neg_group::retrieve_existing_zone_network_endpoint_map(
            &config.neg_name,
            &*self.zone_getter,
            &*self.cloud,
        )
        .await?;

        let (add, remove) = diff::calculate_difference(&target, &current);
        if add.is_empty() && remove.is_empty() {
            debug!("NEG {:?} is in sync", config.neg_name);
            return Ok(());
        }

        for (zone, mut pending) in add {
            while !pending.is_empty() {
                let endpoint_batch = batch::make_endpoint_batch(&mut pending, config.hybrid)?;
                info!(
                    "attaching {} endpoint(s) to NEG {:?} in {:?}",
                    endpoint_batch.len(),
                    config.neg_name,
                    zone
                );
                for endpoint in endpoint_batch.keys() {
                    debug!("attach {}", endpoint);
                }
                self.cloud
                    .attach_network_endpoints(
                        &config.neg_name,
                        &zone,
                        endpoint_batch.into_values().collect(),
                    )
                    .await?;
            }
        }

        for (zone, mut pending) in remove {
            while !pending.is_empty() {
                let endpoint_batch = batch::make_endpoint_batch(&mut pending, config.hybrid)?;
                info!(
                    "detaching {} endpoint(s) from NEG {:?} in {:?}",
                    endpoint_batch.len(),
                    config.neg_name,
                    zone
                );
                for endpoint in endpoint_batch.keys() {
                    debug!("detach {}", endpoint);
                }
                self.cloud
                    .detach_network_endpoints(
                        &config.neg_name,
                        &zone,
                        endpoint_batch.into_values().collect(),
                    )
                    .await?;
            }
        }

        Ok(())
    }
}
