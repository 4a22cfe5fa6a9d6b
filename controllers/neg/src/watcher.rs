//! Endpoints watcher.
//!
//! Watches Endpoints objects and triggers a sync pass for every change on
//! a NEG-managed service, using kube_runtime::Controller for automatic
//! reconnection. Retry scheduling follows the budget in [`crate::backoff`]:
//! the error policy keeps per-key retry state (attempt count plus backoff
//! position) that a successful pass resets.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures::StreamExt;
use gce_neg_client::NetworkEndpointGroupCloud;
use k8s_openapi::api::core::v1::Endpoints;
use kube::Api;
use kube_runtime::controller::{Action, Config as ControllerConfig};
use kube_runtime::{Controller, watcher};
use neg_types::{EventSink, PodLister, ServiceLister, ZoneGetter};
use tracing::{debug, error, info};

use crate::backoff::{ExponentialBackoff, MAX_RETRIES, MAX_RETRY_DELAY, MIN_RETRY_DELAY};
use crate::error::ControllerError;
use crate::syncer::{Syncer, SyncerConfig};

/// Annotation naming the NEG a service's endpoints feed.
pub const NEG_NAME_ANNOTATION: &str = "negsync.io/neg-name";
/// Annotation carrying the target port (number or named port).
pub const TARGET_PORT_ANNOTATION: &str = "negsync.io/target-port";
/// Annotation carrying the service port label used in event messages.
pub const PORT_NAME_ANNOTATION: &str = "negsync.io/port-name";
/// Annotation carrying an optional subset label selector.
pub const SUBSET_LABELS_ANNOTATION: &str = "negsync.io/subset-labels";

/// Interval between periodic resyncs of an in-sync NEG.
const RESYNC_PERIOD: Duration = Duration::from_secs(300);

/// Retry state for one NEG key: attempts used so far and the backoff
/// sequence position.
#[derive(Debug, Default)]
struct RetryState {
    attempt: u32,
    backoff: ExponentialBackoff,
}

/// Shared state handed to every reconcile invocation.
pub struct Ctx {
    pub cloud: Arc<dyn NetworkEndpointGroupCloud>,
    pub zone_getter: Arc<dyn ZoneGetter>,
    pub pod_lister: Arc<dyn PodLister>,
    pub service_lister: Arc<dyn ServiceLister>,
    pub recorder: Arc<dyn EventSink>,
    pub hybrid: bool,
    retries: Mutex<HashMap<String, RetryState>>,
}

impl Ctx {
    pub fn new(
        cloud: Arc<dyn NetworkEndpointGroupCloud>,
        zone_getter: Arc<dyn ZoneGetter>,
        pod_lister: Arc<dyn PodLister>,
        service_lister: Arc<dyn ServiceLister>,
        recorder: Arc<dyn EventSink>,
        hybrid: bool,
    ) -> Self {
        Self {
            cloud,
            zone_getter,
            pod_lister,
            service_lister,
            recorder,
            hybrid,
            retries: Mutex::new(HashMap::new()),
        }
    }

    fn key(endpoints: &Endpoints) -> String {
        format!(
            "{}/{}",
            endpoints.metadata.namespace.as_deref().unwrap_or_default(),
            endpoints.metadata.name.as_deref().unwrap_or_default()
        )
    }

    fn record_success(&self, key: &str) {
        if let Ok(mut retries) = self.retries.lock() {
            retries.remove(key);
        }
    }

    /// Advances the key's retry state, returning the attempt number and
    /// the delay before the next one.
    fn record_failure(&self, key: &str) -> (u32, Duration) {
        match self.retries.lock() {
            Ok(mut retries) => {
                let state = retries.entry(key.to_string()).or_default();
                state.attempt += 1;
                (state.attempt, state.backoff.next_backoff())
            }
            Err(_) => (1, MIN_RETRY_DELAY),
        }
    }
}

/// Reads the syncer configuration off the Endpoints annotations. Returns
/// `None` for services not managed by this controller.
fn syncer_config(endpoints: &Endpoints, hybrid: bool) -> Option<SyncerConfig> {
    let annotations = endpoints.metadata.annotations.as_ref()?;
    let neg_name = annotations.get(NEG_NAME_ANNOTATION)?.clone();
    let target_port = annotations.get(TARGET_PORT_ANNOTATION)?.clone();
    let service_port_name = annotations
        .get(PORT_NAME_ANNOTATION)
        .cloned()
        .unwrap_or_else(|| target_port.clone());
    let subset_labels = annotations
        .get(SUBSET_LABELS_ANNOTATION)
        .cloned()
        .unwrap_or_default();
    Some(SyncerConfig {
        namespace: endpoints.metadata.namespace.clone().unwrap_or_default(),
        name: endpoints.metadata.name.clone().unwrap_or_default(),
        neg_name,
        target_port,
        service_port_name,
        subset_labels,
        hybrid,
    })
}

async fn reconcile(endpoints: Arc<Endpoints>, ctx: Arc<Ctx>) -> Result<Action, ControllerError> {
    let key = Ctx::key(&endpoints);
    let Some(config) = syncer_config(&endpoints, ctx.hybrid) else {
        debug!("Endpoints {} has no NEG annotations, ignoring", key);
        return Ok(Action::await_change());
    };

    let syncer = Syncer::new(
        config,
        ctx.cloud.clone(),
        ctx.zone_getter.clone(),
        ctx.pod_lister.clone(),
        Some(ctx.service_lister.clone()),
        Some(ctx.recorder.clone()),
    );
    syncer.sync(Some(&endpoints)).await?;

    ctx.record_success(&key);
    Ok(Action::requeue(RESYNC_PERIOD))
}

fn error_policy(endpoints: Arc<Endpoints>, err: &ControllerError, ctx: Arc<Ctx>) -> Action {
    let key = Ctx::key(&endpoints);
    let (attempt, delay) = ctx.record_failure(&key);
    if attempt >= MAX_RETRIES {
        error!(
            "sync of {} failed after {} attempts, giving up until the next change: {}",
            key, attempt, err
        );
        return Action::requeue(MAX_RETRY_DELAY);
    }
    error!(
        "sync of {} failed (attempt {}/{}), retrying in {:?}: {}",
        key, attempt, MAX_RETRIES, delay, err
    );
    Action::requeue(delay)
}

/// Watches Endpoints objects until shutdown.
pub async fn watch_endpoints(api: Api<Endpoints>, ctx: Arc<Ctx>) -> Result<(), ControllerError> {
    info!("Starting Endpoints watcher");

    // Debounce batches the endpoint churn of a rolling update into one
    // pass; single-flight per key is guaranteed by the controller runtime.
    let controller_config = ControllerConfig::default()
        .debounce(Duration::from_secs(1))
        .concurrency(3);

    Controller::new(api, watcher::Config::default())
        .with_config(controller_config)
        .run(reconcile, error_policy, ctx)
        .for_each(|res| async move {
            if let Err(e) = res {
                error!("Controller error for Endpoints: {}", e);
            }
        })
        .await;

    Ok(())
}
