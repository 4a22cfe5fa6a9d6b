//! NEG Controller
//!
//! Keeps GCE network endpoint groups (NEGs) in sync with the endpoints of
//! annotated Kubernetes services:
//! - ensures a correctly configured NEG exists in every zone
//! - derives the desired endpoint set from the service's Endpoints object
//! - converges the cloud state through batched attach/detach calls

mod backoff;
mod error;
mod stores;
mod syncer;
#[cfg(test)]
mod test_utils;
mod watcher;

use std::env;
use std::sync::Arc;

use futures::StreamExt;
use gce_neg_client::GceNegClient;
use k8s_openapi::api::core::v1::{Endpoints, Node, Pod, Service};
use kube::runtime::events::{Recorder, Reporter};
use kube::runtime::reflector::Store;
use kube::runtime::{WatchStreamExt, reflector, watcher as kube_watcher};
use kube::{Api, Client, Resource};
use tracing::info;

use crate::error::ControllerError;
use crate::stores::{NodeZoneGetter, RecorderEventSink, StorePodLister, StoreServiceLister};
use crate::watcher::Ctx;

/// Starts a reflector for one resource type and waits for its first full
/// list before returning the read handle.
async fn start_reflector<K>(api: Api<K>) -> Result<Store<K>, ControllerError>
where
    K: Resource + Clone + Send + Sync + 'static + std::fmt::Debug + serde::de::DeserializeOwned,
    K::DynamicType: Default + Clone + std::cmp::Eq + std::hash::Hash,
{
    let (reader, writer) = reflector::store::<K>();
    let stream = kube_watcher(api, kube_watcher::Config::default())
        .default_backoff()
        .reflect(writer)
        .applied_objects();
    tokio::spawn(async move {
        futures::pin_mut!(stream);
        while stream.next().await.is_some() {}
    });
    reader
        .wait_until_ready()
        .await
        .map_err(|e| ControllerError::Watch(format!("reflector failed to become ready: {e}")))?;
    Ok(reader)
}

#[tokio::main]
async fn main() -> Result<(), ControllerError> {
    tracing_subscriber::fmt::init();

    // Both kube and reqwest speak rustls; pin the process-wide crypto
    // provider to ring before either opens a connection.
    rustls::crypto::ring::default_provider()
        .install_default()
        .map_err(|_| {
            ControllerError::InvalidConfig("failed to install rustls crypto provider".to_string())
        })?;

    info!("Starting NEG Controller");

    // Load configuration from environment variables
    let project = env::var("GCE_PROJECT").map_err(|_| {
        ControllerError::InvalidConfig("GCE_PROJECT environment variable is required".to_string())
    })?;
    let token = env::var("GCE_TOKEN").map_err(|_| {
        ControllerError::InvalidConfig("GCE_TOKEN environment variable is required".to_string())
    })?;
    let network_url = env::var("GCE_NETWORK_URL")
        .unwrap_or_else(|_| format!("projects/{project}/global/networks/default"));
    let subnetwork_url = env::var("GCE_SUBNETWORK_URL").unwrap_or_default();
    let hybrid = env::var("NEG_HYBRID").is_ok_and(|value| value == "true");
    let namespace = env::var("WATCH_NAMESPACE").ok();

    info!("Configuration:");
    info!("  GCE project: {}", project);
    info!("  Network: {}", network_url);
    info!("  Hybrid NEGs: {}", hybrid);
    info!("  Namespace: {}", namespace.as_deref().unwrap_or("all namespaces"));

    let cloud = GceNegClient::new(project, token, network_url, subnetwork_url)?;

    let kube_client = Client::try_default().await?;

    // Local caches for the cluster state the sync core reads on every pass.
    let node_api: Api<Node> = Api::all(kube_client.clone());
    let (pod_api, service_api, endpoints_api) = match namespace.as_deref() {
        Some(ns) => (
            Api::<Pod>::namespaced(kube_client.clone(), ns),
            Api::<Service>::namespaced(kube_client.clone(), ns),
            Api::<Endpoints>::namespaced(kube_client.clone(), ns),
        ),
        None => (
            Api::<Pod>::all(kube_client.clone()),
            Api::<Service>::all(kube_client.clone()),
            Api::<Endpoints>::all(kube_client.clone()),
        ),
    };

    let nodes = start_reflector(node_api).await?;
    let pods = start_reflector(pod_api).await?;
    let services = start_reflector(service_api).await?;
    info!("Reflector caches primed");

    let recorder = Recorder::new(
        kube_client,
        Reporter {
            controller: "neg-controller".to_string(),
            instance: None,
        },
    );

    let ctx = Arc::new(Ctx::new(
        Arc::new(cloud),
        Arc::new(NodeZoneGetter::new(nodes)),
        Arc::new(StorePodLister::new(pods)),
        Arc::new(StoreServiceLister::new(services)),
        Arc::new(RecorderEventSink::new(recorder)),
        hybrid,
    ));

    watcher::watch_endpoints(endpoints_api, ctx).await
}
