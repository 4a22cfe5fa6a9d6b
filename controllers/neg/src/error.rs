//! Controller-specific error types.
//!
//! The taxonomy follows the reconciliation design: variants here are the
//! fatal-to-pass failures that abort an attempt and go back through the
//! retry budget. Fail-closed conditions (pod lookup misses, selector parse
//! failures) are absorbed locally and never reach this enum.

use gce_neg_client::CloudError;
use kube::Error as KubeError;
use neg_types::StoreError;
use thiserror::Error;

/// Errors that can occur in the NEG controller.
#[derive(Debug, Error)]
pub enum ControllerError {
    /// Kubernetes API error
    #[error("Kubernetes error: {0}")]
    Kube(#[from] KubeError),

    /// GCE API error
    #[error("cloud error: {0}")]
    Cloud(#[from] CloudError),

    /// Cluster-state store error (zone lookup and friends)
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// An internal endpoint carried a port that does not decode to a number
    #[error("invalid endpoint port on {endpoint}: {port:?}")]
    InvalidEndpointPort { endpoint: String, port: String },

    /// Invalid configuration
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Resource watch failed
    #[error("resource watch failed: {0}")]
    Watch(String),
}
