//! # Reconcilers
//!
//! One reconciler per managed resource kind, each scoped to a single namespace.
//!
//! - `secret`: the registry pull secret
//! - `configmap`: the ConfigMap built from the env-style config file
//! - `identity`: service account `imagePullSecrets` references
//!
//! Reconcilers are stateless. Everything they need comes from the cluster
//! accessor, the [`crate::config::ReconcilePolicy`] and the desired state
//! built for the current cycle.

pub mod configmap;
pub mod identity;
pub mod secret;

pub use configmap::{reconcile_config_map, reconcile_config_map_with};
pub use identity::reconcile_identities;
pub use secret::reconcile_secret;

use crate::cluster::ResourceKind;
use crate::error::{ClusterError, ReconcileError};
use crate::observability::metrics;
use std::future::Future;
use tracing::{debug, info, warn};

/// What a reconciler did to its resource
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The resource already matched the desired state
    Unchanged,
    /// The resource was absent and has been created
    Created,
    /// The resource drifted and has been deleted and recreated
    Repaired,
    /// The resource has been deleted without replacement
    Deleted,
    /// Nothing to do because no desired state could be built
    Skipped,
}

/// Destructively replace a drifted object in two phases
///
/// Phase one deletes the existing object, phase two creates the desired one.
/// The phases are not atomic: if phase two fails, or the process stops in
/// between, the namespace has no object until a later cycle sees it absent
/// and creates it. A delete that finds the object already gone is not an
/// error; the create still runs.
pub(crate) async fn replace<D, C>(
    namespace: &str,
    kind: ResourceKind,
    name: &str,
    delete: D,
    create: C,
) -> Result<(), ReconcileError>
where
    D: Future<Output = Result<(), ClusterError>>,
    C: Future<Output = Result<(), ClusterError>>,
{
    match delete.await {
        Ok(()) => {
            warn!("[{}] Deleted {} [{}]", namespace, kind, name);
            metrics::increment_resources_deleted(kind);
        }
        Err(source) if source.is_not_found() => {
            debug!("[{}] {} [{}] was already deleted", namespace, kind, name);
        }
        Err(source) => {
            return Err(ReconcileError::access(namespace, kind, name, "delete", source));
        }
    }

    create
        .await
        .map_err(|source| ReconcileError::access(namespace, kind, name, "create", source))?;
    info!("[{}] Created {} [{}]", namespace, kind, name);
    metrics::increment_resources_repaired(kind);

    Ok(())
}
