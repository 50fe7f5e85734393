//! # Secret Reconciler
//!
//! Keeps the registry pull secret in one namespace equal to the desired credentials.

use super::{replace, Outcome};
use crate::cluster::{ClusterState, ResourceKind};
use crate::config::ReconcilePolicy;
use crate::controller::classify::{classify_secret, is_managed, SecretState};
use crate::controller::desired::{desired_secret, DesiredCredential};
use crate::error::ReconcileError;
use crate::observability::metrics;
use tracing::{debug, info};

const KIND: ResourceKind = ResourceKind::Secret;

/// Converge the registry secret in `namespace`
///
/// - Absent: create it
/// - Present, unmanaged, managed-only mode: fail without touching it
/// - Valid: nothing to do
/// - Invalid with force: delete and recreate
/// - Invalid without force: fail, leaving the secret untouched
pub async fn reconcile_secret(
    cluster: &dyn ClusterState,
    policy: &ReconcilePolicy,
    namespace: &str,
    credential: &DesiredCredential,
) -> Result<Outcome, ReconcileError> {
    let name = policy.secret_name.as_str();
    let desired = desired_secret(policy, namespace, credential);

    let existing = cluster
        .get_secret(namespace, name)
        .await
        .map_err(|source| ReconcileError::access(namespace, KIND, name, "get", source))?;

    let Some(existing) = existing else {
        cluster
            .create_secret(namespace, &desired)
            .await
            .map_err(|source| ReconcileError::access(namespace, KIND, name, "create", source))?;
        info!("[{}] Created secret [{}]", namespace, name);
        metrics::increment_resources_created(KIND);
        return Ok(Outcome::Created);
    };

    if policy.managed_only && !is_managed(&existing.metadata) {
        return Err(ReconcileError::Unmanaged {
            namespace: namespace.to_string(),
            kind: KIND,
            name: name.to_string(),
        });
    }

    match classify_secret(&existing, credential) {
        SecretState::Valid => {
            debug!("[{}] Secret [{}] is valid", namespace, name);
            Ok(Outcome::Unchanged)
        }
        SecretState::Invalid(drift) => {
            if !policy.force {
                return Err(ReconcileError::Invalid {
                    namespace: namespace.to_string(),
                    kind: KIND,
                    name: name.to_string(),
                    reason: drift.as_str(),
                });
            }

            info!(
                "[{}] Secret [{}] is not valid ({}), overwriting",
                namespace,
                name,
                drift.as_str()
            );
            replace(
                namespace,
                KIND,
                name,
                cluster.delete_secret(namespace, name),
                cluster.create_secret(namespace, &desired),
            )
            .await?;
            Ok(Outcome::Repaired)
        }
    }
}
