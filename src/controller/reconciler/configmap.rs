//! # ConfigMap Reconciler
//!
//! Keeps the external-config ConfigMap in one namespace equal to the mapping
//! parsed from the env-style config file.

use super::{replace, Outcome};
use crate::cluster::{ClusterState, ResourceKind};
use crate::config::ReconcilePolicy;
use crate::controller::classify::{classify_config_map, is_managed, ConfigMapState};
use crate::controller::desired::{desired_config_map, ConfigData};
use crate::controller::parser::load_env_file;
use crate::error::ReconcileError;
use crate::observability::metrics;
use tracing::{debug, info, warn};

const KIND: ResourceKind = ResourceKind::ConfigMap;

/// Converge the external-config ConfigMap in `namespace`
///
/// The config file is parsed on every call so edits are picked up on the
/// next cycle.
pub async fn reconcile_config_map(
    cluster: &dyn ClusterState,
    policy: &ReconcilePolicy,
    namespace: &str,
) -> Result<Outcome, ReconcileError> {
    let desired = match load_env_file(&policy.config_file_path).await {
        Ok(data) => Some(data),
        Err(err) => {
            debug!("[{}] No usable config source: {}", namespace, err);
            None
        }
    };
    reconcile_config_map_with(cluster, policy, namespace, desired.as_ref()).await
}

/// Converge the ConfigMap against an already parsed mapping
///
/// `None` means the config source could not be parsed.
///
/// - Absent, no mapping: nothing to do
/// - Absent: create it
/// - Present, unmanaged, managed-only mode: fail without touching it
/// - Present, no mapping: delete it with force, otherwise leave it
/// - Matching: nothing to do
/// - Mismatch with force: delete and recreate
/// - Mismatch without force: fail, leaving the ConfigMap untouched
pub async fn reconcile_config_map_with(
    cluster: &dyn ClusterState,
    policy: &ReconcilePolicy,
    namespace: &str,
    desired: Option<&ConfigData>,
) -> Result<Outcome, ReconcileError> {
    let name = policy.config_map_name.as_str();

    let existing = cluster
        .get_config_map(namespace, name)
        .await
        .map_err(|source| ReconcileError::access(namespace, KIND, name, "get", source))?;

    let Some(existing) = existing else {
        let Some(data) = desired else {
            debug!(
                "[{}] Skipping configmap [{}]: config source could not be parsed",
                namespace, name
            );
            return Ok(Outcome::Skipped);
        };
        cluster
            .create_config_map(namespace, &desired_config_map(policy, namespace, data))
            .await
            .map_err(|source| ReconcileError::access(namespace, KIND, name, "create", source))?;
        info!("[{}] Created configmap [{}]", namespace, name);
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

    let Some(data) = desired else {
        if !policy.force {
            warn!(
                "[{}] Config source could not be parsed, leaving configmap [{}] in place",
                namespace, name
            );
            return Ok(Outcome::Unchanged);
        }
        cluster
            .delete_config_map(namespace, name)
            .await
            .map_err(|source| ReconcileError::access(namespace, KIND, name, "delete", source))?;
        warn!(
            "[{}] Deleted configmap [{}]: config source could not be parsed",
            namespace, name
        );
        metrics::increment_resources_deleted(KIND);
        return Ok(Outcome::Deleted);
    };

    match classify_config_map(&existing, data) {
        ConfigMapState::Valid => {
            debug!("[{}] Configmap [{}] is valid", namespace, name);
            Ok(Outcome::Unchanged)
        }
        state @ ConfigMapState::Mismatch => {
            if !policy.force {
                return Err(ReconcileError::Invalid {
                    namespace: namespace.to_string(),
                    kind: KIND,
                    name: name.to_string(),
                    reason: state.as_str(),
                });
            }

            info!(
                "[{}] Configmap [{}] is not valid ({}), overwriting",
                namespace,
                name,
                state.as_str()
            );
            let replacement = desired_config_map(policy, namespace, data);
            replace(
                namespace,
                KIND,
                name,
                cluster.delete_config_map(namespace, name),
                cluster.create_config_map(namespace, &replacement),
            )
            .await?;
            Ok(Outcome::Repaired)
        }
    }
}
