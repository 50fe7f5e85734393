//! # Identity Patcher
//!
//! Makes sure the selected service accounts in a namespace reference the
//! registry secret in `imagePullSecrets`.

use crate::cluster::{ClusterState, ResourceKind};
use crate::config::ReconcilePolicy;
use crate::error::ReconcileError;
use crate::observability::metrics;
use k8s_openapi::api::core::v1::ServiceAccount;
use tracing::{debug, info};

const KIND: ResourceKind = ResourceKind::ServiceAccount;

/// Add the registry secret to every selected service account lacking it
///
/// Existing references are kept and the secret is appended last. Stops at the
/// first failed patch. Returns the names of the accounts that were patched.
pub async fn reconcile_identities(
    cluster: &dyn ClusterState,
    policy: &ReconcilePolicy,
    namespace: &str,
) -> Result<Vec<String>, ReconcileError> {
    let accounts = cluster
        .list_service_accounts(namespace)
        .await
        .map_err(|source| ReconcileError::access(namespace, KIND, "*", "list", source))?;

    let mut patched = Vec::new();
    for account in &accounts {
        let name = account.metadata.name.as_deref().unwrap_or_default();

        if !policy.selects_service_account(name) {
            debug!("[{}] Skip service account [{}]", namespace, name);
            continue;
        }

        let mut secret_names = referenced_secrets(account);
        if secret_names.iter().any(|secret| *secret == policy.secret_name) {
            debug!(
                "[{}] Service account [{}] already references secret [{}]",
                namespace, name, policy.secret_name
            );
            continue;
        }
        secret_names.push(policy.secret_name.clone());

        cluster
            .patch_image_pull_secrets(namespace, name, &secret_names)
            .await
            .map_err(|source| ReconcileError::access(namespace, KIND, name, "patch", source))?;
        info!("[{}] Patched imagePullSecrets to service account [{}]", namespace, name);
        metrics::increment_service_accounts_patched();
        patched.push(name.to_string());
    }

    Ok(patched)
}

fn referenced_secrets(account: &ServiceAccount) -> Vec<String> {
    account
        .image_pull_secrets
        .iter()
        .flatten()
        .map(|reference| reference.name.clone())
        .collect()
}
