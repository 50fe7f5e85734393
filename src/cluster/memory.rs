//! # In-Memory Cluster
//!
//! A [`ClusterState`] held entirely in process memory.
//!
//! Used by the unit and integration tests to exercise reconcilers without an
//! API server. Every mutating call is recorded so tests can assert that a pass
//! issued no writes, and failures can be injected per operation to exercise
//! the error paths.

use super::{ClusterState, ResourceKind};
use crate::error::ClusterError;
use async_trait::async_trait;
use k8s_openapi::api::core::v1::{
    ConfigMap, LocalObjectReference, Namespace, Secret, ServiceAccount,
};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Operation class used to target injected failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    List,
    Get,
    Create,
    Delete,
    Patch,
}

/// A mutating call observed by the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClusterCall {
    Create {
        kind: ResourceKind,
        namespace: String,
        name: String,
    },
    Delete {
        kind: ResourceKind,
        namespace: String,
        name: String,
    },
    Patch {
        kind: ResourceKind,
        namespace: String,
        name: String,
    },
}

#[derive(Debug, Clone)]
struct InjectedFailure {
    operation: Operation,
    kind: ResourceKind,
    namespace: Option<String>,
    name: Option<String>,
}

impl InjectedFailure {
    fn matches(&self, operation: Operation, kind: ResourceKind, namespace: &str, name: &str) -> bool {
        self.operation == operation
            && self.kind == kind
            && self.namespace.as_deref().is_none_or(|ns| ns == namespace)
            && self.name.as_deref().is_none_or(|n| n == name)
    }
}

type Key = (String, String);

#[derive(Debug, Default)]
struct Store {
    namespaces: BTreeMap<String, Namespace>,
    secrets: BTreeMap<Key, Secret>,
    config_maps: BTreeMap<Key, ConfigMap>,
    service_accounts: BTreeMap<Key, ServiceAccount>,
    calls: Vec<ClusterCall>,
    failures: Vec<InjectedFailure>,
}

impl Store {
    fn check(
        &self,
        operation: Operation,
        kind: ResourceKind,
        namespace: &str,
        name: &str,
    ) -> Result<(), ClusterError> {
        if self
            .failures
            .iter()
            .any(|f| f.matches(operation, kind, namespace, name))
        {
            return Err(ClusterError::Unavailable(format!(
                "injected {operation:?} failure for {kind} {namespace}/{name}"
            )));
        }
        Ok(())
    }
}

/// Cluster state kept in a mutex-guarded map per resource kind
#[derive(Debug, Default)]
pub struct InMemoryCluster {
    store: Mutex<Store>,
}

fn key(namespace: &str, name: &str) -> Key {
    (namespace.to_string(), name.to_string())
}

fn object_name(metadata: &ObjectMeta) -> String {
    metadata.name.clone().unwrap_or_default()
}

fn not_found(kind: ResourceKind, namespace: &str, name: &str) -> ClusterError {
    ClusterError::NotFound {
        kind,
        namespace: namespace.to_string(),
        name: name.to_string(),
    }
}

fn already_exists(kind: ResourceKind, namespace: &str, name: &str) -> ClusterError {
    ClusterError::AlreadyExists {
        kind,
        namespace: namespace.to_string(),
        name: name.to_string(),
    }
}

impl InMemoryCluster {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Store> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Add a bare namespace
    pub fn add_namespace(&self, name: &str) {
        self.insert_namespace(Namespace {
            metadata: ObjectMeta {
                name: Some(name.to_string()),
                ..ObjectMeta::default()
            },
            ..Namespace::default()
        });
    }

    pub fn insert_namespace(&self, namespace: Namespace) {
        let name = object_name(&namespace.metadata);
        self.lock().namespaces.insert(name, namespace);
    }

    /// Seed a secret without recording a call
    pub fn insert_secret(&self, namespace: &str, mut secret: Secret) {
        secret.metadata.namespace = Some(namespace.to_string());
        let name = object_name(&secret.metadata);
        self.lock().secrets.insert(key(namespace, &name), secret);
    }

    /// Seed a ConfigMap without recording a call
    pub fn insert_config_map(&self, namespace: &str, mut config_map: ConfigMap) {
        config_map.metadata.namespace = Some(namespace.to_string());
        let name = object_name(&config_map.metadata);
        self.lock()
            .config_maps
            .insert(key(namespace, &name), config_map);
    }

    /// Seed a service account referencing the given secrets
    pub fn add_service_account(&self, namespace: &str, name: &str, secret_names: &[&str]) {
        let image_pull_secrets = (!secret_names.is_empty()).then(|| {
            secret_names
                .iter()
                .map(|secret| LocalObjectReference {
                    name: (*secret).to_string(),
                })
                .collect()
        });
        let account = ServiceAccount {
            metadata: ObjectMeta {
                name: Some(name.to_string()),
                namespace: Some(namespace.to_string()),
                ..ObjectMeta::default()
            },
            image_pull_secrets,
            ..ServiceAccount::default()
        };
        self.lock()
            .service_accounts
            .insert(key(namespace, name), account);
    }

    pub fn secret(&self, namespace: &str, name: &str) -> Option<Secret> {
        self.lock().secrets.get(&key(namespace, name)).cloned()
    }

    pub fn config_map(&self, namespace: &str, name: &str) -> Option<ConfigMap> {
        self.lock().config_maps.get(&key(namespace, name)).cloned()
    }

    pub fn service_account(&self, namespace: &str, name: &str) -> Option<ServiceAccount> {
        self.lock()
            .service_accounts
            .get(&key(namespace, name))
            .cloned()
    }

    /// Names in the `imagePullSecrets` list of a service account, in order
    pub fn image_pull_secrets(&self, namespace: &str, name: &str) -> Vec<String> {
        self.service_account(namespace, name)
            .and_then(|account| account.image_pull_secrets)
            .unwrap_or_default()
            .into_iter()
            .map(|reference| reference.name)
            .collect()
    }

    /// Mutating calls observed so far
    pub fn calls(&self) -> Vec<ClusterCall> {
        self.lock().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.lock().calls.clear();
    }

    /// Make every matching call fail until [`Self::clear_failures`]
    ///
    /// `None` for namespace or name matches any value.
    pub fn inject_failure(
        &self,
        operation: Operation,
        kind: ResourceKind,
        namespace: Option<&str>,
        name: Option<&str>,
    ) {
        self.lock().failures.push(InjectedFailure {
            operation,
            kind,
            namespace: namespace.map(str::to_string),
            name: name.map(str::to_string),
        });
    }

    pub fn clear_failures(&self) {
        self.lock().failures.clear();
    }
}

#[async_trait]
impl ClusterState for InMemoryCluster {
    async fn list_namespaces(&self) -> Result<Vec<Namespace>, ClusterError> {
        let store = self.lock();
        store.check(Operation::List, ResourceKind::Namespace, "", "")?;
        Ok(store.namespaces.values().cloned().collect())
    }

    async fn get_secret(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<Option<Secret>, ClusterError> {
        let store = self.lock();
        store.check(Operation::Get, ResourceKind::Secret, namespace, name)?;
        Ok(store.secrets.get(&key(namespace, name)).cloned())
    }

    async fn create_secret(&self, namespace: &str, secret: &Secret) -> Result<(), ClusterError> {
        let name = object_name(&secret.metadata);
        let mut store = self.lock();
        store.check(Operation::Create, ResourceKind::Secret, namespace, &name)?;
        if store.secrets.contains_key(&key(namespace, &name)) {
            return Err(already_exists(ResourceKind::Secret, namespace, &name));
        }
        let mut stored = secret.clone();
        stored.metadata.namespace = Some(namespace.to_string());
        store.secrets.insert(key(namespace, &name), stored);
        store.calls.push(ClusterCall::Create {
            kind: ResourceKind::Secret,
            namespace: namespace.to_string(),
            name,
        });
        Ok(())
    }

    async fn delete_secret(&self, namespace: &str, name: &str) -> Result<(), ClusterError> {
        let mut store = self.lock();
        store.check(Operation::Delete, ResourceKind::Secret, namespace, name)?;
        if store.secrets.remove(&key(namespace, name)).is_none() {
            return Err(not_found(ResourceKind::Secret, namespace, name));
        }
        store.calls.push(ClusterCall::Delete {
            kind: ResourceKind::Secret,
            namespace: namespace.to_string(),
            name: name.to_string(),
        });
        Ok(())
    }

    async fn get_config_map(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<Option<ConfigMap>, ClusterError> {
        let store = self.lock();
        store.check(Operation::Get, ResourceKind::ConfigMap, namespace, name)?;
        Ok(store.config_maps.get(&key(namespace, name)).cloned())
    }

    async fn create_config_map(
        &self,
        namespace: &str,
        config_map: &ConfigMap,
    ) -> Result<(), ClusterError> {
        let name = object_name(&config_map.metadata);
        let mut store = self.lock();
        store.check(Operation::Create, ResourceKind::ConfigMap, namespace, &name)?;
        if store.config_maps.contains_key(&key(namespace, &name)) {
            return Err(already_exists(ResourceKind::ConfigMap, namespace, &name));
        }
        let mut stored = config_map.clone();
        stored.metadata.namespace = Some(namespace.to_string());
        store.config_maps.insert(key(namespace, &name), stored);
        store.calls.push(ClusterCall::Create {
            kind: ResourceKind::ConfigMap,
            namespace: namespace.to_string(),
            name,
        });
        Ok(())
    }

    async fn delete_config_map(&self, namespace: &str, name: &str) -> Result<(), ClusterError> {
        let mut store = self.lock();
        store.check(Operation::Delete, ResourceKind::ConfigMap, namespace, name)?;
        if store.config_maps.remove(&key(namespace, name)).is_none() {
            return Err(not_found(ResourceKind::ConfigMap, namespace, name));
        }
        store.calls.push(ClusterCall::Delete {
            kind: ResourceKind::ConfigMap,
            namespace: namespace.to_string(),
            name: name.to_string(),
        });
        Ok(())
    }

    async fn list_service_accounts(
        &self,
        namespace: &str,
    ) -> Result<Vec<ServiceAccount>, ClusterError> {
        let store = self.lock();
        store.check(Operation::List, ResourceKind::ServiceAccount, namespace, "")?;
        Ok(store
            .service_accounts
            .iter()
            .filter(|((ns, _), _)| ns == namespace)
            .map(|(_, account)| account.clone())
            .collect())
    }

    async fn patch_image_pull_secrets(
        &self,
        namespace: &str,
        name: &str,
        secret_names: &[String],
    ) -> Result<(), ClusterError> {
        let mut store = self.lock();
        store.check(Operation::Patch, ResourceKind::ServiceAccount, namespace, name)?;
        let account = store
            .service_accounts
            .get_mut(&key(namespace, name))
            .ok_or_else(|| not_found(ResourceKind::ServiceAccount, namespace, name))?;
        account.image_pull_secrets = Some(
            secret_names
                .iter()
                .map(|secret| LocalObjectReference {
                    name: secret.clone(),
                })
                .collect(),
        );
        store.calls.push(ClusterCall::Patch {
            kind: ResourceKind::ServiceAccount,
            namespace: namespace.to_string(),
            name: name.to_string(),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_then_get_round_trips() {
        let cluster = InMemoryCluster::new();
        let secret = Secret {
            metadata: ObjectMeta {
                name: Some("registry".to_string()),
                ..ObjectMeta::default()
            },
            ..Secret::default()
        };
        cluster.create_secret("default", &secret).await.unwrap();

        let fetched = cluster.get_secret("default", "registry").await.unwrap();
        assert_eq!(
            fetched.and_then(|s| s.metadata.namespace).as_deref(),
            Some("default")
        );
        assert!(cluster.get_secret("other", "registry").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_create_existing_fails() {
        let cluster = InMemoryCluster::new();
        let secret = Secret {
            metadata: ObjectMeta {
                name: Some("registry".to_string()),
                ..ObjectMeta::default()
            },
            ..Secret::default()
        };
        cluster.create_secret("default", &secret).await.unwrap();
        let err = cluster.create_secret("default", &secret).await.unwrap_err();
        assert!(matches!(err, ClusterError::AlreadyExists { .. }));
    }

    #[tokio::test]
    async fn test_delete_missing_is_not_found() {
        let cluster = InMemoryCluster::new();
        let err = cluster.delete_config_map("default", "absent").await.unwrap_err();
        assert!(err.is_not_found());
        assert!(cluster.calls().is_empty());
    }

    #[tokio::test]
    async fn test_injected_failure_is_scoped() {
        let cluster = InMemoryCluster::new();
        cluster.inject_failure(Operation::Get, ResourceKind::Secret, Some("broken"), None);

        assert!(cluster.get_secret("broken", "registry").await.is_err());
        assert!(cluster.get_secret("default", "registry").await.is_ok());

        cluster.clear_failures();
        assert!(cluster.get_secret("broken", "registry").await.is_ok());
    }

    #[tokio::test]
    async fn test_patch_replaces_references() {
        let cluster = InMemoryCluster::new();
        cluster.add_service_account("default", "default", &["other"]);
        cluster
            .patch_image_pull_secrets(
                "default",
                "default",
                &["other".to_string(), "registry".to_string()],
            )
            .await
            .unwrap();

        assert_eq!(
            cluster.image_pull_secrets("default", "default"),
            vec!["other", "registry"]
        );
        assert_eq!(cluster.calls().len(), 1);
    }
}
