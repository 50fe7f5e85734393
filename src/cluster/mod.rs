//! # Cluster State
//!
//! The narrow capability set the reconcilers use to read and mutate the cluster.
//!
//! Reconcilers never touch `kube::Api` directly. They depend on [`ClusterState`],
//! which has two implementations:
//!
//! - [`kubernetes::KubeCluster`]: the real API server, via `kube::Client`
//! - [`memory::InMemoryCluster`]: an in-process store used by tests
//!
//! "Not found" on a get is not an error: getters return `Ok(None)`.

pub mod kubernetes;
pub mod memory;

use crate::error::ClusterError;
use async_trait::async_trait;
use k8s_openapi::api::core::v1::{ConfigMap, Namespace, Secret, ServiceAccount};
use std::fmt;

pub use kubernetes::KubeCluster;
pub use memory::{ClusterCall, InMemoryCluster, Operation};

/// Resource kinds the controller manages or reads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Namespace,
    Secret,
    ConfigMap,
    ServiceAccount,
}

impl ResourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Namespace => "namespace",
            ResourceKind::Secret => "secret",
            ResourceKind::ConfigMap => "configmap",
            ResourceKind::ServiceAccount => "serviceaccount",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Read and write access to the cluster, scoped by namespace
#[async_trait]
pub trait ClusterState: Send + Sync {
    /// List every namespace in the cluster
    async fn list_namespaces(&self) -> Result<Vec<Namespace>, ClusterError>;

    /// Get a secret, `None` if it does not exist
    async fn get_secret(&self, namespace: &str, name: &str)
        -> Result<Option<Secret>, ClusterError>;

    /// Create a secret; fails if one with the same name exists
    async fn create_secret(&self, namespace: &str, secret: &Secret) -> Result<(), ClusterError>;

    /// Delete a secret by name
    async fn delete_secret(&self, namespace: &str, name: &str) -> Result<(), ClusterError>;

    /// Get a ConfigMap, `None` if it does not exist
    async fn get_config_map(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<Option<ConfigMap>, ClusterError>;

    /// Create a ConfigMap; fails if one with the same name exists
    async fn create_config_map(
        &self,
        namespace: &str,
        config_map: &ConfigMap,
    ) -> Result<(), ClusterError>;

    /// Delete a ConfigMap by name
    async fn delete_config_map(&self, namespace: &str, name: &str) -> Result<(), ClusterError>;

    /// List every service account in a namespace
    async fn list_service_accounts(
        &self,
        namespace: &str,
    ) -> Result<Vec<ServiceAccount>, ClusterError>;

    /// Replace the `imagePullSecrets` list of a service account, leaving every other field alone
    async fn patch_image_pull_secrets(
        &self,
        namespace: &str,
        name: &str,
        secret_names: &[String],
    ) -> Result<(), ClusterError>;
}
