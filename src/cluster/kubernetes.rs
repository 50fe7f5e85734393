//! # Kubernetes Cluster
//!
//! [`ClusterState`] backed by the Kubernetes API server.

use super::ClusterState;
use crate::error::ClusterError;
use async_trait::async_trait;
use k8s_openapi::api::core::v1::{ConfigMap, Namespace, Secret, ServiceAccount};
use kube::{
    api::{Api, DeleteParams, ListParams, Patch, PatchParams, PostParams},
    Client,
};
use serde_json::json;
use tracing::debug;

/// Field manager recorded on patches made by this controller
const FIELD_MANAGER: &str = "imagepullsecret-patcher";

/// Cluster access through a `kube::Client`
#[derive(Clone)]
pub struct KubeCluster {
    client: Client,
}

impl std::fmt::Debug for KubeCluster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KubeCluster").finish_non_exhaustive()
    }
}

impl KubeCluster {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn secrets(&self, namespace: &str) -> Api<Secret> {
        Api::namespaced(self.client.clone(), namespace)
    }

    fn config_maps(&self, namespace: &str) -> Api<ConfigMap> {
        Api::namespaced(self.client.clone(), namespace)
    }

    fn service_accounts(&self, namespace: &str) -> Api<ServiceAccount> {
        Api::namespaced(self.client.clone(), namespace)
    }
}

fn patch_params() -> PatchParams {
    PatchParams {
        field_manager: Some(FIELD_MANAGER.to_string()),
        ..PatchParams::default()
    }
}

#[async_trait]
impl ClusterState for KubeCluster {
    async fn list_namespaces(&self) -> Result<Vec<Namespace>, ClusterError> {
        let namespaces: Api<Namespace> = Api::all(self.client.clone());
        let list = namespaces.list(&ListParams::default()).await?;
        Ok(list.items)
    }

    async fn get_secret(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<Option<Secret>, ClusterError> {
        Ok(self.secrets(namespace).get_opt(name).await?)
    }

    async fn create_secret(&self, namespace: &str, secret: &Secret) -> Result<(), ClusterError> {
        self.secrets(namespace)
            .create(&PostParams::default(), secret)
            .await?;
        Ok(())
    }

    async fn delete_secret(&self, namespace: &str, name: &str) -> Result<(), ClusterError> {
        self.secrets(namespace)
            .delete(name, &DeleteParams::default())
            .await?;
        Ok(())
    }

    async fn get_config_map(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<Option<ConfigMap>, ClusterError> {
        Ok(self.config_maps(namespace).get_opt(name).await?)
    }

    async fn create_config_map(
        &self,
        namespace: &str,
        config_map: &ConfigMap,
    ) -> Result<(), ClusterError> {
        self.config_maps(namespace)
            .create(&PostParams::default(), config_map)
            .await?;
        Ok(())
    }

    async fn delete_config_map(&self, namespace: &str, name: &str) -> Result<(), ClusterError> {
        self.config_maps(namespace)
            .delete(name, &DeleteParams::default())
            .await?;
        Ok(())
    }

    async fn list_service_accounts(
        &self,
        namespace: &str,
    ) -> Result<Vec<ServiceAccount>, ClusterError> {
        let list = self
            .service_accounts(namespace)
            .list(&ListParams::default())
            .await?;
        Ok(list.items)
    }

    async fn patch_image_pull_secrets(
        &self,
        namespace: &str,
        name: &str,
        secret_names: &[String],
    ) -> Result<(), ClusterError> {
        // imagePullSecrets has no merge key, so the list is sent in full
        let references: Vec<_> = secret_names
            .iter()
            .map(|secret| json!({ "name": secret }))
            .collect();
        let patch = json!({ "imagePullSecrets": references });
        debug!("[{}] Patching service account [{}]: {}", namespace, name, patch);

        self.service_accounts(namespace)
            .patch(name, &patch_params(), &Patch::Strategic(patch))
            .await?;
        Ok(())
    }
}
