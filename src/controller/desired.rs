//! # Desired State
//!
//! Pure constructors for the objects the controller wants to exist.
//! Nothing here touches the cluster or the filesystem.

use crate::config::ReconcilePolicy;
use crate::constants::{
    ANNOTATION_MANAGED_BY, DOCKER_CONFIG_JSON_KEY, MANAGED_BY_VALUE,
    SECRET_TYPE_DOCKER_CONFIG_JSON,
};
use k8s_openapi::api::core::v1::{ConfigMap, Secret};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use k8s_openapi::ByteString;
use std::collections::BTreeMap;
use std::fmt;

/// Registry credentials distributed to every namespace
///
/// Opaque bytes; the controller never interprets them.
#[derive(Clone, PartialEq, Eq)]
pub struct DesiredCredential(Vec<u8>);

impl DesiredCredential {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

// Credentials stay out of logs
impl fmt::Debug for DesiredCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DesiredCredential({} bytes)", self.0.len())
    }
}

/// Key/value data parsed from the env-style config source
pub type ConfigData = BTreeMap<String, String>;

fn managed_metadata(name: &str, namespace: &str) -> ObjectMeta {
    ObjectMeta {
        name: Some(name.to_string()),
        namespace: Some(namespace.to_string()),
        annotations: Some(BTreeMap::from([(
            ANNOTATION_MANAGED_BY.to_string(),
            MANAGED_BY_VALUE.to_string(),
        )])),
        ..ObjectMeta::default()
    }
}

/// The registry secret as it should exist in `namespace`
pub fn desired_secret(
    policy: &ReconcilePolicy,
    namespace: &str,
    credential: &DesiredCredential,
) -> Secret {
    Secret {
        metadata: managed_metadata(&policy.secret_name, namespace),
        type_: Some(SECRET_TYPE_DOCKER_CONFIG_JSON.to_string()),
        data: Some(BTreeMap::from([(
            DOCKER_CONFIG_JSON_KEY.to_string(),
            ByteString(credential.as_bytes().to_vec()),
        )])),
        ..Secret::default()
    }
}

/// The external-config ConfigMap as it should exist in `namespace`
pub fn desired_config_map(policy: &ReconcilePolicy, namespace: &str, data: &ConfigData) -> ConfigMap {
    ConfigMap {
        metadata: managed_metadata(&policy.config_map_name, namespace),
        data: Some(data.clone()),
        ..ConfigMap::default()
    }
}
