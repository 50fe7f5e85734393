//! # Classification
//!
//! Turn a fetched object into a state tag against the desired state.
//!
//! Callers match these enums exhaustively, so adding a new drift variant
//! forces every reconciler to decide what to do with it.

use super::desired::{ConfigData, DesiredCredential};
use crate::constants::{
    ANNOTATION_MANAGED_BY, DOCKER_CONFIG_JSON_KEY, MANAGED_BY_VALUE,
    SECRET_TYPE_DOCKER_CONFIG_JSON,
};
use k8s_openapi::api::core::v1::{ConfigMap, Secret};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;

/// How a registry secret differs from the desired one
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SecretDrift {
    /// The secret type is not `kubernetes.io/dockerconfigjson`
    WrongType { found: Option<String> },
    /// The `.dockerconfigjson` key is absent
    MissingKey,
    /// The payload differs from the desired credentials
    ContentMismatch,
}

impl SecretDrift {
    pub fn as_str(&self) -> &'static str {
        match self {
            SecretDrift::WrongType { .. } => "wrong type",
            SecretDrift::MissingKey => "missing key",
            SecretDrift::ContentMismatch => "content mismatch",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SecretState {
    Valid,
    Invalid(SecretDrift),
}

impl SecretState {
    pub fn is_valid(&self) -> bool {
        matches!(self, SecretState::Valid)
    }
}

/// Classify a registry secret
///
/// Checks run in precedence order: type, then key presence, then content.
pub fn classify_secret(secret: &Secret, desired: &DesiredCredential) -> SecretState {
    if secret.type_.as_deref() != Some(SECRET_TYPE_DOCKER_CONFIG_JSON) {
        return SecretState::Invalid(SecretDrift::WrongType {
            found: secret.type_.clone(),
        });
    }

    let Some(payload) = secret
        .data
        .as_ref()
        .and_then(|data| data.get(DOCKER_CONFIG_JSON_KEY))
    else {
        return SecretState::Invalid(SecretDrift::MissingKey);
    };

    if payload.0.as_slice() != desired.as_bytes() {
        return SecretState::Invalid(SecretDrift::ContentMismatch);
    }

    SecretState::Valid
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigMapState {
    Valid,
    Mismatch,
}

impl ConfigMapState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConfigMapState::Valid => "valid",
            ConfigMapState::Mismatch => "data mismatch",
        }
    }
}

/// Classify a ConfigMap by exact, order-independent equality of its data
///
/// A ConfigMap without `data` compares as empty.
pub fn classify_config_map(config_map: &ConfigMap, desired: &ConfigData) -> ConfigMapState {
    let matches = match &config_map.data {
        Some(data) => data == desired,
        None => desired.is_empty(),
    };
    if matches {
        ConfigMapState::Valid
    } else {
        ConfigMapState::Mismatch
    }
}

/// Whether an object carries this controller's managed-by annotation
pub fn is_managed(metadata: &ObjectMeta) -> bool {
    metadata
        .annotations
        .as_ref()
        .and_then(|annotations| annotations.get(ANNOTATION_MANAGED_BY))
        .is_some_and(|value| value == MANAGED_BY_VALUE)
}
