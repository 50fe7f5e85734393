//! # Reconcile Policy
//!
//! The immutable set of switches every reconciler consults.
//!
//! Built once at startup and passed by reference into each reconciler call.

use crate::constants::{
    DEFAULT_CONFIGMAP_NAME, DEFAULT_CONFIG_FILE_PATH, DEFAULT_SECRET_NAME,
    DEFAULT_SERVICE_ACCOUNT_NAME,
};
use crate::error::ConfigError;
use regex::Regex;
use std::path::PathBuf;
use std::sync::LazyLock;

static KUBERNETES_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z0-9]([-a-z0-9]*[a-z0-9])?(\.[a-z0-9]([-a-z0-9]*[a-z0-9])?)*$")
        .expect("kubernetes name regex is valid")
});

/// Reconciliation policy shared by all reconcilers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcilePolicy {
    /// Delete and recreate managed resources that fail classification
    pub force: bool,
    /// Refuse to touch existing resources that lack the managed-by annotation
    pub managed_only: bool,
    /// Patch every service account instead of only the allow-listed ones
    pub all_service_accounts: bool,
    /// Service accounts patched when `all_service_accounts` is off
    pub service_accounts: Vec<String>,
    /// Namespaces never reconciled
    pub excluded_namespaces: Vec<String>,
    /// Name of the managed registry secret
    pub secret_name: String,
    /// Name of the managed ConfigMap
    pub config_map_name: String,
    /// Env-style file the ConfigMap is built from
    pub config_file_path: PathBuf,
}

impl Default for ReconcilePolicy {
    fn default() -> Self {
        Self {
            force: true,
            managed_only: false,
            all_service_accounts: true,
            service_accounts: vec![DEFAULT_SERVICE_ACCOUNT_NAME.to_string()],
            excluded_namespaces: Vec::new(),
            secret_name: DEFAULT_SECRET_NAME.to_string(),
            config_map_name: DEFAULT_CONFIGMAP_NAME.to_string(),
            config_file_path: PathBuf::from(DEFAULT_CONFIG_FILE_PATH),
        }
    }
}

impl ReconcilePolicy {
    /// Whether a service account is selected for patching
    pub fn selects_service_account(&self, name: &str) -> bool {
        self.all_service_accounts || self.service_accounts.iter().any(|sa| sa == name)
    }

    /// Check the managed resource names are usable as Kubernetes object names
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_kubernetes_name(&self.secret_name, "secretname")?;
        validate_kubernetes_name(&self.config_map_name, "aws-configmap-name")?;
        Ok(())
    }
}

/// Split a comma-separated list without trimming entries
///
/// Entries are matched literally later, so `" default"` never matches `default`.
pub fn split_list(list: &str) -> Vec<String> {
    list.split(',').map(str::to_string).collect()
}

/// Validate a Kubernetes object name (RFC 1123 subdomain, at most 253 characters)
pub fn validate_kubernetes_name(name: &str, field: &'static str) -> Result<(), ConfigError> {
    if name.len() > 253 || !KUBERNETES_NAME.is_match(name) {
        return Err(ConfigError::InvalidName {
            field,
            value: name.to_string(),
        });
    }
    Ok(())
}
