//! # Errors
//!
//! Error types for each layer of the controller.
//!
//! - [`ClusterError`]: a call to the cluster-state accessor failed
//! - [`ReconcileError`]: one reconciler failed for one namespace (isolated by the driver)
//! - [`CycleError`]: the whole cycle cannot proceed (fatal, process restarts)
//! - [`ConfigError`]: startup configuration is invalid (fatal)
//! - [`ParseError`]: the env-style config source could not produce a mapping

use crate::cluster::ResourceKind;
use std::path::PathBuf;
use thiserror::Error;

/// Failure reported by a [`crate::cluster::ClusterState`] implementation
#[derive(Debug, Error)]
pub enum ClusterError {
    #[error("{kind} {namespace}/{name} not found")]
    NotFound {
        kind: ResourceKind,
        namespace: String,
        name: String,
    },
    #[error("{kind} {namespace}/{name} already exists")]
    AlreadyExists {
        kind: ResourceKind,
        namespace: String,
        name: String,
    },
    #[error("Kubernetes API request failed: {0}")]
    Kube(#[from] kube::Error),
    #[error("Cluster unavailable: {0}")]
    Unavailable(String),
}

impl ClusterError {
    /// Whether the failure means the object does not exist
    pub fn is_not_found(&self) -> bool {
        match self {
            ClusterError::NotFound { .. } => true,
            ClusterError::Kube(kube::Error::Api(response)) => response.code == 404,
            _ => false,
        }
    }
}

/// Failure of a single reconciler in a single namespace
#[derive(Debug, Error)]
pub enum ReconcileError {
    /// A fetch, create, delete, list or patch call failed
    #[error("[{namespace}] Failed to {operation} {kind} [{name}]: {source}")]
    Access {
        namespace: String,
        kind: ResourceKind,
        name: String,
        operation: &'static str,
        #[source]
        source: ClusterError,
    },
    /// Managed-only mode is on and the resource lacks the managed-by marker
    #[error("[{namespace}] {kind} [{name}] is present but unmanaged")]
    Unmanaged {
        namespace: String,
        kind: ResourceKind,
        name: String,
    },
    /// The resource failed classification and force-overwrite is disabled
    #[error("[{namespace}] {kind} [{name}] is not valid ({reason}), set --force to true to overwrite")]
    Invalid {
        namespace: String,
        kind: ResourceKind,
        name: String,
        reason: &'static str,
    },
}

impl ReconcileError {
    pub(crate) fn access(
        namespace: &str,
        kind: ResourceKind,
        name: &str,
        operation: &'static str,
        source: ClusterError,
    ) -> Self {
        ReconcileError::Access {
            namespace: namespace.to_string(),
            kind,
            name: name.to_string(),
            operation,
            source,
        }
    }

    /// Namespace the failure happened in
    pub fn namespace(&self) -> &str {
        match self {
            ReconcileError::Access { namespace, .. }
            | ReconcileError::Unmanaged { namespace, .. }
            | ReconcileError::Invalid { namespace, .. } => namespace,
        }
    }

    /// Kind of resource the failure concerns
    pub fn kind(&self) -> ResourceKind {
        match self {
            ReconcileError::Access { kind, .. }
            | ReconcileError::Unmanaged { kind, .. }
            | ReconcileError::Invalid { kind, .. } => *kind,
        }
    }
}

/// Failure that aborts a whole reconciliation cycle
#[derive(Debug, Error)]
pub enum CycleError {
    #[error("Failed to list namespaces: {0}")]
    ListNamespaces(#[source] ClusterError),
    #[error("Failed to read registry credentials from {}: {source}", path.display())]
    Credential {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Invalid startup configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Cannot specify both `--dockerconfigjson` and `--dockerconfigjsonpath`")]
    ConflictingCredentialSources,
    #[error("One of `--dockerconfigjson` or `--dockerconfigjsonpath` must be set")]
    MissingCredentialSource,
    #[error("{field} '{value}' must be a valid Kubernetes name (lowercase alphanumeric, hyphens, dots; cannot start/end with hyphen or dot)")]
    InvalidName { field: &'static str, value: String },
    #[error("Invalid duration '{0}'. Expected <number><unit> parts with units ms, s, m or h (e.g. '10s', '1m30s')")]
    InvalidDuration(String),
}

/// The env-style config source produced no usable mapping
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Failed to read config file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Config path is a directory, expected a file: {}", .0.display())]
    NotAFile(PathBuf),
    #[error("No valid entries found in config file {}", .0.display())]
    NoEntries(PathBuf),
}
