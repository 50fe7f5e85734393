//! # Constants
//!
//! Shared constants used throughout the controller.
//!
//! Names and annotation keys are part of the contract with existing clusters:
//! resources created by earlier releases carry these exact markers.

/// Annotation stamped on every resource this controller creates
pub const ANNOTATION_MANAGED_BY: &str = "app.kubernetes.io/managed-by";

/// Value of [`ANNOTATION_MANAGED_BY`] identifying this controller
pub const MANAGED_BY_VALUE: &str = "imagepullsecret-patcher";

/// Namespace annotation that opts a namespace out of reconciliation
/// Only the exact value `"true"` excludes.
pub const ANNOTATION_EXCLUDE: &str = "k8s.titansoft.com/imagepullsecret-patcher-exclude";

/// Secret type for registry credentials
pub const SECRET_TYPE_DOCKER_CONFIG_JSON: &str = "kubernetes.io/dockerconfigjson";

/// Data key holding the registry credentials inside the managed secret
pub const DOCKER_CONFIG_JSON_KEY: &str = ".dockerconfigjson";

/// Default name of the managed registry secret
pub const DEFAULT_SECRET_NAME: &str = "registry";

/// Default name of the managed ConfigMap
pub const DEFAULT_CONFIGMAP_NAME: &str = "aws-configs";

/// Default path of the env-style file the ConfigMap is built from
pub const DEFAULT_CONFIG_FILE_PATH: &str = "/config/aws-configs";

/// Name of the service account every namespace gets by default
pub const DEFAULT_SERVICE_ACCOUNT_NAME: &str = "default";

/// Default period between reconciliation cycles
pub const DEFAULT_LOOP_DURATION: &str = "10s";

/// Default HTTP server port for metrics and health probes
pub const DEFAULT_METRICS_PORT: u16 = 5000;
