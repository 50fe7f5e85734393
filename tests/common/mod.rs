//! Common test utilities for the integration tests
//!
//! Fixtures for seeding an in-memory cluster and writing config sources.

#![allow(dead_code, reason = "Each test binary uses a different subset of helpers")]

use imagepullsecret_patcher::cluster::InMemoryCluster;
use imagepullsecret_patcher::config::ReconcilePolicy;
use imagepullsecret_patcher::constants::ANNOTATION_EXCLUDE;
use imagepullsecret_patcher::controller::desired::DesiredCredential;
use k8s_openapi::api::core::v1::{Namespace, Secret};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use k8s_openapi::ByteString;
use std::collections::BTreeMap;
use std::io::Write;
use tempfile::NamedTempFile;

pub const DOCKER_CONFIG_JSON: &str =
    r#"{"auths":{"registry.example.com":{"username":"ci","password":"hunter2","auth":"Y2k6aHVudGVyMg=="}}}"#;

pub const AWS_CONFIGS: &str = "\
# Shared AWS settings
AWS_REGION=us-west-2
AWS_ACCOUNT_ID='123456789012'
AWS_SQS_ENDPOINT=\"https://sqs.us-west-2.amazonaws.com\"
";

pub fn credential() -> DesiredCredential {
    DesiredCredential::new(DOCKER_CONFIG_JSON.as_bytes())
}

/// Write `content` to a temp file that lives as long as the returned handle
pub fn config_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("Failed to create temp config file");
    file.write_all(content.as_bytes())
        .expect("Failed to write temp config file");
    file
}

/// Default policy reading its ConfigMap source from `file`
pub fn policy_with_config(file: &NamedTempFile) -> ReconcilePolicy {
    ReconcilePolicy {
        config_file_path: file.path().to_path_buf(),
        ..ReconcilePolicy::default()
    }
}

pub fn excluded_namespace(name: &str, value: &str) -> Namespace {
    Namespace {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            annotations: Some(BTreeMap::from([(
                ANNOTATION_EXCLUDE.to_string(),
                value.to_string(),
            )])),
            ..ObjectMeta::default()
        },
        ..Namespace::default()
    }
}

/// A secret with the managed name but the wrong type and data
pub fn opaque_secret(name: &str) -> Secret {
    Secret {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            ..ObjectMeta::default()
        },
        type_: Some("Opaque".to_string()),
        data: Some(BTreeMap::from([(
            "password".to_string(),
            ByteString(b"letmein".to_vec()),
        )])),
        ..Secret::default()
    }
}

/// Cluster with `default` and `kube-system` namespaces, each with a `default` service account
pub fn seeded_cluster() -> InMemoryCluster {
    let cluster = InMemoryCluster::new();
    for namespace in ["default", "kube-system"] {
        cluster.add_namespace(namespace);
        cluster.add_service_account(namespace, "default", &[]);
    }
    cluster
}
