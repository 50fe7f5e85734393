//! # Metrics
//!
//! Prometheus metrics for monitoring the controller.
//!
//! ## Metrics Exposed
//!
//! - `imagepullsecret_patcher_cycles_total` - Total number of reconciliation cycles
//! - `imagepullsecret_patcher_cycle_duration_seconds` - Duration of a full cycle
//! - `imagepullsecret_patcher_namespaces_processed_total` - Namespaces reconciled
//! - `imagepullsecret_patcher_namespaces_skipped_total` - Namespaces excluded from a cycle
//! - `imagepullsecret_patcher_namespace_failures_total` - Namespaces whose reconciliation failed, by kind
//! - `imagepullsecret_patcher_resources_created_total` - Resources created, by kind
//! - `imagepullsecret_patcher_resources_repaired_total` - Resources replaced after drift, by kind
//! - `imagepullsecret_patcher_resources_deleted_total` - Resources deleted, by kind
//! - `imagepullsecret_patcher_serviceaccounts_patched_total` - Service accounts given the pull secret

use crate::cluster::ResourceKind;
use anyhow::Result;
use prometheus::{Histogram, IntCounter, IntCounterVec, Registry};
use std::sync::LazyLock;

pub(crate) static REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

static CYCLES_TOTAL: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "imagepullsecret_patcher_cycles_total",
        "Total number of reconciliation cycles",
    )
    .expect("Failed to create CYCLES_TOTAL metric - this should never happen")
});

static CYCLE_DURATION: LazyLock<Histogram> = LazyLock::new(|| {
    Histogram::with_opts(
        prometheus::HistogramOpts::new(
            "imagepullsecret_patcher_cycle_duration_seconds",
            "Duration of a reconciliation cycle in seconds",
        )
        .buckets(vec![0.1, 0.5, 1.0, 2.0, 5.0, 10.0, 30.0]),
    )
    .expect("Failed to create CYCLE_DURATION metric - this should never happen")
});

static NAMESPACES_PROCESSED_TOTAL: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "imagepullsecret_patcher_namespaces_processed_total",
        "Total number of namespaces reconciled",
    )
    .expect("Failed to create NAMESPACES_PROCESSED_TOTAL metric - this should never happen")
});

static NAMESPACES_SKIPPED_TOTAL: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "imagepullsecret_patcher_namespaces_skipped_total",
        "Total number of namespaces excluded from reconciliation",
    )
    .expect("Failed to create NAMESPACES_SKIPPED_TOTAL metric - this should never happen")
});

static NAMESPACE_FAILURES_TOTAL: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        prometheus::Opts::new(
            "imagepullsecret_patcher_namespace_failures_total",
            "Total number of failed namespace reconciliations by resource kind",
        ),
        &["kind"],
    )
    .expect("Failed to create NAMESPACE_FAILURES_TOTAL metric - this should never happen")
});

static RESOURCES_CREATED_TOTAL: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        prometheus::Opts::new(
            "imagepullsecret_patcher_resources_created_total",
            "Total number of resources created by resource kind",
        ),
        &["kind"],
    )
    .expect("Failed to create RESOURCES_CREATED_TOTAL metric - this should never happen")
});

static RESOURCES_REPAIRED_TOTAL: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        prometheus::Opts::new(
            "imagepullsecret_patcher_resources_repaired_total",
            "Total number of drifted resources replaced by resource kind",
        ),
        &["kind"],
    )
    .expect("Failed to create RESOURCES_REPAIRED_TOTAL metric - this should never happen")
});

static RESOURCES_DELETED_TOTAL: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        prometheus::Opts::new(
            "imagepullsecret_patcher_resources_deleted_total",
            "Total number of resources deleted by resource kind",
        ),
        &["kind"],
    )
    .expect("Failed to create RESOURCES_DELETED_TOTAL metric - this should never happen")
});

pub(crate) static SERVICE_ACCOUNTS_PATCHED_TOTAL: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "imagepullsecret_patcher_serviceaccounts_patched_total",
        "Total number of service accounts patched with the pull secret",
    )
    .expect("Failed to create SERVICE_ACCOUNTS_PATCHED_TOTAL metric - this should never happen")
});

#[allow(
    clippy::missing_errors_doc,
    reason = "Error documentation is provided in doc comments"
)]
pub fn register_metrics() -> Result<()> {
    REGISTRY.register(Box::new(CYCLES_TOTAL.clone()))?;
    REGISTRY.register(Box::new(CYCLE_DURATION.clone()))?;
    REGISTRY.register(Box::new(NAMESPACES_PROCESSED_TOTAL.clone()))?;
    REGISTRY.register(Box::new(NAMESPACES_SKIPPED_TOTAL.clone()))?;
    REGISTRY.register(Box::new(NAMESPACE_FAILURES_TOTAL.clone()))?;
    REGISTRY.register(Box::new(RESOURCES_CREATED_TOTAL.clone()))?;
    REGISTRY.register(Box::new(RESOURCES_REPAIRED_TOTAL.clone()))?;
    REGISTRY.register(Box::new(RESOURCES_DELETED_TOTAL.clone()))?;
    REGISTRY.register(Box::new(SERVICE_ACCOUNTS_PATCHED_TOTAL.clone()))?;

    Ok(())
}

pub fn increment_cycles() {
    CYCLES_TOTAL.inc();
}

pub fn observe_cycle_duration(duration: f64) {
    CYCLE_DURATION.observe(duration);
}

pub fn increment_namespaces_processed() {
    NAMESPACES_PROCESSED_TOTAL.inc();
}

pub fn increment_namespaces_skipped() {
    NAMESPACES_SKIPPED_TOTAL.inc();
}

pub fn increment_namespace_failures(kind: ResourceKind) {
    NAMESPACE_FAILURES_TOTAL
        .with_label_values(&[kind.as_str()])
        .inc();
}

pub fn increment_resources_created(kind: ResourceKind) {
    RESOURCES_CREATED_TOTAL
        .with_label_values(&[kind.as_str()])
        .inc();
}

pub fn increment_resources_repaired(kind: ResourceKind) {
    RESOURCES_REPAIRED_TOTAL
        .with_label_values(&[kind.as_str()])
        .inc();
}

pub fn increment_resources_deleted(kind: ResourceKind) {
    RESOURCES_DELETED_TOTAL
        .with_label_values(&[kind.as_str()])
        .inc();
}

pub fn increment_service_accounts_patched() {
    SERVICE_ACCOUNTS_PATCHED_TOTAL.inc();
}
