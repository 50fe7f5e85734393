//! # Driver
//!
//! Runs reconciliation cycles over every namespace.
//!
//! A cycle lists namespaces, skips excluded ones, and runs the reconcilers in
//! a fixed order for each of the rest: secret, then ConfigMap, then service
//! accounts. The first failure in a namespace ends work on that namespace
//! only; the cycle moves on to the next one.

use super::desired::DesiredCredential;
use super::filter::is_excluded;
use super::reconciler::{reconcile_config_map, reconcile_identities, reconcile_secret};
use crate::cluster::ClusterState;
use crate::config::{CredentialSource, ReconcilePolicy};
use crate::error::{CycleError, ReconcileError};
use crate::observability::metrics;
use std::future::Future;
use std::time::{Duration, Instant};
use tokio::signal::unix::{signal, SignalKind};
use tracing::{debug, error, info, info_span, Instrument};

/// When cycles run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Schedule {
    /// A single cycle, then exit
    Once,
    /// A cycle every period until shutdown
    Every(Duration),
}

/// Summary of one cycle
#[derive(Debug, Default)]
pub struct CycleReport {
    /// Namespaces where every reconciler succeeded
    pub processed: usize,
    /// Namespaces excluded by annotation or by the exclusion list
    pub skipped: usize,
    /// One entry per namespace whose reconciliation failed
    pub failures: Vec<ReconcileError>,
}

impl CycleReport {
    pub fn failed(&self) -> usize {
        self.failures.len()
    }
}

/// Reconcile every resource kind in one namespace, stopping at the first failure
pub async fn reconcile_namespace(
    cluster: &dyn ClusterState,
    policy: &ReconcilePolicy,
    namespace: &str,
    credential: &DesiredCredential,
) -> Result<(), ReconcileError> {
    reconcile_secret(cluster, policy, namespace, credential).await?;
    reconcile_config_map(cluster, policy, namespace).await?;
    reconcile_identities(cluster, policy, namespace).await?;
    Ok(())
}

/// Run one full cycle
///
/// Fails only when namespaces cannot be listed. Per-namespace failures are
/// logged and collected in the report.
pub async fn run_cycle(
    cluster: &dyn ClusterState,
    policy: &ReconcilePolicy,
    credential: &DesiredCredential,
) -> Result<CycleReport, CycleError> {
    let start = Instant::now();
    metrics::increment_cycles();

    let namespaces = cluster
        .list_namespaces()
        .await
        .map_err(CycleError::ListNamespaces)?;

    let mut report = CycleReport::default();
    for namespace in &namespaces {
        let name = namespace.metadata.name.as_deref().unwrap_or_default();

        if is_excluded(namespace, &policy.excluded_namespaces) {
            debug!("[{}] Namespace skipped", name);
            report.skipped += 1;
            metrics::increment_namespaces_skipped();
            continue;
        }

        debug!("[{}] Start processing", name);
        match reconcile_namespace(cluster, policy, name, credential).await {
            Ok(()) => {
                report.processed += 1;
                metrics::increment_namespaces_processed();
            }
            Err(err) => {
                error!("{}", err);
                metrics::increment_namespace_failures(err.kind());
                report.failures.push(err);
            }
        }
    }

    let duration = start.elapsed();
    metrics::observe_cycle_duration(duration.as_secs_f64());
    info!(
        "Cycle finished in {:.3}s: {} processed, {} skipped, {} failed",
        duration.as_secs_f64(),
        report.processed,
        report.skipped,
        report.failed()
    );
    Ok(report)
}

/// Future that resolves on SIGTERM or SIGINT
///
/// Both handlers are installed before this returns, so a signal delivered
/// while a cycle is running is picked up at the next check instead of
/// terminating the process.
pub fn shutdown_signal() -> std::io::Result<impl Future<Output = ()>> {
    let mut terminate = signal(SignalKind::terminate())?;
    let mut interrupt = signal(SignalKind::interrupt())?;
    Ok(async move {
        tokio::select! {
            _ = terminate.recv() => info!("Received SIGTERM"),
            _ = interrupt.recv() => info!("Received SIGINT"),
        }
    })
}

/// Run cycles on `schedule` until `shutdown` resolves
///
/// Credentials are resolved before every cycle. A credential or namespace
/// listing failure ends the loop with an error. Shutdown is only observed
/// between cycles, so an in-flight cycle always completes.
pub async fn run<F>(
    cluster: &dyn ClusterState,
    policy: &ReconcilePolicy,
    credentials: &CredentialSource,
    schedule: Schedule,
    shutdown: F,
) -> Result<(), CycleError>
where
    F: Future<Output = ()>,
{
    tokio::pin!(shutdown);
    let mut cycle: u64 = 0;

    loop {
        cycle += 1;
        let span = info_span!("cycle", cycle);
        async {
            let credential = credentials.resolve().await?;
            run_cycle(cluster, policy, &credential).await
        }
        .instrument(span)
        .await?;

        let Schedule::Every(period) = schedule else {
            return Ok(());
        };

        tokio::select! {
            () = tokio::time::sleep(period) => {}
            () = &mut shutdown => {
                info!("Shutdown requested, stopping after {} cycles", cycle);
                return Ok(());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cluster::{InMemoryCluster, Operation, ResourceKind};
    use crate::constants::ANNOTATION_EXCLUDE;
    use k8s_openapi::api::core::v1::Namespace;
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
    use std::collections::BTreeMap;
    use std::path::PathBuf;

    fn credential() -> DesiredCredential {
        DesiredCredential::new(br#"{"auths":{}}"#.to_vec())
    }

    fn policy() -> ReconcilePolicy {
        ReconcilePolicy {
            config_file_path: PathBuf::from("/nonexistent/aws-configs"),
            ..ReconcilePolicy::default()
        }
    }

    #[tokio::test]
    async fn test_cycle_counts_processed_and_skipped() {
        let cluster = InMemoryCluster::new();
        cluster.add_namespace("default");
        cluster.add_namespace("team-a");
        cluster.insert_namespace(Namespace {
            metadata: ObjectMeta {
                name: Some("kube-system".to_string()),
                annotations: Some(BTreeMap::from([(
                    ANNOTATION_EXCLUDE.to_string(),
                    "true".to_string(),
                )])),
                ..ObjectMeta::default()
            },
            ..Namespace::default()
        });

        let report = run_cycle(&cluster, &policy(), &credential()).await.unwrap();

        assert_eq!(report.processed, 2);
        assert_eq!(report.skipped, 1);
        assert_eq!(report.failed(), 0);
        assert!(cluster.secret("kube-system", "registry").is_none());
    }

    #[tokio::test]
    async fn test_failure_is_isolated_to_its_namespace() {
        let cluster = InMemoryCluster::new();
        cluster.add_namespace("broken");
        cluster.add_namespace("healthy");
        cluster.add_service_account("broken", "default", &[]);
        cluster.inject_failure(Operation::Create, ResourceKind::Secret, Some("broken"), None);

        let report = run_cycle(&cluster, &policy(), &credential()).await.unwrap();

        assert_eq!(report.processed, 1);
        assert_eq!(report.failed(), 1);
        assert_eq!(report.failures[0].namespace(), "broken");
        assert!(cluster.secret("healthy", "registry").is_some());
        // Later reconcilers in the failed namespace did not run
        assert!(cluster.image_pull_secrets("broken", "default").is_empty());
    }

    #[tokio::test]
    async fn test_list_failure_aborts_cycle() {
        let cluster = InMemoryCluster::new();
        cluster.inject_failure(Operation::List, ResourceKind::Namespace, None, None);

        let result = run_cycle(&cluster, &policy(), &credential()).await;

        assert!(matches!(result, Err(CycleError::ListNamespaces(_))));
    }

    #[tokio::test]
    async fn test_run_once_returns_after_one_cycle() {
        let cluster = InMemoryCluster::new();
        cluster.add_namespace("default");
        let source = CredentialSource::Literal(r#"{"auths":{}}"#.to_string());

        run(
            &cluster,
            &policy(),
            &source,
            Schedule::Once,
            std::future::pending(),
        )
        .await
        .unwrap();

        assert!(cluster.secret("default", "registry").is_some());
    }

    #[tokio::test]
    async fn test_loop_stops_on_shutdown() {
        let cluster = InMemoryCluster::new();
        cluster.add_namespace("default");
        let source = CredentialSource::Literal(r#"{"auths":{}}"#.to_string());

        run(
            &cluster,
            &policy(),
            &source,
            Schedule::Every(Duration::from_secs(3600)),
            std::future::ready(()),
        )
        .await
        .unwrap();

        assert!(cluster.secret("default", "registry").is_some());
    }

    #[tokio::test]
    async fn test_sigterm_stops_the_loop() {
        let cluster = InMemoryCluster::new();
        cluster.add_namespace("default");
        let source = CredentialSource::Literal(r#"{"auths":{}}"#.to_string());
        let shutdown = shutdown_signal().unwrap();

        let status = std::process::Command::new("kill")
            .args(["-TERM", &std::process::id().to_string()])
            .status()
            .unwrap();
        assert!(status.success());

        tokio::time::timeout(
            Duration::from_secs(5),
            run(
                &cluster,
                &policy(),
                &source,
                Schedule::Every(Duration::from_secs(3600)),
                shutdown,
            ),
        )
        .await
        .expect("loop did not stop on SIGTERM")
        .unwrap();

        assert!(cluster.secret("default", "registry").is_some());
    }

    #[tokio::test]
    async fn test_unreadable_credential_file_is_fatal() {
        let cluster = InMemoryCluster::new();
        cluster.add_namespace("default");
        let dir = tempfile::tempdir().unwrap();
        let source = CredentialSource::File(dir.path().join("missing.json"));

        let result = run(
            &cluster,
            &policy(),
            &source,
            Schedule::Once,
            std::future::pending(),
        )
        .await;

        assert!(matches!(result, Err(CycleError::Credential { .. })));
        assert!(cluster.calls().is_empty());
    }
}
