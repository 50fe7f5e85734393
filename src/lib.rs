//! # Image Pull Secret Patcher
//!
//! Keeps a registry pull secret, an env-derived ConfigMap and service account
//! `imagePullSecrets` references in sync across every namespace of a cluster.
//!
//! - `cluster`: the narrow cluster-state seam (Kubernetes and in-memory)
//! - `config`: command-line configuration and the reconcile policy
//! - `controller`: classification, reconcilers and the cycle driver
//! - `observability`: Prometheus metrics
//! - `server`: metrics and probe endpoints

pub mod cluster;
pub mod config;
pub mod constants;
pub mod controller;
pub mod error;
pub mod observability;
pub mod server;
