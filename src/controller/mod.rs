//! # Controller
//!
//! Core reconciliation logic for the image pull secret patcher.
//!
//! - `filter`: namespace exclusion rules
//! - `desired`: pure builders for the desired secret and ConfigMap
//! - `classify`: compare fetched objects against the desired state
//! - `parser`: env-style config file parsing
//! - `reconciler`: per-kind reconcilers for one namespace
//! - `driver`: cycle orchestration and scheduling

pub mod classify;
pub mod desired;
pub mod driver;
pub mod filter;
pub mod parser;
pub mod reconciler;
