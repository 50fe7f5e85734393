//! # Configuration
//!
//! - `controller`: command-line flags with environment fallbacks
//! - `credentials`: where the registry credentials come from
//! - `duration`: loop-period parsing
//! - `policy`: the immutable policy handed to every reconciler

pub mod controller;
pub mod credentials;
pub mod duration;
pub mod policy;

pub use controller::{ControllerArgs, ControllerConfig};
pub use credentials::CredentialSource;
pub use policy::ReconcilePolicy;
