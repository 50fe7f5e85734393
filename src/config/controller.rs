//! # Controller Configuration
//!
//! Command-line flags, each with an environment-variable fallback so the
//! controller can be configured from a Deployment's `env` block alone.

use super::credentials::CredentialSource;
use super::duration::parse_duration;
use super::policy::{split_list, ReconcilePolicy};
use crate::constants::{
    DEFAULT_CONFIGMAP_NAME, DEFAULT_CONFIG_FILE_PATH, DEFAULT_LOOP_DURATION, DEFAULT_METRICS_PORT,
    DEFAULT_SECRET_NAME, DEFAULT_SERVICE_ACCOUNT_NAME,
};
use crate::controller::driver::Schedule;
use crate::error::ConfigError;
use clap::{ArgAction, Parser};
use std::path::PathBuf;
use std::time::Duration;

/// Keep a registry pull secret, an env-derived ConfigMap and service account
/// imagePullSecrets in sync across every namespace
#[derive(Debug, Clone, Parser)]
#[command(name = "imagepullsecret-patcher", version)]
#[allow(
    clippy::struct_excessive_bools,
    reason = "Each flag maps one-to-one to a documented command-line switch"
)]
pub struct ControllerArgs {
    /// Force to overwrite secrets and ConfigMaps when they do not match
    #[arg(long, env = "CONFIG_FORCE", default_value_t = true, value_parser = parse_bool, action = ArgAction::Set, num_args = 0..=1, default_missing_value = "true")]
    pub force: bool,

    /// Show DEBUG logs
    #[arg(long, env = "CONFIG_DEBUG", default_value_t = false, value_parser = parse_bool, action = ArgAction::Set, num_args = 0..=1, default_missing_value = "true")]
    pub debug: bool,

    /// Only modify resources annotated as managed by imagepullsecret-patcher
    #[arg(long = "managedonly", env = "CONFIG_MANAGEDONLY", default_value_t = false, value_parser = parse_bool, action = ArgAction::Set, num_args = 0..=1, default_missing_value = "true")]
    pub managed_only: bool,

    /// Run a single update and exit instead of looping
    #[arg(long = "runonce", env = "CONFIG_RUNONCE", default_value_t = false, value_parser = parse_bool, action = ArgAction::Set, num_args = 0..=1, default_missing_value = "true")]
    pub run_once: bool,

    /// If false, patch only the listed service accounts; if true, patch all service accounts
    #[arg(long = "allserviceaccount", env = "CONFIG_ALLSERVICEACCOUNT", default_value_t = true, value_parser = parse_bool, action = ArgAction::Set, num_args = 0..=1, default_missing_value = "true")]
    pub all_service_account: bool,

    /// JSON credential for authenticating the container registry, exclusive with `--dockerconfigjsonpath`
    #[arg(long = "dockerconfigjson", env = "CONFIG_DOCKERCONFIGJSON")]
    pub docker_config_json: Option<String>,

    /// Path to a JSON file containing the registry credentials, exclusive with `--dockerconfigjson`
    #[arg(long = "dockerconfigjsonpath", env = "CONFIG_DOCKERCONFIGJSONPATH")]
    pub docker_config_json_path: Option<PathBuf>,

    /// Name of the managed secret
    #[arg(long = "secretname", env = "CONFIG_SECRETNAME", default_value = DEFAULT_SECRET_NAME)]
    pub secret_name: String,

    /// Comma-separated namespaces excluded from processing
    #[arg(long = "excluded-namespaces", env = "CONFIG_EXCLUDED_NAMESPACES", default_value = "")]
    pub excluded_namespaces: String,

    /// Comma-separated list of service accounts to patch
    #[arg(long = "serviceaccounts", env = "CONFIG_SERVICEACCOUNTS", default_value = DEFAULT_SERVICE_ACCOUNT_NAME)]
    pub service_accounts: String,

    /// Period between reconciliation cycles (e.g. 10s, 1m30s)
    #[arg(long = "loop-duration", env = "CONFIG_LOOP_DURATION", default_value = DEFAULT_LOOP_DURATION, value_parser = parse_duration)]
    pub loop_duration: Duration,

    /// Name of the AWS ConfigMap to be created
    #[arg(long = "aws-configmap-name", env = "CONFIG_AWS_CONFIGMAP_NAME", default_value = DEFAULT_CONFIGMAP_NAME)]
    pub aws_config_map_name: String,

    /// Path to the env-style file the AWS ConfigMap is built from
    #[arg(long = "aws-config-file", env = "CONFIG_AWS_CONFIG_FILE", default_value = DEFAULT_CONFIG_FILE_PATH)]
    pub aws_config_file: PathBuf,

    /// Port for the metrics and health probe server
    #[arg(long = "metrics-port", env = "METRICS_PORT", default_value_t = DEFAULT_METRICS_PORT)]
    pub metrics_port: u16,
}

/// Validated controller configuration
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    pub policy: ReconcilePolicy,
    pub credentials: CredentialSource,
    pub schedule: Schedule,
    pub debug: bool,
    pub metrics_port: u16,
}

impl ControllerArgs {
    /// Validate the flags and split them into policy, credential source and schedule
    pub fn into_config(self) -> Result<ControllerConfig, ConfigError> {
        let credentials =
            CredentialSource::from_settings(self.docker_config_json, self.docker_config_json_path)?;

        let policy = ReconcilePolicy {
            force: self.force,
            managed_only: self.managed_only,
            all_service_accounts: self.all_service_account,
            service_accounts: split_list(&self.service_accounts),
            excluded_namespaces: split_list(&self.excluded_namespaces),
            secret_name: self.secret_name,
            config_map_name: self.aws_config_map_name,
            config_file_path: self.aws_config_file,
        };
        policy.validate()?;

        let schedule = if self.run_once {
            Schedule::Once
        } else {
            Schedule::Every(self.loop_duration)
        };

        Ok(ControllerConfig {
            policy,
            credentials,
            schedule,
            debug: self.debug,
            metrics_port: self.metrics_port,
        })
    }
}

/// Parse a boolean flag value
/// Accepts true/1/yes/on and false/0/no/off, case-insensitive
fn parse_bool(value: &str) -> Result<bool, String> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        other => Err(format!("invalid boolean '{other}'")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> ControllerArgs {
        let mut argv = vec!["imagepullsecret-patcher"];
        argv.extend_from_slice(args);
        ControllerArgs::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_parse_bool_variants() {
        for value in ["true", "TRUE", "1", "yes", "on"] {
            assert_eq!(parse_bool(value), Ok(true), "{value}");
        }
        for value in ["false", "0", "no", "Off"] {
            assert_eq!(parse_bool(value), Ok(false), "{value}");
        }
        assert!(parse_bool("maybe").is_err());
    }

    #[test]
    fn test_defaults() {
        let args = parse(&["--dockerconfigjson", "{}"]);
        assert!(args.force);
        assert!(args.all_service_account);
        assert!(!args.run_once);
        assert_eq!(args.secret_name, "registry");
        assert_eq!(args.loop_duration, Duration::from_secs(10));
        assert_eq!(args.metrics_port, 5000);
    }

    #[test]
    fn test_boolean_flags_take_explicit_values() {
        let args = parse(&["--dockerconfigjson", "{}", "--force=false", "--runonce"]);
        assert!(!args.force);
        assert!(args.run_once);
    }

    #[test]
    fn test_into_config_builds_policy() {
        let config = parse(&[
            "--dockerconfigjson",
            "{}",
            "--excluded-namespaces",
            "kube-system,kube-public",
            "--serviceaccounts",
            "default,builder",
            "--allserviceaccount=false",
            "--loop-duration",
            "1m",
        ])
        .into_config()
        .unwrap();

        assert_eq!(
            config.policy.excluded_namespaces,
            vec!["kube-system", "kube-public"]
        );
        assert_eq!(config.policy.service_accounts, vec!["default", "builder"]);
        assert!(!config.policy.all_service_accounts);
        assert_eq!(config.schedule, Schedule::Every(Duration::from_secs(60)));
        assert_eq!(
            config.credentials,
            CredentialSource::Literal("{}".to_string())
        );
    }

    #[test]
    fn test_run_once_schedule() {
        let config = parse(&["--dockerconfigjsonpath", "/creds", "--runonce=true"])
            .into_config()
            .unwrap();
        assert_eq!(config.schedule, Schedule::Once);
    }

    #[test]
    fn test_conflicting_sources_rejected() {
        let result = parse(&["--dockerconfigjson", "{}", "--dockerconfigjsonpath", "/creds"])
            .into_config();
        assert!(matches!(
            result,
            Err(ConfigError::ConflictingCredentialSources)
        ));
    }

    #[test]
    fn test_invalid_loop_duration_rejected_by_parser() {
        let result = ControllerArgs::try_parse_from([
            "imagepullsecret-patcher",
            "--dockerconfigjson",
            "{}",
            "--loop-duration",
            "soon",
        ]);
        assert!(result.is_err());
    }
}
