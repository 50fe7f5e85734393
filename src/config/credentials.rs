//! # Credential Source
//!
//! Where the registry credentials distributed to every namespace come from.

use crate::controller::desired::DesiredCredential;
use crate::error::{ConfigError, CycleError};
use std::path::PathBuf;

/// Exactly one configured origin of the `.dockerconfigjson` payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialSource {
    /// Payload given inline on the command line or in the environment
    Literal(String),
    /// Payload read from a file, typically a mounted secret
    File(PathBuf),
}

impl CredentialSource {
    /// Pick the source from the two mutually exclusive settings
    ///
    /// Empty values count as unset.
    pub fn from_settings(
        literal: Option<String>,
        path: Option<PathBuf>,
    ) -> Result<Self, ConfigError> {
        let literal = literal.filter(|value| !value.is_empty());
        let path = path.filter(|value| !value.as_os_str().is_empty());

        match (literal, path) {
            (Some(_), Some(_)) => Err(ConfigError::ConflictingCredentialSources),
            (Some(literal), None) => Ok(CredentialSource::Literal(literal)),
            (None, Some(path)) => Ok(CredentialSource::File(path)),
            (None, None) => Err(ConfigError::MissingCredentialSource),
        }
    }

    /// Resolve the payload for one cycle
    ///
    /// File sources are re-read every cycle so a rotated mount is picked up.
    pub async fn resolve(&self) -> Result<DesiredCredential, CycleError> {
        match self {
            CredentialSource::Literal(value) => Ok(DesiredCredential::new(value.as_bytes())),
            CredentialSource::File(path) => {
                let bytes = tokio::fs::read(path)
                    .await
                    .map_err(|source| CycleError::Credential {
                        path: path.clone(),
                        source,
                    })?;
                Ok(DesiredCredential::new(bytes))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_both_sources_conflict() {
        let result = CredentialSource::from_settings(
            Some("{}".to_string()),
            Some(PathBuf::from("/etc/registry/.dockerconfigjson")),
        );
        assert!(matches!(
            result,
            Err(ConfigError::ConflictingCredentialSources)
        ));
    }

    #[test]
    fn test_missing_source() {
        assert!(matches!(
            CredentialSource::from_settings(None, None),
            Err(ConfigError::MissingCredentialSource)
        ));
    }

    #[test]
    fn test_empty_values_count_as_unset() {
        let result =
            CredentialSource::from_settings(Some(String::new()), Some(PathBuf::from("/creds")));
        assert_eq!(result.unwrap(), CredentialSource::File(PathBuf::from("/creds")));
    }

    #[tokio::test]
    async fn test_resolve_literal() {
        let source = CredentialSource::Literal(r#"{"auths":{}}"#.to_string());
        let credential = source.resolve().await.unwrap();
        assert_eq!(credential.as_bytes(), br#"{"auths":{}}"#);
    }

    #[tokio::test]
    async fn test_resolve_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(br#"{"auths":{"registry.example.com":{}}}"#)
            .unwrap();

        let source = CredentialSource::File(file.path().to_path_buf());
        let credential = source.resolve().await.unwrap();
        assert_eq!(
            credential.as_bytes(),
            br#"{"auths":{"registry.example.com":{}}}"#
        );
    }

    #[tokio::test]
    async fn test_resolve_missing_file_fails_cycle() {
        let source = CredentialSource::File(PathBuf::from("/nonexistent/.dockerconfigjson"));
        assert!(matches!(
            source.resolve().await,
            Err(CycleError::Credential { .. })
        ));
    }
}
