//! # Namespace Filter
//!
//! Decides whether a namespace takes part in reconciliation.

use crate::constants::ANNOTATION_EXCLUDE;
use k8s_openapi::api::core::v1::Namespace;

/// True if the namespace opts out by annotation or is on the exclusion list
///
/// The annotation must be exactly `"true"`. List entries are compared
/// literally, so an entry with stray whitespace never matches.
pub fn is_excluded(namespace: &Namespace, excluded: &[String]) -> bool {
    let annotated = namespace
        .metadata
        .annotations
        .as_ref()
        .and_then(|annotations| annotations.get(ANNOTATION_EXCLUDE))
        .is_some_and(|value| value == "true");
    if annotated {
        return true;
    }

    let name = namespace.metadata.name.as_deref().unwrap_or_default();
    excluded.iter().any(|entry| entry == name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::policy::split_list;
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
    use std::collections::BTreeMap;

    fn namespace(name: &str, annotation: Option<&str>) -> Namespace {
        Namespace {
            metadata: ObjectMeta {
                name: Some(name.to_string()),
                annotations: annotation.map(|value| {
                    BTreeMap::from([(ANNOTATION_EXCLUDE.to_string(), value.to_string())])
                }),
                ..ObjectMeta::default()
            },
            ..Namespace::default()
        }
    }

    #[test]
    fn test_empty_list_excludes_nothing() {
        assert!(!is_excluded(&namespace("kube-system", None), &split_list("")));
    }

    #[test]
    fn test_listed_namespace_is_excluded() {
        let excluded = split_list("kube-system,other-namespace");
        assert!(is_excluded(&namespace("kube-system", None), &excluded));
    }

    #[test]
    fn test_unlisted_namespace_is_included() {
        let excluded = split_list("default,other-namespace");
        assert!(!is_excluded(&namespace("kube-system", None), &excluded));
    }

    #[test]
    fn test_annotation_true_excludes_regardless_of_list() {
        assert!(is_excluded(&namespace("kube-system", Some("true")), &split_list("")));
    }

    #[test]
    fn test_annotation_must_be_exactly_true() {
        for value in ["True", "yes", "1", "false", " true"] {
            assert!(
                !is_excluded(&namespace("team-a", Some(value)), &split_list("")),
                "annotation value '{value}' should not exclude"
            );
        }
    }

    #[test]
    fn test_list_entries_are_not_trimmed() {
        let excluded = split_list("default, kube-system");
        assert!(!is_excluded(&namespace("kube-system", None), &excluded));
        assert!(is_excluded(&namespace("default", None), &excluded));
    }

    #[test]
    fn test_whitespace_entry_never_matches() {
        let excluded = split_list(" , ");
        assert!(!is_excluded(&namespace("default", None), &excluded));
    }
}
