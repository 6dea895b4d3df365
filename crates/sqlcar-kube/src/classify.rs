//! Isolating the Deployment from the other documents

use tracing::{debug, warn};

use crate::document::RawDocument;
use crate::error::{KubeError, Result};

/// A manifest split into its single Deployment and everything else
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitManifest {
    pub deployment: RawDocument,
    /// Every other document, in file order
    pub others: Vec<RawDocument>,
}

/// Partition documents by kind
///
/// Exactly one document must be a Deployment. Documents without a kind
/// (blank ones included) are kept with the others.
pub fn extract_deployment(documents: Vec<RawDocument>) -> Result<SplitManifest> {
    let mut deployments = Vec::new();
    let mut others = Vec::new();

    for document in documents {
        match document.kind()? {
            Some(kind) if kind.is_deployment() => {
                debug!(index = document.index(), "found Deployment");
                deployments.push(document);
            }
            Some(kind) => {
                debug!(index = document.index(), %kind, "passing document through");
                others.push(document);
            }
            None => {
                if document.is_blank() {
                    warn!(index = document.index(), "passing empty document through");
                } else {
                    debug!(index = document.index(), "passing document without kind through");
                }
                others.push(document);
            }
        }
    }

    if deployments.len() > 1 {
        return Err(KubeError::MultipleDeployments {
            count: deployments.len(),
            indices: deployments.iter().map(RawDocument::index).collect(),
        });
    }

    let deployment = deployments.pop().ok_or(KubeError::NotFound)?;
    Ok(SplitManifest { deployment, others })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::split_documents;

    const SERVICE: &str = "apiVersion: v1\nkind: Service\nmetadata:\n  name: web";
    const DEPLOYMENT: &str = "apiVersion: apps/v1\nkind: Deployment\nmetadata:\n  name: web";
    const CONFIG_MAP: &str = "apiVersion: v1\nkind: ConfigMap\nmetadata:\n  name: cfg\n";

    #[test]
    fn test_extract_keeps_others_in_order() {
        let input = format!("{}\n---\n{}\n---\n{}", SERVICE, DEPLOYMENT, CONFIG_MAP);
        let split = extract_deployment(split_documents(&input)).unwrap();

        assert_eq!(split.deployment.content(), DEPLOYMENT);
        assert_eq!(split.deployment.index(), 1);
        let others: Vec<_> = split.others.iter().map(RawDocument::content).collect();
        assert_eq!(others, vec![SERVICE, CONFIG_MAP]);
    }

    #[test]
    fn test_extract_passes_blank_and_kindless_documents() {
        let input = format!("# header only\n---\n{}\n---\nfoo: bar\n", DEPLOYMENT);
        let split = extract_deployment(split_documents(&input)).unwrap();

        assert_eq!(split.others.len(), 2);
        assert_eq!(split.others[0].content(), "# header only");
        assert_eq!(split.others[1].content(), "foo: bar\n");
    }

    #[test]
    fn test_extract_without_deployment() {
        let input = format!("{}\n---\n{}", SERVICE, CONFIG_MAP);
        let err = extract_deployment(split_documents(&input)).unwrap_err();
        assert!(matches!(err, KubeError::NotFound));
    }

    #[test]
    fn test_extract_empty_input() {
        let err = extract_deployment(split_documents("")).unwrap_err();
        assert!(matches!(err, KubeError::NotFound));
    }

    #[test]
    fn test_extract_multiple_deployments() {
        let input = format!("{}\n---\n{}\n---\n{}", DEPLOYMENT, SERVICE, DEPLOYMENT);
        let err = extract_deployment(split_documents(&input)).unwrap_err();
        match err {
            KubeError::MultipleDeployments { count, indices } => {
                assert_eq!(count, 2);
                assert_eq!(indices, vec![0, 2]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_extract_stops_on_unreadable_document() {
        let input = format!("{}\n---\n- not\n- a mapping\n", DEPLOYMENT);
        let err = extract_deployment(split_documents(&input)).unwrap_err();
        assert!(matches!(err, KubeError::Parse { index: 1, .. }));
    }
}
