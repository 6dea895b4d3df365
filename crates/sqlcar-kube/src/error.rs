//! Error types for sqlcar-kube

use std::path::PathBuf;
use thiserror::Error;

/// Result type for sqlcar-kube operations
pub type Result<T> = std::result::Result<T, KubeError>;

/// Errors that can occur while rewriting a manifest
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum KubeError {
    /// A document's kind could not be determined
    #[error("cannot read document #{index}: {message}")]
    Parse { index: usize, message: String },

    /// No Deployment in the manifest
    #[error("could not find a Deployment resource in the manifest")]
    NotFound,

    /// More than one Deployment in the manifest
    #[error("found {count} Deployment resources (documents {}), expected exactly one", format_indices(.indices))]
    MultipleDeployments { count: usize, indices: Vec<usize> },

    /// The Deployment does not have the expected shape
    #[error("invalid Deployment: {0}")]
    Decode(String),

    /// The pod template already has an entry with the injected name
    #[error("pod template already has a {kind} named '{name}'")]
    NameConflict { kind: &'static str, name: String },

    /// The mutated Deployment could not be serialized
    #[error("cannot encode Deployment: {0}")]
    Encode(String),

    /// Reading the manifest failed
    #[error("cannot read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Sidecar configuration error
    #[error(transparent)]
    Core(#[from] sqlcar_core::CoreError),
}

fn format_indices(indices: &[usize]) -> String {
    indices
        .iter()
        .map(|i| format!("#{}", i))
        .collect::<Vec<_>>()
        .join(", ")
}

impl KubeError {
    /// Whether the error comes from the manifest content rather than the environment
    pub fn is_manifest_error(&self) -> bool {
        matches!(
            self,
            KubeError::Parse { .. }
                | KubeError::NotFound
                | KubeError::MultipleDeployments { .. }
                | KubeError::Decode(_)
                | KubeError::NameConflict { .. }
        )
    }
}
