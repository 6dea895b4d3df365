//! sqlcar Kube - Kubernetes manifest handling for sqlcar
//!
//! This crate provides:
//! - **Document Splitter**: Split a multi-document manifest and isolate its Deployment
//! - **Manifest Mutator**: Decode the Deployment, append the proxy sidecar and its volume,
//!   re-encode
//! - **Output Assembler**: Put the Deployment back in front of the untouched documents

pub mod assemble;
pub mod classify;
pub mod deployment;
pub mod document;
pub mod error;
pub mod inject;
mod octal;

pub use assemble::assemble;
pub use classify::{SplitManifest, extract_deployment};
pub use deployment::{DeploymentManifest, NamedEntry};
pub use document::{
    DOCUMENT_SEPARATOR, ManifestFormat, RawDocument, ResourceKind, join_documents, split_documents,
};
pub use error::{KubeError, Result};
pub use inject::{credentials_volume, inject_sidecar, sidecar_container};

use sqlcar_core::{ProxyConfig, SidecarSpec};
use std::path::Path;

/// Injects one proxy sidecar into manifests
#[derive(Debug, Clone)]
pub struct Injector {
    sidecar: SidecarSpec,
}

impl Injector {
    /// Validate the configuration and build the sidecar once
    pub fn new(config: &ProxyConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            sidecar: SidecarSpec::build(config)?,
        })
    }

    pub fn sidecar(&self) -> &SidecarSpec {
        &self.sidecar
    }

    /// Rewrite a manifest, returning the full output stream
    pub fn inject(&self, content: &str) -> Result<String> {
        let split = extract_deployment(split_documents(content))?;

        let format = split.deployment.format();
        let mut deployment = DeploymentManifest::decode(&split.deployment)?;
        inject_sidecar(&mut deployment, &self.sidecar)?;
        let encoded = deployment.encode(format)?;

        Ok(assemble(&encoded, &split.others))
    }

    /// Read a manifest file and rewrite it
    pub fn inject_file(&self, path: &Path) -> Result<String> {
        let content = read_manifest(path)?;
        self.inject(&content)
    }
}

/// Read a whole manifest file
pub fn read_manifest(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|source| KubeError::Io {
        path: path.to_path_buf(),
        source,
    })
}
