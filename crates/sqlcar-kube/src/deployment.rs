//! Deployment decoding and encoding
//!
//! Only the path down to the pod template's containers and volumes is typed.
//! Every other field, `metadata` included, is carried in a generic mapping so
//! the re-encoded Deployment keeps whatever the input had, whatever its
//! apiVersion.
//!
//! YAML input is read with the YAML 1.1 integer rules Kubernetes tooling uses,
//! so a plain `defaultMode: 0644` stays the number 420 instead of turning into
//! a string.

use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};

use crate::document::{ManifestFormat, RawDocument};
use crate::error::{KubeError, Result};
use crate::octal::resolve_octal_scalars;

/// A Deployment resource
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentManifest {
    pub api_version: String,
    pub kind: String,
    pub metadata: Mapping,
    pub spec: DeploymentSpec,
    /// Remaining top-level fields (`status`, ...)
    #[serde(flatten)]
    pub extra: Mapping,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeploymentSpec {
    /// `replicas`, `selector`, `strategy`, ...
    #[serde(flatten)]
    pub extra: Mapping,
    pub template: PodTemplate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PodTemplate {
    #[serde(flatten)]
    pub extra: Mapping,
    pub spec: PodSpec,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PodSpec {
    pub containers: Vec<NamedEntry>,
    #[serde(flatten)]
    pub extra: Mapping,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volumes: Option<Vec<NamedEntry>>,
}

/// A container or volume: its name plus all of its other fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedEntry {
    pub name: String,
    #[serde(flatten)]
    pub fields: Mapping,
}

impl DeploymentManifest {
    /// Decode a Deployment document, YAML or JSON
    pub fn decode(document: &RawDocument) -> Result<Self> {
        match document.format() {
            ManifestFormat::Json => Self::from_json(document.body()),
            ManifestFormat::Yaml => Self::from_yaml(document.body()),
        }
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        let content = resolve_octal_scalars(content)?;
        let manifest: Self =
            serde_yaml::from_str(&content).map_err(|e| KubeError::Decode(e.to_string()))?;
        manifest.check_kind()
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let manifest: Self =
            serde_json::from_str(content).map_err(|e| KubeError::Decode(e.to_string()))?;
        manifest.check_kind()
    }

    fn check_kind(self) -> Result<Self> {
        if self.kind != "Deployment" {
            return Err(KubeError::Decode(format!(
                "expected kind Deployment, found {}",
                self.kind
            )));
        }
        Ok(self)
    }

    /// Encode in the given format
    ///
    /// JSON output is pretty-printed and ends with a newline, like YAML output.
    pub fn encode(&self, format: ManifestFormat) -> Result<String> {
        match format {
            ManifestFormat::Yaml => {
                serde_yaml::to_string(self).map_err(|e| KubeError::Encode(e.to_string()))
            }
            ManifestFormat::Json => serde_json::to_string_pretty(self)
                .map(|json| json + "\n")
                .map_err(|e| KubeError::Encode(e.to_string())),
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.metadata.get("name").and_then(Value::as_str)
    }

    /// Pod template containers, in order
    pub fn containers(&self) -> &[NamedEntry] {
        &self.spec.template.spec.containers
    }

    /// Pod template volumes, in order
    pub fn volumes(&self) -> &[NamedEntry] {
        self.spec.template.spec.volumes.as_deref().unwrap_or_default()
    }
}
