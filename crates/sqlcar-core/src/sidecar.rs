//! Cloud SQL proxy sidecar description
//!
//! `SidecarSpec` is a plain value built once from a `ProxyConfig`. It has no
//! knowledge of the manifest it will be injected into; converting it to a
//! Kubernetes container is done by `sqlcar-kube`.

use crate::config::ProxyConfig;
use crate::error::Result;
use crate::quantity::Quantity;

/// Name of the injected container
pub const PROXY_CONTAINER_NAME: &str = "cloudsql-proxy";
/// Name of the shared credentials volume
pub const CREDENTIALS_VOLUME: &str = "cloudsql-proxy-credentials";
/// Secret backing the credentials volume
pub const CREDENTIALS_SECRET: &str = "cloudsql-proxy-credentials";
/// Where the credentials volume is mounted in the sidecar
pub const CREDENTIALS_MOUNT_PATH: &str = "/secrets/cloudsql";
/// Credential file inside the mounted secret
pub const CREDENTIAL_FILE: &str = "/secrets/cloudsql/credentials.json";
/// Proxy binary inside the image
pub const PROXY_BINARY: &str = "/cloud_sql_proxy";
/// Non-root user the proxy runs as
pub const PROXY_RUN_AS_USER: i64 = 2;

/// CPU and memory amounts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceList {
    pub cpu: Quantity,
    pub memory: Quantity,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceRequirements {
    pub requests: ResourceList,
    pub limits: ResourceList,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SecurityProfile {
    pub run_as_user: i64,
    pub allow_privilege_escalation: bool,
}

impl Default for SecurityProfile {
    fn default() -> Self {
        Self {
            run_as_user: PROXY_RUN_AS_USER,
            allow_privilege_escalation: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VolumeMountSpec {
    pub name: String,
    pub mount_path: String,
    pub read_only: bool,
}

/// The proxy container to inject
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SidecarSpec {
    pub name: String,
    /// Full image reference, `<repository>:<tag>`
    pub image: String,
    pub command: Vec<String>,
    pub resources: ResourceRequirements,
    pub security: SecurityProfile,
    pub volume_mount: VolumeMountSpec,
}

impl SidecarSpec {
    /// Build the sidecar from a configuration
    ///
    /// Fails on the first resource quantity that does not parse.
    pub fn build(config: &ProxyConfig) -> Result<Self> {
        let resources = &config.resources;
        let resources = ResourceRequirements {
            requests: ResourceList {
                cpu: Quantity::parse(&resources.cpu_request)?,
                memory: Quantity::parse(&resources.memory_request)?,
            },
            limits: ResourceList {
                cpu: Quantity::parse(&resources.cpu_limit)?,
                memory: Quantity::parse(&resources.memory_limit)?,
            },
        };

        let command = vec![
            PROXY_BINARY.to_string(),
            format!("-instances={}", config.connection_name()),
            "-log_debug_stdout=true".to_string(),
            format!("-verbose={}", config.verbose),
            format!("-credential_file={}", CREDENTIAL_FILE),
        ];

        let spec = Self {
            name: PROXY_CONTAINER_NAME.to_string(),
            image: format!("{}:{}", config.proxy_image, config.proxy_version),
            command,
            resources,
            security: SecurityProfile::default(),
            volume_mount: VolumeMountSpec {
                name: CREDENTIALS_VOLUME.to_string(),
                mount_path: CREDENTIALS_MOUNT_PATH.to_string(),
                read_only: true,
            },
        };

        tracing::debug!(image = %spec.image, "built proxy sidecar spec");
        Ok(spec)
    }
}
