//! Proxy configuration
//!
//! All options are collected once at startup into a `ProxyConfig` and
//! passed explicitly to whatever needs them.

use crate::error::{CoreError, Result};

/// Default CPU request of the sidecar container
pub const DEFAULT_CPU_REQUEST: &str = "5m";
/// Default memory request of the sidecar container
pub const DEFAULT_MEMORY_REQUEST: &str = "8Mi";
/// Default CPU limit of the sidecar container
pub const DEFAULT_CPU_LIMIT: &str = "100m";
/// Default memory limit of the sidecar container
pub const DEFAULT_MEMORY_LIMIT: &str = "128Mi";
/// Default Cloud SQL proxy image tag
pub const DEFAULT_PROXY_VERSION: &str = "1.11";
/// Default Cloud SQL proxy image repository
pub const DEFAULT_PROXY_IMAGE: &str = "gcr.io/cloudsql-docker/gce-proxy";
/// Default value of the proxy's `-verbose` flag
pub const DEFAULT_VERBOSE: &str = "false";

/// Unparsed resource quantities for the sidecar container
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceConfig {
    pub cpu_request: String,
    pub memory_request: String,
    pub cpu_limit: String,
    pub memory_limit: String,
}

impl Default for ResourceConfig {
    fn default() -> Self {
        Self {
            cpu_request: DEFAULT_CPU_REQUEST.to_string(),
            memory_request: DEFAULT_MEMORY_REQUEST.to_string(),
            cpu_limit: DEFAULT_CPU_LIMIT.to_string(),
            memory_limit: DEFAULT_MEMORY_LIMIT.to_string(),
        }
    }
}

/// Everything needed to build the proxy sidecar
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyConfig {
    /// Cloud SQL instance (eg. `my-instance` or `my-instance=tcp:5432`)
    pub instance: String,
    /// GCP region (eg. `europe-west1`)
    pub region: String,
    /// GCP project ID
    pub project: String,
    pub resources: ResourceConfig,
    /// Image repository, without tag
    pub proxy_image: String,
    /// Image tag
    pub proxy_version: String,
    /// Passed verbatim to the proxy as `-verbose=<value>`
    pub verbose: String,
}

impl ProxyConfig {
    /// Create a configuration with default resources, image and verbosity
    pub fn new(
        instance: impl Into<String>,
        region: impl Into<String>,
        project: impl Into<String>,
    ) -> Self {
        Self {
            instance: instance.into(),
            region: region.into(),
            project: project.into(),
            resources: ResourceConfig::default(),
            proxy_image: DEFAULT_PROXY_IMAGE.to_string(),
            proxy_version: DEFAULT_PROXY_VERSION.to_string(),
            verbose: DEFAULT_VERBOSE.to_string(),
        }
    }

    pub fn with_resources(mut self, resources: ResourceConfig) -> Self {
        self.resources = resources;
        self
    }

    pub fn with_proxy_version(mut self, version: impl Into<String>) -> Self {
        self.proxy_version = version.into();
        self
    }

    pub fn with_proxy_image(mut self, image: impl Into<String>) -> Self {
        self.proxy_image = image.into();
        self
    }

    pub fn with_verbose(mut self, verbose: impl Into<String>) -> Self {
        self.verbose = verbose.into();
        self
    }

    /// The `project:region:instance` connection name the proxy expects
    pub fn connection_name(&self) -> String {
        format!("{}:{}:{}", self.project, self.region, self.instance)
    }

    /// Check identifiers before anything is built from them
    ///
    /// Resource quantities are checked later, when the sidecar spec is built.
    pub fn validate(&self) -> Result<()> {
        require_token("instance", &self.instance)?;
        require_token("region", &self.region)?;
        require_token("project", &self.project)?;
        require_token("proxy-version", &self.proxy_version)?;
        require_token("proxy-image", &self.proxy_image)?;

        // These end up inside `project:region:instance`
        for (field, value) in [("region", &self.region), ("project", &self.project)] {
            if value.contains(':') {
                return Err(CoreError::config(field, "must not contain ':'"));
            }
        }

        if self.verbose.chars().any(char::is_whitespace) {
            return Err(CoreError::config("verbose", "must not contain whitespace"));
        }

        Ok(())
    }
}

fn require_token(field: &str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(CoreError::config(field, "must not be empty"));
    }
    if value.chars().any(char::is_whitespace) {
        return Err(CoreError::config(field, "must not contain whitespace"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ProxyConfig {
        ProxyConfig::new("instance-test", "region-test", "project-test")
    }

    #[test]
    fn test_defaults() {
        let config = config();
        assert_eq!(config.resources.cpu_request, "5m");
        assert_eq!(config.resources.memory_request, "8Mi");
        assert_eq!(config.resources.cpu_limit, "100m");
        assert_eq!(config.resources.memory_limit, "128Mi");
        assert_eq!(config.proxy_version, "1.11");
        assert_eq!(config.verbose, "false");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_connection_name() {
        assert_eq!(
            config().connection_name(),
            "project-test:region-test:instance-test"
        );
    }

    #[test]
    fn test_instance_may_carry_port() {
        let config = ProxyConfig::new("my-db=tcp:5432", "europe-west1", "my-project");
        assert!(config.validate().is_ok());
        assert_eq!(
            config.connection_name(),
            "my-project:europe-west1:my-db=tcp:5432"
        );
    }

    #[test]
    fn test_validate_rejects_empty_fields() {
        let err = ProxyConfig::new("", "region", "project").validate().unwrap_err();
        assert_eq!(err, CoreError::config("instance", "must not be empty"));

        let err = config().with_proxy_version("").validate().unwrap_err();
        assert_eq!(err, CoreError::config("proxy-version", "must not be empty"));
    }

    #[test]
    fn test_validate_rejects_whitespace() {
        let err = ProxyConfig::new("inst", "europe west1", "project")
            .validate()
            .unwrap_err();
        assert_eq!(err, CoreError::config("region", "must not contain whitespace"));

        let err = config().with_verbose("tr ue").validate().unwrap_err();
        assert!(matches!(err, CoreError::Config { field, .. } if field == "verbose"));
    }

    #[test]
    fn test_validate_rejects_colon_in_project() {
        let err = ProxyConfig::new("inst", "region", "org:project")
            .validate()
            .unwrap_err();
        insta::assert_snapshot!(err.to_string(), @"Invalid configuration for 'project': must not contain ':'");
    }

    #[test]
    fn test_empty_verbose_is_allowed() {
        assert!(config().with_verbose("").validate().is_ok());
    }
}
