//! sqlcar Core - Core types for injecting a Cloud SQL proxy sidecar
//!
//! This crate provides the Kubernetes-agnostic building blocks:
//! - `ProxyConfig`: The validated configuration, built once at startup
//! - `Quantity`: Resource quantity strings (`5m`, `128Mi`) with their numeric value
//! - `SidecarSpec`: The proxy container description derived from the configuration

pub mod config;
pub mod error;
pub mod quantity;
pub mod sidecar;

pub use config::{ProxyConfig, ResourceConfig};
pub use error::{CoreError, Result};
pub use quantity::Quantity;
pub use sidecar::{
    CREDENTIALS_MOUNT_PATH, CREDENTIALS_SECRET, CREDENTIALS_VOLUME, PROXY_CONTAINER_NAME,
    ResourceList, ResourceRequirements, SecurityProfile, SidecarSpec, VolumeMountSpec,
};
