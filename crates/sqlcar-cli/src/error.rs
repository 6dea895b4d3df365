//! CLI error types with exit code handling
//!
//! Every library error ends up here, gets a diagnostic code and help text,
//! and is mapped to an exit code by the single handler in `main`.

use miette::Diagnostic;
use sqlcar_core::CoreError;
use sqlcar_kube::KubeError;
use thiserror::Error;

use crate::exit_codes;

/// CLI-specific error type that includes exit code information
#[derive(Error, Debug, Diagnostic, Clone)]
pub enum CliError {
    /// Invalid option value or resource quantity
    #[error("Configuration error: {message}")]
    #[diagnostic(code(sqlcar::cli::config))]
    Config {
        message: String,
        #[help]
        help: Option<String>,
    },

    /// The manifest cannot be rewritten
    #[error("Manifest error: {message}")]
    #[diagnostic(code(sqlcar::cli::manifest))]
    Manifest {
        message: String,
        #[help]
        help: Option<String>,
    },

    /// IO error (file not found, permissions, etc.)
    #[error("IO error: {message}")]
    #[diagnostic(code(sqlcar::cli::io))]
    Io { message: String },

    /// Internal error (unexpected failure)
    #[error("Internal error: {message}")]
    #[diagnostic(code(sqlcar::cli::internal))]
    Internal { message: String },
}

impl CliError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> u8 {
        match self {
            CliError::Config { .. } => exit_codes::CONFIG_ERROR,
            CliError::Manifest { .. } => exit_codes::MANIFEST_ERROR,
            CliError::Io { .. } => exit_codes::IO_ERROR,
            CliError::Internal { .. } => exit_codes::ERROR,
        }
    }

    fn config_with_help(message: impl Into<String>, help: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            help: Some(help.into()),
        }
    }

    fn manifest(message: impl Into<String>, help: Option<&str>) -> Self {
        Self::Manifest {
            message: message.into(),
            help: help.map(String::from),
        }
    }

    /// Create an IO error from std::io::Error
    pub fn io(context: impl std::fmt::Display, err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{}: {}", context, err),
        }
    }
}

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        let help = match &err {
            CoreError::Config { field, .. } => format!("Check the --{} option", field),
            CoreError::QuantityParse { .. } => {
                "Quantities look like 5m, 0.5, 8Mi or 1Gi".to_string()
            }
        };
        CliError::config_with_help(err.to_string(), help)
    }
}

impl From<KubeError> for CliError {
    fn from(err: KubeError) -> Self {
        let help = match &err {
            KubeError::Core(core) => return CliError::from(core.clone()),
            KubeError::Io { .. } => {
                return CliError::Io {
                    message: err.to_string(),
                };
            }
            KubeError::Encode(_) => {
                return CliError::Internal {
                    message: err.to_string(),
                };
            }
            KubeError::NotFound => {
                Some("The file must contain exactly one resource of kind Deployment")
            }
            KubeError::MultipleDeployments { .. } => {
                Some("Split the file so that each one holds a single Deployment")
            }
            KubeError::NameConflict { .. } => Some("The proxy sidecar looks already injected"),
            KubeError::Decode(_) => {
                Some("A Deployment needs apiVersion, kind, metadata and spec.template.spec.containers")
            }
            _ => None,
        };
        CliError::manifest(err.to_string(), help)
    }
}

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;
