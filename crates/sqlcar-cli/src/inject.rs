//! Inject command - rewrite a manifest with the proxy sidecar

use sqlcar_core::ProxyConfig;
use sqlcar_kube::Injector;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{CliError, Result};

/// Everything the command needs, resolved from flags and environment
#[derive(Debug, Clone)]
pub struct InjectOptions {
    pub path: PathBuf,
    pub output: Option<PathBuf>,
    pub config: ProxyConfig,
}

pub fn run(options: &InjectOptions) -> Result<()> {
    // Configuration problems surface before the manifest is touched
    let injector = Injector::new(&options.config)?;
    debug!(
        connection = %options.config.connection_name(),
        image = %injector.sidecar().image,
        "configuration is valid"
    );

    let output = injector.inject_file(&options.path)?;

    match &options.output {
        Some(path) => write_file(path, &output),
        None => write_stdout(&output),
    }
}

fn write_file(path: &Path, content: &str) -> Result<()> {
    fs::write(path, content)
        .map_err(|e| CliError::io(format!("cannot write {}", path.display()), e))?;
    debug!(path = %path.display(), "wrote manifest");
    Ok(())
}

fn write_stdout(content: &str) -> Result<()> {
    let mut stdout = std::io::stdout().lock();
    stdout
        .write_all(content.as_bytes())
        .and_then(|()| stdout.flush())
        .map_err(|e| CliError::io("cannot write to stdout", e))
}
