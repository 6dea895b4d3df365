//! sqlcar CLI - Inject a Cloud SQL proxy sidecar into a Kubernetes Deployment manifest

use clap::Parser;
use sqlcar_core::ProxyConfig;
use sqlcar_core::config::{
    DEFAULT_CPU_LIMIT, DEFAULT_CPU_REQUEST, DEFAULT_MEMORY_LIMIT, DEFAULT_MEMORY_REQUEST,
    DEFAULT_PROXY_IMAGE, DEFAULT_PROXY_VERSION, DEFAULT_VERBOSE, ResourceConfig,
};
use std::path::PathBuf;
use std::process::ExitCode;

mod error;
mod exit_codes;
mod inject;
mod logging;

use inject::InjectOptions;

#[derive(Parser)]
#[command(name = "sqlcar")]
#[command(author = "sqlcar Contributors")]
#[command(version)]
#[command(about = "Inject a Cloud SQL proxy sidecar into a Kubernetes Deployment manifest", long_about = None)]
struct Cli {
    /// Deployment file path where to inject the proxy (eg. ./my-deploy-manifest.yaml)
    #[arg(long, env = "SQLCAR_PATH")]
    path: PathBuf,

    /// Cloud SQL instance (eg. my-instance or my-instance=tcp:5432)
    #[arg(long, env = "SQLCAR_INSTANCE")]
    instance: String,

    /// GCP region (eg. europe-west1)
    #[arg(long, env = "SQLCAR_REGION")]
    region: String,

    /// GCP project ID
    #[arg(long, env = "SQLCAR_PROJECT")]
    project: String,

    /// CPU request of the sidecar container
    #[arg(long, env = "SQLCAR_CPU_REQUEST", default_value = DEFAULT_CPU_REQUEST)]
    cpu_request: String,

    /// Memory request of the sidecar container
    #[arg(long, env = "SQLCAR_MEMORY_REQUEST", default_value = DEFAULT_MEMORY_REQUEST)]
    memory_request: String,

    /// CPU limit of the sidecar container
    #[arg(long, env = "SQLCAR_CPU_LIMIT", default_value = DEFAULT_CPU_LIMIT)]
    cpu_limit: String,

    /// Memory limit of the sidecar container
    #[arg(long, env = "SQLCAR_MEMORY_LIMIT", default_value = DEFAULT_MEMORY_LIMIT)]
    memory_limit: String,

    /// Cloud SQL proxy version (image tag)
    #[arg(long, env = "SQLCAR_PROXY_VERSION", default_value = DEFAULT_PROXY_VERSION)]
    proxy_version: String,

    /// Cloud SQL proxy image repository
    #[arg(long, env = "SQLCAR_PROXY_IMAGE", default_value = DEFAULT_PROXY_IMAGE)]
    proxy_image: String,

    /// Cloud SQL proxy verbose mode, passed as -verbose=<value>
    #[arg(long, env = "SQLCAR_VERBOSE", default_value = DEFAULT_VERBOSE)]
    verbose: String,

    /// Output file (if not set, outputs to stdout)
    #[arg(short, long, env = "SQLCAR_OUTPUT")]
    output: Option<PathBuf>,

    /// Enable debug output
    #[arg(long)]
    debug: bool,
}

impl Cli {
    fn into_options(self) -> InjectOptions {
        let config = ProxyConfig::new(self.instance, self.region, self.project)
            .with_resources(ResourceConfig {
                cpu_request: self.cpu_request,
                memory_request: self.memory_request,
                cpu_limit: self.cpu_limit,
                memory_limit: self.memory_limit,
            })
            .with_proxy_image(self.proxy_image)
            .with_proxy_version(self.proxy_version)
            .with_verbose(self.verbose);

        InjectOptions {
            path: self.path,
            output: self.output,
            config,
        }
    }
}

fn main() -> ExitCode {
    // Setup miette for nice error display
    miette::set_panic_hook();

    let cli = Cli::parse();
    logging::init(cli.debug);

    match inject::run(&cli.into_options()) {
        Ok(()) => ExitCode::from(exit_codes::SUCCESS),
        Err(err) => {
            let code = err.exit_code();
            eprintln!("{:?}", miette::Report::new(err));
            ExitCode::from(code)
        }
    }
}
