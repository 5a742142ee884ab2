//! GitHub Dispatch - Container Build Trigger
//!
//! Fires one `repository_dispatch` event of type `container-build` at a GitHub
//! repository, carrying the Penumbra version to build.
//!
//! Exits 0 when GitHub answers with a 2xx status and 1 otherwise.
//!
//! # Usage
//!
//! ```bash
//! # Build from main
//! GITHUB_DISPATCH_TOKEN=ghp_xxx github-dispatch acme/widgets
//!
//! # Build a tagged release
//! GITHUB_DISPATCH_TOKEN=ghp_xxx PENUMBRA_VERSION=v1.2.3 github-dispatch acme/widgets
//! ```

use clap::Parser;
use github_dispatch::{DEFAULT_API_URL, DispatchConfig, DispatchError, dispatch};
use std::{process::ExitCode, time::Duration};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Repository dispatch trigger for container builds.
#[derive(Parser)]
#[command(name = "github-dispatch")]
#[command(about = "Triggers a container-build repository_dispatch on GitHub")]
#[command(version)]
struct Args {
    /// Target repository in owner/name form.
    #[arg(value_name = "GITHUB_REPO")]
    repo: Option<String>,

    /// GitHub API token, sent as a bearer token.
    #[arg(long, env = "GITHUB_DISPATCH_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Penumbra version to build (defaults to main).
    #[arg(long = "version-ref", env = "PENUMBRA_VERSION")]
    version_ref: Option<String>,

    /// GitHub API base URL.
    #[arg(long, env = "GITHUB_DISPATCH_API_URL", default_value = DEFAULT_API_URL)]
    api_url: String,

    /// Request timeout in seconds. Unset leaves the client default.
    #[arg(short, long, env = "GITHUB_DISPATCH_TIMEOUT")]
    timeout: Option<u64>,
}

impl Args {
    fn into_config(self) -> Result<DispatchConfig, DispatchError> {
        Ok(DispatchConfig::new(self.repo, self.token)?
            .with_version(self.version_ref)
            .with_api_url(self.api_url)
            .with_timeout(self.timeout.map(Duration::from_secs)))
    }
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = match Args::try_parse() {
        Ok(args) => args,
        // --help and --version land here too and are not failures
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    init_tracing();

    let config = match args.into_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("github-dispatch: {e}");
            return ExitCode::FAILURE;
        }
    };

    match dispatch(&config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("github-dispatch: {e}");
            ExitCode::FAILURE
        }
    }
}
