//! # ise-provider
//!
//! Applies or destroys a manifest of ISE objects.
//!
//! ```bash
//! ise-provider --config ise.toml apply --manifest demos/site.toml
//! ise-provider destroy --manifest demos/site.toml
//! ```
//!
//! The store behind the ERS API lives in this process, so nothing persists
//! between runs. `apply` therefore applies the manifest twice, showing that
//! the second pass converges without changes, and `destroy` applies before
//! tearing everything down.

use clap::{Parser, Subcommand};
use ise_provider::config::ProviderConfig;
use ise_provider::lifecycle::ProviderSystem;
use ise_provider::manifest::Manifest;
use ise_provider::ProviderError;
use ise_reconcile::telemetry::setup_tracing_with;
use std::path::PathBuf;
use tracing::{error, info, Instrument};

#[derive(Debug, Parser)]
#[command(name = "ise-provider", version, about = "Declarative Cisco ISE objects")]
struct Cli {
    /// Provider configuration file; `ISE_*` variables override it.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Create, adopt or update every resource in the manifest.
    Apply {
        #[arg(long, value_name = "PATH")]
        manifest: PathBuf,
    },
    /// Apply the manifest, then delete everything it manages.
    Destroy {
        #[arg(long, value_name = "PATH")]
        manifest: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<(), ProviderError> {
    let cli = Cli::parse();
    let config = ProviderConfig::load(cli.config.as_deref())?;
    setup_tracing_with(config.debug);

    let mut system = ProviderSystem::new(&config);
    let result = run(&mut system, cli.command).await;
    if let Err(e) = &result {
        error!(error = %e, "Run failed");
    }

    system.shutdown().await?;
    result
}

async fn run(system: &mut ProviderSystem, command: Command) -> Result<(), ProviderError> {
    match command {
        Command::Apply { manifest } => {
            let manifest = Manifest::load(&manifest)?;

            let report = system
                .workspace
                .apply(&manifest)
                .instrument(tracing::info_span!("apply"))
                .await?;
            print!("{report}");

            let report = system
                .workspace
                .apply(&manifest)
                .instrument(tracing::info_span!("converge"))
                .await?;
            info!(noop = report.is_noop(), "Second pass finished");
            print!("{report}");
        }
        Command::Destroy { manifest } => {
            let manifest = Manifest::load(&manifest)?;

            system
                .workspace
                .apply(&manifest)
                .instrument(tracing::info_span!("apply"))
                .await?;
            let report = system
                .workspace
                .destroy()
                .instrument(tracing::info_span!("destroy"))
                .await?;
            print!("{report}");
        }
    }
    Ok(())
}
