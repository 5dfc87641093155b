use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;

pub fn run(args: Cli) -> Result<()> {
    initialise_tracing();
    tracing::info!(link = %args.link, destination = %args.destination.display(), "importing IRMF shader");
    let project = irmf::import(&args.link, &args.destination)
        .with_context(|| format!("importing IRMF shader from '{}'", args.link))?;
    tracing::info!(project = %project.display(), "project bundle generated");
    // The host application opens the project from this path.
    println!("{}", project.display());
    Ok(())
}

fn initialise_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}
