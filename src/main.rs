// Changelog Service entry point
use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use tracing::info;

use changelog_service::{
    init_logging_with_level, start_server, ProcessRunner, ServiceConfig, TokioProcessRunner,
};

/// HTTP API for generating changelogs from git repositories via git-cliff
#[derive(Parser, Debug)]
#[command(name = "changelog-service", version, about)]
struct Args {
    /// Port to listen on (overrides the PORT environment variable)
    #[arg(short, long)]
    port: Option<u16>,

    /// Enable verbose (debug) logging
    #[arg(short, long)]
    verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long)]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = ServiceConfig::from_env()?;
    if let Some(port) = args.port {
        config.port = port;
    }

    init_logging_with_level(args.verbose || config.debug, args.quiet)?;

    // Make sure the workspace root exists before accepting requests
    std::fs::create_dir_all(&config.work_root)?;

    info!("GitLab URL: {}", config.gitlab_url);

    let config = Arc::new(config);
    let runner: Arc<dyn ProcessRunner> = Arc::new(TokioProcessRunner);

    start_server(config, runner).await
}
