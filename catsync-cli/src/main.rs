//! Deletes deferred drafts that have waited too long for their references.
//!
//! Usage:
//!   catsync-cleanup --project-key my-shop --days 30
//!
//! The access token is read from `CATSYNC_ACCESS_TOKEN`.

use anyhow::Result;
use catsync_cli::{run, Args, CleanupConfig};
use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let log_level = if args.verbose { Level::DEBUG } else { Level::INFO };
    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .compact()
        .init();

    let config = CleanupConfig::from_args(&args)?;
    info!(
        project = %config.store.project_key,
        days = args.days,
        containers = ?config.containers,
        "starting cleanup"
    );

    let stats = run(&config, args.days).await?;
    println!("{}", stats.report_message());
    Ok(())
}
