//! Command-line front end for sweeping stale deferred drafts.

use anyhow::{bail, Context, Result};
use catsync_batch::{BatchConfig, BatchExecutor};
use catsync_deferred::{
    Cleanup, CleanupStatistics, HttpKeyValueClient, HttpStoreConfig, KeyValueClient, DEFAULT_CONTAINERS,
};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Parser, Debug, Clone, PartialEq)]
#[command(name = "catsync-cleanup")]
#[command(about = "Delete deferred drafts that have waited too long for their references")]
pub struct Args {
    /// Delete records not modified for this many days (negative deletes all)
    #[arg(short, long, default_value_t = 30, allow_negative_numbers = true)]
    pub days: i64,

    /// Container to sweep; may be repeated (defaults to the built-in containers)
    #[arg(long = "container")]
    pub containers: Vec<String>,

    /// Path to a JSON config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Project key, overriding the config file
    #[arg(long)]
    pub project_key: Option<String>,

    /// API root URL, overriding the config file
    #[arg(long)]
    pub api_url: Option<String>,

    /// Bearer token for the platform API
    #[arg(long, env = "CATSYNC_ACCESS_TOKEN", hide_env_values = true)]
    pub access_token: Option<String>,

    /// Enable verbose debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

/// Settings of a cleanup run, usually read from a JSON file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CleanupConfig {
    pub store: HttpStoreConfig,
    pub containers: Vec<String>,
    pub batch: BatchConfig,
}

impl Default for CleanupConfig {
    fn default() -> Self {
        Self {
            store: HttpStoreConfig::default(),
            containers: DEFAULT_CONTAINERS.iter().map(|c| c.to_string()).collect(),
            batch: BatchConfig::default(),
        }
    }
}

impl CleanupConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        serde_json::from_str(&raw).with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    /// Config file (if any) with command-line overrides applied.
    pub fn from_args(args: &Args) -> Result<Self> {
        let mut config = match &args.config {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        if let Some(project_key) = &args.project_key {
            config.store.project_key = project_key.clone();
        }
        if let Some(api_url) = &args.api_url {
            config.store.api_base_url = api_url.trim_end_matches('/').to_string();
        }
        if let Some(token) = &args.access_token {
            config.store.access_token = token.clone();
        }
        if !args.containers.is_empty() {
            config.containers = args.containers.clone();
        }
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.store.project_key.trim().is_empty() {
            bail!("No project key configured. Pass --project-key or set store.project_key in the config file.");
        }
        if self.store.access_token.is_empty() {
            bail!("No access token configured. Pass --access-token or set CATSYNC_ACCESS_TOKEN.");
        }
        if self.containers.is_empty() {
            bail!("No containers to sweep.");
        }
        Ok(())
    }
}

/// Sweeps the configured containers over HTTP.
pub async fn run(config: &CleanupConfig, days: i64) -> Result<CleanupStatistics> {
    let client = HttpKeyValueClient::new(config.store.clone()).context("Failed to create store client")?;
    sweep(Arc::new(client), config, days).await
}

/// Sweeps the configured containers through `client`.
pub async fn sweep(client: Arc<dyn KeyValueClient>, config: &CleanupConfig, days: i64) -> Result<CleanupStatistics> {
    let cleanup = Cleanup::new(client, BatchExecutor::new(config.batch.clone())).with_page_size(config.store.page_size);
    let stats = cleanup
        .run(&config.containers, days)
        .await
        .context("Cleanup aborted")?;
    Ok(stats)
}
