//! CLI for dsfetch.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use dsfetch_core::config::{self, DsfetchConfig};
use std::path::{Path, PathBuf};

use commands::{run_completions, run_download, run_plan, DownloadRequest};

/// Fetch the datasets listed in a download manifest into a cache directory.
#[derive(Debug, Parser)]
#[command(name = "dsfetch", version)]
#[command(about = "dsfetch: manifest-driven dataset downloader (HTTP, HTTPS, FTP)", long_about = None)]
pub struct Cli {
    /// Read settings from this file instead of ~/.config/dsfetch/config.toml.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Download every manifest entry not already cached.
    Download {
        /// Manifest (YAML list of `url` / `local_name` entries).
        #[arg(short, long, default_value = "download.yaml", value_name = "PATH")]
        manifest: PathBuf,
        /// Cache directory the files are written to.
        #[arg(short, long, default_value = "data/raw", value_name = "DIR")]
        output_dir: PathBuf,
        /// Re-download even when a cached copy exists.
        #[arg(long)]
        force: bool,
        /// Entries fetched in parallel (default from config, 4).
        #[arg(short, long, value_name = "N")]
        jobs: Option<usize>,
        /// Attempts per entry, counting the first (default from config, 3).
        #[arg(long, value_name = "N")]
        retries: Option<u32>,
        /// Write the run report as JSON to this path.
        #[arg(long, value_name = "PATH")]
        report: Option<PathBuf>,
    },

    /// Show what `download` would fetch, without network access.
    Plan {
        #[arg(short, long, default_value = "download.yaml", value_name = "PATH")]
        manifest: PathBuf,
        #[arg(short, long, default_value = "data/raw", value_name = "DIR")]
        output_dir: PathBuf,
        /// Report every entry as to-fetch.
        #[arg(long)]
        force: bool,
    },

    /// Print a shell completion script to stdout.
    Completions {
        shell: clap_complete::Shell,
    },
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();

        match cli.command {
            CliCommand::Download {
                manifest,
                output_dir,
                force,
                jobs,
                retries,
                report,
            } => {
                let cfg = load_config(cli.config.as_deref())?;
                tracing::debug!("loaded config: {:?}", cfg);
                let request = DownloadRequest {
                    manifest,
                    output_dir,
                    force,
                    jobs,
                    retries,
                    report,
                };
                run_download(&cfg, &request).await?;
            }
            CliCommand::Plan {
                manifest,
                output_dir,
                force,
            } => run_plan(&manifest, &output_dir, force)?,
            CliCommand::Completions { shell } => run_completions(shell),
        }

        Ok(())
    }
}

fn load_config(path: Option<&Path>) -> Result<DsfetchConfig> {
    match path {
        Some(p) => config::load_from_path(p),
        None => config::load_or_init(),
    }
}

#[cfg(test)]
mod tests;
