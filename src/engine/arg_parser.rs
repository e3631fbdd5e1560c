use clap::Parser;
use std::path::PathBuf;

use crate::utils::config::{ApiDefaults, PackagePaths, ScanLimits};

struct DefaultArgs;

impl DefaultArgs {
    pub const NAME: &'static str = "circleci";
}

/// Crawl CircleCI build logs and stream them as provenance-tagged chunks (JSON lines).
#[derive(Clone, Debug, Default, Parser)]
#[command(name = "circlesift")]
#[command(about = "Stream sanitized CircleCI build logs as JSON lines for secret scanning.")]
pub struct Cli {
    /// Config file. Default: `.circlesift.toml` in the working directory, if present.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Source name stamped on every chunk.
    #[arg(long)]
    pub name: Option<String>,

    /// Source identifier stamped on every chunk.
    #[arg(long, default_value_t = 0)]
    pub source_id: i64,

    /// Job identifier of this run.
    #[arg(long, default_value_t = 0)]
    pub job_id: i64,

    /// Max projects crawled at once.
    #[arg(long, short = 'j')]
    pub concurrency: Option<usize>,

    /// Ask downstream detectors to verify findings.
    #[arg(long, num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub verify: Option<bool>,

    /// Write chunks to this file instead of stdout.
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,

    /// Chunk channel capacity; producers block when the writer falls this far behind.
    #[arg(long)]
    pub channel_cap: Option<usize>,

    /// API base URL.
    #[arg(long)]
    pub base_url: Option<String>,

    /// Dashboard host used for build links.
    #[arg(long)]
    pub dashboard_url: Option<String>,

    /// Attempts per request, including the first.
    #[arg(long)]
    pub retries: Option<u32>,

    /// Per-request timeout in seconds.
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Verbose output: debug logs, progress bar, every failed branch.
    #[arg(long, short = 'v', num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub verbose: Option<bool>,
}

impl Cli {
    /// Config path, defaulting to the package config filename in the working directory.
    pub fn config_path(&self) -> PathBuf {
        self.config
            .clone()
            .unwrap_or_else(|| PathBuf::from(PackagePaths::get().config_filename()))
    }

    pub fn name(&self) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| DefaultArgs::NAME.to_string())
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency.unwrap_or(ScanLimits::DEFAULT_CONCURRENCY)
    }

    pub fn channel_cap(&self) -> usize {
        self.channel_cap
            .unwrap_or(ScanLimits::DEFAULT_CHANNEL_CAP)
            .max(1)
    }

    pub fn verbose(&self) -> bool {
        self.verbose.unwrap_or(false)
    }

    pub fn verify(&self) -> bool {
        self.verify.unwrap_or(false)
    }

    pub fn client_opts(&self) -> crate::ClientOpts {
        crate::ClientOpts {
            base_url: self
                .base_url
                .clone()
                .unwrap_or_else(|| ApiDefaults::BASE_URL.to_string()),
            dashboard_url: self
                .dashboard_url
                .clone()
                .unwrap_or_else(|| ApiDefaults::DASHBOARD_URL.to_string()),
            retry_attempts: self.retries.unwrap_or(ApiDefaults::RETRY_ATTEMPTS),
            timeout_secs: self.timeout.unwrap_or(ApiDefaults::TIMEOUT_SECS),
        }
    }
}
