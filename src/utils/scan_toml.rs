//! Load `.circlesift.toml` (CLI only). Lib callers pass [`SourceConfig`](crate::SourceConfig)
//! and [`ClientOpts`](crate::ClientOpts) directly.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

use crate::engine::arg_parser::Cli;

#[derive(Debug, Default, Deserialize)]
pub struct ScanToml {
    #[serde(default)]
    pub settings: ScanSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScanSection {
    pub name: Option<String>,
    pub concurrency: Option<usize>,
    pub verify: Option<bool>,
    pub output: Option<String>,
    pub channel_cap: Option<usize>,
    pub base_url: Option<String>,
    pub dashboard_url: Option<String>,
    pub retries: Option<u32>,
    pub timeout: Option<u64>,
    pub verbose: Option<bool>,
}

/// Parse a config file body.
pub fn parse_scan_toml(s: &str) -> Result<ScanToml, toml::de::Error> {
    toml::from_str(s)
}

/// Load the config file at `path`. `Ok(None)` when the file does not exist.
pub fn load_scan_toml(path: &Path) -> Result<Option<ScanToml>> {
    if !path.is_file() {
        return Ok(None);
    }
    let s = std::fs::read_to_string(path)
        .with_context(|| format!("read config {}", path.display()))?;
    let file = parse_scan_toml(&s).with_context(|| format!("parse config {}", path.display()))?;
    Ok(Some(file))
}

/// Fill CLI fields from file values where the flag was not given.
macro_rules! apply_file_opt {
    ($file:expr, $cli:expr, $field:ident) => {
        if $cli.$field.is_none() {
            $cli.$field = $file.$field.clone();
        }
    };
}

/// Merge file settings under the CLI: flags win, file fills the gaps.
pub fn apply_file_to_cli(file: &ScanToml, cli: &mut Cli) {
    let s = &file.settings;
    apply_file_opt!(s, cli, name);
    apply_file_opt!(s, cli, concurrency);
    apply_file_opt!(s, cli, verify);
    apply_file_opt!(s, cli, channel_cap);
    apply_file_opt!(s, cli, base_url);
    apply_file_opt!(s, cli, dashboard_url);
    apply_file_opt!(s, cli, retries);
    apply_file_opt!(s, cli, timeout);
    apply_file_opt!(s, cli, verbose);
    if cli.output.is_none() {
        cli.output = s.output.as_ref().map(Into::into);
    }
}
