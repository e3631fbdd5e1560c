//! circlesift CLI: crawl CircleCI build logs and stream them as JSON lines.

use anyhow::Result;
use circlesift::engine::arg_parser::Cli;
use circlesift::engine::handle_run;
use clap::Parser;
use std::time::Instant;

fn main() -> Result<()> {
    let start_time = Instant::now();
    let cli = Cli::parse();
    handle_run(cli)?;
    log::debug!("Total time: {:?}", start_time.elapsed());
    Ok(())
}
