//! CLI command handler: crawl, write chunks as JSON lines, report branch failures.

use anyhow::{Context, Result, bail};
use crossbeam_channel::{Receiver, bounded};
use log::{debug, info};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crate::engine::arg_parser::Cli;
use crate::engine::cancel::CancelToken;
use crate::engine::progress::{ScanProgress, create_progress_bar};
use crate::engine::transport::RetryingClient;
use crate::pipeline::report_scan_errors;
use crate::source::{ChunkSource, CircleCiSource};
use crate::types::{Chunk, Connection, SourceConfig};
use crate::utils::config::PackagePaths;
use crate::utils::{apply_file_to_cli, get_token, load_scan_toml, setup_logging};

/// Merge the config file (explicit `--config` must exist) under the CLI flags.
fn merge_config(mut cli: Cli) -> Result<Cli> {
    let path = cli.config_path();
    match load_scan_toml(&path)? {
        Some(file) => apply_file_to_cli(&file, &mut cli),
        None if cli.config.is_some() => bail!("config file {} not found", path.display()),
        None => {}
    }
    Ok(cli)
}

/// Drain `rx` on a separate thread, writing one JSON object per chunk. Returns chunks written.
fn spawn_chunk_writer(
    rx: Receiver<Chunk>,
    output: Option<PathBuf>,
) -> Result<JoinHandle<Result<usize>>> {
    let sink: Box<dyn Write + Send> = match &output {
        Some(path) => Box::new(
            File::create(path).with_context(|| format!("create output {}", path.display()))?,
        ),
        None => Box::new(std::io::stdout()),
    };
    Ok(thread::spawn(move || {
        let mut w = BufWriter::new(sink);
        let mut written = 0_usize;
        for chunk in rx.iter() {
            serde_json::to_writer(&mut w, &chunk).context("encode chunk")?;
            w.write_all(b"\n").context("write chunk")?;
            written += 1;
        }
        w.flush().context("flush output")?;
        Ok(written)
    }))
}

/// Run one crawl with settings from flags, config file and environment.
pub fn handle_run(cli: Cli) -> Result<()> {
    let cli = merge_config(cli)?;
    setup_logging(cli.verbose());
    debug!("{} CONFIG:{:#?}", PackagePaths::get().pkg_name().to_uppercase(), cli);

    let token = get_token(Path::new("."))?;
    let opts = cli.client_opts();
    let transport = RetryingClient::new(&opts)?;
    let bar = cli.verbose().then(|| create_progress_bar(0, "Scanning"));
    let source = CircleCiSource::with_transport(
        SourceConfig {
            name: cli.name(),
            job_id: cli.job_id,
            source_id: cli.source_id,
            verify: cli.verify(),
            connection: Connection::with_token(token),
            concurrency: cli.concurrency(),
        },
        &opts,
        Arc::new(transport),
    )?
    .with_progress(Arc::new(ScanProgress::new(bar)));

    let cancel = CancelToken::new();
    let cancel_handler = cancel.clone();
    ctrlc::set_handler(move || cancel_handler.cancel()).context("set Ctrl+C handler")?;

    let (tx, rx) = bounded::<Chunk>(cli.channel_cap());
    let writer = spawn_chunk_writer(rx, cli.output.clone())?;
    let result = source.chunks(&tx, &cancel);
    // Last sender gone: the writer sees the channel close and finishes.
    drop(tx);
    let written = writer
        .join()
        .map_err(|_| anyhow::anyhow!("writer thread panicked"))??;

    let report = result.context("CircleCI scan failed")?;
    report_scan_errors(&report.errors, cli.verbose());
    info!(
        "{}/{} projects scanned, {} chunks written, {} failed",
        report.projects_completed,
        report.projects,
        written,
        report.error_count()
    );
    Ok(())
}
