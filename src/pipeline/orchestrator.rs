//! Run orchestration: list projects, fan out walks, join workers, build the report.

use log::{debug, info};
use std::sync::Arc;

use crate::engine::cancel::CancelToken;
use crate::engine::client::CircleCiClient;
use crate::engine::progress::ScanProgress;
use crate::error::{BranchError, ScanError};
use crate::pipeline;

use super::emit::ChunkEmitter;
use super::error_handler::ScanErrors;

/// Outcome of a run whose project listing succeeded.
#[derive(Debug)]
pub struct ScanReport {
    pub projects: usize,
    /// Projects whose walk finished, whether completed or abandoned on failure.
    pub projects_completed: usize,
    pub chunks_emitted: u64,
    /// Branch failures in recording order. At most one per project.
    pub errors: Vec<BranchError>,
}

impl ScanReport {
    pub fn error_count(&self) -> usize {
        self.errors.len()
    }
}

/// Run the whole traversal.
///
/// Lists projects once (a failure here fails the run and nothing is emitted), queues one
/// walk per project on a pool of at most `concurrency` workers, waits for all of them, then
/// hands back the collected branch failures. Returns [`ScanError::Cancelled`] if `cancel`
/// fired at any point.
pub fn run_scan(
    client: Arc<CircleCiClient>,
    emitter: ChunkEmitter,
    concurrency: usize,
    cancel: &CancelToken,
    progress: Arc<ScanProgress>,
) -> Result<ScanReport, ScanError> {
    let projects = client
        .list_projects(cancel)
        .inspect_err(|e| debug!("project listing failed: {}", e))?;
    let total = projects.len();
    progress.start(total);
    info!("found {} projects", total);

    let tuning = pipeline::PipelineTuning::for_projects(concurrency, total);
    debug!("Project workers: {}", tuning.num_workers);
    let channels = pipeline::create_pipeline_channels(&tuning);
    let errors = Arc::new(ScanErrors::with_capacity(total));

    let ctx = pipeline::PipelineContext {
        client,
        emitter,
        cancel: cancel.clone(),
        progress: Arc::clone(&progress),
        errors: Arc::clone(&errors),
    };
    let worker_handles =
        pipeline::spawn_project_workers(channels.project_rx, &ctx, tuning.num_workers);
    drop(ctx);

    for project in projects {
        // Queue holds every project, so this only fails if all workers are gone.
        if channels.project_tx.send(project).is_err() {
            break;
        }
    }
    // Dropping the last sender closes the queue so workers exit when it is drained.
    drop(channels.project_tx);

    for h in worker_handles {
        if h.join().is_err() {
            log::error!("project worker panicked");
        }
    }

    if cancel.is_cancelled() {
        return Err(ScanError::Cancelled);
    }

    if errors.count() > 0 {
        debug!("{} projects abandoned on error", errors.count());
    }
    let errors = errors.take();
    debug!("{}; {} chunks", progress.message(), progress.chunks());

    Ok(ScanReport {
        projects: total,
        projects_completed: progress.done(),
        chunks_emitted: progress.chunks(),
        errors,
    })
}
