use crossbeam_channel::Receiver;
use log::debug;
use std::thread::{self, JoinHandle};

use crate::types::Project;

use super::context::PipelineContext;
use super::walk::{ProjectOutcome, walk_project};

/// Single project worker: take projects from `project_rx` until the queue is drained or the
/// run is cancelled. Failures go to the run's error list; the worker keeps going.
fn project_worker_loop(project_rx: Receiver<Project>, ctx: PipelineContext) {
    while let Ok(project) = project_rx.recv() {
        if ctx.cancel.is_cancelled() {
            break;
        }
        match walk_project(&ctx, &project) {
            ProjectOutcome::Completed { chunks } => {
                debug!("{}: {} chunks", project, chunks);
            }
            ProjectOutcome::Failed(err) => {
                debug!("{}", err);
                ctx.errors.add(err);
            }
            ProjectOutcome::Cancelled => break,
        }
        let done = ctx.progress.project_done();
        debug!("scanned {}/{} projects", done, ctx.progress.total());
    }
}

/// Spawn `num_workers` project workers. The caller must drop its project sender so workers
/// exit once the queue is empty.
pub fn spawn_project_workers(
    project_rx: Receiver<Project>,
    ctx: &PipelineContext,
    num_workers: usize,
) -> Vec<JoinHandle<()>> {
    (0..num_workers)
        .map(|_| {
            let project_rx = project_rx.clone();
            let ctx = ctx.clone();
            thread::spawn(move || project_worker_loop(project_rx, ctx))
        })
        .collect()
}
