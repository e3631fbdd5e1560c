//! Pipeline context: shared data handed to every project worker.

use crossbeam_channel::{Receiver, Sender, bounded};
use std::sync::Arc;

use crate::engine::cancel::CancelToken;
use crate::engine::client::CircleCiClient;
use crate::engine::progress::ScanProgress;
use crate::types::Project;

use super::emit::ChunkEmitter;
use super::error_handler::ScanErrors;

/// Worker count and queue size for one run.
#[derive(Clone, Debug)]
pub struct PipelineTuning {
    pub num_workers: usize,
    /// Capacity of the project queue; all projects are enqueued up front.
    pub queue_cap: usize,
}

impl PipelineTuning {
    /// `concurrency` workers, never more than there are projects, never fewer than one.
    pub fn for_projects(concurrency: usize, projects: usize) -> Self {
        Self {
            num_workers: concurrency.min(projects).max(1),
            queue_cap: projects.max(1),
        }
    }
}

/// Shared context for the project walk. Cloned into each worker thread; every field is
/// either immutable or internally synchronized.
#[derive(Clone)]
pub struct PipelineContext {
    pub client: Arc<CircleCiClient>,
    pub emitter: ChunkEmitter,
    pub cancel: CancelToken,
    pub progress: Arc<ScanProgress>,
    pub errors: Arc<ScanErrors>,
}

/// Project queue: the scheduler fills `project_tx` and drops it; workers drain `project_rx`.
pub struct PipelineChannels {
    pub project_tx: Sender<Project>,
    pub project_rx: Receiver<Project>,
}

pub fn create_pipeline_channels(tuning: &PipelineTuning) -> PipelineChannels {
    let (project_tx, project_rx) = bounded::<Project>(tuning.queue_cap);
    PipelineChannels {
        project_tx,
        project_rx,
    }
}
