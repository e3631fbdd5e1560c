//! Pipeline components: context, project workers, walk, emission, error collection.

pub mod context;
pub mod emit;
pub mod error_handler;
pub mod orchestrator;
pub mod walk;
pub mod worker;

pub use context::{PipelineChannels, PipelineContext, PipelineTuning, create_pipeline_channels};
pub use emit::{ChunkEmitter, SourceContext};
pub use error_handler::{ScanErrors, report_scan_errors};
pub use orchestrator::{ScanReport, run_scan};
pub use walk::{ProjectOutcome, walk_project};
pub use worker::spawn_project_workers;
