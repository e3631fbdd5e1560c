//! circlesift: crawl CircleCI projects → builds → steps → action logs and stream each
//! sanitized log as a provenance-tagged [`Chunk`] for secret scanning.

pub mod engine;
pub mod error;
pub mod pipeline;
pub mod source;
pub mod types;
pub mod utils;

/// Re-export types for API
pub use types::*;

pub use engine::CancelToken;
pub use error::{Branch, BranchError, ScanError};
pub use pipeline::ScanReport;
pub use source::{ChunkSource, CircleCiSource};

use crossbeam_channel::Sender;
use log::debug;

/// Single entry point: initialize a CircleCI source from `config` and stream all chunks into `tx`.
///
/// Fails only if initialization fails or the project listing fails (nothing is emitted then).
/// Failures further down the tree abandon the affected project and are returned in
/// [`ScanReport::errors`]; the run itself still succeeds.
///
/// ```ignore
/// let (tx, rx) = crossbeam_channel::bounded(64);
/// let config = SourceConfig { name: "ci".into(), job_id: 1, source_id: 1, verify: false,
///     connection: Connection::with_token(token), concurrency: 8 };
/// let report = circlesift::scan(config, &tx, &CancelToken::new())?;
/// ```
pub fn scan(
    config: SourceConfig,
    tx: &Sender<Chunk>,
    cancel: &CancelToken,
) -> Result<ScanReport, ScanError> {
    let source = CircleCiSource::init(config)?;
    debug!(
        "{} scanning as {:?} with concurrency {}",
        env!("CARGO_PKG_NAME"),
        source.name(),
        source.concurrency()
    );
    source.chunks(tx, cancel)
}
