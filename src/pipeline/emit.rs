//! Chunk construction and delivery to the shared output channel.

use crossbeam_channel::{Sender, select};

use crate::engine::cancel::CancelToken;
use crate::engine::client::Endpoints;
use crate::error::ScanError;
use crate::types::{
    Action, Build, Chunk, CircleCiMetadata, Project, SourceMetadata, SourceType,
};

/// Identity stamped on every chunk of a run.
#[derive(Clone, Debug)]
pub struct SourceContext {
    pub source_type: SourceType,
    pub source_name: String,
    pub source_id: i64,
    pub verify: bool,
}

/// Builds provenance-tagged chunks and sends them on `tx`. One clone per worker.
#[derive(Clone)]
pub struct ChunkEmitter {
    tx: Sender<Chunk>,
    source: SourceContext,
    endpoints: Endpoints,
}

impl ChunkEmitter {
    pub fn new(tx: Sender<Chunk>, source: SourceContext, endpoints: Endpoints) -> Self {
        Self {
            tx,
            source,
            endpoints,
        }
    }

    pub fn build_chunk(
        &self,
        project: &Project,
        build: Build,
        step_name: &str,
        data: Vec<u8>,
    ) -> Chunk {
        Chunk {
            source_type: self.source.source_type,
            source_name: self.source.source_name.clone(),
            source_id: self.source.source_id,
            data,
            source_metadata: SourceMetadata::CircleCi(CircleCiMetadata {
                vcs_type: project.vcs.clone(),
                username: project.username.clone(),
                repository: project.reponame.clone(),
                build_number: build.build_num as i64,
                build_step: step_name.to_string(),
                link: self.endpoints.build_link(project, build),
            }),
            verify: self.source.verify,
        }
    }

    /// Blocking send of the chunk for `action`. Waits while the channel is full; gives up
    /// with [`ScanError::Cancelled`] on cancel and [`ScanError::Write`] if the consumer is gone.
    pub fn emit(
        &self,
        project: &Project,
        build: Build,
        step_name: &str,
        action: &Action,
        sanitized: Vec<u8>,
        cancel: &CancelToken,
    ) -> Result<(), ScanError> {
        if cancel.is_cancelled() {
            return Err(ScanError::Cancelled);
        }
        let chunk = self.build_chunk(project, build, step_name, sanitized);
        log::trace!(
            "emit {} build {} step {:?} action {}",
            project,
            build.build_num,
            step_name,
            action.index
        );
        select! {
            send(self.tx, chunk) -> res => res.map_err(|_| ScanError::Write),
            recv(cancel.closed()) -> _ => Err(ScanError::Cancelled),
        }
    }
}
