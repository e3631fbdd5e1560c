//! CircleCI source: init from a [`SourceConfig`], then stream chunks with [`ChunkSource::chunks`].

use crossbeam_channel::Sender;
use log::warn;
use std::sync::Arc;

use crate::engine::cancel::CancelToken;
use crate::engine::client::{CircleCiClient, Endpoints};
use crate::engine::progress::ScanProgress;
use crate::engine::transport::{RetryingClient, Transport};
use crate::error::ScanError;
use crate::pipeline::{ChunkEmitter, ScanReport, SourceContext, run_scan};
use crate::types::{Chunk, ClientOpts, Credential, SourceConfig, SourceType};

/// A producer of chunks for the scanning pipeline.
pub trait ChunkSource {
    fn source_type(&self) -> SourceType;
    fn source_id(&self) -> i64;
    fn job_id(&self) -> i64;

    /// Stream every chunk of the source into `tx`. Never closes or reads `tx`.
    fn chunks(&self, tx: &Sender<Chunk>, cancel: &CancelToken) -> Result<ScanReport, ScanError>;
}

pub struct CircleCiSource {
    name: String,
    job_id: i64,
    source_id: i64,
    verify: bool,
    concurrency: usize,
    client: Arc<CircleCiClient>,
    progress: Arc<ScanProgress>,
}

impl CircleCiSource {
    /// Initialize against the public API with the default retrying transport.
    pub fn init(config: SourceConfig) -> Result<Self, ScanError> {
        let opts = ClientOpts::default();
        let transport = RetryingClient::new(&opts)?;
        Self::with_transport(config, &opts, Arc::new(transport))
    }

    /// Initialize with explicit endpoints and transport.
    pub fn with_transport(
        config: SourceConfig,
        opts: &ClientOpts,
        transport: Arc<dyn Transport>,
    ) -> Result<Self, ScanError> {
        let token = match config.connection.credential {
            Some(Credential::Token(token)) if !token.trim().is_empty() => token,
            _ => return Err(ScanError::Config("no CircleCI token provided".into())),
        };
        let endpoints = Endpoints::new(opts)?;
        let concurrency = if config.concurrency == 0 {
            warn!("concurrency 0 is not usable, scanning one project at a time");
            1
        } else {
            config.concurrency
        };
        Ok(Self {
            name: config.name,
            job_id: config.job_id,
            source_id: config.source_id,
            verify: config.verify,
            concurrency,
            client: Arc::new(CircleCiClient::new(transport, endpoints, token)),
            progress: Arc::new(ScanProgress::default()),
        })
    }

    /// Mirror progress on `progress` (e.g. one carrying a bar) instead of the internal counters.
    pub fn with_progress(mut self, progress: Arc<ScanProgress>) -> Self {
        self.progress = progress;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    pub fn progress(&self) -> &ScanProgress {
        &self.progress
    }
}

impl ChunkSource for CircleCiSource {
    fn source_type(&self) -> SourceType {
        SourceType::CircleCi
    }

    fn source_id(&self) -> i64 {
        self.source_id
    }

    fn job_id(&self) -> i64 {
        self.job_id
    }

    fn chunks(&self, tx: &Sender<Chunk>, cancel: &CancelToken) -> Result<ScanReport, ScanError> {
        let emitter = ChunkEmitter::new(
            tx.clone(),
            SourceContext {
                source_type: self.source_type(),
                source_name: self.name.clone(),
                source_id: self.source_id,
                verify: self.verify,
            },
            self.client.endpoints().clone(),
        );
        run_scan(
            Arc::clone(&self.client),
            emitter,
            self.concurrency,
            cancel,
            Arc::clone(&self.progress),
        )
    }
}
