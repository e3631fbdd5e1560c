//! Public and internal types for the circlesift API and pipeline.

use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

use crate::utils::config::ApiDefaults;

/// A repository tracked by CircleCI. Unique by `(vcs, username, reponame)`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Deserialize)]
pub struct Project {
    /// Version-control provider tag (`github`, `bitbucket`, ...).
    #[serde(rename = "vcs_type")]
    pub vcs: String,
    /// Owning account or organization.
    pub username: String,
    pub reponame: String,
}

impl fmt::Display for Project {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.vcs, self.username, self.reponame)
    }
}

/// One numbered pipeline execution of a [`Project`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
pub struct Build {
    pub build_num: u64,
}

/// A named phase of a build with its actions in execution order.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct BuildStep {
    pub name: String,
    #[serde(default)]
    pub actions: Vec<Action>,
}

/// Leaf of the tree: one executable unit whose log is fetched from `output_url`.
/// Actions that produced no output have no URL.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Action {
    pub index: i64,
    #[serde(default)]
    pub output_url: Option<String>,
}

/// Kind of source a chunk came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceType {
    CircleCi,
}

/// Provenance of a CircleCI log chunk.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CircleCiMetadata {
    pub vcs_type: String,
    pub username: String,
    pub repository: String,
    pub build_number: i64,
    pub build_step: String,
    /// Dashboard link to the build, e.g. `https://app.circleci.com/pipelines/github/acme/api/42`.
    pub link: String,
}

/// Source-specific provenance attached to every chunk.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceMetadata {
    CircleCi(CircleCiMetadata),
}

/// Unit of sanitized content plus provenance, delivered to the downstream consumer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Chunk {
    pub source_type: SourceType,
    pub source_name: String,
    pub source_id: i64,
    #[serde(serialize_with = "lossy_utf8")]
    pub data: Vec<u8>,
    pub source_metadata: SourceMetadata,
    pub verify: bool,
}

fn lossy_utf8<S: Serializer>(data: &[u8], s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&String::from_utf8_lossy(data))
}

/// Credential kinds accepted by the CircleCI source.
#[derive(Clone)]
pub enum Credential {
    /// Personal or project API token, sent as `Circle-Token`.
    Token(String),
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credential::Token(_) => f.write_str("Token(<redacted>)"),
        }
    }
}

/// Connection settings handed over by the initializer.
#[derive(Clone, Debug, Default)]
pub struct Connection {
    pub credential: Option<Credential>,
}

impl Connection {
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            credential: Some(Credential::Token(token.into())),
        }
    }
}

/// Init contract: identity of the source, the credential, and the worker limit.
#[derive(Clone, Debug)]
pub struct SourceConfig {
    /// Display name stamped on every chunk.
    pub name: String,
    pub job_id: i64,
    pub source_id: i64,
    /// Whether detected secrets should be verified downstream.
    pub verify: bool,
    pub connection: Connection,
    /// Max project walks running at once.
    pub concurrency: usize,
}

/// Remote endpoint and transport tuning. Defaults target the public CircleCI API.
#[derive(Clone, Debug)]
pub struct ClientOpts {
    /// API base, must end with `/` (e.g. `https://circleci.com/api/v1.1/`).
    pub base_url: String,
    /// Host used to build human-navigable build links.
    pub dashboard_url: String,
    /// Attempts per request, including the first.
    pub retry_attempts: u32,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for ClientOpts {
    fn default() -> Self {
        Self {
            base_url: ApiDefaults::BASE_URL.to_string(),
            dashboard_url: ApiDefaults::DASHBOARD_URL.to_string(),
            retry_attempts: ApiDefaults::RETRY_ATTEMPTS,
            timeout_secs: ApiDefaults::TIMEOUT_SECS,
        }
    }
}
