//! Error types for circlesift.
//!
//! [`ScanError`] covers every failure a single remote call or emission can produce.
//! [`BranchError`] wraps one of those with the position in the project tree where it happened.

use std::fmt;
use thiserror::Error;

use crate::types::Project;

/// Failure of one accessor call, emission, or of source initialization.
#[derive(Error, Debug)]
pub enum ScanError {
    /// The API answered with a 4xx status: credentials rejected or resource not visible.
    #[error("invalid credentials, status {status} from {url}")]
    Auth { status: u16, url: String },

    /// Connection failure, timeout, or a non-success status after transport retries.
    #[error("request to {url} failed: {reason}")]
    Transport { url: String, reason: String },

    /// Listing response body was not the expected JSON shape.
    #[error("malformed response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    /// Receiving end of the chunk channel was dropped.
    #[error("chunk channel closed by consumer")]
    Write,

    /// The run was cancelled by the caller.
    #[error("scan cancelled")]
    Cancelled,

    /// Invalid source configuration (missing credential, bad URL).
    #[error("configuration error: {0}")]
    Config(String),
}

/// Where in the tree a branch failed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Branch {
    /// Listing the builds of a project.
    ListBuilds(Project),
    /// Listing the steps of one build.
    ListSteps(Project, u64),
    /// Fetching the log of one action.
    FetchLog {
        project: Project,
        build_num: u64,
        step: String,
        action_index: i64,
    },
}

impl Branch {
    pub fn project(&self) -> &Project {
        match self {
            Branch::ListBuilds(p) | Branch::ListSteps(p, _) => p,
            Branch::FetchLog { project, .. } => project,
        }
    }
}

impl fmt::Display for Branch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Branch::ListBuilds(p) => write!(f, "error getting builds for project {}", p),
            Branch::ListSteps(p, build_num) => {
                write!(f, "error getting steps for build {} of {}", build_num, p)
            }
            Branch::FetchLog {
                project,
                build_num,
                step,
                action_index,
            } => write!(
                f,
                "error chunking action {} of step {:?} in build {} of {}",
                action_index, step, build_num, project
            ),
        }
    }
}

/// A failure that abandoned one project branch.
#[derive(Error, Debug)]
#[error("{branch}: {source}")]
pub struct BranchError {
    pub branch: Branch,
    #[source]
    pub source: ScanError,
}

impl BranchError {
    pub fn new(branch: Branch, source: ScanError) -> Self {
        Self { branch, source }
    }
}
