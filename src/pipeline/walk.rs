//! Project walk: builds → steps → actions, strictly sequential within one project.

use log::debug;

use crate::engine::sanitize::sanitize;
use crate::error::{Branch, BranchError, ScanError};
use crate::types::Project;

use super::context::PipelineContext;

/// Result of walking one project.
#[derive(Debug)]
pub enum ProjectOutcome {
    /// Every build was walked; `chunks` were emitted.
    Completed { chunks: usize },
    /// The branch failed and the rest of the project was abandoned.
    /// Chunks emitted before the failure stay emitted.
    Failed(BranchError),
    /// The run was cancelled while this project was in progress.
    Cancelled,
}

impl ProjectOutcome {
    fn from_error(branch: Branch, err: ScanError) -> Self {
        match err {
            ScanError::Cancelled => ProjectOutcome::Cancelled,
            err => ProjectOutcome::Failed(BranchError::new(branch, err)),
        }
    }
}

/// Walk `project` in API order, emitting one chunk per action log. The first failure at
/// any level abandons the remaining builds, steps and actions of this project.
pub fn walk_project(ctx: &PipelineContext, project: &Project) -> ProjectOutcome {
    let cancel = &ctx.cancel;
    let builds = match ctx.client.list_builds(project, cancel) {
        Ok(b) => b,
        Err(e) => return ProjectOutcome::from_error(Branch::ListBuilds(project.clone()), e),
    };

    let mut chunks = 0_usize;
    for build in builds {
        let steps = match ctx.client.list_steps(project, build, cancel) {
            Ok(s) => s,
            Err(e) => {
                return ProjectOutcome::from_error(
                    Branch::ListSteps(project.clone(), build.build_num),
                    e,
                );
            }
        };

        for step in &steps {
            for action in &step.actions {
                let branch = || Branch::FetchLog {
                    project: project.clone(),
                    build_num: build.build_num,
                    step: step.name.clone(),
                    action_index: action.index,
                };
                let body = match ctx.client.fetch_log_body(action, cancel) {
                    Ok(Some(body)) => body,
                    Ok(None) => {
                        debug!(
                            "{} build {} step {:?} action {} has no output",
                            project, build.build_num, step.name, action.index
                        );
                        continue;
                    }
                    Err(e) => return ProjectOutcome::from_error(branch(), e),
                };
                if let Err(e) = ctx.emitter.emit(
                    project,
                    build,
                    &step.name,
                    action,
                    sanitize(&body),
                    cancel,
                ) {
                    return ProjectOutcome::from_error(branch(), e);
                }
                ctx.progress.chunk_emitted();
                chunks += 1;
            }
        }
    }
    ProjectOutcome::Completed { chunks }
}
