//! CircleCI v1.1 accessor: list projects, builds and steps, and fetch raw action logs.
//!
//! Each call is one GET through a [`Transport`]; this layer classifies the response
//! (4xx → [`ScanError::Auth`], other failures → [`ScanError::Transport`]) and decodes JSON.
//! It never retries on its own.

use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use url::Url;

use crate::engine::cancel::CancelToken;
use crate::engine::transport::{HttpRequest, HttpResponse, Transport};
use crate::error::ScanError;
use crate::types::{Action, Build, BuildStep, ClientOpts, Project};
use crate::utils::config::ApiHeaders;

/// API base and dashboard host, parsed once at init.
#[derive(Clone, Debug)]
pub struct Endpoints {
    base: Url,
    dashboard: Url,
}

fn parse_base(kind: &str, raw: &str) -> Result<Url, ScanError> {
    let url = Url::parse(raw).map_err(|e| ScanError::Config(format!("{kind} {raw:?}: {e}")))?;
    if url.cannot_be_a_base() {
        return Err(ScanError::Config(format!(
            "{kind} {raw:?} cannot be used as a base URL"
        )));
    }
    Ok(url)
}

impl Endpoints {
    pub fn new(opts: &ClientOpts) -> Result<Self, ScanError> {
        Ok(Self {
            base: parse_base("base_url", &opts.base_url)?,
            dashboard: parse_base("dashboard_url", &opts.dashboard_url)?,
        })
    }

    /// Append `segments` to the path of `root`, percent-encoding each one.
    fn with_segments<'a>(root: &Url, segments: impl IntoIterator<Item = &'a str>) -> String {
        let mut url = root.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url.into()
    }

    pub fn projects(&self) -> String {
        Self::with_segments(&self.base, ["projects"])
    }

    pub fn builds(&self, project: &Project) -> String {
        Self::with_segments(
            &self.base,
            [
                "project",
                project.vcs.as_str(),
                project.username.as_str(),
                project.reponame.as_str(),
            ],
        )
    }

    pub fn build(&self, project: &Project, build: Build) -> String {
        let num = build.build_num.to_string();
        Self::with_segments(
            &self.base,
            [
                "project",
                project.vcs.as_str(),
                project.username.as_str(),
                project.reponame.as_str(),
                num.as_str(),
            ],
        )
    }

    /// Dashboard link for a build: `<dashboard>/pipelines/<vcs>/<user>/<repo>/<num>`.
    pub fn build_link(&self, project: &Project, build: Build) -> String {
        let num = build.build_num.to_string();
        Self::with_segments(
            &self.dashboard,
            [
                "pipelines",
                project.vcs.as_str(),
                project.username.as_str(),
                project.reponame.as_str(),
                num.as_str(),
            ],
        )
    }

    /// True when `raw` points at the API's own origin; only then is the token attached.
    fn same_origin(&self, raw: &str) -> bool {
        Url::parse(raw)
            .map(|u| u.origin() == self.base.origin())
            .unwrap_or(false)
    }
}

#[derive(Deserialize)]
struct BuildDetails {
    #[serde(default)]
    steps: Vec<BuildStep>,
}

/// Remote tree accessor bound to one credential.
pub struct CircleCiClient {
    transport: Arc<dyn Transport>,
    endpoints: Endpoints,
    token: String,
}

impl CircleCiClient {
    pub fn new(transport: Arc<dyn Transport>, endpoints: Endpoints, token: String) -> Self {
        Self {
            transport,
            endpoints,
            token,
        }
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    fn get(
        &self,
        url: &str,
        with_token: bool,
        cancel: &CancelToken,
    ) -> Result<HttpResponse, ScanError> {
        let mut headers = vec![(ApiHeaders::ACCEPT, ApiHeaders::ACCEPT_JSON)];
        if with_token {
            headers.push((ApiHeaders::TOKEN, self.token.as_str()));
        }
        let res = self.transport.get(&HttpRequest { url, headers }, cancel)?;
        if res.is_client_error() {
            return Err(ScanError::Auth {
                status: res.status,
                url: url.to_string(),
            });
        }
        if !res.is_success() {
            return Err(ScanError::Transport {
                url: url.to_string(),
                reason: format!("unexpected status {}", res.status),
            });
        }
        Ok(res)
    }

    fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        cancel: &CancelToken,
    ) -> Result<T, ScanError> {
        let res = self.get(url, true, cancel)?;
        serde_json::from_slice(&res.body).map_err(|source| ScanError::Decode {
            url: url.to_string(),
            source,
        })
    }

    /// All projects followed by the token's user.
    pub fn list_projects(&self, cancel: &CancelToken) -> Result<Vec<Project>, ScanError> {
        self.get_json(&self.endpoints.projects(), cancel)
    }

    /// Recent builds of `project`, in API order.
    pub fn list_builds(
        &self,
        project: &Project,
        cancel: &CancelToken,
    ) -> Result<Vec<Build>, ScanError> {
        self.get_json(&self.endpoints.builds(project), cancel)
    }

    /// Steps of one build, each with its actions in execution order.
    pub fn list_steps(
        &self,
        project: &Project,
        build: Build,
        cancel: &CancelToken,
    ) -> Result<Vec<BuildStep>, ScanError> {
        let details: BuildDetails = self.get_json(&self.endpoints.build(project, build), cancel)?;
        Ok(details.steps)
    }

    /// Raw log bytes at the action's `output_url`. Returns `Ok(None)` for actions without output.
    pub fn fetch_log_body(
        &self,
        action: &Action,
        cancel: &CancelToken,
    ) -> Result<Option<Vec<u8>>, ScanError> {
        let Some(url) = action.output_url.as_deref() else {
            return Ok(None);
        };
        let with_token = self.endpoints.same_origin(url);
        let res = self.get(url, with_token, cancel)?;
        Ok(Some(res.body))
    }
}
