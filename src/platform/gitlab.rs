//! GitLab platform service implementation

use crate::error::{Error, Result};
use crate::platform::{GitLabApi, default_merge_request_title};
use crate::types::{
    Branch, MergeRequestDetails, MergeRequestState, MergeRequestSummary, Project, Subgroup,
};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

/// Page size used for every list endpoint
const PER_PAGE: &str = "100";

/// Default request timeout in seconds
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// GitLab service using reqwest
pub struct GitLabService {
    client: Client,
    token: String,
    base_url: String,
}

/// Response to MR creation; only the iid matters
#[derive(Deserialize)]
struct CreatedMergeRequest {
    iid: u64,
}

#[derive(Serialize)]
struct CreateMrPayload<'a> {
    source_branch: &'a str,
    target_branch: &'a str,
    title: &'a str,
}

impl GitLabService {
    /// Create a new GitLab service
    ///
    /// `base_url` is the instance root (e.g. `https://gitlab.example.com`);
    /// a trailing slash is ignored.
    pub fn new(token: String, base_url: &str) -> Result<Self> {
        let base_url = base_url.trim().trim_end_matches('/').to_string();
        Url::parse(&base_url)
            .map_err(|e| Error::Config(format!("invalid base URL '{base_url}': {e}")))?;

        let client = Client::builder()
            .user_agent(concat!("glbm/", env!("CARGO_PKG_VERSION")))
            .timeout(std::time::Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .map_err(|e| Error::Config(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            token,
            base_url,
        })
    }

    /// Instance root this service talks to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}/api/v4{}", self.base_url, path)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client
            .request(method, self.api_url(path))
            .header("PRIVATE-TOKEN", &self.token)
            .header(CONTENT_TYPE, "application/json")
    }

    /// Send a request and return the body, mapping non-2xx to `GitLabApi`
    async fn send(&self, request: RequestBuilder) -> Result<String> {
        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let err = status_error(status, response.text().await);
            debug!(error = %err, "GitLab API error");
            return Err(err);
        }

        Ok(response.text().await?)
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let body = self.send(request).await?;
        Ok(serde_json::from_str(&body)?)
    }
}

/// Non-2xx response; an unreadable body still keeps the status
fn status_error(status: StatusCode, body: reqwest::Result<String>) -> Error {
    Error::GitLabApi {
        status: status.as_u16(),
        body: body.unwrap_or_default(),
    }
}

fn encode_group(group_path: &str) -> String {
    urlencoding::encode(group_path).into_owned()
}

#[async_trait]
impl GitLabApi for GitLabService {
    async fn list_subgroups(&self, group_path: &str) -> Result<Vec<Subgroup>> {
        debug!(group_path, "listing subgroups");
        let path = format!("/groups/{}/subgroups", encode_group(group_path));

        let subgroups: Vec<Subgroup> = self.send_json(self.request(Method::GET, &path)).await?;

        debug!(group_path, count = subgroups.len(), "listed subgroups");
        Ok(subgroups)
    }

    async fn list_group_projects(&self, group_path: &str) -> Result<Vec<Project>> {
        debug!(group_path, "listing group projects");
        let path = format!("/groups/{}/projects", encode_group(group_path));

        let projects: Vec<Project> = self
            .send_json(
                self.request(Method::GET, &path)
                    .query(&[("include_subgroups", "true"), ("per_page", PER_PAGE)]),
            )
            .await?;

        debug!(group_path, count = projects.len(), "listed group projects");
        Ok(projects)
    }

    async fn list_branches(&self, project_id: u64, search: Option<&str>) -> Result<Vec<Branch>> {
        debug!(project_id, ?search, "listing branches");
        let path = format!("/projects/{project_id}/repository/branches");

        let mut request = self
            .request(Method::GET, &path)
            .query(&[("per_page", PER_PAGE)]);
        if let Some(search) = search.map(str::trim).filter(|s| !s.is_empty()) {
            request = request.query(&[("search", search)]);
        }

        let branches: Vec<Branch> = self.send_json(request).await?;

        debug!(project_id, count = branches.len(), "listed branches");
        Ok(branches)
    }

    async fn create_merge_request(
        &self,
        project_id: u64,
        source: &str,
        target: &str,
        title: Option<&str>,
    ) -> Result<u64> {
        debug!(project_id, source, target, "creating MR");
        let path = format!("/projects/{project_id}/merge_requests");

        let default_title;
        let title = match title {
            Some(title) => title,
            None => {
                default_title = default_merge_request_title(source, target);
                &default_title
            }
        };

        let payload = CreateMrPayload {
            source_branch: source,
            target_branch: target,
            title,
        };

        let mr: CreatedMergeRequest = self
            .send_json(self.request(Method::POST, &path).json(&payload))
            .await?;

        debug!(project_id, mr_iid = mr.iid, "created MR");
        Ok(mr.iid)
    }

    async fn get_merge_requests(
        &self,
        project_id: u64,
        source_branch: &str,
        state: MergeRequestState,
    ) -> Result<Vec<MergeRequestSummary>> {
        debug!(project_id, source_branch, %state, "finding MRs");
        let path = format!("/projects/{project_id}/merge_requests");

        let mrs: Vec<MergeRequestSummary> = self
            .send_json(
                self.request(Method::GET, &path)
                    .query(&[("state", state.as_str()), ("source_branch", source_branch)]),
            )
            .await?;

        debug!(project_id, count = mrs.len(), "found MRs");
        Ok(mrs)
    }

    async fn get_merge_request(&self, project_id: u64, iid: u64) -> Result<MergeRequestDetails> {
        debug!(project_id, mr_iid = iid, "getting MR");
        let path = format!("/projects/{project_id}/merge_requests/{iid}");

        let mr: MergeRequestDetails = self.send_json(self.request(Method::GET, &path)).await?;

        debug!(project_id, mr_iid = iid, merge_status = %mr.merge_status, "got MR");
        Ok(mr)
    }

    async fn accept_merge_request(&self, project_id: u64, iid: u64) -> Result<()> {
        debug!(project_id, mr_iid = iid, "accepting MR");
        let path = format!("/projects/{project_id}/merge_requests/{iid}/merge");

        self.send(self.request(Method::PUT, &path)).await?;

        debug!(project_id, mr_iid = iid, "accepted MR");
        Ok(())
    }
}
