//! GitLab platform service
//!
//! The merge orchestrator and the selection helpers only talk to GitLab
//! through [`GitLabApi`], so tests can substitute an in-memory double.

mod gitlab;

pub use gitlab::GitLabService;

use crate::error::Result;
use crate::types::{
    Branch, MergeRequestDetails, MergeRequestState, MergeRequestSummary, Project, Subgroup,
};
use async_trait::async_trait;

/// GitLab operations needed for bulk merging
///
/// Every method is a single request. Non-2xx responses come back as
/// [`Error::GitLabApi`](crate::error::Error::GitLabApi) with the raw body.
#[async_trait]
pub trait GitLabApi: Send + Sync {
    /// List the direct subgroups of a group
    async fn list_subgroups(&self, group_path: &str) -> Result<Vec<Subgroup>>;

    /// List projects of a group, including nested subgroups (first 100)
    async fn list_group_projects(&self, group_path: &str) -> Result<Vec<Project>>;

    /// List branches of a project, optionally filtered by substring
    async fn list_branches(&self, project_id: u64, search: Option<&str>) -> Result<Vec<Branch>>;

    /// Create an MR and return its iid
    ///
    /// When `title` is `None` the title defaults to `Merge {source} into {target}`.
    async fn create_merge_request(
        &self,
        project_id: u64,
        source: &str,
        target: &str,
        title: Option<&str>,
    ) -> Result<u64>;

    /// List MRs of a project with the given source branch and state
    async fn get_merge_requests(
        &self,
        project_id: u64,
        source_branch: &str,
        state: MergeRequestState,
    ) -> Result<Vec<MergeRequestSummary>>;

    /// Fetch a single MR, including its merge status
    async fn get_merge_request(&self, project_id: u64, iid: u64) -> Result<MergeRequestDetails>;

    /// Accept (merge) an MR
    async fn accept_merge_request(&self, project_id: u64, iid: u64) -> Result<()>;
}

/// Default MR title used when none is supplied
pub fn default_merge_request_title(source: &str, target: &str) -> String {
    format!("Merge {source} into {target}")
}
