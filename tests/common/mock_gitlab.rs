//! Mock GitLab service for testing
//!
//! These are test utilities - not all may be used in every test binary.

#![allow(dead_code)]

use async_trait::async_trait;
use gl_bulk_merge::error::{Error, Result};
use gl_bulk_merge::platform::GitLabApi;
use gl_bulk_merge::report::OutcomeSink;
use gl_bulk_merge::types::{
    Branch, MergeRequestDetails, MergeRequestState, MergeRequestSummary, MergeStatus, Outcome,
    Project, ProjectRef, Subgroup,
};
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

/// Call record for `create_merge_request`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateMrCall {
    pub project_id: u64,
    pub source: String,
    pub target: String,
    pub title: Option<String>,
}

/// Call record for `get_merge_requests`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListMrsCall {
    pub project_id: u64,
    pub source_branch: String,
    pub state: MergeRequestState,
}

/// Build a `GitLabApi` error the way the real service reports it
pub fn api_error(status: u16, body: &str) -> Error {
    Error::GitLabApi {
        status,
        body: body.to_string(),
    }
}

/// Body GitLab sends when an open MR for the branch pair already exists
pub fn conflict_body(iid: u64) -> String {
    format!(
        r#"{{"message":["Another open merge request already exists for this source branch: !{iid}"]}}"#
    )
}

/// In-memory GitLab double
///
/// Features:
/// - Auto-incrementing MR iids per run
/// - Scripted merge status sequences per (project, iid)
/// - Call tracking for verification
/// - Error injection per project for every mutating call
///
/// When no status sequence is scripted, an MR is mergeable on the first
/// poll. When a sequence runs out, its last value repeats.
pub struct MockGitLab {
    next_iid: AtomicU64,
    subgroups: Mutex<HashMap<String, Vec<Subgroup>>>,
    projects: Mutex<HashMap<String, Vec<Project>>>,
    branches: Mutex<HashMap<u64, Vec<String>>>,
    create_iids: Mutex<HashMap<u64, u64>>,
    open_mrs: Mutex<HashMap<u64, Vec<MergeRequestSummary>>>,
    statuses: Mutex<HashMap<(u64, u64), VecDeque<MergeStatus>>>,
    // Call tracking
    create_calls: Mutex<Vec<CreateMrCall>>,
    list_mrs_calls: Mutex<Vec<ListMrsCall>>,
    get_mr_calls: Mutex<Vec<(u64, u64)>>,
    accept_calls: Mutex<Vec<(u64, u64)>>,
    // Error injection
    error_on_list_projects: Mutex<Option<Error>>,
    error_on_branches: Mutex<HashMap<u64, (u16, String)>>,
    error_on_create: Mutex<HashMap<u64, (u16, String)>>,
    error_on_list_mrs: Mutex<HashMap<u64, (u16, String)>>,
    error_on_get_mr: Mutex<HashMap<u64, (u16, String)>>,
    error_on_accept: Mutex<HashMap<u64, (u16, String)>>,
}

impl Default for MockGitLab {
    fn default() -> Self {
        Self::new()
    }
}

impl MockGitLab {
    pub fn new() -> Self {
        Self {
            next_iid: AtomicU64::new(1),
            subgroups: Mutex::new(HashMap::new()),
            projects: Mutex::new(HashMap::new()),
            branches: Mutex::new(HashMap::new()),
            create_iids: Mutex::new(HashMap::new()),
            open_mrs: Mutex::new(HashMap::new()),
            statuses: Mutex::new(HashMap::new()),
            create_calls: Mutex::new(Vec::new()),
            list_mrs_calls: Mutex::new(Vec::new()),
            get_mr_calls: Mutex::new(Vec::new()),
            accept_calls: Mutex::new(Vec::new()),
            error_on_list_projects: Mutex::new(None),
            error_on_branches: Mutex::new(HashMap::new()),
            error_on_create: Mutex::new(HashMap::new()),
            error_on_list_mrs: Mutex::new(HashMap::new()),
            error_on_get_mr: Mutex::new(HashMap::new()),
            error_on_accept: Mutex::new(HashMap::new()),
        }
    }

    // === Responses ===

    pub fn set_subgroups(&self, group_path: &str, full_paths: &[&str]) {
        let subgroups = full_paths
            .iter()
            .enumerate()
            .map(|(i, path)| Subgroup {
                id: i as u64 + 100,
                name: path.rsplit('/').next().unwrap_or(*path).to_string(),
                full_path: (*path).to_string(),
            })
            .collect();
        self.subgroups
            .lock()
            .unwrap()
            .insert(group_path.to_string(), subgroups);
    }

    /// Projects of a group as `(id, name)`; paths are `group/name`
    pub fn set_projects(&self, group_path: &str, projects: &[(u64, &str)]) {
        let projects = projects
            .iter()
            .map(|(id, name)| Project {
                id: *id,
                name: (*name).to_string(),
                path_with_namespace: Some(format!("{group_path}/{name}")),
            })
            .collect();
        self.projects
            .lock()
            .unwrap()
            .insert(group_path.to_string(), projects);
    }

    pub fn set_branches(&self, project_id: u64, names: &[&str]) {
        self.branches
            .lock()
            .unwrap()
            .insert(project_id, names.iter().map(ToString::to_string).collect());
    }

    /// Make `create_merge_request` return this iid for the project
    pub fn set_create_iid(&self, project_id: u64, iid: u64) {
        self.create_iids.lock().unwrap().insert(project_id, iid);
    }

    /// Register an open MR returned by `get_merge_requests`
    pub fn add_open_mr(&self, project_id: u64, iid: u64, source: &str, target: &str) {
        self.open_mrs
            .lock()
            .unwrap()
            .entry(project_id)
            .or_default()
            .push(MergeRequestSummary {
                iid,
                title: format!("Merge {source} into {target}"),
                source_branch: source.to_string(),
                target_branch: target.to_string(),
            });
    }

    /// Script the statuses successive polls of an MR observe
    pub fn set_statuses(&self, project_id: u64, iid: u64, statuses: &[MergeStatus]) {
        self.statuses
            .lock()
            .unwrap()
            .insert((project_id, iid), statuses.iter().copied().collect());
    }

    // === Error injection methods ===

    pub fn fail_list_projects(&self, status: u16, body: &str) {
        *self.error_on_list_projects.lock().unwrap() = Some(api_error(status, body));
    }

    pub fn fail_branches(&self, project_id: u64, status: u16, body: &str) {
        self.error_on_branches
            .lock()
            .unwrap()
            .insert(project_id, (status, body.to_string()));
    }

    /// Make `create_merge_request` fail for a project
    pub fn fail_create(&self, project_id: u64, status: u16, body: &str) {
        self.error_on_create
            .lock()
            .unwrap()
            .insert(project_id, (status, body.to_string()));
    }

    /// Make create fail with the existing-MR rejection for `iid`
    pub fn fail_create_with_conflict(&self, project_id: u64, iid: u64) {
        self.fail_create(project_id, 409, &conflict_body(iid));
    }

    /// Make the open-MR lookup fail for a project
    pub fn fail_list_mrs(&self, project_id: u64, status: u16, body: &str) {
        self.error_on_list_mrs
            .lock()
            .unwrap()
            .insert(project_id, (status, body.to_string()));
    }

    pub fn fail_get_mr(&self, project_id: u64, status: u16, body: &str) {
        self.error_on_get_mr
            .lock()
            .unwrap()
            .insert(project_id, (status, body.to_string()));
    }

    pub fn fail_accept(&self, project_id: u64, status: u16, body: &str) {
        self.error_on_accept
            .lock()
            .unwrap()
            .insert(project_id, (status, body.to_string()));
    }

    // === Call inspection ===

    pub fn create_calls(&self) -> Vec<CreateMrCall> {
        self.create_calls.lock().unwrap().clone()
    }

    pub fn list_mrs_calls(&self) -> Vec<ListMrsCall> {
        self.list_mrs_calls.lock().unwrap().clone()
    }

    /// Polls made, as `(project_id, iid)`
    pub fn get_mr_calls(&self) -> Vec<(u64, u64)> {
        self.get_mr_calls.lock().unwrap().clone()
    }

    pub fn polls_for(&self, project_id: u64) -> usize {
        self.get_mr_calls()
            .iter()
            .filter(|(p, _)| *p == project_id)
            .count()
    }

    /// Accepts made, as `(project_id, iid)`
    pub fn accept_calls(&self) -> Vec<(u64, u64)> {
        self.accept_calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl GitLabApi for MockGitLab {
    async fn list_subgroups(&self, group_path: &str) -> Result<Vec<Subgroup>> {
        self.subgroups
            .lock()
            .unwrap()
            .get(group_path)
            .cloned()
            .ok_or_else(|| api_error(404, r#"{"message":"404 Group Not Found"}"#))
    }

    async fn list_group_projects(&self, group_path: &str) -> Result<Vec<Project>> {
        if let Some(err) = self.error_on_list_projects.lock().unwrap().take() {
            return Err(err);
        }
        self.projects
            .lock()
            .unwrap()
            .get(group_path)
            .cloned()
            .ok_or_else(|| api_error(404, r#"{"message":"404 Group Not Found"}"#))
    }

    async fn list_branches(&self, project_id: u64, search: Option<&str>) -> Result<Vec<Branch>> {
        if let Some((status, body)) = self.error_on_branches.lock().unwrap().get(&project_id) {
            return Err(api_error(*status, body));
        }
        let names = self
            .branches
            .lock()
            .unwrap()
            .get(&project_id)
            .cloned()
            .unwrap_or_default();
        Ok(names
            .into_iter()
            .filter(|name| search.is_none_or(|s| name.contains(s)))
            .map(|name| Branch { name })
            .collect())
    }

    async fn create_merge_request(
        &self,
        project_id: u64,
        source: &str,
        target: &str,
        title: Option<&str>,
    ) -> Result<u64> {
        self.create_calls.lock().unwrap().push(CreateMrCall {
            project_id,
            source: source.to_string(),
            target: target.to_string(),
            title: title.map(ToString::to_string),
        });

        if let Some((status, body)) = self.error_on_create.lock().unwrap().get(&project_id) {
            return Err(api_error(*status, body));
        }

        let iid = self
            .create_iids
            .lock()
            .unwrap()
            .get(&project_id)
            .copied()
            .unwrap_or_else(|| self.next_iid.fetch_add(1, Ordering::SeqCst));
        Ok(iid)
    }

    async fn get_merge_requests(
        &self,
        project_id: u64,
        source_branch: &str,
        state: MergeRequestState,
    ) -> Result<Vec<MergeRequestSummary>> {
        self.list_mrs_calls.lock().unwrap().push(ListMrsCall {
            project_id,
            source_branch: source_branch.to_string(),
            state,
        });

        if let Some((status, body)) = self.error_on_list_mrs.lock().unwrap().get(&project_id) {
            return Err(api_error(*status, body));
        }

        Ok(self
            .open_mrs
            .lock()
            .unwrap()
            .get(&project_id)
            .map(|mrs| {
                mrs.iter()
                    .filter(|mr| mr.source_branch == source_branch)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn get_merge_request(&self, project_id: u64, iid: u64) -> Result<MergeRequestDetails> {
        self.get_mr_calls.lock().unwrap().push((project_id, iid));

        if let Some((status, body)) = self.error_on_get_mr.lock().unwrap().get(&project_id) {
            return Err(api_error(*status, body));
        }

        let merge_status = {
            let mut statuses = self.statuses.lock().unwrap();
            match statuses.get_mut(&(project_id, iid)) {
                Some(queue) if queue.len() > 1 => queue.pop_front().unwrap(),
                Some(queue) => queue.front().copied().unwrap_or(MergeStatus::CanBeMerged),
                None => MergeStatus::CanBeMerged,
            }
        };

        Ok(MergeRequestDetails {
            iid,
            state: "opened".to_string(),
            merge_status,
        })
    }

    async fn accept_merge_request(&self, project_id: u64, iid: u64) -> Result<()> {
        self.accept_calls.lock().unwrap().push((project_id, iid));

        if let Some((status, body)) = self.error_on_accept.lock().unwrap().get(&project_id) {
            return Err(api_error(*status, body));
        }
        Ok(())
    }
}

/// Sink that records everything it is given
#[derive(Default)]
pub struct RecordingSink {
    starts: Mutex<Vec<(usize, usize, u64)>>,
    outcomes: Mutex<Vec<Outcome>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start notifications as `(index, total, project_id)`
    pub fn starts(&self) -> Vec<(usize, usize, u64)> {
        self.starts.lock().unwrap().clone()
    }

    pub fn outcomes(&self) -> Vec<Outcome> {
        self.outcomes.lock().unwrap().clone()
    }
}

#[async_trait]
impl OutcomeSink for RecordingSink {
    async fn on_project_start(&self, index: usize, total: usize, project: &ProjectRef) {
        self.starts.lock().unwrap().push((index, total, project.id));
    }

    async fn on_outcome(&self, outcome: &Outcome) {
        self.outcomes.lock().unwrap().push(outcome.clone());
    }
}
