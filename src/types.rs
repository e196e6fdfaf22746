//! Core types for gl-bulk-merge

use serde::{Deserialize, Serialize};

/// A project selected for a merge run
///
/// Supplied by the caller and never mutated by the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectRef {
    /// GitLab project ID
    pub id: u64,
    /// Display name
    pub name: String,
    /// Full path including namespace (e.g. `top/team/svc-a`)
    #[serde(default)]
    pub path_with_namespace: Option<String>,
}

impl ProjectRef {
    /// Create a project reference from an ID and display name
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            path_with_namespace: None,
        }
    }
}

impl From<Project> for ProjectRef {
    fn from(project: Project) -> Self {
        Self {
            id: project.id,
            name: project.name,
            path_with_namespace: project.path_with_namespace,
        }
    }
}

/// A subgroup as returned by `GET /groups/:id/subgroups`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subgroup {
    /// Group ID
    pub id: u64,
    /// Short name
    #[serde(default)]
    pub name: String,
    /// Full path (e.g. `top/team`)
    pub full_path: String,
}

/// A project as returned by `GET /groups/:id/projects`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    /// Project ID
    pub id: u64,
    /// Display name
    pub name: String,
    /// Full path including namespace
    #[serde(default)]
    pub path_with_namespace: Option<String>,
}

/// A repository branch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Branch {
    /// Branch name
    pub name: String,
}

/// GitLab's asynchronously computed mergeability of an MR
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeStatus {
    /// Not yet checked
    #[default]
    Unchecked,
    /// Check in progress
    Checking,
    /// No conflicts, can be accepted
    CanBeMerged,
    /// Has conflicts
    CannotBeMerged,
    /// Previously had conflicts, recheck queued
    CannotBeMergedRecheck,
    /// Previously had conflicts, recheck running
    CannotBeMergedRechecking,
    /// Any value this crate does not know about
    #[serde(other)]
    Unknown,
}

impl MergeStatus {
    /// Whether GitLab will accept the MR right now
    pub const fn is_mergeable(self) -> bool {
        matches!(self, Self::CanBeMerged)
    }
}

impl std::fmt::Display for MergeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unchecked => write!(f, "unchecked"),
            Self::Checking => write!(f, "checking"),
            Self::CanBeMerged => write!(f, "can_be_merged"),
            Self::CannotBeMerged => write!(f, "cannot_be_merged"),
            Self::CannotBeMergedRecheck => write!(f, "cannot_be_merged_recheck"),
            Self::CannotBeMergedRechecking => write!(f, "cannot_be_merged_rechecking"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// MR state filter for listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MergeRequestState {
    /// Open MRs
    #[default]
    Opened,
}

impl MergeRequestState {
    /// Value of the `state` query parameter
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Opened => "opened",
        }
    }
}

impl std::fmt::Display for MergeRequestState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An MR as listed by `GET /projects/:id/merge_requests`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeRequestSummary {
    /// Project-local MR number
    pub iid: u64,
    /// Title
    #[serde(default)]
    pub title: String,
    /// Source branch
    #[serde(default)]
    pub source_branch: String,
    /// Target branch
    #[serde(default)]
    pub target_branch: String,
}

/// A single MR as returned by `GET /projects/:id/merge_requests/:iid`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeRequestDetails {
    /// Project-local MR number
    pub iid: u64,
    /// "opened", "closed", "merged", "locked"
    #[serde(default)]
    pub state: String,
    /// Mergeability as computed by GitLab
    #[serde(default)]
    pub merge_status: MergeStatus,
}

/// Severity of a per-project outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutcomeLevel {
    /// MR created (or reused) and accepted
    Success,
    /// MR left open for manual handling
    Warning,
    /// Something failed for this project
    Error,
}

impl std::fmt::Display for OutcomeLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Success => write!(f, "success"),
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Terminal result for one project of a merge run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    /// Project ID
    pub project_id: u64,
    /// Project display name
    pub project_name: String,
    /// Severity
    pub level: OutcomeLevel,
    /// Human-readable message (includes the project name)
    pub message: String,
    /// MR the outcome refers to, when one was resolved
    pub merge_request_iid: Option<u64>,
}
