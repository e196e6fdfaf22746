//! Merge execution - effectful operations
//!
//! Drives each selected project through create-or-reuse, mergeability
//! polling and acceptance, and turns whatever happens into one outcome.

use crate::error::{Error, Result};
use crate::merge::conflict::is_existing_merge_request_conflict;
use crate::merge::policy::{CancelFlag, PollPolicy};
use crate::platform::GitLabApi;
use crate::report::OutcomeSink;
use crate::types::{MergeRequestState, Outcome, OutcomeLevel, ProjectRef};
use futures::stream::{self, StreamExt};
use tracing::{debug, info, warn};

/// Branch pair (and optional MR title) applied to every project of a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeJob {
    /// Source branch
    pub source_branch: String,
    /// Target branch
    pub target_branch: String,
    /// MR title; `None` lets the platform pick its default
    pub title: Option<String>,
}

impl MergeJob {
    /// Create a job without an explicit title
    pub fn new(source_branch: impl Into<String>, target_branch: impl Into<String>) -> Self {
        Self {
            source_branch: source_branch.into(),
            target_branch: target_branch.into(),
            title: None,
        }
    }

    /// Set the MR title
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// `source → target`, for messages
    pub fn direction(&self) -> String {
        format!("{} → {}", self.source_branch, self.target_branch)
    }
}

/// Knobs for [`execute_bulk_merge`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecuteOptions {
    /// Mergeability polling budget per project
    pub poll: PollPolicy,
    /// Maximum number of projects in flight; 1 means strictly sequential
    pub concurrency: usize,
}

impl Default for ExecuteOptions {
    fn default() -> Self {
        Self {
            poll: PollPolicy::default(),
            concurrency: 1,
        }
    }
}

/// Result of a bulk merge run
#[derive(Debug, Clone, Default)]
pub struct BulkMergeSummary {
    /// One outcome per input project, in input order
    pub outcomes: Vec<Outcome>,
}

impl BulkMergeSummary {
    fn count(&self, level: OutcomeLevel) -> usize {
        self.outcomes.iter().filter(|o| o.level == level).count()
    }

    /// Number of projects processed
    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    /// Number of projects merged
    pub fn succeeded(&self) -> usize {
        self.count(OutcomeLevel::Success)
    }

    /// Number of projects left for manual handling
    pub fn warnings(&self) -> usize {
        self.count(OutcomeLevel::Warning)
    }

    /// Number of projects that failed
    pub fn failed(&self) -> usize {
        self.count(OutcomeLevel::Error)
    }

    /// Check that no project ended in an error
    pub fn is_success(&self) -> bool {
        self.failed() == 0
    }

    /// Convert to an error when any project failed
    pub fn into_result(self) -> Result<Self> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(Error::MergeFailures {
                failed: self.failed(),
                total: self.total(),
            })
        }
    }
}

/// How the MR for a project was obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeRequestResolution {
    /// A new MR was created
    Created(u64),
    /// An already-open MR for the source branch was reused
    Reused(u64),
}

impl MergeRequestResolution {
    /// The MR's iid
    pub const fn iid(self) -> u64 {
        match self {
            Self::Created(iid) | Self::Reused(iid) => iid,
        }
    }
}

/// Create the MR, or reuse the open one GitLab says already exists
///
/// Only the existing-MR rejection is recovered from; any other error, or a
/// rejection with no open MR to reuse, is returned as-is.
pub async fn resolve_merge_request(
    platform: &dyn GitLabApi,
    project_id: u64,
    job: &MergeJob,
) -> Result<MergeRequestResolution> {
    let created = platform
        .create_merge_request(
            project_id,
            &job.source_branch,
            &job.target_branch,
            job.title.as_deref(),
        )
        .await;

    match created {
        Ok(iid) => Ok(MergeRequestResolution::Created(iid)),
        Err(e) if is_existing_merge_request_conflict(&e) => {
            debug!(project_id, source = %job.source_branch, "MR already exists, looking it up");
            let existing = platform
                .get_merge_requests(project_id, &job.source_branch, MergeRequestState::Opened)
                .await?;
            match existing.first() {
                Some(mr) => {
                    debug!(project_id, mr_iid = mr.iid, "reusing open MR");
                    Ok(MergeRequestResolution::Reused(mr.iid))
                }
                None => Err(e),
            }
        }
        Err(e) => Err(e),
    }
}

/// Poll until GitLab reports `can_be_merged` or the budget runs out
///
/// Returns `Ok(false)` when the budget is exhausted; that is not an error.
pub async fn poll_until_mergeable(
    platform: &dyn GitLabApi,
    project_id: u64,
    iid: u64,
    policy: &PollPolicy,
) -> Result<bool> {
    for attempt in 1..=policy.max_attempts {
        let mr = platform.get_merge_request(project_id, iid).await?;
        if mr.merge_status.is_mergeable() {
            debug!(project_id, mr_iid = iid, attempt, "MR is mergeable");
            return Ok(true);
        }

        debug!(project_id, mr_iid = iid, attempt, merge_status = %mr.merge_status, "MR not mergeable yet");
        if attempt < policy.max_attempts {
            tokio::time::sleep(policy.interval).await;
        }
    }

    Ok(false)
}

fn outcome(
    project: &ProjectRef,
    level: OutcomeLevel,
    message: String,
    merge_request_iid: Option<u64>,
) -> Outcome {
    Outcome {
        project_id: project.id,
        project_name: project.name.clone(),
        level,
        message,
        merge_request_iid,
    }
}

fn failure(project: &ProjectRef, iid: Option<u64>, err: &Error) -> Outcome {
    warn!(project_id = project.id, mr_iid = ?iid, error = %err, "project failed");
    outcome(
        project,
        OutcomeLevel::Error,
        format!("{}: {err}", project.name),
        iid,
    )
}

fn cancelled(project: &ProjectRef) -> Outcome {
    outcome(
        project,
        OutcomeLevel::Error,
        format!("{}: skipped, run cancelled", project.name),
        None,
    )
}

/// Run the full pipeline for one project
///
/// Never fails: every error becomes an [`OutcomeLevel::Error`] outcome.
pub async fn merge_project(
    platform: &dyn GitLabApi,
    project: &ProjectRef,
    job: &MergeJob,
    policy: &PollPolicy,
) -> Outcome {
    let direction = job.direction();

    let resolution = match resolve_merge_request(platform, project.id, job).await {
        Ok(resolution) => resolution,
        Err(e) => return failure(project, None, &e),
    };
    let iid = resolution.iid();

    let mergeable = match poll_until_mergeable(platform, project.id, iid, policy).await {
        Ok(mergeable) => mergeable,
        Err(e) => return failure(project, Some(iid), &e),
    };

    if !mergeable {
        info!(project_id = project.id, mr_iid = iid, "MR not mergeable, leaving it open");
        return outcome(
            project,
            OutcomeLevel::Warning,
            format!(
                "{} ({direction}) cannot merge automatically, needs manual handling (!{iid})",
                project.name
            ),
            Some(iid),
        );
    }

    match platform.accept_merge_request(project.id, iid).await {
        Ok(()) => {
            info!(project_id = project.id, mr_iid = iid, "merged");
            let reused = match resolution {
                MergeRequestResolution::Reused(_) => ", existing MR",
                MergeRequestResolution::Created(_) => "",
            };
            outcome(
                project,
                OutcomeLevel::Success,
                format!("{} ({direction}) merged (!{iid}{reused})", project.name),
                Some(iid),
            )
        }
        Err(e) => failure(project, Some(iid), &e),
    }
}

/// Execute a bulk merge over `projects` (EFFECTFUL)
///
/// Produces exactly one outcome per project, delivered to `sink` in input
/// order. With `concurrency > 1` up to that many projects are in flight at
/// once. `cancel` is checked before each project starts; projects skipped
/// because of it get an error outcome.
pub async fn execute_bulk_merge(
    projects: &[ProjectRef],
    job: &MergeJob,
    platform: &dyn GitLabApi,
    sink: &dyn OutcomeSink,
    options: &ExecuteOptions,
    cancel: &CancelFlag,
) -> BulkMergeSummary {
    let total = projects.len();
    let poll = options.poll;

    info!(
        total,
        source = %job.source_branch,
        target = %job.target_branch,
        concurrency = options.concurrency,
        max_wait_ms = u64::try_from(poll.max_wait().as_millis()).unwrap_or(u64::MAX),
        "starting bulk merge"
    );

    let mut pending = stream::iter(projects.iter().enumerate())
        .map(move |(index, project)| async move {
            if cancel.is_cancelled() {
                debug!(project_id = project.id, "skipping, run cancelled");
                return cancelled(project);
            }
            sink.on_project_start(index, total, project).await;
            merge_project(platform, project, job, &poll).await
        })
        .buffered(options.concurrency.max(1));

    let mut summary = BulkMergeSummary::default();
    while let Some(finished) = pending.next().await {
        sink.on_outcome(&finished).await;
        summary.outcomes.push(finished);
    }

    info!(
        succeeded = summary.succeeded(),
        warnings = summary.warnings(),
        failed = summary.failed(),
        "bulk merge finished"
    );
    summary
}
