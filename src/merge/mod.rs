//! Merge engine for bulk merge runs
//!
//! Per project: create (or reuse) an MR, poll until GitLab reports it
//! mergeable, accept it. Every project ends in exactly one [`Outcome`],
//! and a failure in one project never stops the others.
//!
//! [`Outcome`]: crate::types::Outcome

mod conflict;
mod execute;
mod policy;

pub use conflict::{EXISTING_MERGE_REQUEST_MARKER, is_existing_merge_request_conflict};
pub use execute::{
    BulkMergeSummary, ExecuteOptions, MergeJob, MergeRequestResolution, execute_bulk_merge,
    merge_project, poll_until_mergeable, resolve_merge_request,
};
pub use policy::{CancelFlag, DEFAULT_INTERVAL, DEFAULT_MAX_ATTEMPTS, PollPolicy};
