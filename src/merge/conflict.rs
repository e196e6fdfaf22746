//! Detection of GitLab's "MR already exists" rejection
//!
//! GitLab has no dedicated error code for this case; the only signal is the
//! text of the 409 body. The match is a heuristic over GitLab's wording and
//! lives here alone so it can follow wording changes without touching the
//! orchestration.

use crate::error::Error;

/// Text GitLab puts in the body when an open MR for the branch pair exists
pub const EXISTING_MERGE_REQUEST_MARKER: &str = "Another open merge request";

/// Whether `err` is GitLab refusing to create a duplicate MR
pub fn is_existing_merge_request_conflict(err: &Error) -> bool {
    match err {
        Error::GitLabApi { body, .. } => body.contains(EXISTING_MERGE_REQUEST_MARKER),
        _ => false,
    }
}
