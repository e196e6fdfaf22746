//! Shared test utilities

#![allow(dead_code)]

mod mock_gitlab;

pub use mock_gitlab::{
    CreateMrCall, ListMrsCall, MockGitLab, RecordingSink, api_error, conflict_body,
};

use gl_bulk_merge::merge::PollPolicy;
use gl_bulk_merge::types::ProjectRef;
use std::time::Duration;

/// Default attempt budget with no delay between polls
pub fn fast_policy() -> PollPolicy {
    PollPolicy::new(10, Duration::ZERO)
}

/// Project references from `(id, name)` pairs
pub fn projects(pairs: &[(u64, &str)]) -> Vec<ProjectRef> {
    pairs
        .iter()
        .map(|(id, name)| ProjectRef::new(*id, *name))
        .collect()
}
