//! gl-bulk-merge: bulk merge request creation and acceptance across the
//! projects of a GitLab group.
//!
//! For each selected project the merge engine creates an MR from a source
//! branch to a target branch (or reuses the open one), waits for GitLab to
//! report it mergeable, then accepts it. Each project yields exactly one
//! [`types::Outcome`]; failures never stop the rest of the run.

pub mod config;
pub mod error;
pub mod merge;
pub mod platform;
pub mod report;
pub mod selection;
pub mod types;
