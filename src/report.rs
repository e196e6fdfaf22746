//! Outcome reporting
//!
//! The orchestrator's only output contract: one [`Outcome`] per project,
//! delivered in input order.

use crate::types::{Outcome, ProjectRef};
use async_trait::async_trait;

/// Receives per-project progress and outcomes from a merge run
#[async_trait]
pub trait OutcomeSink: Send + Sync {
    /// Called when work on a project starts (`index` is zero-based)
    async fn on_project_start(&self, _index: usize, _total: usize, _project: &ProjectRef) {}

    /// Called exactly once per project with its terminal outcome
    async fn on_outcome(&self, outcome: &Outcome);
}

/// Sink that discards everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSink;

#[async_trait]
impl OutcomeSink for NoopSink {
    async fn on_outcome(&self, _outcome: &Outcome) {}
}
