//! Shared command context for CLI commands
//!
//! Extracts the setup shared by the groups, projects, branches and merge
//! commands.

use gl_bulk_merge::config::{ResolvedSettings, Settings};
use gl_bulk_merge::error::Result;
use gl_bulk_merge::platform::{GitLabApi, GitLabService};
use gl_bulk_merge::selection::resolve_group_path;

/// Shared context for CLI commands that talk to GitLab
///
/// Building it validates the settings, so a missing token, base URL or top
/// group fails the command before any request is made.
pub struct CommandContext {
    /// Validated settings
    pub settings: ResolvedSettings,
    /// GitLab service
    pub platform: Box<dyn GitLabApi>,
}

impl CommandContext {
    /// Create a new command context
    pub fn new(settings: &Settings) -> Result<Self> {
        let settings = settings.resolve()?;
        let platform = GitLabService::new(settings.token.clone(), &settings.base_url)?;

        Ok(Self {
            settings,
            platform: Box::new(platform),
        })
    }

    /// Resolve a user-supplied group against the top group
    pub fn group_path(&self, group: Option<&str>) -> String {
        resolve_group_path(&self.settings.top_group, group)
    }
}
