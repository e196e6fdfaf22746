//! Command-line interface

mod browse;
mod config;
mod context;
mod merge;
mod report;
mod style;

use clap::{Args, Parser, Subcommand};
use context::CommandContext;
use gl_bulk_merge::config::{
    Settings, default_settings_path, load_settings, normalize_base_url, normalize_group_path,
};
use gl_bulk_merge::error::Result;
use gl_bulk_merge::merge::DEFAULT_MAX_ATTEMPTS;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "glbm")]
#[command(
    author,
    version,
    about = "Bulk merge requests across GitLab group projects",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Settings file (default: <config dir>/glbm/config.toml)
    #[arg(long, global = true, env = "GLBM_CONFIG")]
    config: Option<PathBuf>,

    /// GitLab personal access token
    #[arg(long, global = true, env = "GITLAB_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// GitLab instance URL (e.g. <https://gitlab.example.com>)
    #[arg(long, global = true, env = "GITLAB_URL")]
    url: Option<String>,

    /// Top-level group whose projects are merged
    #[arg(long, global = true, env = "GLBM_TOP_GROUP")]
    top_group: Option<String>,

    /// Log API traffic at debug level
    #[arg(long, global = true, default_value_t = false)]
    pub debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List subgroups of the top group
    Groups,

    /// List projects of a group (including nested subgroups)
    Projects {
        /// Group path, absolute or relative to the top group (default: top group)
        group: Option<String>,
    },

    /// Search branch names across projects
    Branches {
        /// Substring to search for
        search: Option<String>,

        /// Group path, absolute or relative to the top group
        #[arg(short, long)]
        group: Option<String>,

        /// Project name, full path or ID (repeatable; default: all projects)
        #[arg(short = 'p', long = "project")]
        projects: Vec<String>,
    },

    /// Create, wait for and accept an MR in every selected project
    Merge(MergeArgs),

    /// Show or write the settings file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Arguments of `glbm merge`
#[derive(Args, Debug, Clone)]
pub struct MergeArgs {
    /// Source branch, merged into the target branch in every project
    #[arg(short, long)]
    pub source: String,

    /// Target branch; must be a configured target branch (default: the first one)
    #[arg(short, long)]
    pub target: Option<String>,

    /// Group path, absolute or relative to the top group (default: top group)
    #[arg(short, long)]
    pub group: Option<String>,

    /// Project name, full path or ID (repeatable)
    #[arg(
        short = 'p',
        long = "project",
        required_unless_present = "all",
        conflicts_with = "all"
    )]
    pub projects: Vec<String>,

    /// Merge every project of the group
    #[arg(long, default_value_t = false)]
    pub all: bool,

    /// MR title (default: "Auto merge: SOURCE → TARGET")
    #[arg(long)]
    pub title: Option<String>,

    /// Number of projects processed at the same time
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u16).range(1..=32))]
    pub concurrency: u16,

    /// Mergeability checks per MR before giving up
    #[arg(long, default_value_t = DEFAULT_MAX_ATTEMPTS)]
    pub poll_attempts: u32,

    /// Delay between mergeability checks, in milliseconds
    #[arg(long, default_value_t = 500)]
    pub poll_interval_ms: u64,

    /// Show the selected projects without creating or merging anything
    #[arg(long, default_value_t = false)]
    pub dry_run: bool,

    /// Preview the selection and ask before merging
    #[arg(long, default_value_t = false)]
    pub confirm: bool,
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective settings (token masked)
    Show,

    /// Write the effective settings to the settings file
    Init {
        /// Comma-separated target branches to store
        #[arg(long)]
        target_branches: Option<String>,

        /// Overwrite an existing settings file
        #[arg(long, default_value_t = false)]
        force: bool,
    },
}

impl Cli {
    fn settings_path(&self) -> Option<PathBuf> {
        self.config.clone().or_else(default_settings_path)
    }

    /// Load the settings file and apply command-line overrides
    pub fn load_settings(&self) -> Result<Settings> {
        let mut settings = match self.settings_path() {
            Some(path) => load_settings(&path)?,
            None => Settings::default(),
        };

        if let Some(token) = &self.token {
            settings.token = Some(token.clone());
        }
        if let Some(url) = &self.url {
            settings.base_url = normalize_base_url(url);
        }
        if let Some(top_group) = &self.top_group {
            settings.top_group = normalize_group_path(top_group);
        }
        if self.debug {
            settings.debug_log = true;
        }

        Ok(settings.normalized())
    }

    pub async fn execute(&self, settings: Settings) -> Result<()> {
        if let Commands::Config { action } = &self.command {
            let path = self.settings_path();
            return match action {
                ConfigAction::Show => config::run_show(&settings, path.as_deref()),
                ConfigAction::Init {
                    target_branches,
                    force,
                } => config::run_init(settings, path.as_deref(), target_branches.as_deref(), *force),
            };
        }

        // Fatal configuration problems surface here, before any remote call
        let ctx = CommandContext::new(&settings)?;

        match &self.command {
            Commands::Groups => browse::run_groups(&ctx).await,
            Commands::Projects { group } => browse::run_projects(&ctx, group.as_deref()).await,
            Commands::Branches {
                search,
                group,
                projects,
            } => browse::run_branches(&ctx, search.as_deref(), group.as_deref(), projects).await,
            Commands::Merge(args) => merge::run_merge(&ctx, args).await,
            Commands::Config { .. } => Ok(()),
        }
    }
}
