//! Settings persistence in `~/.config/glbm/config.toml`.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Directory name for glbm settings within the user config directory.
const CONFIG_DIR: &str = "glbm";

/// Filename for settings.
const CONFIG_FILE: &str = "config.toml";

/// GitLab instance used when none is configured.
pub const DEFAULT_BASE_URL: &str = "https://gitlab.com";

/// Target branches offered when none are configured.
pub const DEFAULT_TARGET_BRANCHES: &str = "uat";

/// User settings as stored on disk
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Settings {
    /// GitLab personal access token
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    /// GitLab instance root, without trailing slash
    pub base_url: String,
    /// Top-level group whose projects are merged
    pub top_group: String,
    /// Verbose logging of API traffic
    pub debug_log: bool,
    /// Comma-separated list of allowed target branches
    pub target_branches: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            token: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            top_group: String::new(),
            debug_log: false,
            target_branches: DEFAULT_TARGET_BRANCHES.to_string(),
        }
    }
}

/// Validated settings, ready to build a client from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSettings {
    /// GitLab personal access token
    pub token: String,
    /// GitLab instance root, without trailing slash
    pub base_url: String,
    /// Top-level group, without leading/trailing slashes
    pub top_group: String,
    /// Allowed target branches, in configured order; may be empty
    pub target_branches: Vec<String>,
}

/// Strip surrounding whitespace and trailing slashes from a base URL
pub fn normalize_base_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

/// Strip surrounding whitespace and slashes from a group path
pub fn normalize_group_path(path: &str) -> String {
    path.trim().trim_matches('/').to_string()
}

/// Split a comma-separated branch list, trimming and dropping empty entries
pub fn parse_target_branches(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|b| !b.is_empty())
        .map(ToString::to_string)
        .collect()
}

/// Hide all but the last four characters of a token
pub fn mask_token(token: &str) -> String {
    let chars: Vec<char> = token.chars().collect();
    if chars.len() <= 4 {
        return "*".repeat(chars.len());
    }
    let visible: String = chars[chars.len() - 4..].iter().collect();
    format!("{}{visible}", "*".repeat(chars.len() - 4))
}

impl Settings {
    /// Apply the same normalisation the settings form applies on save
    #[must_use]
    pub fn normalized(mut self) -> Self {
        self.base_url = normalize_base_url(&self.base_url);
        self.top_group = normalize_group_path(&self.top_group);
        self.token = self
            .token
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());
        self
    }

    /// Validate required values
    ///
    /// Fails when the token, base URL or top group is missing. Target
    /// branches are only checked when a merge picks one.
    pub fn resolve(&self) -> Result<ResolvedSettings> {
        let settings = self.clone().normalized();

        let Some(token) = settings.token else {
            return Err(Error::Config(
                "GitLab access token is not set (use --token, GITLAB_TOKEN or 'token' in the settings file)"
                    .to_string(),
            ));
        };
        if settings.base_url.is_empty() {
            return Err(Error::Config("GitLab base URL is not set".to_string()));
        }
        if settings.top_group.is_empty() {
            return Err(Error::Config(
                "top group is not set (use --top-group or 'top-group' in the settings file)"
                    .to_string(),
            ));
        }

        Ok(ResolvedSettings {
            token,
            base_url: settings.base_url,
            top_group: settings.top_group,
            target_branches: parse_target_branches(&settings.target_branches),
        })
    }
}

impl ResolvedSettings {
    /// Pick the target branch for a run
    ///
    /// Without a request the first configured branch is used; a requested
    /// branch must be one of the configured ones.
    pub fn choose_target_branch(&self, requested: Option<&str>) -> Result<String> {
        let Some(first) = self.target_branches.first() else {
            return Err(Error::Config(
                "no target branches configured (set 'target-branches' in the settings file)"
                    .to_string(),
            ));
        };

        match requested.map(str::trim) {
            None => Ok(first.clone()),
            Some(branch) if self.target_branches.iter().any(|b| b == branch) => {
                Ok(branch.to_string())
            }
            Some(branch) => Err(Error::InvalidArgument(format!(
                "target branch '{branch}' is not configured (allowed: {})",
                self.target_branches.join(", ")
            ))),
        }
    }
}

/// Default settings file location, if the platform has a config directory
pub fn default_settings_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(CONFIG_DIR).join(CONFIG_FILE))
}

/// Load settings from disk.
///
/// Returns default settings if the file doesn't exist.
pub fn load_settings(path: &Path) -> Result<Settings> {
    if !path.exists() {
        return Ok(Settings::default());
    }

    let content = fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("failed to read {}: {e}", path.display())))?;

    let settings: Settings = toml::from_str(&content)
        .map_err(|e| Error::Config(format!("failed to parse {}: {e}", path.display())))?;

    Ok(settings.normalized())
}

/// Save settings to disk.
///
/// Creates the parent directory if it doesn't exist.
pub fn save_settings(path: &Path, settings: &Settings) -> Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        if !dir.exists() {
            fs::create_dir_all(dir)
                .map_err(|e| Error::Config(format!("failed to create {}: {e}", dir.display())))?;
        }
    }

    let content = toml::to_string_pretty(&settings.clone().normalized())
        .map_err(|e| Error::Config(format!("failed to serialize settings: {e}")))?;

    let content_with_header = format!("# glbm settings\n\n{content}");

    fs::write(path, content_with_header)
        .map_err(|e| Error::Config(format!("failed to write {}: {e}", path.display())))?;

    Ok(())
}
