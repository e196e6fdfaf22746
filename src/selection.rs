//! Group and project selection
//!
//! Turns "top group + optional subgroup + project selectors" into the
//! read-only project list a merge run operates on.

use crate::error::{Error, Result};
use crate::platform::GitLabApi;
use crate::types::{Project, ProjectRef};
use std::collections::BTreeSet;
use tracing::debug;

/// Which projects of a group to select
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProjectFilter {
    /// Every project in the group (including nested subgroups)
    All,
    /// Projects matching any selector by name, full path or numeric ID
    Only(Vec<String>),
}

/// Resolve a user-supplied group against the configured top group
///
/// `None` selects the top group itself. A group that is not already under
/// the top group is taken as relative to it (`team` → `top/team`).
pub fn resolve_group_path(top_group: &str, group: Option<&str>) -> String {
    let top = top_group.trim_matches('/');
    let Some(group) = group.map(|g| g.trim().trim_matches('/')).filter(|g| !g.is_empty()) else {
        return top.to_string();
    };

    if group == top || group.starts_with(&format!("{top}/")) {
        group.to_string()
    } else {
        format!("{top}/{group}")
    }
}

/// Full paths of the direct subgroups of `group_path`
pub async fn list_subgroup_paths(platform: &dyn GitLabApi, group_path: &str) -> Result<Vec<String>> {
    let subgroups = platform
        .list_subgroups(group_path)
        .await
        .map_err(|e| not_found_as_group(e, group_path))?;
    Ok(subgroups.into_iter().map(|g| g.full_path).collect())
}

fn not_found_as_group(err: Error, group_path: &str) -> Error {
    if err.status() == Some(404) {
        Error::GroupNotFound(group_path.to_string())
    } else {
        err
    }
}

fn matches_selector(project: &Project, selector: &str) -> bool {
    project.name == selector
        || project.path_with_namespace.as_deref() == Some(selector)
        || project.id.to_string() == selector
}

fn display_path(project: &Project) -> String {
    project
        .path_with_namespace
        .clone()
        .unwrap_or_else(|| project.id.to_string())
}

/// Check that `selector` picks out exactly one project of the listing
fn check_selector(projects: &[Project], selector: &str) -> Result<()> {
    let matched: Vec<&Project> = projects
        .iter()
        .filter(|p| matches_selector(p, selector))
        .collect();

    match matched.as_slice() {
        [] => Err(Error::ProjectNotFound(selector.to_string())),
        [_] => Ok(()),
        // Names repeat across subgroups; paths and ids never do
        many => Err(Error::InvalidArgument(format!(
            "'{selector}' matches {}; use the full path or id",
            many.iter()
                .map(|p| display_path(p))
                .collect::<Vec<_>>()
                .join(", ")
        ))),
    }
}

/// Apply `filter` to a group's project listing (pure)
///
/// Keeps the listing order. Fails with `ProjectNotFound` for the first
/// selector that matches nothing, and with `InvalidArgument` for a selector
/// that matches several projects.
pub fn filter_projects(projects: Vec<Project>, filter: &ProjectFilter) -> Result<Vec<ProjectRef>> {
    match filter {
        ProjectFilter::All => Ok(projects.into_iter().map(ProjectRef::from).collect()),
        ProjectFilter::Only(selectors) => {
            let selectors: Vec<&str> = selectors
                .iter()
                .map(|s| s.trim())
                .filter(|s| !s.is_empty())
                .collect();

            for selector in &selectors {
                check_selector(&projects, selector)?;
            }

            Ok(projects
                .into_iter()
                .filter(|p| selectors.iter().any(|sel| matches_selector(p, sel)))
                .map(ProjectRef::from)
                .collect())
        }
    }
}

/// Fetch the projects of `group_path` and apply `filter`
pub async fn select_projects(
    platform: &dyn GitLabApi,
    group_path: &str,
    filter: &ProjectFilter,
) -> Result<Vec<ProjectRef>> {
    let projects = platform
        .list_group_projects(group_path)
        .await
        .map_err(|e| not_found_as_group(e, group_path))?;
    debug!(group_path, count = projects.len(), "fetched group projects");

    filter_projects(projects, filter)
}

/// Branch names across `projects`, sorted and deduplicated
///
/// Projects whose branch listing fails are skipped.
pub async fn search_branches(
    platform: &dyn GitLabApi,
    projects: &[ProjectRef],
    search: Option<&str>,
) -> Vec<String> {
    let mut names = BTreeSet::new();

    for project in projects {
        match platform.list_branches(project.id, search).await {
            Ok(branches) => names.extend(branches.into_iter().map(|b| b.name)),
            Err(e) => {
                debug!(project_id = project.id, error = %e, "ignoring branch listing failure");
            }
        }
    }

    names.into_iter().collect()
}
