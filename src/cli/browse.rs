//! Browse commands - groups, projects and branches

use crate::cli::context::CommandContext;
use crate::cli::style::{Stylize, spinner_style};
use anstream::println;
use gl_bulk_merge::error::Result;
use gl_bulk_merge::selection::{
    ProjectFilter, list_subgroup_paths, search_branches, select_projects,
};
use indicatif::ProgressBar;
use std::time::Duration;

fn spinner(message: String) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(spinner_style());
    spinner.set_message(message);
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner
}

/// Project filter from repeated `--project` values (none means all)
pub fn project_filter(projects: &[String]) -> ProjectFilter {
    if projects.is_empty() {
        ProjectFilter::All
    } else {
        ProjectFilter::Only(projects.to_vec())
    }
}

/// Run the groups command
pub async fn run_groups(ctx: &CommandContext) -> Result<()> {
    let top = &ctx.settings.top_group;
    let paths = list_subgroup_paths(ctx.platform.as_ref(), top).await?;

    if paths.is_empty() {
        println!("{}", format!("No subgroups under {top}").muted());
        return Ok(());
    }

    for path in paths {
        println!("{path}");
    }
    Ok(())
}

/// Run the projects command
pub async fn run_projects(ctx: &CommandContext, group: Option<&str>) -> Result<()> {
    let group_path = ctx.group_path(group);
    let projects = select_projects(ctx.platform.as_ref(), &group_path, &ProjectFilter::All).await?;

    if projects.is_empty() {
        println!("{}", format!("No projects in {group_path}").muted());
        return Ok(());
    }

    for project in projects {
        let path = project.path_with_namespace.as_deref().unwrap_or("");
        println!("{:>8}  {}  {}", project.id, project.name.emphasis(), path.muted());
    }
    Ok(())
}

/// Run the branches command
pub async fn run_branches(
    ctx: &CommandContext,
    search: Option<&str>,
    group: Option<&str>,
    projects: &[String],
) -> Result<()> {
    let group_path = ctx.group_path(group);
    let selected =
        select_projects(ctx.platform.as_ref(), &group_path, &project_filter(projects)).await?;

    let spinner = spinner(format!(
        "Searching branches in {} project(s)...",
        selected.len()
    ));
    let branches = search_branches(ctx.platform.as_ref(), &selected, search).await;
    spinner.finish_and_clear();

    if branches.is_empty() {
        println!("{}", "No matching branches".muted());
        return Ok(());
    }

    for branch in branches {
        println!("{branch}");
    }
    Ok(())
}
