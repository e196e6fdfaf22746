//! Config command - show or write the settings file

use crate::cli::style::{Stylize, check};
use anstream::println;
use gl_bulk_merge::config::{Settings, mask_token, save_settings};
use gl_bulk_merge::error::{Error, Result};
use std::path::Path;

/// Print the effective settings
pub fn run_show(settings: &Settings, path: Option<&Path>) -> Result<()> {
    let file = path.map_or_else(|| "(none)".to_string(), |p| p.display().to_string());
    let token = settings
        .token
        .as_deref()
        .map_or_else(|| "(not set)".to_string(), mask_token);
    let top_group = if settings.top_group.is_empty() {
        "(not set)"
    } else {
        settings.top_group.as_str()
    };

    println!("{} {}", "settings file:".muted(), file);
    println!("{} {}", "base-url:".muted(), settings.base_url.accent());
    println!("{} {}", "top-group:".muted(), top_group.accent());
    println!("{} {}", "token:".muted(), token);
    println!("{} {}", "debug-log:".muted(), settings.debug_log);
    println!("{} {}", "target-branches:".muted(), settings.target_branches);
    Ok(())
}

/// Write the effective settings to the settings file
pub fn run_init(
    mut settings: Settings,
    path: Option<&Path>,
    target_branches: Option<&str>,
    force: bool,
) -> Result<()> {
    let path = path.ok_or_else(|| {
        Error::Config("no config directory on this platform; pass --config".to_string())
    })?;

    if path.exists() && !force {
        return Err(Error::InvalidArgument(format!(
            "{} already exists (use --force to overwrite)",
            path.display()
        )));
    }

    if let Some(branches) = target_branches {
        settings.target_branches = branches.to_string();
    }

    save_settings(path, &settings)?;
    println!("{} Wrote {}", check(), path.display().emphasis());
    Ok(())
}
