//! Merge command - create and accept an MR in every selected project

use crate::cli::MergeArgs;
use crate::cli::context::CommandContext;
use crate::cli::report::CliReporter;
use crate::cli::style::{Stylize, WARN, check, spinner_style};
use anstream::{eprintln, println};
use dialoguer::Confirm;
use gl_bulk_merge::error::{Error, Result};
use gl_bulk_merge::merge::{
    BulkMergeSummary, CancelFlag, ExecuteOptions, MergeJob, PollPolicy, execute_bulk_merge,
};
use gl_bulk_merge::selection::{ProjectFilter, select_projects};
use gl_bulk_merge::types::ProjectRef;
use indicatif::ProgressBar;
use std::time::Duration;

/// Title used for MRs created by the merge command
pub fn auto_merge_title(source: &str, target: &str) -> String {
    format!("Auto merge: {source} → {target}")
}

/// Build the job from the arguments, validating both branches
fn merge_job(ctx: &CommandContext, args: &MergeArgs) -> Result<MergeJob> {
    let source = args.source.trim();
    if source.is_empty() {
        return Err(Error::InvalidArgument(
            "source branch cannot be blank".to_string(),
        ));
    }
    let target = ctx.settings.choose_target_branch(args.target.as_deref())?;

    let title = args
        .title
        .clone()
        .unwrap_or_else(|| auto_merge_title(source, &target));

    Ok(MergeJob::new(source, target).with_title(title))
}

fn execute_options(args: &MergeArgs) -> ExecuteOptions {
    ExecuteOptions {
        poll: PollPolicy::new(
            args.poll_attempts,
            Duration::from_millis(args.poll_interval_ms),
        ),
        concurrency: usize::from(args.concurrency),
    }
}

/// Run the merge command
pub async fn run_merge(ctx: &CommandContext, args: &MergeArgs) -> Result<()> {
    // Everything fatal is checked before the first MR is touched
    let job = merge_job(ctx, args)?;
    let group_path = ctx.group_path(args.group.as_deref());
    let filter = if args.all {
        ProjectFilter::All
    } else {
        ProjectFilter::Only(args.projects.clone())
    };

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(spinner_style());
    spinner.set_message(format!("Loading projects of {}...", group_path.emphasis()));
    spinner.enable_steady_tick(Duration::from_millis(80));

    let projects = select_projects(ctx.platform.as_ref(), &group_path, &filter).await?;

    spinner.finish_and_clear();

    if projects.is_empty() {
        println!("{}", "No projects selected.".muted());
        return Ok(());
    }

    if args.dry_run {
        report_merge_dry_run(&job, &projects);
        return Ok(());
    }

    if args.confirm {
        report_merge_dry_run(&job, &projects);
        if !Confirm::new()
            .with_prompt("Proceed with merge?")
            .default(true)
            .interact()
            .map_err(|e| Error::Internal(format!("Failed to read confirmation: {e}")))?
        {
            println!("{}", "Aborted".muted());
            return Ok(());
        }
        println!();
    }

    println!(
        "{} {} ({})",
        "Merging".emphasis(),
        format!("{} project(s)", projects.len()).accent(),
        job.direction()
    );

    let cancel = CancelFlag::new();
    let signal_task = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                eprintln!(
                    "{}",
                    "Cancelling: projects in progress will finish, the rest are skipped".warn()
                );
                cancel.cancel();
            }
        })
    };

    let reporter = CliReporter::new(projects.len(), &job);
    let summary = execute_bulk_merge(
        &projects,
        &job,
        ctx.platform.as_ref(),
        &reporter,
        &execute_options(args),
        &cancel,
    )
    .await;
    reporter.finish();
    signal_task.abort();

    print_merge_summary(&summary);

    summary.into_result().map(|_| ())
}

/// Print merge summary
fn print_merge_summary(summary: &BulkMergeSummary) {
    println!();
    if summary.is_success() && summary.warnings() == 0 {
        println!("{} Merge complete!", check());
    } else {
        println!("{} Merge partially complete", WARN.warn());
    }

    println!(
        "   {} merged, {} need manual handling, {} failed",
        summary.succeeded().to_string().success(),
        summary.warnings().to_string().warn(),
        summary.failed().to_string().error()
    );
}

/// Report what would be merged (dry run)
fn report_merge_dry_run(job: &MergeJob, projects: &[ProjectRef]) {
    println!("{}:", "Merge plan".emphasis());
    println!();
    println!("  {} {}", "Branches:".muted(), job.direction().accent());
    if let Some(title) = &job.title {
        println!("  {} {}", "Title:".muted(), title);
    }
    println!();

    for project in projects {
        let path = project.path_with_namespace.as_deref().unwrap_or("");
        println!(
            "  {} {} {}",
            "→ Would merge".success(),
            project.name,
            path.muted()
        );
    }

    println!();
    println!("{}", "Run without --dry-run to execute.".muted());
}
