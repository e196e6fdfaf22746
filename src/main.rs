//! glbm - bulk merge requests across GitLab group projects

mod cli;

use anyhow::Result;
use clap::Parser;
use cli::Cli;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let settings = cli.load_settings()?;

    init_tracing(cli.debug || settings.debug_log);
    info!("starting glbm");

    cli.execute(settings).await?;

    Ok(())
}

/// `RUST_LOG` wins; otherwise warnings only, or debug output for this crate
fn init_tracing(debug: bool) {
    let default_filter = if debug {
        "warn,gl_bulk_merge=debug,glbm=debug"
    } else {
        "warn"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .with(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .init();
}
