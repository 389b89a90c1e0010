use clap::Parser;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use horizon_login::{Cli, TracingReporter};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("unable to set logging subscriber: {e}"))?;

    let pipeline = Cli::parse().into_pipeline();
    pipeline.execute(&TracingReporter)?;
    Ok(())
}
