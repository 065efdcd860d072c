//! Estonian Tutor - adaptive language exercises
//!
//! Tracks learner proficiency and turns unreliable generator output into
//! validated exercise sets.

use estonian_tutor::cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = cli::parse();

    // WARN by default; RUST_LOG adds directives, --verbose forces DEBUG
    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    cli::run(cli).await
}
