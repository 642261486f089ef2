mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};

fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Reconcile {
            topics,
            active,
            history,
            overrides,
            json,
            out,
        } => commands::reconcile::run(
            &topics,
            active.as_deref(),
            history.as_deref(),
            overrides.as_deref(),
            json,
            out.as_deref(),
        ),
        Commands::Classify { subject, flow, body } => {
            commands::classify::run(&subject, &flow, &body)
        }
        Commands::Report {
            topics,
            active,
            history,
        } => commands::report::run(&topics, active.as_deref(), history.as_deref()),
        Commands::Version => commands::version::run(),
    }
}
