use anyhow::Result;
use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod cli;
mod config;
mod notify;
mod prompt;
mod publish;
mod sequence;

use cli::RootArgs;
use config::{watched_env_keys, EnvSnapshot, Settings, LOG_ENV};
use notify::UreqTransport;
use publish::{GitCli, SourceControl};

fn main() -> Result<ExitCode> {
    let args = RootArgs::parse();
    init_tracing(args.verbose);

    let env = EnvSnapshot::from_process(&watched_env_keys());
    let settings = Settings::resolve(&args, env);
    tracing::debug!(
        automated = settings.automated(),
        history = %settings.history_path.display(),
        repo_dir = %settings.repo_dir.display(),
        "settings resolved"
    );

    let transport = UreqTransport::new();
    let report = sequence::ship(
        &settings,
        prompt::obtain_commit_message,
        |settings| {
            let git = GitCli::locate(&settings.repo_dir)?;
            Ok(Box::new(git) as Box<dyn SourceControl>)
        },
        &transport,
    )?;
    tracing::debug!(summary = %report.summary(), "run finished");
    Ok(report.exit_code())
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "shipit=debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}
