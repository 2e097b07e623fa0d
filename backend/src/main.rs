mod api;
mod cli;

use calc_core::history::HistoryStore;
use clap::Parser;
use cli::{Cli, Command};
use std::path::Path;
use std::process::ExitCode;
use tracing::{error, warn};
use tracing_subscriber::EnvFilter;

/// Load the history file, starting over with an empty history if it cannot
/// be read. The unreadable file is only replaced on the next write.
pub(crate) fn open_history(path: &Path) -> HistoryStore {
    match HistoryStore::open(path) {
        Ok(store) => store,
        Err(e) => {
            warn!("Ignoring history file {}: {}", path.display(), e);
            HistoryStore::empty(path)
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => match api::serve(cli.addr, &cli.history_file).await {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                error!("Server failed: {}", e);
                ExitCode::FAILURE
            }
        },
        command => cli::run(command, &cli.history_file),
    }
}
