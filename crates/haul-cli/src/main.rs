use clap::Parser;
use std::process::ExitCode;
use tracing::error;

use haul_cli::{cli::Cli, commands, logging};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let log_level = logging::init(cli.level_filter());

    tokio::select! {
        result = commands::batch::execute(cli, log_level) => match result {
            Ok(status) => ExitCode::from(status.code() as u8),
            // Reader went away (`haul -g ... | head`); nothing left to report to
            Err(e) if commands::batch::is_broken_pipe(&e) => ExitCode::FAILURE,
            Err(e) => {
                error!("{:#}", e);
                ExitCode::FAILURE
            }
        },
        _ = tokio::signal::ctrl_c() => {
            eprintln!("\nKeyboardInterrupt");
            ExitCode::FAILURE
        }
    }
}
