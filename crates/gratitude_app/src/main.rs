use std::process::ExitCode;

use clap::Parser;
use gratitude_app::{
    app::{AppConfig, AppController},
    cli::{Cli, Commands},
};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Failed to read configuration: {err:#}");
            return ExitCode::FAILURE;
        }
    };
    if let Some(root) = cli.root {
        config = config.with_root(root);
    }
    if let Some(goal) = cli.goal {
        config = match config.with_goal(goal) {
            Ok(config) => config,
            Err(err) => {
                eprintln!("{err}");
                return ExitCode::FAILURE;
            }
        };
    }

    let mut controller = match AppController::new(config, cli.json) {
        Ok(controller) => controller,
        Err(err) => {
            eprintln!("Failed to open journal: {err:#}");
            return ExitCode::FAILURE;
        }
    };
    match controller.handle(cli.command.unwrap_or(Commands::Today)) {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(status) => {
            eprintln!("{status}");
            ExitCode::FAILURE
        }
    }
}
