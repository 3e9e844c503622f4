use std::process::ExitCode;

use clap::Parser;

use coverflow::AnimatorConfig;
use coverflow_sim::cli::{Cli, Command};
use coverflow_sim::error::{Result, SimError};
use coverflow_sim::{output, run, snapshot};

fn load_config(cli: &Cli) -> Result<AnimatorConfig> {
    match &cli.config {
        Some(path) => Ok(AnimatorConfig::load(path)?),
        None => Ok(AnimatorConfig::default()),
    }
}

fn execute(cli: &Cli) -> Result<serde_json::Value> {
    let config = load_config(cli)?;
    let value = match &cli.command {
        Command::Snapshot(args) => serde_json::to_value(snapshot::snapshot(config, args)?)?,
        Command::Run(args) => serde_json::to_value(run::run(config, args)?)?,
    };
    Ok(value)
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    match execute(&cli) {
        Ok(value) => match output::emit(cli.output, &value) {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                let e = SimError::from(e);
                output::emit_error(cli.output, e.exit_code(), &e.to_string());
                ExitCode::from(e.exit_code())
            }
        },
        Err(e) => {
            output::emit_error(cli.output, e.exit_code(), &e.to_string());
            ExitCode::from(e.exit_code())
        }
    }
}
