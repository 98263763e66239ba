use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;

use pharmastock_cli::{Cli, execute};
use pharmastock_infra::AppConfig;

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(&cli) {
        Ok(code) => ExitCode::from(code),
        Err(err) => {
            tracing::error!(error = %format!("{err:#}"), "command failed");
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<u8> {
    let config = AppConfig::load(cli.config.as_deref()).context("load configuration")?;
    pharmastock_observability::init(&config.log);

    let output = execute(&cli.command, &config)?;
    println!("{}", output.body);
    Ok(output.exit_code)
}
