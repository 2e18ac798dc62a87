mod cli;
mod commands;
mod telemetry;

use clap::Parser;

fn main() {
    if let Err(err) = run() {
        eprintln!("{err:?}");
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let args = cli::Cli::parse();
    let config = cli::AppConfig::try_from(args)?;
    let telemetry = telemetry::enter_runtime(&config.telemetry);
    commands::execute(&config)?;
    telemetry.dump_metrics();
    Ok(())
}
