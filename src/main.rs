use anyhow::Result;
use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod cli;
mod config;
mod convert;
mod exec;
mod harness;
mod links;
mod natsort;
mod report;
mod scan;
mod util;

use cli::{Command, RootArgs};
use config::HarnessConfig;
use harness::RunStatus;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();
    exec::install_interrupt_handler();

    let args = RootArgs::parse();
    match run(args) {
        Ok(status) => ExitCode::from(status.exit_code()),
        Err(error) => {
            eprintln!("error: {error:#}");
            ExitCode::from(2)
        }
    }
}

fn run(args: RootArgs) -> Result<RunStatus> {
    match args.command {
        Command::Test(args) => {
            let mut config = base_config(args.config.as_deref())?;
            config.merge_overrides(
                &args.ignore,
                &[],
                args.interpreter.as_deref(),
                args.timeout_secs,
            )?;
            harness::run_test(&args.root, &config, args.verbose)
        }
        Command::Links(args) => {
            let mut config = base_config(args.config.as_deref())?;
            config.merge_overrides(&args.ignore, &args.mirror_prefix, None, None)?;
            harness::run_links(&args.root, &config, args.verbose)
        }
    }
}

fn base_config(path: Option<&std::path::Path>) -> Result<HarnessConfig> {
    match path {
        Some(path) => config::load_config(path),
        None => Ok(HarnessConfig::default()),
    }
}
