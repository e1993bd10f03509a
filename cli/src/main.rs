//! LinkOpener command-line entry point.

mod cli;
mod commands;
mod progress;

use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use linkopener_core::{Config, CoreError, LinkOpener};

use cli::{Cli, Commands};

fn main() -> ExitCode {
    let cli = Cli::parse();
    linkopener_core::init_logging(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            print_error(&e);
            ExitCode::FAILURE
        }
    }
}

/// Print the error category when it comes from the core, then the message chain.
fn print_error(e: &anyhow::Error) {
    match e.downcast_ref::<CoreError>() {
        Some(core) => eprintln!("{}: {}", core.kind(), core),
        None => eprintln!("Error: {:#}", e),
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut config = Config::load_or_default(cli.config.as_deref())?;
    if let Some(driver) = cli.driver {
        config.driver_path = driver;
    }

    let mut opener = LinkOpener::new(config);
    let result = match cli.command {
        Commands::Scan { file } => commands::scan(&mut opener, &file),
        Commands::Export {
            file,
            output,
            force,
        } => commands::export(&mut opener, &file, output.as_deref(), force).map(|_| ()),
        Commands::Open { file } => commands::open(&mut opener, &file),
        Commands::OpenUrl { url } => commands::open_url(&opener, &url),
    };

    opener.shutdown();
    result
}
