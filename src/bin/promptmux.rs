//! promptmux CLI Binary

use clap::Parser;
use promptmux::config::ConfigLoader;
use promptmux::logging::{init_logging, LogOutput};
use promptmux::tooling::cli::{Cli, CliContext};
use std::process;

fn main() {
    let cli = Cli::parse();

    let mut config = match ConfigLoader::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error loading configuration: {}", e);
            process::exit(1);
        }
    };

    if let Some(level) = &cli.log_level {
        config.logging.level = level.clone();
    }
    if let Some(output) = &cli.log_output {
        match output.parse::<LogOutput>() {
            Ok(output) => config.logging.output = output,
            Err(e) => {
                eprintln!("Error: {}", e);
                process::exit(2);
            }
        }
    }
    if let Err(e) = init_logging(Some(&config.logging)) {
        eprintln!("Warning: logging disabled: {}", e);
    }

    let context = match CliContext::with_config(config, cli.storage.clone()) {
        Ok(ctx) => ctx,
        Err(e) => {
            eprintln!("Error opening prompt registry: {}", e);
            process::exit(1);
        }
    };

    match context.execute(&cli.command) {
        Ok(output) => print!("{}", output),
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}
