//! Main entry point for flowmap CLI

use clap::Parser;
use flowmap::cli::Cli;
use flowmap::commands::execute_command;

fn main() {
    let cli = Cli::parse();

    // Initialize logging; RUST_LOG can still narrow or widen per module
    env_logger::Builder::new()
        .filter_level(cli.log_level())
        .parse_default_env()
        .init();

    if let Err(e) = execute_command(cli.command, cli.config.as_deref(), cli.quiet) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
