//! Attrform CLI - command-line interface for schema-driven JSON attributes
//!
//! Validates attribute documents, lists the nodes a schema flattens to, runs
//! single reducer phases and full save cycles against fixture stores.

mod cli;
mod config;
mod error;
mod handlers;
mod logging;
mod output;

use cli::{Cli, Commands};
use colored::control;
use config::Config;
use error::{Error, Result};
use logging::{timing::Timer, LoggingConfig};
use output::OutputWriter;
use std::process;
use tracing::instrument;

fn main() {
    let cli = Cli::parse_args();

    let result = Config::load_with_file(cli.config.as_deref()).and_then(|config| {
        let use_color = cli.use_color() && config.output.color;
        control::set_override(use_color);

        if let Err(e) = init_logging(&cli, &config) {
            eprintln!("Failed to initialize logging: {}", e);
        }
        run(cli, &config, use_color)
    });

    match result {
        Ok(()) => process::exit(0),
        Err(e) => {
            // validation failures were already reported in the selected output format
            if !matches!(e, Error::Core(attrform_core::Error::Validation(_))) {
                eprintln!(
                    "{}",
                    error::format_error(&e, control::SHOULD_COLORIZE.should_colorize())
                );
            }
            if e.should_show_help() {
                eprintln!("\nFor more information, try '--help'");
            }
            process::exit(e.exit_code());
        }
    }
}

#[instrument(skip_all, fields(command = ?cli.command))]
fn run(cli: Cli, config: &Config, use_color: bool) -> Result<()> {
    let _timer = Timer::new("cli_execution");
    let mut output = OutputWriter::new(cli.output, use_color, cli.quiet, cli.verbosity_level());

    tracing::info!(verbosity = cli.verbosity_level(), "executing command");

    match cli.command {
        Commands::Validate(args) => handlers::handle_validate(args, config, &mut output),
        Commands::Nodes(args) => handlers::handle_nodes(args, config, &mut output),
        Commands::Reduce(args) => handlers::handle_reduce(args, config, &mut output),
        Commands::Cycle(args) => handlers::handle_cycle(args, config, &mut output),
        Commands::Config(args) => handlers::handle_config(args, config, &mut output),
        Commands::Completions(args) => handlers::handle_completions(args),
    }
}

fn init_logging(cli: &Cli, config: &Config) -> Result<()> {
    let verbosity = cli.verbosity_level();
    let mut logging_config = LoggingConfig::from_verbosity(verbosity);
    logging_config.merge_with_settings(&config.logging, verbosity);
    logging_config.merge_with_env();

    if cli.quiet {
        logging_config.level = "error".to_string();
    }
    logging::init_logging(&logging_config)
}
