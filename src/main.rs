mod cli;
mod error;
mod fmt;
mod logging;
mod models;
mod pipeline;
mod reader;
mod settings;
mod sink;
mod transform;
mod validate;

use clap::Parser;

use cli::{Cli, Commands, ConfigCommands};

fn main() {
    let cli = Cli::parse();
    let settings = settings::load_settings();
    let guard = logging::init_logging(&settings);

    let result = match cli.command {
        Commands::Run {
            bank,
            transactions,
            delimiter,
            output,
        } => cli::run::run(
            &settings,
            &bank,
            &transactions,
            delimiter.as_deref(),
            output.as_deref(),
        ),
        Commands::Check {
            bank,
            transactions,
            delimiter,
        } => cli::check::run(&settings, &bank, &transactions, delimiter.as_deref()),
        Commands::Config { command } => match command {
            ConfigCommands::Show => cli::config::show(&settings),
            ConfigCommands::Set {
                delimiter,
                result_file,
                log_file,
                log_level,
            } => cli::config::set(&settings, delimiter, result_file, log_file, log_level),
        },
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        drop(guard);
        std::process::exit(1);
    }
}
