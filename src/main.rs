mod cli;
mod commands;
mod output;

use clap::Parser;
use cli::{Cli, Commands};
use envswitch::{Error as SwitchError, Parser as EnvParser};

fn main() {
    if let Err(e) = run() {
        // Library errors: print with suggestions
        if let Some(switch_error) = e.downcast_ref::<SwitchError>() {
            eprintln!("Error: {}", switch_error);
            if let Some(suggestion) = switch_error.suggestion() {
                eprintln!("\nHint: {}", suggestion);
            }
        } else {
            eprintln!("Error: {:#}", e);
        }
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let parser = EnvParser::new();
    let out = output::CliOutput;

    match cli.command {
        Commands::Plan { source, json } => commands::run_plan(&parser, &source, json, &out),
        Commands::Validate { source } => commands::run_validate(&parser, &source, &out),
        Commands::List { dir } => commands::run_list(&parser, dir, &out),
        Commands::CheckHook { command } => commands::run_check_hook(&command, &out),
    }
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}
