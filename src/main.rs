mod cli;
mod commands;
mod config;
mod context;
mod resource;
mod status;
mod ui;
mod verify;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Command, ProviderArgs};

/// Global context for the application
pub struct Context {
    pub quiet: bool,
    pub json: bool,
    pub provider: ProviderArgs,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    let log_level = match cli.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    env_logger::Builder::new()
        .filter_level(if cli.quiet {
            log::LevelFilter::Error
        } else {
            log_level
        })
        .format_timestamp(None)
        .init();

    let ctx = Context {
        quiet: cli.quiet,
        json: cli.json,
        provider: cli.provider,
    };

    match cli.command {
        Command::Schema { type_name } => commands::schema::run(type_name.as_deref()),
        Command::Create(args) => commands::lifecycle::create(&ctx, args),
        Command::Read(args) => commands::lifecycle::read(&ctx, args),
        Command::Update(args) => commands::lifecycle::update(&ctx, args),
        Command::Delete(args) => commands::lifecycle::delete(&ctx, args),
        Command::Import { type_name, id, out } => {
            commands::lifecycle::import(&ctx, type_name, id, out.as_deref())
        }
        Command::Apply(args) => commands::apply::run(&ctx, args),
    }
}
