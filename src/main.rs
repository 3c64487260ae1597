mod cli;
mod db;
mod error;
mod export;
mod fmt;
mod fraud;
mod ledger;
mod models;
mod settings;

use std::io::stderr;

use clap::Parser;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::Layer;

use cli::{Cli, Commands};

fn setup_logging(level: LevelFilter) {
    // stdout carries tables, JSON and CSV; logs go to stderr.
    let terminal_log = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(stderr)
        .with_filter(level);

    tracing_subscriber::registry().with(terminal_log).init();
}

fn main() {
    let cli = Cli::parse();
    setup_logging(cli.log_level);

    let result = match cli.command {
        Commands::Init { data_dir } => cli::init::run(data_dir),
        Commands::Add {
            date,
            description,
            amount,
            txn_type,
            json,
        } => cli::add::run(date, &description, amount, txn_type, json),
        Commands::List {
            from_date,
            to_date,
            flagged,
            json,
        } => cli::list::run(from_date, to_date, flagged, json),
        Commands::Summary { json } => cli::summary::run(json),
        Commands::Export { output } => cli::export::run(output),
        Commands::Status => cli::status::run(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
