pub mod add;
pub mod export;
pub mod init;
pub mod list;
pub mod status;
pub mod summary;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use rusqlite::Connection;
use rust_decimal::Decimal;
use tracing::level_filters::LevelFilter;

use crate::db::{get_connection, init_db};
use crate::error::Result;
use crate::models::TxnType;
use crate::settings::{load_settings, Settings};

/// Load settings and open the ledger, creating the data directory and
/// schema on first use.
pub(crate) fn open_ledger() -> Result<(Settings, Connection)> {
    let settings = load_settings()?;
    std::fs::create_dir_all(&settings.data_dir)?;
    let conn = get_connection(&settings.db_path())?;
    init_db(&conn)?;
    Ok((settings, conn))
}

pub(crate) fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[derive(Parser)]
#[command(name = "fintrack", version, about = "Personal finance ledger with heuristic fraud flags.")]
pub struct Cli {
    /// Log verbosity on stderr: off, error, warn, info, debug, trace
    #[arg(long = "log-level", global = true, default_value = "warn")]
    pub log_level: LevelFilter,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Choose a data directory and initialize the ledger database.
    Init {
        /// Path for ledger data (default: ~/Documents/fintrack)
        #[arg(long = "data-dir")]
        data_dir: Option<String>,
    },
    /// Record a transaction and check it against the fraud rules.
    Add {
        /// Transaction date: YYYY-MM-DD (default: today)
        #[arg(long)]
        date: Option<NaiveDate>,
        /// What the money was for, e.g. 'Groceries'
        #[arg(long)]
        description: String,
        /// Positive amount, e.g. 1250.50
        #[arg(long)]
        amount: Decimal,
        /// Transaction type: credit or debit
        #[arg(long = "type")]
        txn_type: TxnType,
        /// Print the stored record as JSON
        #[arg(long)]
        json: bool,
    },
    /// List transactions with fraud flags, newest first.
    List {
        /// Start date filter: YYYY-MM-DD (inclusive)
        #[arg(long = "from")]
        from_date: Option<NaiveDate>,
        /// End date filter: YYYY-MM-DD (inclusive)
        #[arg(long = "to")]
        to_date: Option<NaiveDate>,
        /// Only show suspicious transactions
        #[arg(long)]
        flagged: bool,
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Total credits, debits and net balance.
    Summary {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Export all transactions with their fraud flags to CSV.
    Export {
        /// Output file path, or '-' for stdout (default: <data_dir>/exports/transactions.csv)
        #[arg(long)]
        output: Option<String>,
    },
    /// Show current database, fraud rules and counts.
    Status,
}
