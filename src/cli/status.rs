use crate::db::get_connection;
use crate::error::Result;
use crate::fmt::format_bytes;
use crate::ledger::{count_transactions, scored_listing};
use crate::settings::load_settings;

pub fn run() -> Result<()> {
    let settings = load_settings()?;
    let db_path = settings.db_path();
    let config = settings.fraud_config()?;

    println!("Data dir:   {}", settings.data_dir);
    println!("Database:   {}", db_path.display());

    println!();
    println!("Fraud rules");
    println!("  Large amount:  >= {}", config.threshold_label());
    println!(
        "  Burst debits:  {}+ within {} min",
        config.burst_count(),
        config.window_minutes_label()
    );

    if db_path.exists() {
        let size = std::fs::metadata(&db_path)?.len();
        let conn = get_connection(&db_path)?;
        let transactions = count_transactions(&conn)?;
        let flagged = scored_listing(&conn, &config)?
            .iter()
            .filter(|v| v.is_suspicious)
            .count();

        println!();
        println!("DB size:       {}", format_bytes(size));
        println!("Transactions:  {transactions}");
        println!("Flagged:       {flagged}");
    } else {
        println!();
        println!("Database not found. Run `fintrack init` to set up.");
    }

    Ok(())
}
