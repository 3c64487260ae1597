use std::fs::File;
use std::io::{stdout, BufWriter};
use std::path::PathBuf;

use tracing::info;

use crate::cli::open_ledger;
use crate::error::Result;
use crate::export::write_csv;
use crate::ledger::scored_listing;

pub fn run(output: Option<String>) -> Result<()> {
    let (settings, conn) = open_ledger()?;
    let config = settings.fraud_config()?;
    let views = scored_listing(&conn, &config)?;

    if output.as_deref() == Some("-") {
        write_csv(&views, stdout().lock())?;
        return Ok(());
    }

    let path = output
        .map(PathBuf::from)
        .unwrap_or_else(|| settings.exports_dir().join("transactions.csv"));
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let count = write_csv(&views, BufWriter::new(File::create(&path)?))?;
    info!("Exported {count} transactions to {}", path.display());

    println!("Wrote {count} transactions to {}", path.display());
    Ok(())
}
