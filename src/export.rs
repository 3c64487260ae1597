use std::io::Write;

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::error::Result;
use crate::models::{TransactionId, TransactionView, TxnType};

pub const REASON_SEPARATOR: &str = "; ";

/// One CSV record. Reasons are flattened into a single column since CSV
/// fields cannot hold lists.
#[derive(Debug, Serialize)]
struct ExportRow<'a> {
    id: TransactionId,
    date: NaiveDate,
    description: &'a str,
    amount: Decimal,
    txn_type: TxnType,
    created_at: NaiveDateTime,
    is_suspicious: bool,
    suspicious_reasons: String,
}

impl<'a> From<&'a TransactionView> for ExportRow<'a> {
    fn from(view: &'a TransactionView) -> Self {
        Self {
            id: view.id,
            date: view.date,
            description: &view.description,
            amount: view.amount,
            txn_type: view.txn_type,
            created_at: view.created_at,
            is_suspicious: view.is_suspicious,
            suspicious_reasons: view.suspicious_reasons.join(REASON_SEPARATOR),
        }
    }
}

/// Write `views` as CSV with a header row. Returns the number of records.
pub fn write_csv<W: Write>(views: &[TransactionView], out: W) -> Result<usize> {
    let mut writer = csv::Writer::from_writer(out);
    for view in views {
        writer.serialize(ExportRow::from(view))?;
    }
    if views.is_empty() {
        writer.write_record([
            "id",
            "date",
            "description",
            "amount",
            "txn_type",
            "created_at",
            "is_suspicious",
            "suspicious_reasons",
        ])?;
    }
    writer.flush()?;
    Ok(views.len())
}
