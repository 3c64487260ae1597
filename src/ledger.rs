use std::str::FromStr;

use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension, Row};
use rust_decimal::{Decimal, RoundingStrategy};
use tracing::{debug, info};

use crate::error::{LedgerError, Result};
use crate::fraud::{score, FraudConfig};
use crate::models::{overlay, NewTransaction, Summary, Transaction, TransactionId, TransactionView, TxnType};

pub const MAX_DESCRIPTION_CHARS: usize = 255;
const AMOUNT_SCALE: u32 = 2;

/// Largest amount the ledger holds: twelve digits, two after the point.
pub fn max_amount() -> Decimal {
    Decimal::new(999_999_999_999, AMOUNT_SCALE)
}

const SELECT_COLUMNS: &str = "SELECT id, date, description, amount, txn_type, created_at FROM transactions";

fn row_to_transaction(row: &Row<'_>) -> rusqlite::Result<Transaction> {
    let amount: String = row.get(3)?;
    let txn_type: String = row.get(4)?;
    Ok(Transaction {
        id: row.get(0)?,
        date: row.get(1)?,
        description: row.get(2)?,
        amount: Decimal::from_str(&amount)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(3, Type::Text, Box::new(e)))?,
        txn_type: TxnType::from_str(&txn_type)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(4, Type::Text, Box::new(e)))?,
        created_at: row.get(5)?,
    })
}

/// Round half away from zero and pin the scale to cents.
fn to_cents(value: Decimal) -> Decimal {
    let mut cents = value.round_dp_with_strategy(AMOUNT_SCALE, RoundingStrategy::MidpointAwayFromZero);
    cents.rescale(AMOUNT_SCALE);
    cents
}

/// Trim and bound the description, round the amount to cents.
fn validate(new: &NewTransaction) -> Result<(String, Decimal)> {
    let description = new.description.trim();
    if description.is_empty() {
        return Err(LedgerError::InvalidTransaction("description must not be empty".to_string()));
    }
    if description.chars().count() > MAX_DESCRIPTION_CHARS {
        return Err(LedgerError::InvalidTransaction(format!(
            "description must be at most {MAX_DESCRIPTION_CHARS} characters"
        )));
    }

    let amount = to_cents(new.amount);
    if amount <= Decimal::ZERO {
        return Err(LedgerError::InvalidTransaction(format!(
            "amount must be greater than zero (got {})",
            new.amount
        )));
    }
    if amount > max_amount() {
        return Err(LedgerError::InvalidTransaction(format!(
            "amount must not exceed {}",
            max_amount()
        )));
    }

    Ok((description.to_string(), amount))
}

pub fn create_transaction(conn: &Connection, new: &NewTransaction) -> Result<Transaction> {
    let (description, amount) = validate(new)?;
    conn.execute(
        "INSERT INTO transactions (date, description, amount, txn_type) VALUES (?1, ?2, ?3, ?4)",
        rusqlite::params![new.date, description, amount.to_string(), new.txn_type.as_str()],
    )?;
    let id = conn.last_insert_rowid();
    info!("Recorded transaction [{id}]:[{}] for {amount}", new.txn_type);

    get_transaction(conn, id)?
        .ok_or_else(|| LedgerError::Other(format!("transaction [{id}] missing after insert")))
}

pub fn get_transaction(conn: &Connection, id: TransactionId) -> Result<Option<Transaction>> {
    let sql = format!("{SELECT_COLUMNS} WHERE id = ?1");
    Ok(conn.query_row(&sql, [id], row_to_transaction).optional()?)
}

/// Every transaction, newest date first, ties by newest id.
pub fn list_transactions(conn: &Connection) -> Result<Vec<Transaction>> {
    let sql = format!("{SELECT_COLUMNS} ORDER BY date DESC, id DESC");
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map([], row_to_transaction)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    debug!("Loaded {} transactions", rows.len());
    Ok(rows)
}

pub fn count_transactions(conn: &Connection) -> Result<i64> {
    Ok(conn.query_row("SELECT count(*) FROM transactions", [], |r| r.get(0))?)
}

fn fold_totals<I>(entries: I) -> Summary
where
    I: IntoIterator<Item = (Decimal, TxnType)>,
{
    let mut total_credit = Decimal::ZERO;
    let mut total_debit = Decimal::ZERO;
    for (amount, txn_type) in entries {
        match txn_type {
            TxnType::Credit => total_credit += amount,
            TxnType::Debit => total_debit += amount,
        }
    }

    Summary {
        total_credit: to_cents(total_credit),
        total_debit: to_cents(total_debit),
        net_balance: to_cents(total_credit - total_debit),
    }
}

pub fn summary(conn: &Connection) -> Result<Summary> {
    let mut stmt = conn.prepare("SELECT amount, txn_type FROM transactions")?;
    let rows: Vec<(String, String)> = stmt
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let entries = rows
        .into_iter()
        .map(|(amount, txn_type)| -> Result<(Decimal, TxnType)> {
            let amount = Decimal::from_str(&amount).map_err(|e| {
                LedgerError::Other(format!("stored amount '{amount}' is not a decimal: {e}"))
            })?;
            Ok((amount, TxnType::from_str(&txn_type)?))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(fold_totals(entries))
}

/// Credit and debit totals over rows already in hand, e.g. a filtered listing.
pub fn summarize_views(views: &[TransactionView]) -> Summary {
    fold_totals(views.iter().map(|v| (v.amount, v.txn_type)))
}

/// Store one transaction and score it on its own. Only the large-amount rule
/// can fire here; bursts need the rest of the ledger.
pub fn create_and_score(conn: &Connection, new: &NewTransaction, config: &FraudConfig) -> Result<TransactionView> {
    let created = create_transaction(conn, new)?;
    let findings = score(std::slice::from_ref(&created), config);
    Ok(TransactionView::new(&created, &findings))
}

/// The whole ledger in display order with findings from a single pass over it.
pub fn scored_listing(conn: &Connection, config: &FraudConfig) -> Result<Vec<TransactionView>> {
    let rows = list_transactions(conn)?;
    let findings = score(&rows, config);
    Ok(overlay(&rows, &findings))
}
