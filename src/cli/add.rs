use chrono::NaiveDate;
use colored::Colorize;
use rust_decimal::Decimal;

use crate::cli::{open_ledger, print_json};
use crate::error::Result;
use crate::fmt::money;
use crate::ledger::create_and_score;
use crate::models::{NewTransaction, TxnType};

pub fn run(
    date: Option<NaiveDate>,
    description: &str,
    amount: Decimal,
    txn_type: TxnType,
    json: bool,
) -> Result<()> {
    let (settings, conn) = open_ledger()?;
    let config = settings.fraud_config()?;

    let new = NewTransaction {
        date: date.unwrap_or_else(|| chrono::Local::now().date_naive()),
        description: description.to_string(),
        amount,
        txn_type,
    };
    let view = create_and_score(&conn, &new, &config)?;

    if json {
        return print_json(&view);
    }

    println!(
        "Saved #{}: {} {} {} ({})",
        view.id,
        view.date,
        view.txn_type,
        money(view.amount),
        view.description
    );
    if view.is_suspicious {
        println!(
            "{} {}",
            "Flagged suspicious:".yellow().bold(),
            view.suspicious_reasons.join(", ")
        );
    }
    Ok(())
}
