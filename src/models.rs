use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::LedgerError;
use crate::fraud::FraudFindings;

pub type TransactionId = i64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TxnType {
    Credit,
    Debit,
}

impl TxnType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TxnType::Credit => "credit",
            TxnType::Debit => "debit",
        }
    }
}

impl fmt::Display for TxnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TxnType {
    type Err = LedgerError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "credit" => Ok(TxnType::Credit),
            "debit" => Ok(TxnType::Debit),
            other => Err(LedgerError::InvalidTransaction(format!(
                "unknown transaction type '{other}' (expected credit or debit)"
            ))),
        }
    }
}

/// A stored ledger row. `id` and `created_at` are assigned by the store.
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    pub id: TransactionId,
    pub date: NaiveDate,
    pub description: String,
    pub amount: Decimal,
    pub txn_type: TxnType,
    pub created_at: NaiveDateTime,
}

/// User input for a transaction that has not been stored yet.
#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub date: NaiveDate,
    pub description: String,
    pub amount: Decimal,
    pub txn_type: TxnType,
}

/// A transaction with its fraud findings overlaid, as handed to callers.
#[derive(Debug, Clone, Serialize)]
pub struct TransactionView {
    pub id: TransactionId,
    pub date: NaiveDate,
    pub description: String,
    pub amount: Decimal,
    pub txn_type: TxnType,
    pub created_at: NaiveDateTime,
    pub is_suspicious: bool,
    pub suspicious_reasons: Vec<String>,
}

impl TransactionView {
    pub fn new(txn: &Transaction, findings: &FraudFindings) -> Self {
        Self {
            id: txn.id,
            date: txn.date,
            description: txn.description.clone(),
            amount: txn.amount,
            txn_type: txn.txn_type,
            created_at: txn.created_at,
            is_suspicious: findings.is_suspicious(txn.id),
            suspicious_reasons: findings.reasons(txn.id).to_vec(),
        }
    }
}

/// Overlay findings onto every transaction, keeping the caller's order.
pub fn overlay(transactions: &[Transaction], findings: &FraudFindings) -> Vec<TransactionView> {
    transactions
        .iter()
        .map(|txn| TransactionView::new(txn, findings))
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub total_credit: Decimal,
    pub total_debit: Decimal,
    pub net_balance: Decimal,
}
