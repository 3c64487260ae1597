use std::collections::BTreeMap;

use chrono::Duration;
use rust_decimal::Decimal;
use tracing::debug;

use crate::error::{LedgerError, Result};
use crate::models::{Transaction, TransactionId, TxnType};

pub const DEFAULT_AMOUNT_THRESHOLD: i64 = 50_000;
pub const DEFAULT_BURST_WINDOW_MINUTES: i64 = 5;
pub const DEFAULT_BURST_COUNT: usize = 3;

/// Rule parameters for a scoring pass.
///
/// Only constructible through [`FraudConfig::new`] or `Default`, so a value in
/// hand always has a non-negative threshold, a positive window and a burst
/// count of at least two.
#[derive(Debug, Clone, PartialEq)]
pub struct FraudConfig {
    amount_threshold: Decimal,
    burst_window: Duration,
    burst_count: usize,
}

impl FraudConfig {
    pub fn new(amount_threshold: Decimal, burst_window: Duration, burst_count: usize) -> Result<Self> {
        if amount_threshold.is_sign_negative() && !amount_threshold.is_zero() {
            return Err(LedgerError::InvalidConfig(format!(
                "amount threshold must not be negative (got {amount_threshold})"
            )));
        }
        if burst_window <= Duration::zero() {
            return Err(LedgerError::InvalidConfig(format!(
                "burst window must be positive (got {}s)",
                burst_window.num_seconds()
            )));
        }
        if burst_count < 2 {
            return Err(LedgerError::InvalidConfig(format!(
                "burst count must be at least 2 (got {burst_count})"
            )));
        }
        Ok(Self {
            amount_threshold,
            burst_window,
            burst_count,
        })
    }

    pub fn from_minutes(amount_threshold: Decimal, burst_window_minutes: i64, burst_count: usize) -> Result<Self> {
        let burst_window = Duration::try_minutes(burst_window_minutes).ok_or_else(|| {
            LedgerError::InvalidConfig(format!(
                "burst window of {burst_window_minutes} minutes is out of range"
            ))
        })?;
        Self::new(amount_threshold, burst_window, burst_count)
    }

    pub fn burst_count(&self) -> usize {
        self.burst_count
    }

    /// Threshold as shown to users: `50000`, not `50000.00`.
    pub fn threshold_label(&self) -> String {
        self.amount_threshold.normalize().to_string()
    }

    /// Window length in minutes, fractional only when the window is not a
    /// whole number of minutes.
    pub fn window_minutes_label(&self) -> String {
        let seconds = Decimal::from(self.burst_window.num_seconds());
        (seconds / Decimal::from(60)).normalize().to_string()
    }

    fn large_amount_reason(&self) -> String {
        format!("Large amount >= {}", self.threshold_label())
    }

    fn burst_reason(&self) -> String {
        format!(
            "{}+ debits within {} min",
            self.burst_count,
            self.window_minutes_label()
        )
    }
}

impl Default for FraudConfig {
    fn default() -> Self {
        Self {
            amount_threshold: Decimal::from(DEFAULT_AMOUNT_THRESHOLD),
            burst_window: Duration::minutes(DEFAULT_BURST_WINDOW_MINUTES),
            burst_count: DEFAULT_BURST_COUNT,
        }
    }
}

/// Reasons per flagged transaction, in the order the rules produced them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FraudFindings {
    reasons: BTreeMap<TransactionId, Vec<String>>,
}

impl FraudFindings {
    fn flag(&mut self, id: TransactionId, reason: String) {
        self.reasons.entry(id).or_default().push(reason);
    }

    pub fn is_suspicious(&self, id: TransactionId) -> bool {
        self.reasons.contains_key(&id)
    }

    pub fn reasons(&self, id: TransactionId) -> &[String] {
        self.reasons.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.reasons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reasons.is_empty()
    }
}

/// Run both rules over `transactions`.
///
/// Large-amount reasons are recorded before burst reasons. Debits are ordered
/// by `created_at` then `id`, independent of the order they were passed in,
/// and every qualifying window of `burst_count` consecutive debits adds one
/// reason to each of its members, so overlapping windows repeat the reason.
pub fn score(transactions: &[Transaction], config: &FraudConfig) -> FraudFindings {
    let mut findings = FraudFindings::default();

    let large_reason = config.large_amount_reason();
    for txn in transactions {
        if txn.amount >= config.amount_threshold {
            findings.flag(txn.id, large_reason.clone());
        }
    }

    let mut debits: Vec<&Transaction> = transactions
        .iter()
        .filter(|txn| txn.txn_type == TxnType::Debit)
        .collect();
    debits.sort_by_key(|txn| (txn.created_at, txn.id));

    let burst_reason = config.burst_reason();
    let mut bursts = 0usize;
    for window in debits.windows(config.burst_count) {
        let (Some(first), Some(last)) = (window.first(), window.last()) else {
            continue;
        };
        if last.created_at - first.created_at <= config.burst_window {
            bursts += 1;
            for txn in window {
                findings.flag(txn.id, burst_reason.clone());
            }
        }
    }

    debug!(
        transactions = transactions.len(),
        debits = debits.len(),
        bursts,
        flagged = findings.len(),
        clean = findings.is_empty(),
        "fraud scoring pass complete"
    );

    findings
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};
    use std::str::FromStr;

    fn base_time() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, 1)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap()
    }

    fn txn(id: i64, amount: &str, txn_type: TxnType, minute: i64) -> Transaction {
        Transaction {
            id,
            date: base_time().date(),
            description: format!("txn {id}"),
            amount: Decimal::from_str(amount).unwrap(),
            txn_type,
            created_at: base_time() + Duration::minutes(minute),
        }
    }

    fn debit(id: i64, minute: i64) -> Transaction {
        txn(id, "10.00", TxnType::Debit, minute)
    }

    const BURST: &str = "3+ debits within 5 min";

    #[test]
    fn test_empty_input_yields_no_findings() {
        let findings = score(&[], &FraudConfig::default());
        assert!(findings.is_empty());
    }

    #[test]
    fn test_single_small_transaction_is_clean() {
        let findings = score(&[debit(1, 0)], &FraudConfig::default());
        assert!(findings.is_empty());
        assert!(!findings.is_suspicious(1));
        assert!(findings.reasons(1).is_empty());
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let txns = vec![
            txn(1, "50000", TxnType::Credit, 0),
            txn(2, "49999.99", TxnType::Credit, 1),
            txn(3, "50000.00", TxnType::Debit, 20),
        ];
        let findings = score(&txns, &FraudConfig::default());
        assert_eq!(findings.reasons(1), ["Large amount >= 50000"]);
        assert!(!findings.is_suspicious(2));
        assert_eq!(findings.reasons(3), ["Large amount >= 50000"]);
    }

    #[test]
    fn test_fractional_threshold_label() {
        let config = FraudConfig::from_minutes(Decimal::from_str("1000.50").unwrap(), 5, 3).unwrap();
        let findings = score(&[txn(1, "1000.50", TxnType::Credit, 0)], &config);
        assert_eq!(findings.reasons(1), ["Large amount >= 1000.5"]);
    }

    #[test]
    fn test_burst_within_window_flags_all_three() {
        let findings = score(&[debit(1, 0), debit(2, 2), debit(3, 4)], &FraudConfig::default());
        for id in 1..=3 {
            assert_eq!(findings.reasons(id), [BURST]);
        }
    }

    #[test]
    fn test_span_over_window_is_not_a_burst() {
        let findings = score(&[debit(1, 0), debit(2, 2), debit(3, 6)], &FraudConfig::default());
        assert!(findings.is_empty());
    }

    #[test]
    fn test_span_equal_to_window_is_a_burst() {
        let findings = score(&[debit(1, 0), debit(2, 1), debit(3, 5)], &FraudConfig::default());
        assert_eq!(findings.len(), 3);
    }

    #[test]
    fn test_overlapping_windows_repeat_reason() {
        let txns = vec![debit(1, 0), debit(2, 1), debit(3, 2), debit(4, 3)];
        let findings = score(&txns, &FraudConfig::default());
        assert_eq!(findings.reasons(1).len(), 1);
        assert_eq!(findings.reasons(2), [BURST, BURST]);
        assert_eq!(findings.reasons(3), [BURST, BURST]);
        assert_eq!(findings.reasons(4).len(), 1);
    }

    #[test]
    fn test_credits_never_form_bursts() {
        let txns = vec![
            txn(1, "10", TxnType::Credit, 0),
            txn(2, "10", TxnType::Credit, 0),
            txn(3, "10", TxnType::Credit, 0),
        ];
        assert!(score(&txns, &FraudConfig::default()).is_empty());
    }

    #[test]
    fn test_credits_between_debits_do_not_break_burst() {
        let txns = vec![
            debit(1, 0),
            txn(2, "10", TxnType::Credit, 1),
            debit(3, 2),
            debit(4, 3),
        ];
        let findings = score(&txns, &FraudConfig::default());
        assert!(!findings.is_suspicious(2));
        assert_eq!(findings.reasons(1), [BURST]);
        assert_eq!(findings.reasons(4), [BURST]);
    }

    #[test]
    fn test_caller_order_does_not_affect_result() {
        let ascending = vec![debit(1, 0), debit(2, 1), debit(3, 2), debit(4, 30)];
        let mut descending = ascending.clone();
        descending.reverse();
        let config = FraudConfig::default();
        assert_eq!(score(&ascending, &config), score(&descending, &config));
    }

    #[test]
    fn test_equal_timestamps_tie_break_by_id() {
        // ids 5 and 6 share a timestamp; id order decides which falls inside
        // the window that reaches the debit at minute 7.
        let config = FraudConfig::from_minutes(Decimal::from(50_000), 5, 2).unwrap();
        let txns = vec![debit(6, 2), debit(5, 2), debit(7, 7)];
        let findings = score(&txns, &config);
        let reason = "2+ debits within 5 min";
        assert_eq!(findings.reasons(5), [reason]);
        assert_eq!(findings.reasons(6), [reason, reason]);
        assert_eq!(findings.reasons(7), [reason]);
    }

    #[test]
    fn test_large_amount_reason_precedes_burst_reason() {
        let txns = vec![
            debit(1, 0),
            txn(2, "75000", TxnType::Debit, 1),
            debit(3, 2),
        ];
        let findings = score(&txns, &FraudConfig::default());
        assert_eq!(findings.reasons(2), ["Large amount >= 50000", BURST]);
    }

    #[test]
    fn test_scoring_is_idempotent() {
        let txns = vec![debit(1, 0), debit(2, 1), txn(3, "90000", TxnType::Credit, 2), debit(4, 3)];
        let config = FraudConfig::default();
        assert_eq!(score(&txns, &config), score(&txns, &config));
    }

    #[test]
    fn test_fewer_debits_than_burst_count() {
        assert!(score(&[debit(1, 0), debit(2, 0)], &FraudConfig::default()).is_empty());
    }

    #[test]
    fn test_config_rejects_invalid_values() {
        let threshold = Decimal::from(50_000);
        assert!(matches!(
            FraudConfig::from_minutes(threshold, 5, 0),
            Err(LedgerError::InvalidConfig(_))
        ));
        assert!(FraudConfig::from_minutes(threshold, 5, 1).is_err());
        assert!(FraudConfig::from_minutes(threshold, 0, 3).is_err());
        assert!(FraudConfig::from_minutes(threshold, -5, 3).is_err());
        assert!(FraudConfig::from_minutes(Decimal::from(-1), 5, 3).is_err());
        assert!(matches!(
            FraudConfig::from_minutes(threshold, 200_000_000_000_000, 3),
            Err(LedgerError::InvalidConfig(_))
        ));
        assert!(FraudConfig::from_minutes(threshold, i64::MIN, 3).is_err());
        assert!(FraudConfig::from_minutes(Decimal::ZERO, 5, 2).is_ok());
    }

    #[test]
    fn test_window_label_for_partial_minutes() {
        let config = FraudConfig::new(Decimal::from(100), Duration::seconds(90), 3).unwrap();
        assert_eq!(config.window_minutes_label(), "1.5");
        assert_eq!(FraudConfig::default().window_minutes_label(), "5");
    }
}
