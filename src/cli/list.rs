use chrono::NaiveDate;
use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::cli::{open_ledger, print_json};
use crate::error::{LedgerError, Result};
use crate::fmt::money;
use crate::ledger::{scored_listing, summarize_views};
use crate::models::{TransactionView, TxnType};

/// Narrow an already scored listing for display. Scoring always sees the
/// whole ledger, so bursts that straddle the range boundary still count.
fn filter_views(
    views: Vec<TransactionView>,
    from_date: Option<NaiveDate>,
    to_date: Option<NaiveDate>,
    flagged_only: bool,
) -> Result<Vec<TransactionView>> {
    if let (Some(from), Some(to)) = (from_date, to_date) {
        if from > to {
            return Err(LedgerError::Other(format!(
                "--from ({from}) cannot be after --to ({to})"
            )));
        }
    }
    Ok(views
        .into_iter()
        .filter(|v| from_date.map_or(true, |from| v.date >= from))
        .filter(|v| to_date.map_or(true, |to| v.date <= to))
        .filter(|v| !flagged_only || v.is_suspicious)
        .collect())
}

/// Earliest and latest transaction date in `views`.
fn date_span(views: &[TransactionView]) -> Option<(NaiveDate, NaiveDate)> {
    let min = views.iter().map(|v| v.date).min()?;
    let max = views.iter().map(|v| v.date).max()?;
    Some((min, max))
}

fn empty_message(span: Option<(NaiveDate, NaiveDate)>, flagged_only: bool) -> String {
    match span {
        None => "No transactions. Add one with `fintrack add`.".to_string(),
        Some(_) if flagged_only => "No suspicious transactions.".to_string(),
        Some((min, max)) => format!("No rows in range. Available data: {min} to {max}."),
    }
}

pub fn run(
    from_date: Option<NaiveDate>,
    to_date: Option<NaiveDate>,
    flagged_only: bool,
    json: bool,
) -> Result<()> {
    let (settings, conn) = open_ledger()?;
    let config = settings.fraud_config()?;
    let all = scored_listing(&conn, &config)?;
    let span = date_span(&all);
    let views = filter_views(all, from_date, to_date, flagged_only)?;

    if json {
        return print_json(&views);
    }

    if views.is_empty() {
        println!("{}", empty_message(span, flagged_only));
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["ID", "Date", "Description", "Amount", "Type", "Created", "Flags"]);
    for v in &views {
        let amt = match v.txn_type {
            TxnType::Credit => money(v.amount).green().to_string(),
            TxnType::Debit => money(v.amount).red().to_string(),
        };
        table.add_row(vec![
            Cell::new(v.id),
            Cell::new(v.date),
            Cell::new(&v.description),
            Cell::new(amt),
            Cell::new(v.txn_type),
            Cell::new(v.created_at.format("%Y-%m-%d %H:%M:%S")),
            Cell::new(v.suspicious_reasons.join("\n").yellow().to_string()),
        ]);
    }

    let flagged = views.iter().filter(|v| v.is_suspicious).count();
    let title = if flagged_only { "Suspicious Transactions" } else { "Transactions" };
    println!("{title} ({}, {flagged} flagged)\n{table}", views.len());

    let totals = summarize_views(&views);
    let mut by_type = Table::new();
    by_type.set_header(vec!["Type", "Total"]);
    by_type.add_row(vec![
        Cell::new(TxnType::Credit),
        Cell::new(money(totals.total_credit).green().to_string()),
    ]);
    by_type.add_row(vec![
        Cell::new(TxnType::Debit),
        Cell::new(money(totals.total_debit).red().to_string()),
    ]);
    by_type.add_row(vec![Cell::new("net"), Cell::new(money(totals.net_balance))]);
    println!("\nSpend by Type\n{by_type}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view(id: i64, date: &str, suspicious: bool) -> TransactionView {
        typed_view(id, date, "10", TxnType::Debit, suspicious)
    }

    fn typed_view(id: i64, date: &str, amount: &str, txn_type: TxnType, suspicious: bool) -> TransactionView {
        let date: NaiveDate = date.parse().unwrap();
        TransactionView {
            id,
            date,
            description: format!("txn {id}"),
            amount: amount.parse().unwrap(),
            txn_type,
            created_at: date.and_hms_opt(12, 0, 0).unwrap(),
            is_suspicious: suspicious,
            suspicious_reasons: if suspicious { vec!["reason".to_string()] } else { vec![] },
        }
    }

    fn ids(views: &[TransactionView]) -> Vec<i64> {
        views.iter().map(|v| v.id).collect()
    }

    fn sample() -> Vec<TransactionView> {
        vec![
            view(3, "2025-03-01", true),
            view(2, "2025-02-01", false),
            view(1, "2025-01-01", true),
        ]
    }

    #[test]
    fn test_no_filters_keeps_order() {
        let out = filter_views(sample(), None, None, false).unwrap();
        assert_eq!(ids(&out), vec![3, 2, 1]);
    }

    #[test]
    fn test_date_range_is_inclusive() {
        let from = Some("2025-02-01".parse().unwrap());
        let to = Some("2025-03-01".parse().unwrap());
        let out = filter_views(sample(), from, to, false).unwrap();
        assert_eq!(ids(&out), vec![3, 2]);
    }

    #[test]
    fn test_flagged_only() {
        let out = filter_views(sample(), None, None, true).unwrap();
        assert_eq!(ids(&out), vec![3, 1]);
    }

    #[test]
    fn test_inverted_range_is_an_error() {
        let from = Some("2025-03-01".parse().unwrap());
        let to = Some("2025-01-01".parse().unwrap());
        assert!(filter_views(sample(), from, to, false).is_err());
    }

    #[test]
    fn test_date_span_of_full_listing() {
        assert_eq!(date_span(&[]), None);
        let span = date_span(&sample()).unwrap();
        assert_eq!(span, ("2025-01-01".parse().unwrap(), "2025-03-01".parse().unwrap()));
    }

    #[test]
    fn test_empty_range_reports_available_span() {
        let all = sample();
        let span = date_span(&all);
        let from = Some("2026-01-01".parse().unwrap());
        let out = filter_views(all, from, None, false).unwrap();
        assert!(out.is_empty());
        assert_eq!(
            empty_message(span, false),
            "No rows in range. Available data: 2025-01-01 to 2025-03-01."
        );
        assert_eq!(empty_message(span, true), "No suspicious transactions.");
        assert!(empty_message(None, false).starts_with("No transactions."));
    }

    #[test]
    fn test_type_totals_follow_the_filter() {
        let all = vec![
            typed_view(4, "2025-03-02", "100.00", TxnType::Credit, false),
            typed_view(3, "2025-03-01", "25.50", TxnType::Debit, false),
            typed_view(2, "2025-02-10", "900.00", TxnType::Credit, false),
            typed_view(1, "2025-02-01", "10.25", TxnType::Debit, false),
        ];
        let from = Some("2025-03-01".parse().unwrap());
        let out = filter_views(all, from, None, false).unwrap();
        let totals = summarize_views(&out);
        assert_eq!(totals.total_credit.to_string(), "100.00");
        assert_eq!(totals.total_debit.to_string(), "25.50");
        assert_eq!(totals.net_balance.to_string(), "74.50");
    }
}
