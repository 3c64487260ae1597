use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::cli::{open_ledger, print_json};
use crate::error::Result;
use crate::fmt::money;
use crate::ledger;

pub fn run(json: bool) -> Result<()> {
    let (_settings, conn) = open_ledger()?;
    let summary = ledger::summary(&conn)?;

    if json {
        return print_json(&summary);
    }

    let mut table = Table::new();
    table.set_header(vec!["", "Amount"]);
    table.add_row(vec![
        Cell::new("Total Credit".green().bold()),
        Cell::new(money(summary.total_credit)),
    ]);
    table.add_row(vec![
        Cell::new("Total Debit".red().bold()),
        Cell::new(money(summary.total_debit)),
    ]);

    let net_label = if summary.net_balance.is_sign_negative() && !summary.net_balance.is_zero() {
        "Net Balance".red().bold()
    } else {
        "Net Balance".green().bold()
    };
    table.add_row(vec![Cell::new(net_label), Cell::new(money(summary.net_balance))]);

    println!("Summary\n{table}");
    Ok(())
}
