//! Records command - stored payroll runs with totals

use crate::cmd::Context;
use crate::money::display_amount;
use crate::payroll::{records_summary, PayrollRun};
use chrono::Datelike;
use clap::Args;
use std::io;
use tabled::{
    settings::{object::Rows, Alignment, Modify, Style},
    Table, Tabled,
};

#[derive(Args, Debug)]
pub struct RecordsCommand {
    /// Only show runs for this employee id
    #[arg(short, long)]
    employee: Option<i64>,

    /// Only show runs paid in this calendar year
    #[arg(short, long)]
    year: Option<i32>,

    /// Output as CSV instead of formatted table
    #[arg(long)]
    csv: bool,
}

/// Row for the payroll runs table
#[derive(Debug, Clone, Tabled, serde::Serialize)]
pub struct RunRow {
    #[tabled(rename = "Run")]
    pub id: i64,

    #[tabled(rename = "Date")]
    pub pay_date: String,

    #[tabled(rename = "Employee")]
    pub employee: String,

    #[tabled(rename = "Periods")]
    pub periods: u32,

    #[tabled(rename = "Gross")]
    pub gross: String,

    #[tabled(rename = "CPP")]
    pub cpp: String,

    #[tabled(rename = "EI")]
    pub ei: String,

    #[tabled(rename = "Tax")]
    pub tax: String,

    #[tabled(rename = "Net")]
    pub net: String,

    #[tabled(rename = "Remittance")]
    pub remittance: String,
}

impl RunRow {
    pub fn new(run: &PayrollRun, employee: &str) -> Self {
        RunRow {
            id: run.id,
            pay_date: run.pay_date.to_string(),
            employee: employee.to_string(),
            periods: run.frequency.periods(),
            gross: run.gross.to_string(),
            cpp: run.cpp_employee.to_string(),
            ei: run.ei_employee.to_string(),
            tax: run.tax_withheld().to_string(),
            net: run.net.to_string(),
            remittance: run.remittance().to_string(),
        }
    }
}

pub fn print_runs(rows: &[RunRow]) {
    let table = Table::new(rows)
        .with(Style::rounded())
        .with(Modify::new(Rows::new(1..)).with(Alignment::right()))
        .to_string();
    println!("{}", table);
}

impl RecordsCommand {
    pub fn exec(&self, ctx: &Context) -> anyhow::Result<()> {
        let store = ctx.open_store()?;
        let runs: Vec<(PayrollRun, String)> = store
            .all_runs()?
            .into_iter()
            .filter(|(run, _)| self.employee.map_or(true, |id| run.employee_id == id))
            .filter(|(run, _)| self.year.map_or(true, |y| run.pay_date.year() == y))
            .collect();

        let rows: Vec<RunRow> = runs.iter().map(|(run, name)| RunRow::new(run, name)).collect();

        if self.csv {
            let mut wtr = csv::Writer::from_writer(io::stdout());
            for row in &rows {
                wtr.serialize(row)?;
            }
            wtr.flush()?;
            return Ok(());
        }

        if rows.is_empty() {
            println!("No payroll runs found matching filters");
            return Ok(());
        }
        print_runs(&rows);

        let totals = records_summary(runs.iter().map(|(run, _)| run));
        println!();
        println!("  {:<20}{:>14}", "Runs:", totals.count);
        println!("  {:<20}{:>14}", "Total gross:", display_amount(totals.gross));
        println!("  {:<20}{:>14}", "Total deductions:", display_amount(totals.total_deductions));
        println!("  {:<20}{:>14}", "Total net:", display_amount(totals.net));
        println!("  {:<20}{:>14}", "Total remittance:", display_amount(totals.remittance));
        Ok(())
    }
}
