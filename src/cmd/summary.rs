//! Summary command - year-end totals for one employee

use crate::cmd::{print_disclaimer, Context};
use crate::error::PayrollError;
use crate::money::display_amount;
use crate::payroll::{year_end_summary, YearEndSummary};
use clap::Args;
use rust_decimal::Decimal;
use tabled::{
    settings::{object::Rows, Alignment, Modify, Style},
    Table, Tabled,
};

#[derive(Args, Debug)]
pub struct SummaryCommand {
    /// Employee id
    #[arg(short, long)]
    employee: i64,

    /// Calendar year to summarize
    #[arg(short, long)]
    year: i32,

    /// Output as JSON instead of formatted text
    #[arg(long)]
    json: bool,
}

#[derive(Tabled)]
struct ProgressRow {
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Gross")]
    gross: String,
    #[tabled(rename = "CPP")]
    cpp: String,
    #[tabled(rename = "YTD CPP")]
    ytd_cpp: String,
    #[tabled(rename = "EI")]
    ei: String,
    #[tabled(rename = "YTD EI")]
    ytd_ei: String,
}

impl SummaryCommand {
    pub fn exec(&self, ctx: &Context) -> anyhow::Result<()> {
        let store = ctx.open_store()?;
        let employee = store
            .employee_by_id(self.employee)?
            .ok_or(PayrollError::EmployeeNotFound(self.employee))?;
        let runs = store.runs_for_year(employee.id, self.year)?;
        let rates = ctx.tables().rates_for(self.year);
        let summary = year_end_summary(employee, self.year, &runs, &rates);

        if self.json {
            println!("{}", serde_json::to_string_pretty(&summary)?);
        } else {
            print_summary(&summary);
        }
        Ok(())
    }
}

fn print_summary(summary: &YearEndSummary) {
    let employee = &summary.employee;
    println!(
        "Year-end summary {} for {} (employee {})",
        summary.year, employee.name, employee.id
    );
    if let Some(sin) = &employee.tax_id {
        println!("SIN: {}", sin);
    }
    println!("Province of employment: {}", employee.jurisdiction);
    println!("Pay periods: {}", summary.pay_periods);
    println!();

    let line = |label: &str, amount: Decimal| {
        println!("  {:<40}{:>14}", label, display_amount(amount))
    };
    line("Box 14  Employment income:", summary.employment_income);
    line("Box 16  Employee's CPP contributions:", summary.cpp_contributions);
    line("Box 18  Employee's EI premiums:", summary.ei_premiums);
    line("Box 22  Income tax deducted:", summary.income_tax);
    line("          federal:", summary.federal_tax);
    line("          provincial:", summary.provincial_tax);
    println!();
    println!(
        "  CPP {} of {}{}",
        display_amount(summary.cpp_contributions),
        display_amount(summary.cpp_annual_max),
        if summary.cpp_at_max { " (annual maximum reached)" } else { "" }
    );
    println!(
        "  EI  {} of {}{}",
        display_amount(summary.ei_premiums),
        display_amount(summary.ei_annual_max),
        if summary.ei_at_max { " (annual maximum reached)" } else { "" }
    );

    if !summary.progression.is_empty() {
        let rows: Vec<ProgressRow> = summary
            .progression
            .iter()
            .map(|p| ProgressRow {
                date: p.pay_date.to_string(),
                gross: p.gross.to_string(),
                cpp: p.cpp.to_string(),
                ytd_cpp: p.ytd_cpp.to_string(),
                ei: p.ei.to_string(),
                ytd_ei: p.ytd_ei.to_string(),
            })
            .collect();
        let table = Table::new(rows)
            .with(Style::rounded())
            .with(Modify::new(Rows::new(1..)).with(Alignment::right()))
            .to_string();
        println!();
        println!("{}", table);
    }
    print_disclaimer();
}
