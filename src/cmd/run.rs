//! Run command - pay an employee for one period and record the run

use crate::cmd::{
    parse_amount_arg, parse_date_arg, parse_frequency_arg, print_deductions, print_disclaimer,
    Context,
};
use crate::payroll::{Ledger, RunComputation, RunRequest};
use crate::tax::{DeductionResult, PayFrequency, YtdTotals, WITHHOLDING_DISCLAIMER};
use chrono::NaiveDate;
use clap::Args;
use rust_decimal::Decimal;
use serde::Serialize;

#[derive(Args, Debug)]
pub struct RunCommand {
    /// Employee id
    #[arg(short, long)]
    employee: i64,

    /// Pay date (YYYY-MM-DD)
    #[arg(short, long, value_parser = parse_date_arg)]
    date: NaiveDate,

    /// Gross pay for the period
    #[arg(short, long, value_parser = parse_amount_arg)]
    gross: Decimal,

    /// Pay periods per year (defaults to the organization setting)
    #[arg(long, value_parser = parse_frequency_arg)]
    periods: Option<PayFrequency>,

    /// Calculate and show the run without storing it
    #[arg(long)]
    dry_run: bool,

    /// Output as JSON instead of formatted text
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Serialize)]
struct RunOutput<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    run_id: Option<i64>,
    stored: bool,
    employee_id: i64,
    employee: &'a str,
    province: String,
    pay_date: NaiveDate,
    frequency: PayFrequency,
    rates_year: i32,
    ytd_before: YtdTotals,
    #[serde(flatten)]
    deductions: &'a DeductionResult,
    remittance: Decimal,
    disclaimer: &'static str,
}

impl RunCommand {
    pub fn exec(&self, ctx: &Context) -> anyhow::Result<()> {
        let mut store = ctx.open_store()?;
        let frequency = match self.periods {
            Some(frequency) => frequency,
            None => store.settings()?.default_frequency,
        };
        let request = RunRequest {
            employee_id: self.employee,
            pay_date: self.date,
            gross: self.gross,
            frequency,
        };

        let tables = ctx.tables();
        let mut ledger = Ledger::new(&mut store, &tables);
        let (run_id, computation) = if self.dry_run {
            (None, ledger.preview(&request)?)
        } else {
            let recorded = ledger.run_payroll(&request)?;
            (Some(recorded.run.id), recorded.computation)
        };

        if self.json {
            self.print_json(frequency, run_id, &computation)
        } else {
            self.print_text(run_id, &computation);
            Ok(())
        }
    }

    fn print_json(
        &self,
        frequency: PayFrequency,
        run_id: Option<i64>,
        computation: &RunComputation,
    ) -> anyhow::Result<()> {
        let output = RunOutput {
            run_id,
            stored: run_id.is_some(),
            employee_id: computation.employee.id,
            employee: &computation.employee.name,
            province: computation.employee.jurisdiction.to_string(),
            pay_date: self.date,
            frequency,
            rates_year: computation.rates.year,
            ytd_before: computation.ytd_before,
            deductions: &computation.deductions,
            remittance: computation.deductions.remittance(),
            disclaimer: WITHHOLDING_DISCLAIMER,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        Ok(())
    }

    fn print_text(&self, run_id: Option<i64>, computation: &RunComputation) {
        let employee = &computation.employee;
        match run_id {
            Some(id) => println!("Recorded payroll run {}", id),
            None => println!("Dry run, nothing stored"),
        }
        println!(
            "Employee {}: {} ({}), paid {}",
            employee.id, employee.name, employee.jurisdiction, self.date
        );
        println!("Rates: {} ({})", computation.rates.year, computation.rates.source);
        println!();
        print_deductions(&computation.deductions);
        print_disclaimer();
    }
}
