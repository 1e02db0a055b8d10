//! Calc command - deductions for a single pay period, nothing stored

use crate::cmd::{
    parse_amount_arg, parse_frequency_arg, print_deductions, print_disclaimer, Context,
};
use crate::tax::{
    compute_payroll, DeductionResult, PayFrequency, YtdTotals, WITHHOLDING_DISCLAIMER,
};
use chrono::Datelike;
use clap::Args;
use rust_decimal::Decimal;
use serde::Serialize;

#[derive(Args, Debug)]
pub struct CalcCommand {
    /// Gross pay for the period (e.g. 3000 or 3,000.00)
    #[arg(short, long, value_parser = parse_amount_arg)]
    gross: Decimal,

    /// Province or territory code (e.g. ON, QC, BC)
    #[arg(short, long, default_value = "ON")]
    province: String,

    /// Pay periods per year: 12, 24, 26 or 52
    #[arg(long, value_parser = parse_frequency_arg, default_value = "12")]
    periods: PayFrequency,

    /// CPP already contributed this year
    #[arg(long, value_parser = parse_amount_arg, default_value = "0")]
    ytd_cpp: Decimal,

    /// EI premiums already paid this year
    #[arg(long, value_parser = parse_amount_arg, default_value = "0")]
    ytd_ei: Decimal,

    /// Tax year of the rates to use (defaults to the current year)
    #[arg(short, long)]
    year: Option<i32>,

    /// Output as JSON instead of formatted text
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Serialize)]
struct CalcOutput<'a> {
    year: i32,
    rates_source: String,
    province: String,
    frequency: PayFrequency,
    #[serde(flatten)]
    deductions: &'a DeductionResult,
    employer_cost: Decimal,
    remittance: Decimal,
    disclaimer: &'static str,
}

impl CalcCommand {
    pub fn exec(&self, ctx: &Context) -> anyhow::Result<()> {
        let year = self.year.unwrap_or_else(|| chrono::Local::now().year());
        let rates = ctx.tables().rates_for(year);
        let ytd = YtdTotals {
            cpp: self.ytd_cpp,
            ei: self.ytd_ei,
        };
        let province = self.province.trim().to_ascii_uppercase();
        if rates.provincial_brackets(&province).is_none() {
            log::warn!("No provincial brackets for '{}', provincial tax will be zero", province);
        }

        let result = compute_payroll(self.gross, &province, self.periods, ytd, &rates)?;

        if self.json {
            let output = CalcOutput {
                year: rates.year,
                rates_source: rates.source.to_string(),
                province,
                frequency: self.periods,
                deductions: &result,
                employer_cost: result.employer_cost(),
                remittance: result.remittance(),
                disclaimer: WITHHOLDING_DISCLAIMER,
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
            return Ok(());
        }

        println!("Payroll deductions, {} {}", province, self.periods);
        println!("Rates: {} ({})", rates.year, rates.source);
        println!();
        print_deductions(&result);
        print_disclaimer();
        Ok(())
    }
}
