pub mod calc;
pub mod employee;
pub mod rates;
pub mod records;
pub mod run;
pub mod schema;
pub mod settings;
pub mod summary;

use crate::money::display_amount;
use crate::store::Store;
use crate::tax::{DeductionResult, PayFrequency, TaxTableProvider, WITHHOLDING_DISCLAIMER};
use chrono::NaiveDate;
use clap::Args;
use rust_decimal::Decimal;
use std::path::PathBuf;

/// Options shared by every command
#[derive(Args, Debug)]
pub struct Context {
    /// SQLite database file
    #[arg(long, global = true, env = "PAYCALC_DB", default_value = "payroll.db")]
    db: PathBuf,

    /// Directory containing tax_rates_<year>.json files
    #[arg(long, global = true, env = "PAYCALC_TABLES")]
    tables: Option<PathBuf>,
}

impl Context {
    pub fn open_store(&self) -> anyhow::Result<Store> {
        Store::open(&self.db)
            .map_err(|e| anyhow::anyhow!("cannot open database {}: {}", self.db.display(), e))
    }

    pub fn tables(&self) -> TaxTableProvider {
        TaxTableProvider::new(self.tables.clone())
    }
}

pub fn parse_amount_arg(s: &str) -> Result<Decimal, String> {
    crate::money::parse_amount(s).map_err(|e| format!("invalid amount '{}': {}", s, e))
}

pub fn parse_frequency_arg(s: &str) -> Result<PayFrequency, String> {
    let periods: u32 = s
        .trim()
        .parse()
        .map_err(|_| format!("invalid pay period count '{}'", s))?;
    PayFrequency::try_from(periods).map_err(|e| e.to_string())
}

pub fn parse_date_arg(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|e| format!("invalid date '{}' (expected YYYY-MM-DD): {}", s, e))
}

/// Deduction breakdown used by `calc` and `run`
pub fn print_deductions(result: &DeductionResult) {
    let line = |label: &str, amount: Decimal| {
        println!("  {:<34}{:>14}", label, display_amount(amount))
    };

    line("Gross pay:", result.gross);
    println!();
    println!("  Employee deductions");
    line("CPP:", result.cpp_employee);
    line("EI:", result.ei_employee);
    line("Federal tax (approx.):", result.federal_withholding);
    line("Provincial tax (approx.):", result.provincial_withholding);
    line("Total deductions:", result.total_deductions);
    println!();
    line("NET PAY:", result.net);
    println!();
    println!("  Employer contributions");
    line("CPP:", result.cpp_employer);
    line("EI:", result.ei_employer);
    line("Total remittance:", result.remittance());
    println!();
    line("YTD CPP (after this pay):", result.ytd_cpp_after);
    line("YTD EI (after this pay):", result.ytd_ei_after);
}

pub fn print_disclaimer() {
    println!();
    println!("Note: {}", WITHHOLDING_DISCLAIMER);
}
