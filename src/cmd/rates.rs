//! Rates command - the contribution rates and brackets in force for a year

use crate::cmd::Context;
use crate::money::{cents, display_amount};
use crate::tax::{Bracket, TaxRateSet};
use chrono::Datelike;
use clap::Args;
use rust_decimal::Decimal;
use tabled::{
    settings::{object::Rows, Alignment, Modify, Style},
    Table, Tabled,
};

#[derive(Args, Debug)]
pub struct RatesCommand {
    /// Tax year (defaults to the current year)
    #[arg(short, long)]
    year: Option<i32>,

    /// Output as JSON instead of formatted text
    #[arg(long)]
    json: bool,
}

#[derive(Tabled)]
struct BracketRow {
    #[tabled(rename = "Schedule")]
    schedule: String,
    #[tabled(rename = "Up to")]
    upper: String,
    #[tabled(rename = "Rate")]
    rate: String,
}

impl RatesCommand {
    pub fn exec(&self, ctx: &Context) -> anyhow::Result<()> {
        let year = self.year.unwrap_or_else(|| chrono::Local::now().year());
        let rates = ctx.tables().rates_for(year);
        if self.json {
            println!("{}", serde_json::to_string_pretty(rates.as_ref())?);
        } else {
            print_rates(&rates);
        }
        Ok(())
    }
}

fn percent(rate: Decimal) -> String {
    format!("{}%", (rate * Decimal::ONE_HUNDRED).normalize())
}

fn bracket_rows(schedule: &str, brackets: &[Bracket]) -> Vec<BracketRow> {
    brackets
        .iter()
        .enumerate()
        .map(|(i, b)| BracketRow {
            schedule: if i == 0 { schedule.to_string() } else { String::new() },
            upper: b.upper.map(display_amount).unwrap_or_else(|| "and above".to_string()),
            rate: percent(b.rate),
        })
        .collect()
}

fn print_rates(rates: &TaxRateSet) {
    println!("Tax year {} ({})", rates.year, rates.source);
    println!();
    let pension = &rates.pension;
    println!(
        "  CPP  rate {}, YMPE {}, basic exemption {}, annual maximum {}",
        percent(pension.rate),
        display_amount(pension.ympe),
        display_amount(pension.basic_exemption),
        display_amount(cents(pension.annual_max()))
    );
    let ei = &rates.unemployment;
    println!(
        "  EI   rate {}, maximum insurable {}, employer x{}, annual maximum {}",
        percent(ei.rate),
        display_amount(ei.max_insurable),
        ei.employer_multiplier.normalize(),
        display_amount(cents(ei.annual_max()))
    );
    println!();

    let mut rows = bracket_rows("Federal", &rates.federal);
    for (code, brackets) in &rates.provincial {
        rows.extend(bracket_rows(code, brackets));
    }
    let table = Table::new(rows)
        .with(Style::rounded())
        .with(Modify::new(Rows::new(1..)).with(Alignment::right()))
        .to_string();
    println!("{}", table);
}
