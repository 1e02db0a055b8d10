//! Aggregates over stored runs: year-end slip totals and listing totals.

use crate::money::cents;
use crate::payroll::employee::Employee;
use crate::payroll::run::PayrollRun;
use crate::tax::TaxRateSet;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

/// Year-end totals for one employee, matching the T4 slip boxes
#[derive(Debug, Clone, Serialize)]
pub struct YearEndSummary {
    pub employee: Employee,
    pub year: i32,
    pub pay_periods: usize,
    /// Box 14
    pub employment_income: Decimal,
    /// Box 16
    pub cpp_contributions: Decimal,
    /// Box 18
    pub ei_premiums: Decimal,
    /// Box 22
    pub income_tax: Decimal,
    pub federal_tax: Decimal,
    pub provincial_tax: Decimal,
    pub cpp_annual_max: Decimal,
    pub ei_annual_max: Decimal,
    pub cpp_at_max: bool,
    pub ei_at_max: bool,
    pub progression: Vec<YtdProgress>,
}

/// Running totals after each run of the year
#[derive(Debug, Clone, Serialize)]
pub struct YtdProgress {
    pub pay_date: NaiveDate,
    pub gross: Decimal,
    pub cpp: Decimal,
    pub ei: Decimal,
    pub ytd_cpp: Decimal,
    pub ytd_ei: Decimal,
}

/// Summarize an employee's runs for `year`. `runs` must be that year's runs
/// in pay date order.
pub fn year_end_summary(
    employee: Employee,
    year: i32,
    runs: &[PayrollRun],
    rates: &TaxRateSet,
) -> YearEndSummary {
    let mut ytd_cpp = Decimal::ZERO;
    let mut ytd_ei = Decimal::ZERO;
    let mut gross = Decimal::ZERO;
    let mut federal = Decimal::ZERO;
    let mut provincial = Decimal::ZERO;
    let mut progression = Vec::with_capacity(runs.len());

    for run in runs {
        ytd_cpp += run.cpp_employee;
        ytd_ei += run.ei_employee;
        gross += run.gross;
        federal += run.federal_withholding;
        provincial += run.provincial_withholding;
        progression.push(YtdProgress {
            pay_date: run.pay_date,
            gross: run.gross,
            cpp: run.cpp_employee,
            ei: run.ei_employee,
            ytd_cpp: cents(ytd_cpp),
            ytd_ei: cents(ytd_ei),
        });
    }

    let cpp_annual_max = cents(rates.pension.annual_max());
    let ei_annual_max = cents(rates.unemployment.annual_max());

    YearEndSummary {
        employee,
        year,
        pay_periods: runs.len(),
        employment_income: cents(gross),
        cpp_contributions: cents(ytd_cpp),
        ei_premiums: cents(ytd_ei),
        income_tax: cents(federal + provincial),
        federal_tax: cents(federal),
        provincial_tax: cents(provincial),
        cpp_annual_max,
        ei_annual_max,
        cpp_at_max: ytd_cpp >= cpp_annual_max,
        ei_at_max: ytd_ei >= ei_annual_max,
        progression,
    }
}

/// Totals shown under a list of runs
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RecordsSummary {
    pub count: usize,
    pub gross: Decimal,
    pub total_deductions: Decimal,
    pub net: Decimal,
    pub remittance: Decimal,
}

pub fn records_summary<'a>(runs: impl IntoIterator<Item = &'a PayrollRun>) -> RecordsSummary {
    let totals = runs
        .into_iter()
        .fold(RecordsSummary::default(), |mut acc, run| {
            acc.count += 1;
            acc.gross += run.gross;
            acc.total_deductions += run.total_deductions;
            acc.net += run.net;
            acc.remittance += run.remittance();
            acc
        });
    RecordsSummary {
        gross: cents(totals.gross),
        total_deductions: cents(totals.total_deductions),
        net: cents(totals.net),
        remittance: cents(totals.remittance),
        ..totals
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tax::{Jurisdiction, PayFrequency, TaxTableProvider};
    use rust_decimal_macros::dec;

    fn run(on: &str, cpp: Decimal, ei: Decimal) -> PayrollRun {
        PayrollRun {
            id: 0,
            employee_id: 1,
            pay_date: NaiveDate::parse_from_str(on, "%Y-%m-%d").unwrap(),
            frequency: PayFrequency::Monthly,
            gross: dec!(3000.00),
            cpp_employee: cpp,
            cpp_employer: cpp,
            ei_employee: ei,
            ei_employer: dec!(68.88),
            federal_withholding: dec!(450.00),
            provincial_withholding: dec!(151.50),
            total_deductions: cpp + ei + dec!(601.50),
            net: dec!(3000.00) - cpp - ei - dec!(601.50),
        }
    }

    fn employee() -> Employee {
        Employee {
            id: 1,
            name: "Ada".into(),
            tax_id: None,
            jurisdiction: Jurisdiction::ON,
        }
    }

    #[test]
    fn year_end_totals_and_progression() {
        let rates = TaxTableProvider::new(None).rates_for(2025);
        let runs = vec![
            run("2025-01-31", dec!(161.15), dec!(49.20)),
            run("2025-02-28", dec!(161.15), dec!(49.20)),
        ];
        let summary = year_end_summary(employee(), 2025, &runs, &rates);

        assert_eq!(summary.pay_periods, 2);
        assert_eq!(summary.employment_income, dec!(6000.00));
        assert_eq!(summary.cpp_contributions, dec!(322.30));
        assert_eq!(summary.ei_premiums, dec!(98.40));
        assert_eq!(summary.income_tax, dec!(1203.00));
        assert_eq!(summary.federal_tax, dec!(900.00));
        assert_eq!(summary.cpp_annual_max, dec!(4034.10));
        assert!(!summary.cpp_at_max);
        assert!(!summary.ei_at_max);
        assert_eq!(summary.progression[1].ytd_cpp, dec!(322.30));
        assert_eq!(summary.progression[0].ytd_ei, dec!(49.20));
    }

    #[test]
    fn flags_annual_maximum() {
        let rates = TaxTableProvider::new(None).rates_for(2025);
        let runs = vec![run("2025-12-31", dec!(4034.10), dec!(1077.48))];
        let summary = year_end_summary(employee(), 2025, &runs, &rates);
        assert!(summary.cpp_at_max);
        assert!(summary.ei_at_max);
    }

    #[test]
    fn records_totals_include_employer_side() {
        let runs = vec![
            run("2025-01-31", dec!(161.15), dec!(49.20)),
            run("2025-02-28", dec!(161.15), dec!(49.20)),
        ];
        let totals = records_summary(&runs);
        assert_eq!(totals.count, 2);
        assert_eq!(totals.gross, dec!(6000.00));
        assert_eq!(totals.total_deductions, dec!(1623.70));
        assert_eq!(totals.net, dec!(4376.30));
        assert_eq!(totals.remittance, dec!(2083.76));
    }

    #[test]
    fn empty_records() {
        let totals = records_summary(Vec::<PayrollRun>::new().iter());
        assert_eq!(totals.count, 0);
        assert_eq!(totals.gross.to_string(), "0.00");
    }
}
