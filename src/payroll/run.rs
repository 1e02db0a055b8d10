use crate::tax::{DeductionResult, PayFrequency};
use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;

/// A committed payroll run. Runs are never updated once stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PayrollRun {
    pub id: i64,
    pub employee_id: i64,
    pub pay_date: NaiveDate,
    pub frequency: PayFrequency,
    pub gross: Decimal,
    pub cpp_employee: Decimal,
    pub cpp_employer: Decimal,
    pub ei_employee: Decimal,
    pub ei_employer: Decimal,
    pub federal_withholding: Decimal,
    pub provincial_withholding: Decimal,
    pub total_deductions: Decimal,
    pub net: Decimal,
}

impl PayrollRun {
    pub fn tax_withheld(&self) -> Decimal {
        self.federal_withholding + self.provincial_withholding
    }

    /// Employee and employer contributions plus withholding
    pub fn remittance(&self) -> Decimal {
        self.total_deductions + self.cpp_employer + self.ei_employer
    }
}

/// A run ready to be inserted
#[derive(Debug, Clone)]
pub struct NewRun<'a> {
    pub employee_id: i64,
    pub pay_date: NaiveDate,
    pub frequency: PayFrequency,
    pub deductions: &'a DeductionResult,
}

/// `YYYY-MM` key used for the one-run-per-month rule
pub fn pay_month(date: NaiveDate) -> String {
    format!("{:04}-{:02}", date.year(), date.month())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pay_month_key() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 9).unwrap();
        assert_eq!(pay_month(date), "2025-03");
    }
}
