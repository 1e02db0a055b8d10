//! Per-period CPP, EI and income tax withholding.
//!
//! All functions are pure: the rate set and YTD totals are passed in. Amounts
//! are carried unrounded through the annualize/divide steps and rounded to
//! cents only once per returned figure.

use crate::error::{PayrollError, Result};
use crate::money::cents;
use crate::tax::tables::{Bracket, TaxRateSet};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Largest gross pay accepted for a single period
pub const MAX_GROSS_PER_PERIOD: Decimal = dec!(1000000);

/// Shown wherever withholding figures are presented
pub const WITHHOLDING_DISCLAIMER: &str = "Income tax withholding is an approximation: it \
annualizes gross pay through the federal and provincial brackets and ignores personal \
credits and the CPP/EI reduction of taxable income. Consult the payroll deduction tables \
for exact amounts.";

/// Number of pay periods in a year
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum PayFrequency {
    #[default]
    Monthly,
    SemiMonthly,
    BiWeekly,
    Weekly,
}

impl PayFrequency {
    pub const ALL: [PayFrequency; 4] = [
        PayFrequency::Monthly,
        PayFrequency::SemiMonthly,
        PayFrequency::BiWeekly,
        PayFrequency::Weekly,
    ];

    pub fn periods(self) -> u32 {
        match self {
            PayFrequency::Monthly => 12,
            PayFrequency::SemiMonthly => 24,
            PayFrequency::BiWeekly => 26,
            PayFrequency::Weekly => 52,
        }
    }

    fn periods_dec(self) -> Decimal {
        Decimal::from(self.periods())
    }

    pub fn label(self) -> &'static str {
        match self {
            PayFrequency::Monthly => "Monthly",
            PayFrequency::SemiMonthly => "Semi-monthly",
            PayFrequency::BiWeekly => "Bi-weekly",
            PayFrequency::Weekly => "Weekly",
        }
    }
}

impl TryFrom<u32> for PayFrequency {
    type Error = PayrollError;

    fn try_from(periods: u32) -> Result<Self> {
        PayFrequency::ALL
            .into_iter()
            .find(|f| f.periods() == periods)
            .ok_or_else(|| {
                PayrollError::validation(format!(
                    "pay period count must be one of 12, 24, 26, 52 \
                     (12=Monthly, 24=Semi-monthly, 26=Bi-weekly, 52=Weekly), got {}",
                    periods
                ))
            })
    }
}

impl From<PayFrequency> for u32 {
    fn from(frequency: PayFrequency) -> u32 {
        frequency.periods()
    }
}

impl fmt::Display for PayFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.periods(), self.label())
    }
}

/// Employee-side contributions already made this year
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct YtdTotals {
    pub cpp: Decimal,
    pub ei: Decimal,
}

/// Deductions for one pay period
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeductionResult {
    pub gross: Decimal,
    pub cpp_employee: Decimal,
    pub cpp_employer: Decimal,
    pub ei_employee: Decimal,
    pub ei_employer: Decimal,
    pub federal_withholding: Decimal,
    pub provincial_withholding: Decimal,
    pub total_deductions: Decimal,
    pub net: Decimal,
    pub ytd_cpp_after: Decimal,
    pub ytd_ei_after: Decimal,
}

impl DeductionResult {
    /// Employer's own CPP and EI on top of gross pay
    pub fn employer_cost(&self) -> Decimal {
        self.cpp_employer + self.ei_employer
    }

    /// Amount owed to the tax authority for the period: both sides of CPP/EI plus withholding
    pub fn remittance(&self) -> Decimal {
        self.total_deductions + self.employer_cost()
    }
}

/// CPP for one period, returned as `(employee, employer)`.
pub fn pension_contribution(
    gross: Decimal,
    frequency: PayFrequency,
    ytd_cpp: Decimal,
    rates: &TaxRateSet,
) -> (Decimal, Decimal) {
    let cpp = &rates.pension;
    let annual_max = cpp.annual_max();
    if ytd_cpp >= annual_max {
        return (cents(Decimal::ZERO), cents(Decimal::ZERO));
    }

    let periods = frequency.periods_dec();
    let max_pensionable = cpp.ympe - cpp.basic_exemption;
    let pensionable = (gross * periods - cpp.basic_exemption)
        .max(Decimal::ZERO)
        .min(max_pensionable);
    let per_period = (pensionable * cpp.rate / periods).min(annual_max - ytd_cpp);

    let amount = cents(per_period);
    (amount, amount)
}

/// EI for one period, returned as `(employee, employer)`.
pub fn unemployment_premium(
    gross: Decimal,
    frequency: PayFrequency,
    ytd_ei: Decimal,
    rates: &TaxRateSet,
) -> (Decimal, Decimal) {
    let ei = &rates.unemployment;
    let annual_max = ei.annual_max();
    if ytd_ei >= annual_max {
        return (cents(Decimal::ZERO), cents(Decimal::ZERO));
    }

    let periods = frequency.periods_dec();
    let insurable = (gross * periods).min(ei.max_insurable);
    let per_period = (insurable * ei.rate / periods).min(annual_max - ytd_ei);
    let employer = per_period * ei.employer_multiplier;

    (cents(per_period), cents(employer))
}

/// Tax on an annual amount under a marginal bracket schedule. Not rounded.
pub fn progressive_tax(amount: Decimal, brackets: &[Bracket]) -> Decimal {
    let mut previous = Decimal::ZERO;
    let mut tax = Decimal::ZERO;

    for bracket in brackets {
        let top = match bracket.upper {
            Some(upper) => amount.min(upper),
            None => amount,
        };
        let slice = (top - previous).max(Decimal::ZERO);
        tax += slice * bracket.rate;

        match bracket.upper {
            Some(upper) if amount > upper => previous = upper,
            _ => break,
        }
    }
    tax
}

/// Approximate federal and provincial withholding for one period.
///
/// A jurisdiction with no schedule in the rate set withholds nothing
/// provincially. See [`WITHHOLDING_DISCLAIMER`].
pub fn withholding(
    gross: Decimal,
    jurisdiction: &str,
    frequency: PayFrequency,
    rates: &TaxRateSet,
) -> (Decimal, Decimal) {
    let periods = frequency.periods_dec();
    let annual = gross * periods;

    let federal = progressive_tax(annual, &rates.federal);
    let provincial = match rates.provincial_brackets(jurisdiction) {
        Some(brackets) => progressive_tax(annual, brackets),
        None => {
            log::debug!(
                "No provincial schedule for '{}' in {} rates, withholding zero",
                jurisdiction,
                rates.year
            );
            Decimal::ZERO
        }
    };

    (cents(federal / periods), cents(provincial / periods))
}

/// Compute every deduction for one pay period
pub fn compute_payroll(
    gross: Decimal,
    jurisdiction: &str,
    frequency: PayFrequency,
    ytd: YtdTotals,
    rates: &TaxRateSet,
) -> Result<DeductionResult> {
    validate_gross(gross)?;
    if ytd.cpp < Decimal::ZERO || ytd.ei < Decimal::ZERO {
        return Err(PayrollError::validation("YTD totals cannot be negative"));
    }

    let (cpp_employee, cpp_employer) = pension_contribution(gross, frequency, ytd.cpp, rates);
    let (ei_employee, ei_employer) = unemployment_premium(gross, frequency, ytd.ei, rates);
    let (federal_withholding, provincial_withholding) =
        withholding(gross, jurisdiction, frequency, rates);

    let gross = cents(gross);
    let total_deductions =
        cents(cpp_employee + ei_employee + federal_withholding + provincial_withholding);
    let net = cents(gross - total_deductions);

    log::debug!(
        "gross {} ({}, {}): cpp {} ei {} fed {} prov {} net {}",
        gross,
        jurisdiction,
        frequency,
        cpp_employee,
        ei_employee,
        federal_withholding,
        provincial_withholding,
        net
    );

    Ok(DeductionResult {
        gross,
        cpp_employee,
        cpp_employer,
        ei_employee,
        ei_employer,
        federal_withholding,
        provincial_withholding,
        total_deductions,
        net,
        ytd_cpp_after: cents(ytd.cpp + cpp_employee),
        ytd_ei_after: cents(ytd.ei + ei_employee),
    })
}

/// Gross pay must be positive and below the per-period sanity ceiling
pub fn validate_gross(gross: Decimal) -> Result<()> {
    if gross <= Decimal::ZERO {
        return Err(PayrollError::validation("gross pay must be greater than zero"));
    }
    if cents(gross).is_zero() {
        return Err(PayrollError::validation("gross pay must be at least $0.01"));
    }
    if gross > MAX_GROSS_PER_PERIOD {
        return Err(PayrollError::validation(format!(
            "gross pay exceeds reasonable limit (${} per period)",
            MAX_GROSS_PER_PERIOD
        )));
    }
    Ok(())
}
