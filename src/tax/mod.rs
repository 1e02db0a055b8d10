pub mod deductions;
pub mod jurisdiction;
pub mod tables;

pub use deductions::{
    compute_payroll, DeductionResult, PayFrequency, YtdTotals, WITHHOLDING_DISCLAIMER,
};
pub use jurisdiction::Jurisdiction;
pub use tables::{Bracket, TaxRateSet, TaxTableFile, TaxTableProvider};
