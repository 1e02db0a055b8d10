pub mod employee;
pub mod ledger;
pub mod run;
pub mod settings;
pub mod summary;

pub use employee::{Employee, EmployeeInput};
pub use ledger::{Ledger, RunComputation, RunRequest};
pub use run::PayrollRun;
pub use summary::{records_summary, year_end_summary, YearEndSummary};
