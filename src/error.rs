use chrono::NaiveDate;
use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, PayrollError>;

#[derive(Debug, thiserror::Error)]
pub enum PayrollError {
    #[error("invalid input: {0}")]
    Validation(String),
    #[error(
        "a payroll run already exists for employee {employee_id} in {year:04}-{month:02}; \
         each employee can only have one payroll run per month"
    )]
    DuplicatePeriod {
        employee_id: i64,
        year: i32,
        month: u32,
    },
    #[error(
        "pay date {attempted} for employee {employee_id} is earlier than the most recent \
         payroll run ({latest}); runs must be in chronological order to keep YTD totals accurate"
    )]
    ChronologyViolation {
        employee_id: i64,
        attempted: NaiveDate,
        latest: NaiveDate,
    },
    #[error("an employee with tax identity {0} already exists")]
    DuplicateTaxId(String),
    #[error("employee {0} not found")]
    EmployeeNotFound(i64),
    #[error("unknown jurisdiction '{0}'")]
    UnknownJurisdiction(String),
    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),
    #[error("io error at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl PayrollError {
    pub fn validation(msg: impl Into<String>) -> Self {
        PayrollError::Validation(msg.into())
    }
}
