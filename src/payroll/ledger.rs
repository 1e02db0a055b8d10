//! Rules for accepting a new payroll run.
//!
//! An employee may have at most one run per calendar month, and a new run
//! may not be dated before the employee's latest run. Both rules are checked
//! together with the YTD read and the insert inside a single write
//! transaction.

use crate::error::{PayrollError, Result};
use crate::payroll::employee::Employee;
use crate::payroll::run::{NewRun, PayrollRun};
use crate::store::{self, Store};
use crate::tax::deductions::validate_gross;
use crate::tax::{
    compute_payroll, DeductionResult, PayFrequency, TaxRateSet, TaxTableProvider, YtdTotals,
};
use chrono::{Datelike, NaiveDate};
use rusqlite::Connection;
use rust_decimal::Decimal;
use std::sync::Arc;

/// Request to pay an employee for one period
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunRequest {
    pub employee_id: i64,
    pub pay_date: NaiveDate,
    pub gross: Decimal,
    pub frequency: PayFrequency,
}

/// Everything computed for a run before it is stored
#[derive(Debug, Clone)]
pub struct RunComputation {
    pub employee: Employee,
    pub ytd_before: YtdTotals,
    pub deductions: DeductionResult,
    pub rates: Arc<TaxRateSet>,
}

#[derive(Debug, Clone)]
pub struct RecordedRun {
    pub run: PayrollRun,
    pub computation: RunComputation,
}

/// Check that a run dated `pay_date` may follow the employee's existing runs.
pub fn check_new_run(
    employee_id: i64,
    pay_date: NaiveDate,
    latest: Option<NaiveDate>,
    month_taken: bool,
) -> Result<()> {
    if month_taken {
        return Err(PayrollError::DuplicatePeriod {
            employee_id,
            year: pay_date.year(),
            month: pay_date.month(),
        });
    }
    if let Some(latest) = latest {
        if pay_date < latest {
            return Err(PayrollError::ChronologyViolation {
                employee_id,
                attempted: pay_date,
                latest,
            });
        }
    }
    Ok(())
}

pub struct Ledger<'a> {
    store: &'a mut Store,
    tables: &'a TaxTableProvider,
}

impl<'a> Ledger<'a> {
    pub fn new(store: &'a mut Store, tables: &'a TaxTableProvider) -> Self {
        Ledger { store, tables }
    }

    /// Compute the run without storing it. Rule violations are still reported.
    pub fn preview(&self, request: &RunRequest) -> Result<RunComputation> {
        compute_in(self.store.conn(), self.tables, request)
    }

    /// Validate, compute and store a run atomically
    pub fn run_payroll(&mut self, request: &RunRequest) -> Result<RecordedRun> {
        let tx = self.store.immediate_transaction()?;
        let computation = compute_in(&tx, self.tables, request)?;

        let new_run = NewRun {
            employee_id: request.employee_id,
            pay_date: request.pay_date,
            frequency: request.frequency,
            deductions: &computation.deductions,
        };
        let run = match store::insert_run(&tx, &new_run) {
            Ok(run) => run,
            Err(PayrollError::Storage(err)) if store::is_constraint_violation(&err) => {
                return Err(PayrollError::DuplicatePeriod {
                    employee_id: request.employee_id,
                    year: request.pay_date.year(),
                    month: request.pay_date.month(),
                })
            }
            Err(err) => return Err(err),
        };
        tx.commit()?;

        log::info!(
            "Recorded payroll run {} for employee {} on {}: gross {}, net {}",
            run.id,
            run.employee_id,
            run.pay_date,
            run.gross,
            run.net
        );
        Ok(RecordedRun { run, computation })
    }
}

fn compute_in(
    conn: &Connection,
    tables: &TaxTableProvider,
    request: &RunRequest,
) -> Result<RunComputation> {
    validate_gross(request.gross)?;
    let employee = store::employee_by_id(conn, request.employee_id)?
        .ok_or(PayrollError::EmployeeNotFound(request.employee_id))?;

    let month_taken = store::run_exists_for_month(
        conn,
        employee.id,
        request.pay_date.year(),
        request.pay_date.month(),
    )?;
    let latest = store::latest_run_date(conn, employee.id)?;
    check_new_run(employee.id, request.pay_date, latest, month_taken)?;

    let ytd_before = store::sum_ytd(conn, employee.id, request.pay_date)?;
    let rates = tables.rates_for(request.pay_date.year());
    let deductions = compute_payroll(
        request.gross,
        employee.jurisdiction.code(),
        request.frequency,
        ytd_before,
        &rates,
    )?;

    Ok(RunComputation {
        employee,
        ytd_before,
        deductions,
        rates,
    })
}
