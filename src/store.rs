//! SQLite persistence for employees, payroll runs and organization settings.
//!
//! Query helpers take a `&Connection` so the ledger can call them inside its
//! own transaction. Money is stored as decimal TEXT, dates as `YYYY-MM-DD`.

use crate::error::{PayrollError, Result};
use crate::payroll::employee::{Employee, EmployeeInput};
use crate::payroll::run::{pay_month, NewRun, PayrollRun};
use crate::payroll::settings::OrganizationSettings;
use crate::tax::{Jurisdiction, PayFrequency, YtdTotals};
use chrono::{Datelike, NaiveDate};
use rusqlite::types::Type;
use rusqlite::{
    params, Connection, ErrorCode, OptionalExtension, Row, Transaction, TransactionBehavior,
};
use rust_decimal::Decimal;
use std::path::Path;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS employees (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    tax_id TEXT,
    province TEXT NOT NULL DEFAULT 'ON',
    created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
);

CREATE UNIQUE INDEX IF NOT EXISTS employees_tax_id
    ON employees(tax_id) WHERE tax_id IS NOT NULL;

CREATE TABLE IF NOT EXISTS payroll_runs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    employee_id INTEGER NOT NULL REFERENCES employees(id) ON DELETE CASCADE,
    pay_date TEXT NOT NULL,
    pay_month TEXT NOT NULL,
    period_count INTEGER NOT NULL,
    gross TEXT NOT NULL,
    cpp_employee TEXT NOT NULL,
    cpp_employer TEXT NOT NULL,
    ei_employee TEXT NOT NULL,
    ei_employer TEXT NOT NULL,
    federal_withholding TEXT NOT NULL,
    provincial_withholding TEXT NOT NULL,
    total_deductions TEXT NOT NULL,
    net TEXT NOT NULL,
    created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
    UNIQUE (employee_id, pay_month)
);

CREATE INDEX IF NOT EXISTS payroll_runs_employee_date
    ON payroll_runs(employee_id, pay_date);

CREATE TABLE IF NOT EXISTS company_settings (
    id INTEGER PRIMARY KEY CHECK (id = 1),
    company_name TEXT NOT NULL DEFAULT 'My Company',
    business_number TEXT NOT NULL DEFAULT '',
    address_street TEXT NOT NULL DEFAULT '',
    address_city TEXT NOT NULL DEFAULT '',
    address_province TEXT NOT NULL DEFAULT 'ON',
    address_postal TEXT NOT NULL DEFAULT '',
    phone TEXT NOT NULL DEFAULT '',
    email TEXT NOT NULL DEFAULT '',
    payroll_account TEXT NOT NULL DEFAULT '',
    default_pay_frequency INTEGER NOT NULL DEFAULT 12,
    updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
);
";

const RUN_COLUMNS: &str = "id, employee_id, pay_date, period_count, gross, cpp_employee, \
    cpp_employer, ei_employee, ei_employer, federal_withholding, provincial_withholding, \
    total_deductions, net";

/// The single local payroll database
#[derive(Debug)]
pub struct Store {
    conn: Connection,
}

impl Store {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| PayrollError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        log::debug!("Opening payroll database {}", path.display());
        Self::init(Connection::open(path)?)
    }

    #[cfg(test)]
    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        conn.execute_batch(SCHEMA)?;
        Ok(Store { conn })
    }

    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Write transaction that takes the database lock up front
    pub fn immediate_transaction(&mut self) -> Result<Transaction<'_>> {
        Ok(self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?)
    }

    pub fn employee_by_id(&self, id: i64) -> Result<Option<Employee>> {
        employee_by_id(&self.conn, id)
    }

    pub fn list_employees(&self) -> Result<Vec<Employee>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, tax_id, province FROM employees ORDER BY name, id")?;
        let rows = stmt.query_map([], map_employee)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    pub fn add_employee(&mut self, input: EmployeeInput) -> Result<Employee> {
        let input = input.normalized()?;
        let tx = self.immediate_transaction()?;
        if let Some(tax_id) = &input.tax_id {
            if tax_id_taken(&tx, tax_id, None)? {
                return Err(PayrollError::DuplicateTaxId(tax_id.clone()));
            }
        }
        tx.execute(
            "INSERT INTO employees (name, tax_id, province) VALUES (?1, ?2, ?3)",
            params![input.name, input.tax_id, input.jurisdiction.code()],
        )
        .map_err(|err| map_tax_id_conflict(err, &input))?;
        let id = tx.last_insert_rowid();
        tx.commit()?;

        log::info!("Added employee {} ({})", id, input.name);
        Ok(Employee {
            id,
            name: input.name,
            tax_id: input.tax_id,
            jurisdiction: input.jurisdiction,
        })
    }

    pub fn update_employee(&mut self, id: i64, input: EmployeeInput) -> Result<Employee> {
        let input = input.normalized()?;
        let tx = self.immediate_transaction()?;
        if employee_by_id(&tx, id)?.is_none() {
            return Err(PayrollError::EmployeeNotFound(id));
        }
        if let Some(tax_id) = &input.tax_id {
            if tax_id_taken(&tx, tax_id, Some(id))? {
                return Err(PayrollError::DuplicateTaxId(tax_id.clone()));
            }
        }
        tx.execute(
            "UPDATE employees SET name = ?1, tax_id = ?2, province = ?3 WHERE id = ?4",
            params![input.name, input.tax_id, input.jurisdiction.code(), id],
        )
        .map_err(|err| map_tax_id_conflict(err, &input))?;
        tx.commit()?;

        Ok(Employee {
            id,
            name: input.name,
            tax_id: input.tax_id,
            jurisdiction: input.jurisdiction,
        })
    }

    /// Delete an employee and every run they own. The runs are removed
    /// explicitly so the result does not depend on foreign key enforcement.
    pub fn delete_employee(&mut self, id: i64) -> Result<usize> {
        let tx = self.immediate_transaction()?;
        let runs = tx.execute("DELETE FROM payroll_runs WHERE employee_id = ?1", params![id])?;
        let employees = tx.execute("DELETE FROM employees WHERE id = ?1", params![id])?;
        if employees == 0 {
            return Err(PayrollError::EmployeeNotFound(id));
        }
        tx.commit()?;

        log::info!("Deleted employee {} and {} payroll run(s)", id, runs);
        Ok(runs)
    }

    /// Runs for one employee, newest first
    pub fn runs_for_employee(&self, employee_id: i64) -> Result<Vec<PayrollRun>> {
        query_runs(
            &self.conn,
            &format!(
                "SELECT {} FROM payroll_runs WHERE employee_id = ?1
                 ORDER BY pay_date DESC, id DESC",
                RUN_COLUMNS
            ),
            params![employee_id],
        )
    }

    /// Runs for one employee in a calendar year, in pay date order
    pub fn runs_for_year(&self, employee_id: i64, year: i32) -> Result<Vec<PayrollRun>> {
        let (start, end) = year_bounds(year);
        query_runs(
            &self.conn,
            &format!(
                "SELECT {} FROM payroll_runs
                 WHERE employee_id = ?1 AND pay_date >= ?2 AND pay_date < ?3
                 ORDER BY pay_date, id",
                RUN_COLUMNS
            ),
            params![employee_id, start, end],
        )
    }

    /// Every run with its employee's name, newest first
    pub fn all_runs(&self) -> Result<Vec<(PayrollRun, String)>> {
        let columns = RUN_COLUMNS
            .split(", ")
            .map(|c| format!("p.{}", c.trim()))
            .collect::<Vec<_>>()
            .join(", ");
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {}, e.name FROM payroll_runs p
             JOIN employees e ON p.employee_id = e.id
             ORDER BY p.pay_date DESC, p.id DESC",
            columns
        ))?;
        let rows = stmt.query_map([], |row| Ok((map_run(row)?, row.get::<_, String>(13)?)))?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    #[cfg(test)]
    pub fn run_count(&self, employee_id: i64) -> Result<usize> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM payroll_runs WHERE employee_id = ?1",
            params![employee_id],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    /// Organization settings, created with defaults if missing
    pub fn settings(&mut self) -> Result<OrganizationSettings> {
        let tx = self.immediate_transaction()?;
        tx.execute("INSERT OR IGNORE INTO company_settings (id) VALUES (1)", [])?;
        let settings = tx.query_row(
            "SELECT company_name, business_number, address_street, address_city,
                    address_province, address_postal, phone, email, payroll_account,
                    default_pay_frequency
             FROM company_settings WHERE id = 1",
            [],
            map_settings,
        )?;
        tx.commit()?;
        Ok(settings)
    }

    /// Create or replace the single settings record
    pub fn upsert_settings(&self, settings: &OrganizationSettings) -> Result<()> {
        self.conn.execute(
            "INSERT INTO company_settings (id, company_name, business_number, address_street,
                    address_city, address_province, address_postal, phone, email,
                    payroll_account, default_pay_frequency, updated_at)
             VALUES (1, ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, CURRENT_TIMESTAMP)
             ON CONFLICT(id) DO UPDATE SET
                company_name = excluded.company_name,
                business_number = excluded.business_number,
                address_street = excluded.address_street,
                address_city = excluded.address_city,
                address_province = excluded.address_province,
                address_postal = excluded.address_postal,
                phone = excluded.phone,
                email = excluded.email,
                payroll_account = excluded.payroll_account,
                default_pay_frequency = excluded.default_pay_frequency,
                updated_at = CURRENT_TIMESTAMP",
            params![
                settings.company_name,
                settings.business_number,
                settings.address_street,
                settings.address_city,
                settings.address_province.code(),
                settings.address_postal,
                settings.phone,
                settings.email,
                settings.payroll_account,
                settings.default_frequency.periods(),
            ],
        )?;
        Ok(())
    }
}

pub fn employee_by_id(conn: &Connection, id: i64) -> Result<Option<Employee>> {
    Ok(conn
        .query_row(
            "SELECT id, name, tax_id, province FROM employees WHERE id = ?1",
            params![id],
            map_employee,
        )
        .optional()?)
}

pub fn tax_id_taken(conn: &Connection, tax_id: &str, exclude: Option<i64>) -> Result<bool> {
    Ok(conn
        .query_row(
            "SELECT id FROM employees WHERE tax_id = ?1 AND (?2 IS NULL OR id != ?2)",
            params![tax_id, exclude],
            |_| Ok(()),
        )
        .optional()?
        .is_some())
}

pub fn latest_run_date(conn: &Connection, employee_id: i64) -> Result<Option<NaiveDate>> {
    Ok(conn
        .query_row(
            "SELECT pay_date FROM payroll_runs WHERE employee_id = ?1
             ORDER BY pay_date DESC LIMIT 1",
            params![employee_id],
            |row| row.get(0),
        )
        .optional()?)
}

pub fn run_exists_for_month(
    conn: &Connection,
    employee_id: i64,
    year: i32,
    month: u32,
) -> Result<bool> {
    let key = format!("{:04}-{:02}", year, month);
    Ok(conn
        .query_row(
            "SELECT 1 FROM payroll_runs WHERE employee_id = ?1 AND pay_month = ?2",
            params![employee_id, key],
            |_| Ok(()),
        )
        .optional()?
        .is_some())
}

/// Employee-side CPP and EI over runs in `before`'s calendar year dated
/// strictly earlier than `before`. Summed as decimals, never in SQL floats.
pub fn sum_ytd(conn: &Connection, employee_id: i64, before: NaiveDate) -> Result<YtdTotals> {
    let (start, _) = year_bounds(before.year());
    let mut stmt = conn.prepare(
        "SELECT cpp_employee, ei_employee FROM payroll_runs
         WHERE employee_id = ?1 AND pay_date >= ?2 AND pay_date < ?3",
    )?;
    let rows = stmt.query_map(params![employee_id, start, before], |row| {
        Ok((decimal_at(row, 0)?, decimal_at(row, 1)?))
    })?;

    let mut totals = YtdTotals::default();
    for row in rows {
        let (cpp, ei) = row?;
        totals.cpp += cpp;
        totals.ei += ei;
    }
    Ok(totals)
}

pub fn insert_run(conn: &Connection, run: &NewRun<'_>) -> Result<PayrollRun> {
    let d = run.deductions;
    conn.execute(
        "INSERT INTO payroll_runs (employee_id, pay_date, pay_month, period_count, gross,
                cpp_employee, cpp_employer, ei_employee, ei_employer, federal_withholding,
                provincial_withholding, total_deductions, net)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
        params![
            run.employee_id,
            run.pay_date,
            pay_month(run.pay_date),
            run.frequency.periods(),
            d.gross.to_string(),
            d.cpp_employee.to_string(),
            d.cpp_employer.to_string(),
            d.ei_employee.to_string(),
            d.ei_employer.to_string(),
            d.federal_withholding.to_string(),
            d.provincial_withholding.to_string(),
            d.total_deductions.to_string(),
            d.net.to_string(),
        ],
    )?;

    Ok(PayrollRun {
        id: conn.last_insert_rowid(),
        employee_id: run.employee_id,
        pay_date: run.pay_date,
        frequency: run.frequency,
        gross: d.gross,
        cpp_employee: d.cpp_employee,
        cpp_employer: d.cpp_employer,
        ei_employee: d.ei_employee,
        ei_employer: d.ei_employer,
        federal_withholding: d.federal_withholding,
        provincial_withholding: d.provincial_withholding,
        total_deductions: d.total_deductions,
        net: d.net,
    })
}

/// True when a write failed on a UNIQUE or CHECK constraint
pub fn is_constraint_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _) if e.code == ErrorCode::ConstraintViolation
    )
}

fn map_tax_id_conflict(err: rusqlite::Error, input: &EmployeeInput) -> PayrollError {
    match &input.tax_id {
        Some(tax_id) if is_constraint_violation(&err) => {
            PayrollError::DuplicateTaxId(tax_id.clone())
        }
        _ => err.into(),
    }
}

fn year_bounds(year: i32) -> (String, String) {
    (format!("{:04}-01-01", year), format!("{:04}-01-01", year + 1))
}

fn query_runs<P: rusqlite::Params>(
    conn: &Connection,
    sql: &str,
    params: P,
) -> Result<Vec<PayrollRun>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map(params, map_run)?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

fn conversion_error<E>(idx: usize, err: E) -> rusqlite::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err))
}

fn decimal_at(row: &Row<'_>, idx: usize) -> rusqlite::Result<Decimal> {
    let text: String = row.get(idx)?;
    text.parse::<Decimal>().map_err(|err| conversion_error(idx, err))
}

fn jurisdiction_at(row: &Row<'_>, idx: usize) -> rusqlite::Result<Jurisdiction> {
    let text: String = row.get(idx)?;
    text.parse::<Jurisdiction>()
        .map_err(|err| conversion_error(idx, err))
}

fn frequency_at(row: &Row<'_>, idx: usize) -> rusqlite::Result<PayFrequency> {
    let periods: u32 = row.get(idx)?;
    PayFrequency::try_from(periods).map_err(|err| {
        rusqlite::Error::FromSqlConversionFailure(idx, Type::Integer, Box::new(err))
    })
}

fn map_employee(row: &Row<'_>) -> rusqlite::Result<Employee> {
    Ok(Employee {
        id: row.get(0)?,
        name: row.get(1)?,
        tax_id: row.get(2)?,
        jurisdiction: jurisdiction_at(row, 3)?,
    })
}

fn map_run(row: &Row<'_>) -> rusqlite::Result<PayrollRun> {
    Ok(PayrollRun {
        id: row.get(0)?,
        employee_id: row.get(1)?,
        pay_date: row.get(2)?,
        frequency: frequency_at(row, 3)?,
        gross: decimal_at(row, 4)?,
        cpp_employee: decimal_at(row, 5)?,
        cpp_employer: decimal_at(row, 6)?,
        ei_employee: decimal_at(row, 7)?,
        ei_employer: decimal_at(row, 8)?,
        federal_withholding: decimal_at(row, 9)?,
        provincial_withholding: decimal_at(row, 10)?,
        total_deductions: decimal_at(row, 11)?,
        net: decimal_at(row, 12)?,
    })
}

fn map_settings(row: &Row<'_>) -> rusqlite::Result<OrganizationSettings> {
    Ok(OrganizationSettings {
        company_name: row.get(0)?,
        business_number: row.get(1)?,
        address_street: row.get(2)?,
        address_city: row.get(3)?,
        address_province: jurisdiction_at(row, 4)?,
        address_postal: row.get(5)?,
        phone: row.get(6)?,
        email: row.get(7)?,
        payroll_account: row.get(8)?,
        default_frequency: frequency_at(row, 9)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tax::DeductionResult;
    use rust_decimal_macros::dec;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn deductions(cpp: Decimal, ei: Decimal) -> DeductionResult {
        DeductionResult {
            gross: dec!(1000.00),
            cpp_employee: cpp,
            cpp_employer: cpp,
            ei_employee: ei,
            ei_employer: ei * dec!(1.4),
            federal_withholding: dec!(100.00),
            provincial_withholding: dec!(30.00),
            total_deductions: cpp + ei + dec!(130.00),
            net: dec!(1000.00) - cpp - ei - dec!(130.00),
            ytd_cpp_after: cpp,
            ytd_ei_after: ei,
        }
    }

    fn insert(store: &Store, employee_id: i64, on: &str, cpp: Decimal, ei: Decimal) -> PayrollRun {
        let d = deductions(cpp, ei);
        insert_run(
            store.conn(),
            &NewRun {
                employee_id,
                pay_date: date(on),
                frequency: PayFrequency::Monthly,
                deductions: &d,
            },
        )
        .unwrap()
    }

    fn employee(store: &mut Store, name: &str, tax_id: Option<&str>) -> Employee {
        store
            .add_employee(EmployeeInput::new(name, tax_id, Jurisdiction::ON))
            .unwrap()
    }

    #[test]
    fn add_and_fetch_employee() {
        let mut store = Store::open_in_memory().unwrap();
        let added = employee(&mut store, "Ada", Some("046 454 286"));
        let fetched = store.employee_by_id(added.id).unwrap().unwrap();
        assert_eq!(fetched, added);
        assert_eq!(fetched.jurisdiction, Jurisdiction::ON);
        assert!(store.employee_by_id(added.id + 1).unwrap().is_none());
    }

    #[test]
    fn duplicate_tax_id_rejected() {
        let mut store = Store::open_in_memory().unwrap();
        employee(&mut store, "Ada", Some("123"));
        let err = store
            .add_employee(EmployeeInput::new("Bob", Some(" 123 "), Jurisdiction::BC))
            .unwrap_err();
        assert!(matches!(err, PayrollError::DuplicateTaxId(ref id) if id == "123"));
        assert_eq!(store.list_employees().unwrap().len(), 1);
    }

    #[test]
    fn employees_without_tax_id_may_coexist() {
        let mut store = Store::open_in_memory().unwrap();
        employee(&mut store, "Ada", None);
        employee(&mut store, "Bob", Some(""));
        assert_eq!(store.list_employees().unwrap().len(), 2);
    }

    #[test]
    fn update_keeps_own_tax_id_but_not_anothers() {
        let mut store = Store::open_in_memory().unwrap();
        let ada = employee(&mut store, "Ada", Some("111"));
        employee(&mut store, "Bob", Some("222"));

        let updated = store
            .update_employee(ada.id, EmployeeInput::new("Ada L", Some("111"), Jurisdiction::QC))
            .unwrap();
        assert_eq!(updated.name, "Ada L");
        assert_eq!(updated.jurisdiction, Jurisdiction::QC);

        let err = store
            .update_employee(ada.id, EmployeeInput::new("Ada L", Some("222"), Jurisdiction::QC))
            .unwrap_err();
        assert!(matches!(err, PayrollError::DuplicateTaxId(_)));
        assert_eq!(
            store.employee_by_id(ada.id).unwrap().unwrap().tax_id.as_deref(),
            Some("111")
        );
    }

    #[test]
    fn update_missing_employee() {
        let mut store = Store::open_in_memory().unwrap();
        let err = store
            .update_employee(42, EmployeeInput::new("X", None, Jurisdiction::ON))
            .unwrap_err();
        assert!(matches!(err, PayrollError::EmployeeNotFound(42)));
    }

    #[test]
    fn employees_listed_by_name() {
        let mut store = Store::open_in_memory().unwrap();
        employee(&mut store, "Zed", None);
        employee(&mut store, "Amy", None);
        let names: Vec<_> = store
            .list_employees()
            .unwrap()
            .into_iter()
            .map(|e| e.name)
            .collect();
        assert_eq!(names, vec!["Amy", "Zed"]);
    }

    #[test]
    fn latest_date_and_month_lookup() {
        let mut store = Store::open_in_memory().unwrap();
        let ada = employee(&mut store, "Ada", None);
        assert_eq!(latest_run_date(store.conn(), ada.id).unwrap(), None);

        insert(&store, ada.id, "2025-01-31", dec!(100), dec!(10));
        insert(&store, ada.id, "2025-02-28", dec!(100), dec!(10));

        let latest = latest_run_date(store.conn(), ada.id).unwrap();
        assert_eq!(latest, Some(date("2025-02-28")));
        assert!(run_exists_for_month(store.conn(), ada.id, 2025, 2).unwrap());
        assert!(!run_exists_for_month(store.conn(), ada.id, 2025, 3).unwrap());
        assert!(!run_exists_for_month(store.conn(), ada.id, 2024, 2).unwrap());
    }

    #[test]
    fn ytd_excludes_target_date_and_other_years() {
        let mut store = Store::open_in_memory().unwrap();
        let ada = employee(&mut store, "Ada", None);
        let bob = employee(&mut store, "Bob", None);
        insert(&store, ada.id, "2024-12-15", dec!(500), dec!(50));
        insert(&store, ada.id, "2025-01-15", dec!(161.15), dec!(49.20));
        insert(&store, ada.id, "2025-02-15", dec!(161.15), dec!(49.20));
        insert(&store, bob.id, "2025-01-15", dec!(999), dec!(99));

        let ytd = sum_ytd(store.conn(), ada.id, date("2025-02-15")).unwrap();
        assert_eq!(ytd.cpp, dec!(161.15));
        assert_eq!(ytd.ei, dec!(49.20));

        let ytd = sum_ytd(store.conn(), ada.id, date("2025-03-15")).unwrap();
        assert_eq!(ytd.cpp, dec!(322.30));
        assert_eq!(ytd.ei, dec!(98.40));

        let ytd = sum_ytd(store.conn(), ada.id, date("2025-01-01")).unwrap();
        assert_eq!(ytd, YtdTotals::default());
    }

    #[test]
    fn month_uniqueness_enforced_by_schema() {
        let mut store = Store::open_in_memory().unwrap();
        let ada = employee(&mut store, "Ada", None);
        insert(&store, ada.id, "2025-01-01", dec!(1), dec!(1));
        let d = deductions(dec!(1), dec!(1));
        let err = insert_run(
            store.conn(),
            &NewRun {
                employee_id: ada.id,
                pay_date: date("2025-01-31"),
                frequency: PayFrequency::Monthly,
                deductions: &d,
            },
        )
        .unwrap_err();
        assert!(matches!(err, PayrollError::Storage(ref e) if is_constraint_violation(e)));
    }

    #[test]
    fn runs_round_trip_exact_decimals() {
        let mut store = Store::open_in_memory().unwrap();
        let ada = employee(&mut store, "Ada", None);
        let inserted = insert(&store, ada.id, "2025-03-31", dec!(161.15), dec!(49.20));

        let runs = store.runs_for_employee(ada.id).unwrap();
        assert_eq!(runs, vec![inserted]);
        assert_eq!(runs[0].ei_employee.to_string(), "49.20");
        assert_eq!(runs[0].ei_employer.to_string(), "68.880");
    }

    #[test]
    fn runs_for_year_in_date_order() {
        let mut store = Store::open_in_memory().unwrap();
        let ada = employee(&mut store, "Ada", None);
        insert(&store, ada.id, "2024-12-31", dec!(1), dec!(1));
        insert(&store, ada.id, "2025-01-31", dec!(1), dec!(1));
        insert(&store, ada.id, "2025-02-28", dec!(1), dec!(1));
        insert(&store, ada.id, "2026-01-31", dec!(1), dec!(1));

        let dates: Vec<_> = store
            .runs_for_year(ada.id, 2025)
            .unwrap()
            .into_iter()
            .map(|r| r.pay_date)
            .collect();
        assert_eq!(dates, vec![date("2025-01-31"), date("2025-02-28")]);
    }

    #[test]
    fn all_runs_include_employee_name() {
        let mut store = Store::open_in_memory().unwrap();
        let ada = employee(&mut store, "Ada", None);
        let bob = employee(&mut store, "Bob", None);
        insert(&store, ada.id, "2025-01-31", dec!(1), dec!(1));
        insert(&store, bob.id, "2025-02-28", dec!(1), dec!(1));

        let runs = store.all_runs().unwrap();
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[0].1, "Bob");
        assert_eq!(runs[1].1, "Ada");
    }

    #[test]
    fn delete_cascades_runs() {
        let mut store = Store::open_in_memory().unwrap();
        let ada = employee(&mut store, "Ada", None);
        let bob = employee(&mut store, "Bob", None);
        insert(&store, ada.id, "2025-01-31", dec!(1), dec!(1));
        insert(&store, ada.id, "2025-02-28", dec!(1), dec!(1));
        insert(&store, bob.id, "2025-01-31", dec!(1), dec!(1));

        assert_eq!(store.delete_employee(ada.id).unwrap(), 2);
        assert!(store.employee_by_id(ada.id).unwrap().is_none());
        assert_eq!(store.run_count(ada.id).unwrap(), 0);
        assert_eq!(store.run_count(bob.id).unwrap(), 1);
    }

    #[test]
    fn delete_cascades_without_foreign_keys() {
        let mut store = Store::open_in_memory().unwrap();
        store.conn().execute_batch("PRAGMA foreign_keys = OFF;").unwrap();
        let ada = employee(&mut store, "Ada", None);
        insert(&store, ada.id, "2025-01-31", dec!(1), dec!(1));

        store.delete_employee(ada.id).unwrap();
        let orphans: i64 = store
            .conn()
            .query_row("SELECT COUNT(*) FROM payroll_runs", [], |row| row.get(0))
            .unwrap();
        assert_eq!(orphans, 0);
    }

    #[test]
    fn delete_missing_employee() {
        let mut store = Store::open_in_memory().unwrap();
        assert!(matches!(
            store.delete_employee(7),
            Err(PayrollError::EmployeeNotFound(7))
        ));
    }

    #[test]
    fn settings_created_on_first_read() {
        let mut store = Store::open_in_memory().unwrap();
        let settings = store.settings().unwrap();
        assert_eq!(settings, OrganizationSettings::default());
        let count: i64 = store
            .conn()
            .query_row("SELECT COUNT(*) FROM company_settings", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn settings_upsert_is_idempotent() {
        let mut store = Store::open_in_memory().unwrap();
        let settings = OrganizationSettings {
            company_name: "Maple Widgets".into(),
            default_frequency: PayFrequency::BiWeekly,
            address_province: Jurisdiction::MB,
            ..OrganizationSettings::default()
        };
        store.upsert_settings(&settings).unwrap();
        store.upsert_settings(&settings).unwrap();

        assert_eq!(store.settings().unwrap(), settings);
        let count: i64 = store
            .conn()
            .query_row("SELECT COUNT(*) FROM company_settings", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn file_backed_store_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("payroll.db");
        let id = {
            let mut store = Store::open(&path).unwrap();
            let ada = employee(&mut store, "Ada", Some("999"));
            insert(&store, ada.id, "2025-05-31", dec!(10), dec!(2));
            ada.id
        };

        let store = Store::open(&path).unwrap();
        assert_eq!(store.employee_by_id(id).unwrap().unwrap().name, "Ada");
        assert_eq!(store.run_count(id).unwrap(), 1);
    }

    #[test]
    fn unusable_database_directory_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("occupied");
        std::fs::write(&blocker, "not a directory").unwrap();

        match Store::open(blocker.join("sub").join("payroll.db")) {
            Err(PayrollError::Io { path, .. }) => assert_eq!(path, blocker.join("sub")),
            Err(other) => panic!("unexpected error {:?}", other),
            Ok(_) => panic!("store opened under a regular file"),
        }
    }
}
