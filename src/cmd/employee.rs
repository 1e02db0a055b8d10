//! Employee commands - add, update, delete and list employees

use crate::cmd::records::{print_runs, RunRow};
use crate::cmd::Context;
use crate::error::PayrollError;
use crate::money::display_amount;
use crate::payroll::{records_summary, Employee, EmployeeInput};
use crate::tax::Jurisdiction;
use clap::{Args, Subcommand};
use tabled::{settings::Style, Table, Tabled};

#[derive(Subcommand, Debug)]
pub enum EmployeeCommand {
    /// Add a new employee
    Add(EmployeeFields),
    /// Replace an existing employee's details
    Update {
        /// Employee id
        id: i64,
        #[command(flatten)]
        fields: EmployeeFields,
    },
    /// Delete an employee together with all of their payroll runs
    Delete {
        /// Employee id
        id: i64,
    },
    /// List all employees
    List {
        /// Output as JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Show one employee and their payroll history
    Show {
        /// Employee id
        id: i64,
    },
}

#[derive(Args, Debug)]
pub struct EmployeeFields {
    /// Full name
    #[arg(short, long)]
    name: String,

    /// Social insurance number (optional, must be unique)
    #[arg(short, long)]
    sin: Option<String>,

    /// Province or territory of employment
    #[arg(short, long, default_value = "ON")]
    province: Jurisdiction,
}

impl EmployeeFields {
    fn input(&self) -> EmployeeInput {
        EmployeeInput::new(self.name.as_str(), self.sin.as_deref(), self.province)
    }
}

#[derive(Tabled)]
struct EmployeeRow {
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "SIN")]
    sin: String,
    #[tabled(rename = "Province")]
    province: Jurisdiction,
}

impl From<&Employee> for EmployeeRow {
    fn from(e: &Employee) -> Self {
        EmployeeRow {
            id: e.id,
            name: e.name.clone(),
            sin: e.tax_id.clone().unwrap_or_else(|| "-".to_string()),
            province: e.jurisdiction,
        }
    }
}

impl EmployeeCommand {
    pub fn exec(&self, ctx: &Context) -> anyhow::Result<()> {
        let mut store = ctx.open_store()?;
        match self {
            EmployeeCommand::Add(fields) => {
                let employee = store.add_employee(fields.input())?;
                println!("Added employee {} ({})", employee.id, employee.name);
            }
            EmployeeCommand::Update { id, fields } => {
                let employee = store.update_employee(*id, fields.input())?;
                println!("Updated employee {} ({})", employee.id, employee.name);
            }
            EmployeeCommand::Delete { id } => {
                let runs = store.delete_employee(*id)?;
                println!("Deleted employee {} and {} payroll run(s)", id, runs);
            }
            EmployeeCommand::List { json } => {
                let employees = store.list_employees()?;
                if *json {
                    println!("{}", serde_json::to_string_pretty(&employees)?);
                } else if employees.is_empty() {
                    println!("No employees");
                } else {
                    let rows: Vec<EmployeeRow> = employees.iter().map(EmployeeRow::from).collect();
                    let table = Table::new(rows).with(Style::rounded()).to_string();
                    println!("{}", table);
                }
            }
            EmployeeCommand::Show { id } => {
                let employee = store
                    .employee_by_id(*id)?
                    .ok_or(PayrollError::EmployeeNotFound(*id))?;
                let runs = store.runs_for_employee(employee.id)?;

                println!("Employee {}: {}", employee.id, employee.name);
                println!("  SIN:      {}", employee.tax_id.as_deref().unwrap_or("-"));
                println!("  Province: {}", employee.jurisdiction);
                println!();

                if runs.is_empty() {
                    println!("No payroll runs");
                    return Ok(());
                }
                let rows: Vec<RunRow> = runs
                    .iter()
                    .map(|run| RunRow::new(run, &employee.name))
                    .collect();
                print_runs(&rows);

                let totals = records_summary(&runs);
                println!(
                    "{} run(s), gross {}, net {}",
                    totals.count,
                    display_amount(totals.gross),
                    display_amount(totals.net)
                );
            }
        }
        Ok(())
    }
}
