mod cmd;
mod error;
mod money;
mod payroll;
mod store;
mod tax;

use clap::{Parser, Subcommand};
use log::LevelFilter;

#[derive(Parser, Debug)]
#[command(name = "paycalc", version, about = "Canadian payroll deductions and run ledger")]
struct Cli {
    #[command(flatten)]
    context: cmd::Context,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Calculate deductions for one pay period without storing anything
    Calc(cmd::calc::CalcCommand),
    /// Manage employees
    #[command(subcommand)]
    Employee(cmd::employee::EmployeeCommand),
    /// Run payroll for an employee and store the result
    Run(cmd::run::RunCommand),
    /// List stored payroll runs
    Records(cmd::records::RecordsCommand),
    /// Year-end totals for an employee (T4 boxes)
    Summary(cmd::summary::SummaryCommand),
    /// Show or change organization settings
    #[command(subcommand)]
    Settings(cmd::settings::SettingsCommand),
    /// Show the tax rates in force for a year
    Rates(cmd::rates::RatesCommand),
    /// Print the JSON schema for tax table files
    Schema(cmd::schema::SchemaCommand),
}

fn main() -> anyhow::Result<()> {
    pretty_env_logger::formatted_builder()
        .filter_level(LevelFilter::Warn)
        .parse_env("RUST_LOG")
        .init();

    let cli = Cli::parse();
    let ctx = &cli.context;
    match &cli.command {
        Command::Calc(c) => c.exec(ctx),
        Command::Employee(c) => c.exec(ctx),
        Command::Run(c) => c.exec(ctx),
        Command::Records(c) => c.exec(ctx),
        Command::Summary(c) => c.exec(ctx),
        Command::Settings(c) => c.exec(ctx),
        Command::Rates(c) => c.exec(ctx),
        Command::Schema(c) => c.exec(),
    }
}
