//! Settings commands - organization details used on reports

use crate::cmd::{parse_frequency_arg, Context};
use crate::tax::{Jurisdiction, PayFrequency};
use clap::{Args, Subcommand};

#[derive(Subcommand, Debug)]
pub enum SettingsCommand {
    /// Show the current settings
    Show {
        /// Output as JSON instead of formatted text
        #[arg(long)]
        json: bool,
    },
    /// Change one or more settings; omitted fields keep their value
    Set(SettingsFields),
}

#[derive(Args, Debug)]
pub struct SettingsFields {
    #[arg(long)]
    company_name: Option<String>,
    /// CRA business number
    #[arg(long)]
    business_number: Option<String>,
    #[arg(long)]
    street: Option<String>,
    #[arg(long)]
    city: Option<String>,
    #[arg(long)]
    province: Option<Jurisdiction>,
    #[arg(long)]
    postal_code: Option<String>,
    #[arg(long)]
    phone: Option<String>,
    #[arg(long)]
    email: Option<String>,
    /// Payroll program account number (RP)
    #[arg(long)]
    payroll_account: Option<String>,
    /// Default pay periods per year for new runs: 12, 24, 26 or 52
    #[arg(long, value_parser = parse_frequency_arg)]
    periods: Option<PayFrequency>,
}

impl SettingsCommand {
    pub fn exec(&self, ctx: &Context) -> anyhow::Result<()> {
        let mut store = ctx.open_store()?;
        let mut settings = store.settings()?;
        match self {
            SettingsCommand::Show { json } => {
                if *json {
                    println!("{}", serde_json::to_string_pretty(&settings)?);
                    return Ok(());
                }
                let field = |label: &str, value: &str| {
                    println!("  {:<22}{}", label, if value.is_empty() { "-" } else { value })
                };
                println!("Organization settings");
                field("Company name:", &settings.company_name);
                field("Business number:", &settings.business_number);
                field("Address:", settings.address().as_deref().unwrap_or(""));
                field("Phone:", &settings.phone);
                field("Email:", &settings.email);
                field("Payroll account:", &settings.payroll_account);
                field("Pay frequency:", &settings.default_frequency.to_string());
            }
            SettingsCommand::Set(fields) => {
                let text = |target: &mut String, value: &Option<String>| {
                    if let Some(value) = value {
                        *target = value.trim().to_string();
                    }
                };
                text(&mut settings.company_name, &fields.company_name);
                text(&mut settings.business_number, &fields.business_number);
                text(&mut settings.address_street, &fields.street);
                text(&mut settings.address_city, &fields.city);
                text(&mut settings.address_postal, &fields.postal_code);
                text(&mut settings.phone, &fields.phone);
                text(&mut settings.email, &fields.email);
                text(&mut settings.payroll_account, &fields.payroll_account);
                if let Some(province) = fields.province {
                    settings.address_province = province;
                }
                if let Some(periods) = fields.periods {
                    settings.default_frequency = periods;
                }
                if settings.company_name.is_empty() {
                    anyhow::bail!("company name cannot be empty");
                }
                store.upsert_settings(&settings)?;
                log::info!("Updated organization settings");
                println!("Settings saved");
            }
        }
        Ok(())
    }
}
