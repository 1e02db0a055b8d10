use crate::tax::{Jurisdiction, PayFrequency};
use serde::Serialize;

/// Organization details. Exactly one record exists; it is created with
/// these defaults the first time it is read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrganizationSettings {
    pub company_name: String,
    pub business_number: String,
    pub address_street: String,
    pub address_city: String,
    pub address_province: Jurisdiction,
    pub address_postal: String,
    pub phone: String,
    pub email: String,
    pub payroll_account: String,
    pub default_frequency: PayFrequency,
}

impl Default for OrganizationSettings {
    fn default() -> Self {
        OrganizationSettings {
            company_name: "My Company".to_string(),
            business_number: String::new(),
            address_street: String::new(),
            address_city: String::new(),
            address_province: Jurisdiction::ON,
            address_postal: String::new(),
            phone: String::new(),
            email: String::new(),
            payroll_account: String::new(),
            default_frequency: PayFrequency::Monthly,
        }
    }
}

impl OrganizationSettings {
    /// Single-line address, or `None` when nothing has been entered
    pub fn address(&self) -> Option<String> {
        let mut parts = Vec::new();
        if !self.address_street.is_empty() {
            parts.push(self.address_street.clone());
        }
        if !self.address_city.is_empty() {
            let mut line = format!("{}, {}", self.address_city, self.address_province);
            if !self.address_postal.is_empty() {
                line.push(' ');
                line.push_str(&self.address_postal);
            }
            parts.push(line);
        }
        if parts.is_empty() {
            None
        } else {
            Some(parts.join(", "))
        }
    }
}
