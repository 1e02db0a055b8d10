use crate::error::{PayrollError, Result};
use crate::tax::Jurisdiction;
use serde::Serialize;

/// A stored employee
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Employee {
    pub id: i64,
    pub name: String,
    /// Social insurance number, treated as an opaque unique key
    pub tax_id: Option<String>,
    pub jurisdiction: Jurisdiction,
}

/// Fields supplied when adding or updating an employee
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmployeeInput {
    pub name: String,
    pub tax_id: Option<String>,
    pub jurisdiction: Jurisdiction,
}

impl EmployeeInput {
    pub fn new(name: impl Into<String>, tax_id: Option<&str>, jurisdiction: Jurisdiction) -> Self {
        EmployeeInput {
            name: name.into(),
            tax_id: tax_id.map(str::to_string),
            jurisdiction,
        }
    }

    /// Trim fields, drop an empty tax identity and require a name
    pub fn normalized(self) -> Result<Self> {
        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err(PayrollError::validation("employee name is required"));
        }
        let tax_id = self
            .tax_id
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());
        Ok(EmployeeInput {
            name,
            tax_id,
            jurisdiction: self.jurisdiction,
        })
    }
}
