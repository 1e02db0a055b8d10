use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Province or territory an employee is taxed in
#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Jurisdiction {
    #[default]
    ON,
    QC,
    BC,
    AB,
    SK,
    MB,
    NB,
    NS,
    PE,
    NL,
    YT,
    NT,
    NU,
}

impl Jurisdiction {
    pub const ALL: [Jurisdiction; 13] = [
        Jurisdiction::ON,
        Jurisdiction::QC,
        Jurisdiction::BC,
        Jurisdiction::AB,
        Jurisdiction::SK,
        Jurisdiction::MB,
        Jurisdiction::NB,
        Jurisdiction::NS,
        Jurisdiction::PE,
        Jurisdiction::NL,
        Jurisdiction::YT,
        Jurisdiction::NT,
        Jurisdiction::NU,
    ];

    /// Two-letter code used as the key into provincial tax schedules
    pub fn code(self) -> &'static str {
        match self {
            Jurisdiction::ON => "ON",
            Jurisdiction::QC => "QC",
            Jurisdiction::BC => "BC",
            Jurisdiction::AB => "AB",
            Jurisdiction::SK => "SK",
            Jurisdiction::MB => "MB",
            Jurisdiction::NB => "NB",
            Jurisdiction::NS => "NS",
            Jurisdiction::PE => "PE",
            Jurisdiction::NL => "NL",
            Jurisdiction::YT => "YT",
            Jurisdiction::NT => "NT",
            Jurisdiction::NU => "NU",
        }
    }
}

impl FromStr for Jurisdiction {
    type Err = crate::error::PayrollError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim().to_ascii_uppercase();
        Jurisdiction::ALL
            .into_iter()
            .find(|j| j.code() == code)
            .ok_or_else(|| crate::error::PayrollError::UnknownJurisdiction(s.to_string()))
    }
}

impl fmt::Display for Jurisdiction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_codes() {
        assert_eq!("ON".parse::<Jurisdiction>().unwrap(), Jurisdiction::ON);
        assert_eq!("qc".parse::<Jurisdiction>().unwrap(), Jurisdiction::QC);
        assert_eq!(" bc ".parse::<Jurisdiction>().unwrap(), Jurisdiction::BC);
        assert!("XX".parse::<Jurisdiction>().is_err());
        assert!("".parse::<Jurisdiction>().is_err());
    }

    #[test]
    fn codes_round_trip() {
        for j in Jurisdiction::ALL {
            assert_eq!(j.code().parse::<Jurisdiction>().unwrap(), j);
        }
    }

    #[test]
    fn every_code_has_a_bundled_schedule() {
        let rates = crate::tax::TaxTableProvider::new(None).rates_for(2025);
        for j in Jurisdiction::ALL {
            assert!(rates.provincial_brackets(j.code()).is_some(), "{}", j);
        }
    }
}
