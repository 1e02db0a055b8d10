//! Year-versioned tax rate tables.
//!
//! Tables are read from `tax_rates_<year>.json` in an optional directory. When
//! the file is missing or malformed the bundled table for that year is used,
//! and failing that the bundled default year. Lookups never fail.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

/// Year whose bundled table stands in for any year without data.
pub const DEFAULT_TABLE_YEAR: i32 = 2025;

/// Tables compiled into the binary, tagged by year.
const EMBEDDED_TABLES: &[(i32, &str)] = &[(2025, include_str!("../../data/tax_rates_2025.json"))];

#[derive(Debug, thiserror::Error)]
pub enum TableError {
    #[error("io error reading {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid bracket limit '{0}'")]
    InvalidLimit(String),
    #[error("{0}")]
    Invalid(String),
}

/// One marginal band. `upper` of `None` means the band is unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Bracket {
    pub upper: Option<Decimal>,
    pub rate: Decimal,
}

impl Bracket {
    pub fn new(upper: Decimal, rate: Decimal) -> Self {
        Bracket {
            upper: Some(upper),
            rate,
        }
    }

    pub fn unbounded(rate: Decimal) -> Self {
        Bracket { upper: None, rate }
    }
}

/// CPP contribution parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct PensionRates {
    #[schemars(with = "f64")]
    pub rate: Decimal,
    /// Year's maximum pensionable earnings
    #[schemars(with = "f64")]
    pub ympe: Decimal,
    #[schemars(with = "f64")]
    pub basic_exemption: Decimal,
}

impl PensionRates {
    /// Largest contribution an employee can make in a year
    pub fn annual_max(&self) -> Decimal {
        (self.ympe - self.basic_exemption) * self.rate
    }
}

/// EI premium parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct UnemploymentRates {
    #[schemars(with = "f64")]
    pub rate: Decimal,
    #[schemars(with = "f64")]
    pub max_insurable: Decimal,
    #[schemars(with = "f64")]
    pub employer_multiplier: Decimal,
}

impl UnemploymentRates {
    /// Largest premium an employee can pay in a year
    pub fn annual_max(&self) -> Decimal {
        self.max_insurable * self.rate
    }
}

/// Where a rate set came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum TableSource {
    /// Read from a table file on disk
    External(PathBuf),
    /// Bundled table for the requested year
    Embedded,
    /// Bundled default year substituted for a year with no usable data
    Fallback { requested: i32 },
}

impl fmt::Display for TableSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableSource::External(path) => write!(f, "file {}", path.display()),
            TableSource::Embedded => write!(f, "bundled table"),
            TableSource::Fallback { requested } => {
                write!(f, "bundled {} table (no data for {})", DEFAULT_TABLE_YEAR, requested)
            }
        }
    }
}

/// Complete set of rates in force for one year
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaxRateSet {
    pub year: i32,
    pub source: TableSource,
    pub pension: PensionRates,
    pub unemployment: UnemploymentRates,
    pub federal: Vec<Bracket>,
    pub provincial: BTreeMap<String, Vec<Bracket>>,
}

impl TaxRateSet {
    /// Provincial schedule for a jurisdiction code (case-insensitive)
    pub fn provincial_brackets(&self, code: &str) -> Option<&[Bracket]> {
        self.provincial
            .get(&code.trim().to_ascii_uppercase())
            .map(Vec::as_slice)
    }
}

/// On-disk layout of a `tax_rates_<year>.json` file
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct TaxTableFile {
    pub year: i32,
    pub federal_brackets: Vec<BracketEntry>,
    pub provincial_brackets: BTreeMap<String, Vec<BracketEntry>>,
    pub cpp: PensionRates,
    pub ei: UnemploymentRates,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct BracketEntry {
    /// Upper bound of the band. The last band is always unbounded; it may be
    /// written as "Infinity", null or any number.
    #[serde(default)]
    #[schemars(with = "Option<serde_json::Value>")]
    pub limit: Option<BracketLimit>,
    #[schemars(with = "f64")]
    pub rate: Decimal,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum BracketLimit {
    Amount(Decimal),
    Keyword(String),
}

impl BracketLimit {
    fn to_bound(&self) -> Result<Option<Decimal>, TableError> {
        match self {
            BracketLimit::Amount(amount) => Ok(Some(*amount)),
            BracketLimit::Keyword(s) => match s.trim().to_ascii_lowercase().as_str() {
                "infinity" | "inf" | "+inf" | "unbounded" => Ok(None),
                _ => Err(TableError::InvalidLimit(s.clone())),
            },
        }
    }
}

/// Parse and validate a table document
pub fn parse_table(json: &str, source: TableSource) -> Result<TaxRateSet, TableError> {
    let file: TaxTableFile = serde_json::from_str(json)?;
    file.into_rate_set(source)
}

impl TaxTableFile {
    pub fn into_rate_set(self, source: TableSource) -> Result<TaxRateSet, TableError> {
        validate_rates(&self.cpp, &self.ei)?;
        let federal = normalize_brackets("federal", &self.federal_brackets)?;
        let provincial = self
            .provincial_brackets
            .iter()
            .map(|(code, entries)| {
                let code = code.trim().to_ascii_uppercase();
                normalize_brackets(&code, entries).map(|brackets| (code, brackets))
            })
            .collect::<Result<BTreeMap<_, _>, _>>()?;

        Ok(TaxRateSet {
            year: self.year,
            source,
            pension: self.cpp,
            unemployment: self.ei,
            federal,
            provincial,
        })
    }
}

/// Convert a schedule, forcing the final band to be unbounded
fn normalize_brackets(name: &str, entries: &[BracketEntry]) -> Result<Vec<Bracket>, TableError> {
    if entries.is_empty() {
        return Err(TableError::Invalid(format!("{} schedule is empty", name)));
    }
    let last = entries.len() - 1;
    let mut brackets = Vec::with_capacity(entries.len());
    let mut previous = Decimal::ZERO;

    for (i, entry) in entries.iter().enumerate() {
        if entry.rate < Decimal::ZERO || entry.rate > Decimal::ONE {
            return Err(TableError::Invalid(format!(
                "{} schedule has rate {} outside [0, 1]",
                name, entry.rate
            )));
        }
        if i == last {
            brackets.push(Bracket::unbounded(entry.rate));
            break;
        }
        let upper = match &entry.limit {
            Some(limit) => limit.to_bound()?,
            None => None,
        };
        let upper = upper.ok_or_else(|| {
            TableError::Invalid(format!("{} schedule has an unbounded band before the last", name))
        })?;
        if upper < previous {
            return Err(TableError::Invalid(format!(
                "{} schedule bounds decrease at {}",
                name, upper
            )));
        }
        previous = upper;
        brackets.push(Bracket::new(upper, entry.rate));
    }
    Ok(brackets)
}

fn validate_rates(cpp: &PensionRates, ei: &UnemploymentRates) -> Result<(), TableError> {
    let unit = Decimal::ZERO..=Decimal::ONE;
    if !unit.contains(&cpp.rate) || !unit.contains(&ei.rate) {
        return Err(TableError::Invalid("contribution rate outside [0, 1]".into()));
    }
    if cpp.basic_exemption < Decimal::ZERO || cpp.ympe <= cpp.basic_exemption {
        return Err(TableError::Invalid(
            "pensionable ceiling must exceed the basic exemption".into(),
        ));
    }
    if ei.max_insurable <= Decimal::ZERO {
        return Err(TableError::Invalid("insurable ceiling must be positive".into()));
    }
    if ei.employer_multiplier < dec!(1) {
        return Err(TableError::Invalid("employer multiplier must be at least 1".into()));
    }
    Ok(())
}

fn embedded_table(year: i32) -> Option<&'static str> {
    EMBEDDED_TABLES
        .iter()
        .find(|(y, _)| *y == year)
        .map(|(_, json)| *json)
}

fn default_rate_set(requested: i32) -> TaxRateSet {
    let json = embedded_table(DEFAULT_TABLE_YEAR).expect("default year is bundled");
    parse_table(json, TableSource::Fallback { requested }).expect("bundled default table is valid")
}

/// Loads and memoizes rate sets per year
#[derive(Debug, Default)]
pub struct TaxTableProvider {
    dir: Option<PathBuf>,
    cache: Mutex<HashMap<i32, Arc<TaxRateSet>>>,
}

impl TaxTableProvider {
    pub fn new(dir: Option<PathBuf>) -> Self {
        TaxTableProvider {
            dir,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Rates in force for `year`. The first call for a year loads it; later
    /// calls return the same `Arc`.
    pub fn rates_for(&self, year: i32) -> Arc<TaxRateSet> {
        let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        cache
            .entry(year)
            .or_insert_with(|| Arc::new(self.load(year)))
            .clone()
    }

    fn load(&self, year: i32) -> TaxRateSet {
        if let Some(dir) = &self.dir {
            let path = dir.join(format!("tax_rates_{}.json", year));
            match read_table_file(&path) {
                Ok(rates) if rates.year == year => {
                    log::info!("Loaded {} tax rates from {}", year, path.display());
                    return rates;
                }
                Ok(rates) => log::warn!(
                    "Tax table {} declares year {} but was requested for {}",
                    path.display(),
                    rates.year,
                    year
                ),
                Err(err) => log::warn!("Could not load tax rates for {}: {}", year, err),
            }
        }

        if let Some(json) = embedded_table(year) {
            match parse_table(json, TableSource::Embedded) {
                Ok(rates) => {
                    log::debug!("Using bundled tax rates for {}", year);
                    return rates;
                }
                Err(err) => log::warn!("Bundled tax table for {} is invalid: {}", year, err),
            }
        }

        log::warn!(
            "No tax rates available for {}, using {} values",
            year,
            DEFAULT_TABLE_YEAR
        );
        default_rate_set(year)
    }
}

fn read_table_file(path: &Path) -> Result<TaxRateSet, TableError> {
    let json = std::fs::read_to_string(path).map_err(|source| TableError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_table(&json, TableSource::External(path.to_path_buf()))
}
