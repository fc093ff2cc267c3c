//! Core data types for scraped tax results.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Number of figures extracted from one result page.
pub const FIELD_COUNT: usize = 12;

/// Reporting period whose table layout is parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cadence {
    Monthly,
    #[default]
    Yearly,
}

impl fmt::Display for Cadence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cadence::Monthly => f.write_str("monthly"),
            Cadence::Yearly => f.write_str("yearly"),
        }
    }
}

impl FromStr for Cadence {
    type Err = TaxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "monthly" | "month" | "monat" => Ok(Cadence::Monthly),
            "yearly" | "year" | "jahr" => Ok(Cadence::Yearly),
            other => Err(TaxError::InvalidOption(format!(
                "unknown cadence '{other}' (expected monthly or yearly)"
            ))),
        }
    }
}

/// One named figure of a [`TaxResult`], in table order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Brutto,
    GeldwerterVorteil,
    Solidaritaetszuschlag,
    Kirchensteuer,
    Lohnsteuer,
    Steuern,
    Rentenversicherung,
    Arbeitslosenversicherung,
    Krankenversicherung,
    Pflegeversicherung,
    SozialAbgaben,
    Netto,
}

impl Field {
    /// All fields in the order they appear on the result page.
    pub const ALL: [Field; FIELD_COUNT] = [
        Field::Brutto,
        Field::GeldwerterVorteil,
        Field::Solidaritaetszuschlag,
        Field::Kirchensteuer,
        Field::Lohnsteuer,
        Field::Steuern,
        Field::Rentenversicherung,
        Field::Arbeitslosenversicherung,
        Field::Krankenversicherung,
        Field::Pflegeversicherung,
        Field::SozialAbgaben,
        Field::Netto,
    ];

    /// JSON key used in the output file.
    pub fn key(self) -> &'static str {
        match self {
            Field::Brutto => "brutto",
            Field::GeldwerterVorteil => "geldwertervorteil",
            Field::Solidaritaetszuschlag => "solidaritätszuschlag",
            Field::Kirchensteuer => "kirchensteuer",
            Field::Lohnsteuer => "lohnsteuer",
            Field::Steuern => "steuern",
            Field::Rentenversicherung => "rentenversicherung",
            Field::Arbeitslosenversicherung => "arbeitslosenversicherung",
            Field::Krankenversicherung => "krankenversicherung",
            Field::Pflegeversicherung => "pflegeversicherung",
            Field::SozialAbgaben => "sozialabgaben",
            Field::Netto => "netto",
        }
    }

    /// Position of this field in [`Field::ALL`].
    pub fn index(self) -> usize {
        self as usize
    }

    /// Look up a field by its JSON key.
    pub fn from_key(key: &str) -> Option<Field> {
        Field::ALL.into_iter().find(|f| f.key() == key)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Figures parsed from one result page.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TaxResult {
    pub brutto: f64,
    pub geldwertervorteil: f64,
    #[serde(rename = "solidaritätszuschlag")]
    pub solidaritaetszuschlag: f64,
    pub kirchensteuer: f64,
    pub lohnsteuer: f64,
    pub steuern: f64,
    pub rentenversicherung: f64,
    pub arbeitslosenversicherung: f64,
    pub krankenversicherung: f64,
    pub pflegeversicherung: f64,
    pub sozialabgaben: f64,
    pub netto: f64,
}

impl TaxResult {
    /// Build a result from values in [`Field::ALL`] order.
    pub fn from_values(values: [f64; FIELD_COUNT]) -> Self {
        let [
            brutto,
            geldwertervorteil,
            solidaritaetszuschlag,
            kirchensteuer,
            lohnsteuer,
            steuern,
            rentenversicherung,
            arbeitslosenversicherung,
            krankenversicherung,
            pflegeversicherung,
            sozialabgaben,
            netto,
        ] = values;

        Self {
            brutto,
            geldwertervorteil,
            solidaritaetszuschlag,
            kirchensteuer,
            lohnsteuer,
            steuern,
            rentenversicherung,
            arbeitslosenversicherung,
            krankenversicherung,
            pflegeversicherung,
            sozialabgaben,
            netto,
        }
    }

    /// Values in [`Field::ALL`] order.
    pub fn values(&self) -> [f64; FIELD_COUNT] {
        [
            self.brutto,
            self.geldwertervorteil,
            self.solidaritaetszuschlag,
            self.kirchensteuer,
            self.lohnsteuer,
            self.steuern,
            self.rentenversicherung,
            self.arbeitslosenversicherung,
            self.krankenversicherung,
            self.pflegeversicherung,
            self.sozialabgaben,
            self.netto,
        ]
    }

    /// Value of a single field.
    pub fn get(&self, field: Field) -> f64 {
        self.values()[field.index()]
    }
}

/// Errors that can occur while fetching, parsing or writing results.
#[derive(thiserror::Error, Debug)]
pub enum TaxError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Unreadable response body: {0}")]
    Body(String),

    #[error("Cannot parse amount '{text}': {source}")]
    Amount {
        text: String,
        #[source]
        source: std::num::ParseFloatError,
    },

    #[error("Amount '{0}' is not a finite number")]
    NonFiniteAmount(String),

    #[error("Row amount mismatch: expected {expected} values, found {found}")]
    CountMismatch { expected: usize, found: usize },

    #[error("Unknown row label: '{0}'")]
    UnknownLabel(String),

    #[error("Field extracted twice: {0}")]
    DuplicateField(Field),

    #[error("Field missing from table: {0}")]
    MissingField(Field),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Invalid option: {0}")]
    InvalidOption(String),
}

impl TaxError {
    /// Whether this error belongs to the fetch/parse tier that aborts a run.
    ///
    /// Output-side failures (`Io`, `Serialize`) only stop further writing.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, TaxError::Io(_) | TaxError::Serialize(_))
    }
}

/// Convenience result type.
pub type TaxOutcome<T> = Result<T, TaxError>;
