//! Build the calculator request and turn its answer into a document tree.

use std::fmt;
use std::str::FromStr;

use scraper::Html;

use crate::http_client::Transport;
use crate::types::{Cadence, TaxError, TaxOutcome};

/// Calculator endpoint queried by default.
pub const DEFAULT_ENDPOINT: &str = "https://www.brutto-netto-rechner.info/";

/// Form field carrying the gross income.
const GROSS_FIELD: &str = "f_bruttolohn";

/// Form field selecting the accounting period of the computed table.
const PERIOD_FIELD: &str = "f_abrechnungszeitraum";

/// Fixed tax profile sent with every request: 2024, tax class 1, Bavaria,
/// age 27, no church tax, no children, statutory insurance throughout.
const FIXED_FIELDS: &[(&str, &str)] = &[
    ("f_geld_werter_vorteil", "0"),
    ("f_abrechnungsjahr", "2024"),
    ("f_steuerfreibetrag", "0"),
    ("f_steuerklasse", "1"),
    ("f_kirche", "nein"),
    ("f_bundesland", "bayern"),
    ("f_alter", "27"),
    ("f_kinder", "nein"),
    ("f_kinderfreibetrag", "0"),
    ("f_krankenversicherung", "pflichtversichert"),
    ("f_private_k", ""),
    ("f_arbeitgeberzuschuss_pkv", "ja"),
    ("f_KVZ", "1.2"),
    ("f_rentenversicherung", "pflichtversichert"),
    ("f_arbeitslosenversicherung", "pflichtversichert"),
    ("ok", "1"),
];

/// How the request's accounting period relates to the parsing cadence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RequestPeriod {
    /// Always request the yearly table, whatever cadence is parsed.
    ///
    /// Monthly parsing against a yearly page finds no monthly cells.
    #[default]
    FixedYearly,
    /// Request the table matching the parsing cadence.
    FollowCadence,
}

impl RequestPeriod {
    /// Value sent in the accounting period field.
    pub fn form_value(self, cadence: Cadence) -> &'static str {
        match (self, cadence) {
            (RequestPeriod::FollowCadence, Cadence::Monthly) => "monat",
            _ => "jahr",
        }
    }
}

impl fmt::Display for RequestPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestPeriod::FixedYearly => f.write_str("fixed-yearly"),
            RequestPeriod::FollowCadence => f.write_str("follow-cadence"),
        }
    }
}

impl FromStr for RequestPeriod {
    type Err = TaxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fixed-yearly" | "fixed" => Ok(RequestPeriod::FixedYearly),
            "follow-cadence" | "cadence" => Ok(RequestPeriod::FollowCadence),
            other => Err(TaxError::InvalidOption(format!(
                "unknown request period '{other}' (expected fixed-yearly or follow-cadence)"
            ))),
        }
    }
}

/// Form payload for one gross income sample.
pub fn build_form(gross: u32, cadence: Cadence, period: RequestPeriod) -> Vec<(String, String)> {
    let mut fields = Vec::with_capacity(FIXED_FIELDS.len() + 2);
    fields.push((GROSS_FIELD.to_string(), gross.to_string()));
    fields.push((
        PERIOD_FIELD.to_string(),
        period.form_value(cadence).to_string(),
    ));
    fields.extend(
        FIXED_FIELDS
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string())),
    );
    fields
}

/// Submits calculator requests through a [`Transport`] and parses the pages.
pub struct Fetcher<T: Transport> {
    transport: T,
    endpoint: String,
    period: RequestPeriod,
}

impl<T: Transport> Fetcher<T> {
    /// Fetcher against [`DEFAULT_ENDPOINT`] requesting yearly tables.
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            period: RequestPeriod::default(),
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_period(mut self, period: RequestPeriod) -> Self {
        self.period = period;
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn period(&self) -> RequestPeriod {
        self.period
    }

    /// Fetch the result page for `gross` and parse it.
    pub async fn fetch(&self, gross: u32, cadence: Cadence) -> TaxOutcome<Html> {
        tracing::info!("Getting tax data for {gross}");
        let form = build_form(gross, cadence, self.period);
        let body = self.transport.post_form(&self.endpoint, &form).await?;
        Ok(Html::parse_document(&body))
    }
}
