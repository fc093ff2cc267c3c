//! Range → fetch → extract, one sample at a time.

use std::fmt;
use std::str::FromStr;

use crate::extract::{extract_tax_result, ExtractionMode};
use crate::fetch::{Fetcher, RequestPeriod};
use crate::http_client::Transport;
use crate::range::income_range;
use crate::types::{Cadence, TaxError, TaxOutcome, TaxResult};

/// What to do when a sample cannot be fetched or parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorPolicy {
    /// Stop the run and return the error.
    #[default]
    Abort,
    /// Log the error and leave the sample out.
    Skip,
}

impl fmt::Display for ErrorPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorPolicy::Abort => f.write_str("abort"),
            ErrorPolicy::Skip => f.write_str("skip"),
        }
    }
}

impl FromStr for ErrorPolicy {
    type Err = TaxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "abort" => Ok(ErrorPolicy::Abort),
            "skip" => Ok(ErrorPolicy::Skip),
            other => Err(TaxError::InvalidOption(format!(
                "unknown error policy '{other}' (expected abort or skip)"
            ))),
        }
    }
}

/// Knobs for a scraping run. `Default` reproduces the plain yearly run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScrapeOptions {
    pub cadence: Cadence,
    pub period: RequestPeriod,
    pub mode: ExtractionMode,
    pub policy: ErrorPolicy,
}

/// Sequential scraper over a [`Transport`].
pub struct Pipeline<T: Transport> {
    fetcher: Fetcher<T>,
    options: ScrapeOptions,
}

impl<T: Transport> Pipeline<T> {
    /// The fetcher's request period is overridden by `options.period`.
    pub fn new(fetcher: Fetcher<T>, options: ScrapeOptions) -> Self {
        Self {
            fetcher: fetcher.with_period(options.period),
            options,
        }
    }

    pub fn options(&self) -> &ScrapeOptions {
        &self.options
    }

    /// Fetch and extract the result for one gross income.
    pub async fn fetch_one(&self, gross: u32) -> TaxOutcome<TaxResult> {
        let doc = self.fetcher.fetch(gross, self.options.cadence).await?;
        extract_tax_result(&doc, self.options.cadence, self.options.mode)
    }

    /// Results for every sample of [`income_range`]`(start, stop)`, in order.
    pub async fn collect_range(&self, start: u32, stop: u32) -> TaxOutcome<Vec<TaxResult>> {
        let mut results = Vec::new();
        let mut skipped = 0usize;

        for gross in income_range(start, stop) {
            match self.fetch_one(gross).await {
                Ok(record) => results.push(record),
                Err(e) if self.options.policy == ErrorPolicy::Skip => {
                    tracing::warn!("Skipping gross {gross}: {e}");
                    skipped += 1;
                }
                Err(e) => return Err(e),
            }
        }

        tracing::info!(
            "Collected {} results for {start}..={stop} ({} cadence, {skipped} skipped)",
            results.len(),
            self.options.cadence
        );
        Ok(results)
    }
}
