//! Steuer — scrape a gross-to-net tax calculator into line-delimited JSON.

pub mod extract;
pub mod fetch;
pub mod http_client;
pub mod pipeline;
pub mod range;
pub mod types;
pub mod writer;

pub use extract::{extract_tax_result, extract_values, parse_amount, ExtractionMode, Markers};
pub use fetch::{build_form, Fetcher, RequestPeriod, DEFAULT_ENDPOINT};
pub use http_client::{HttpClient, Transport};
pub use pipeline::{ErrorPolicy, Pipeline, ScrapeOptions};
pub use range::{income_range, INCOME_STEP};
pub use types::*;
pub use writer::{write_results, JsonlWriter, DEFAULT_OUTPUT};
