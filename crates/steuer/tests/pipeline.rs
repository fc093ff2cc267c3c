//! End-to-end pipeline tests against canned calculator pages.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use steuer::*;
use wiremock::matchers::{body_string_contains, method};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── helpers ──

const REGULAR: [&str; 10] = [
    "50.000,00 €",
    "0,00 €",
    "0,00 €",
    "0,00 €",
    "7.230,00 €",
    "7.230,00 €",
    "4.650,00 €",
    "650,00 €",
    "4.075,00 €",
    "45.500,00 €",
];
const LAST: [&str; 2] = ["4.400,00 €", "35.420,50 €"];

/// Render a result page the way the calculator lays it out.
fn result_page(cadence: Cadence, regular: &[&str], last: &[&str]) -> String {
    let markers = Markers::for_cadence(cadence);
    let mut rows = String::new();
    for amount in regular {
        rows.push_str(&format!(
            "<tr>\n  <td class=\"left_column\">Posten</td>\n  <td class=\"{}\">{}</td>\n</tr>\n",
            markers.regular,
            amount.replace(' ', "\u{a0}")
        ));
    }
    for amount in last {
        rows.push_str(&format!(
            "<tr>\n  <td class=\"left_column orange big\">Summe</td>\n  <td class=\"{}\"><b>{amount}</b></td>\n</tr>\n",
            markers.last
        ));
    }
    format!(
        "<!DOCTYPE html><html><head><title>Brutto Netto Rechner</title></head>\
         <body><form></form><table class=\"result\">\n{rows}</table></body></html>"
    )
}

fn standard_page(cadence: Cadence) -> String {
    result_page(cadence, &REGULAR, &LAST)
}

fn form_value<'a>(fields: &'a [(String, String)], key: &str) -> &'a str {
    fields
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
        .unwrap_or("")
}

/// Serves a page chosen by the submitted form, recording every gross value.
struct StubSite {
    requests: Mutex<Vec<u32>>,
    broken_gross: Option<u32>,
}

impl StubSite {
    fn new() -> Self {
        Self {
            requests: Mutex::new(Vec::new()),
            broken_gross: None,
        }
    }

    fn broken_at(gross: u32) -> Self {
        Self {
            broken_gross: Some(gross),
            ..Self::new()
        }
    }

    fn requested(&self) -> Vec<u32> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for StubSite {
    async fn post_form(&self, _url: &str, fields: &[(String, String)]) -> TaxOutcome<String> {
        let gross: u32 = form_value(fields, "f_bruttolohn").parse().unwrap();
        self.requests.lock().unwrap().push(gross);

        let cadence = match form_value(fields, "f_abrechnungszeitraum") {
            "monat" => Cadence::Monthly,
            _ => Cadence::Yearly,
        };
        if Some(gross) == self.broken_gross {
            return Ok(result_page(cadence, &REGULAR[..9], &LAST));
        }
        let brutto = format!("{gross},00 €");
        let mut regular: Vec<&str> = REGULAR.to_vec();
        regular[0] = &brutto;
        Ok(result_page(cadence, &regular, &LAST))
    }
}

fn pipeline(site: &Arc<StubSite>, options: ScrapeOptions) -> Pipeline<Arc<StubSite>> {
    Pipeline::new(Fetcher::new(Arc::clone(site)), options)
}

// ── tests ──

#[test]
fn test_standard_page_extracts_all_fields() {
    let doc = scraper::Html::parse_document(&standard_page(Cadence::Yearly));
    let r = extract_tax_result(&doc, Cadence::Yearly, ExtractionMode::Positional).unwrap();

    assert_eq!(r.brutto, 50_000.0);
    assert_eq!(r.geldwertervorteil, 0.0);
    assert_eq!(r.lohnsteuer, 7_230.0);
    assert_eq!(r.pflegeversicherung, 45_500.0);
    assert_eq!(r.sozialabgaben, 4_400.0);
    assert_eq!(r.netto, 35_420.5);
    assert_eq!(r.get(Field::Netto), 35_420.5);
}

#[test]
fn test_end_to_end_writes_one_line() {
    let doc = scraper::Html::parse_document(&standard_page(Cadence::Yearly));
    let r = extract_tax_result(&doc, Cadence::Yearly, ExtractionMode::Positional).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(DEFAULT_OUTPUT);
    assert_eq!(write_results(&path, &[r]).unwrap(), 1);

    let content = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 1);
    let value: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
    assert_eq!(value["brutto"], 50_000.0);
    assert_eq!(value["solidaritätszuschlag"], 0.0);
    assert_eq!(value["netto"], 35_420.5);
    assert_eq!(value.as_object().unwrap().len(), FIELD_COUNT);

    let back: TaxResult = serde_json::from_str(lines[0]).unwrap();
    assert_eq!(back, r);
}

#[tokio::test]
async fn test_collect_range_in_order() {
    let site = Arc::new(StubSite::new());
    let p = pipeline(&site, ScrapeOptions::default());
    let results = p.collect_range(0, 5_500).await.unwrap();

    assert_eq!(site.requested(), vec![0, 1000, 2000, 3000, 4000, 5000]);

    let grosses: Vec<f64> = results.iter().map(|r| r.brutto).collect();
    assert_eq!(grosses, vec![0.0, 1000.0, 2000.0, 3000.0, 4000.0, 5000.0]);
    assert!(results.iter().all(|r| r.netto == 35_420.5));
}

#[tokio::test]
async fn test_empty_range_makes_no_requests() {
    let site = Arc::new(StubSite::new());
    let p = pipeline(&site, ScrapeOptions::default());
    assert!(p.collect_range(3_000, 1_000).await.unwrap().is_empty());
    assert!(site.requested().is_empty());
}

#[tokio::test]
async fn test_abort_policy_stops_at_first_bad_page() {
    let site = Arc::new(StubSite::broken_at(2_000));
    let p = pipeline(&site, ScrapeOptions::default());
    let err = p.collect_range(0, 5_000).await.unwrap_err();

    assert_eq!(site.requested(), vec![0, 1000, 2000]);

    assert!(matches!(
        err,
        TaxError::CountMismatch {
            expected: 12,
            found: 11
        }
    ));
    assert!(err.is_fatal());
}

#[tokio::test]
async fn test_skip_policy_leaves_sample_out() {
    let options = ScrapeOptions {
        policy: ErrorPolicy::Skip,
        ..ScrapeOptions::default()
    };
    let site = Arc::new(StubSite::broken_at(2_000));
    let p = pipeline(&site, options);
    let results = p.collect_range(0, 4_000).await.unwrap();

    assert_eq!(site.requested(), vec![0, 1000, 2000, 3000, 4000]);

    let grosses: Vec<f64> = results.iter().map(|r| r.brutto).collect();
    assert_eq!(grosses, vec![0.0, 1000.0, 3000.0, 4000.0]);
}

#[tokio::test]
async fn test_monthly_cadence_with_fixed_yearly_request_never_matches() {
    let options = ScrapeOptions {
        cadence: Cadence::Monthly,
        ..ScrapeOptions::default()
    };
    let p = pipeline(&Arc::new(StubSite::new()), options);
    let err = p.fetch_one(3_000).await.unwrap_err();
    assert!(matches!(err, TaxError::CountMismatch { found: 0, .. }));
}

#[tokio::test]
async fn test_monthly_cadence_following_request_period() {
    let options = ScrapeOptions {
        cadence: Cadence::Monthly,
        period: RequestPeriod::FollowCadence,
        ..ScrapeOptions::default()
    };
    let p = pipeline(&Arc::new(StubSite::new()), options);
    let r = p.fetch_one(3_000).await.unwrap();
    assert_eq!(r.brutto, 3_000.0);
    assert_eq!(r.netto, 35_420.5);
}

#[tokio::test]
async fn test_pipeline_over_http() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_string_contains("f_bruttolohn=50000"))
        .and(body_string_contains("f_abrechnungszeitraum=jahr"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(standard_page(Cadence::Yearly)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = Fetcher::new(HttpClient::new()).with_endpoint(server.uri());
    let p = Pipeline::new(fetcher, ScrapeOptions::default());
    let results = p.collect_range(50_000, 50_999).await.unwrap();

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].brutto, 50_000.0);
    assert_eq!(results[0].netto, 35_420.5);
}
