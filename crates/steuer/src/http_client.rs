//! Async HTTP client wrapping reqwest.
//!
//! One request at a time, no retry and no backoff: a failed request is
//! reported to the caller, which decides whether the run aborts.

use async_trait::async_trait;

use crate::types::{TaxError, TaxOutcome};

/// Browser user-agent sent with every request; the calculator serves
/// a reduced page to unknown clients.
const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
                          AppleWebKit/537.36 (KHTML, like Gecko) \
                          Chrome/131.0.0.0 Safari/537.36";

/// Response from a form submission.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    /// Original requested URL.
    pub url: String,
    /// Final URL after redirects.
    pub final_url: String,
    /// HTTP status code.
    pub status: u16,
    /// Response body as text.
    pub body: String,
}

impl HttpResponse {
    /// Whether the status code is in the 2xx range.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Something that can submit a url-encoded form and hand back the page body.
///
/// The pipeline talks to the calculator only through this trait, so tests
/// can substitute canned pages for the live site.
#[async_trait]
pub trait Transport: Send + Sync {
    /// POST `fields` to `url` and return the response body.
    async fn post_form(&self, url: &str, fields: &[(String, String)]) -> TaxOutcome<String>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for std::sync::Arc<T> {
    async fn post_form(&self, url: &str, fields: &[(String, String)]) -> TaxOutcome<String> {
        (**self).post_form(url, fields).await
    }
}

/// reqwest-backed [`Transport`].
#[derive(Clone)]
pub struct HttpClient {
    client: reqwest::Client,
}

impl HttpClient {
    /// Create a client with the transport's default timeout.
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::limited(5))
            .user_agent(USER_AGENT)
            .build()
            .unwrap_or_default();

        Self { client }
    }

    /// POST form data (url-encoded) and return the full response.
    pub async fn submit_form(
        &self,
        url: &str,
        form_fields: &[(String, String)],
    ) -> TaxOutcome<HttpResponse> {
        let r = self.client.post(url).form(form_fields).send().await?;
        let status = r.status().as_u16();
        let final_url = r.url().to_string();

        let body = r
            .text()
            .await
            .map_err(|e| TaxError::Body(format!("{url}: {e}")))?;

        Ok(HttpResponse {
            url: url.to_string(),
            final_url,
            status,
            body,
        })
    }
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for HttpClient {
    async fn post_form(&self, url: &str, fields: &[(String, String)]) -> TaxOutcome<String> {
        let resp = self.submit_form(url, fields).await?;
        if !resp.is_success() {
            // The body is still parsed; an error page surfaces as a count mismatch.
            tracing::warn!(
                "{} answered with status {} (final url {})",
                resp.url,
                resp.status,
                resp.final_url
            );
        }
        Ok(resp.body)
    }
}
