use std::time::Duration;

use futures::stream::{self, StreamExt};
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, HeaderMap, HeaderValue};
use tracing::{Instrument, debug, info, info_span, warn};

use crate::config::Config;
use crate::error::AppError;
use crate::pincode::{Pincode, Pincodes};

mod response;

pub use response::{FindByPinResponse, Session, SlotResponse};

/// Public host of the appointment availability API
pub const DEFAULT_BASE_URL: &str = "https://cdn-api.co-vin.in";

/// Client-side deadline for a single pincode lookup
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

const FIND_BY_PIN_PATH: &str = "/api/v2/appointment/sessions/public/findByPin";

/// A request that never produced a response.
#[derive(Debug)]
pub struct FailedRequest {
    pub pincode: Pincode,
    pub error: reqwest::Error,
}

/// What happened to the lookup for a single pincode.
#[derive(Debug)]
pub enum Outcome {
    /// The API answered, whatever the status code
    Response(SlotResponse),
    /// The request did not complete before the deadline
    Timeout(FailedRequest),
    /// Any other transport-level failure
    RequestFailure(FailedRequest),
}

impl Outcome {
    pub fn pincode(&self) -> &Pincode {
        match self {
            Outcome::Response(response) => &response.pincode,
            Outcome::Timeout(failed) | Outcome::RequestFailure(failed) => &failed.pincode,
        }
    }
}

/// Outcomes of a multi-pincode query, split by kind.
///
/// Each sequence keeps the order in which the pincodes were supplied.
#[derive(Debug, Default)]
pub struct SlotReport {
    pub responses: Vec<SlotResponse>,
    pub failures: Vec<FailedRequest>,
    pub timeouts: Vec<FailedRequest>,
}

impl SlotReport {
    pub fn push(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Response(response) => self.responses.push(response),
            Outcome::Timeout(failed) => self.timeouts.push(failed),
            Outcome::RequestFailure(failed) => self.failures.push(failed),
        }
    }

    /// Total number of outcomes across all three buckets.
    pub fn len(&self) -> usize {
        self.responses.len() + self.failures.len() + self.timeouts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Sum of slots over every response whose body decodes.
    pub fn total_slots(&self) -> usize {
        self.responses
            .iter()
            .filter_map(|response| response.slot_counts().ok())
            .flatten()
            .sum()
    }
}

impl FromIterator<Outcome> for SlotReport {
    fn from_iter<I: IntoIterator<Item = Outcome>>(iter: I) -> Self {
        let mut report = SlotReport::default();
        for outcome in iter {
            report.push(outcome);
        }
        report
    }
}

/// Queries the findByPin endpoint and classifies each pincode's outcome.
#[derive(Debug, Clone)]
pub struct SlotFinder {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
    concurrency: usize,
}

impl SlotFinder {
    /// Creates a finder for the given API host with the default timeout and
    /// sequential processing.
    pub fn new(base_url: impl Into<String>) -> Result<Self, AppError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("hi_IN"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout: DEFAULT_TIMEOUT,
            concurrency: 1,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, AppError> {
        Ok(Self::new(&config.base_url)?
            .with_timeout(config.timeout)
            .with_concurrency(config.concurrency))
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Maximum number of requests in flight. Outcomes are still reported in
    /// input order.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    fn url(&self, pincode: &Pincode, date: &str) -> String {
        format!(
            "{}{}?pincode={}&date={}",
            self.base_url, FIND_BY_PIN_PATH, pincode, date
        )
    }

    /// Looks up every pincode for `date`.
    ///
    /// Never fails: each pincode ends up in exactly one bucket of the
    /// returned report, and one pincode's failure does not stop the rest.
    pub async fn query(&self, date: &str, pincodes: impl Into<Pincodes>) -> SlotReport {
        let pincodes = pincodes.into();
        let span = info_span!("query", date, pincodes = pincodes.len());

        async {
            let report: SlotReport = stream::iter(pincodes)
                .map(|pincode| self.query_one(date, pincode))
                .buffered(self.concurrency)
                .collect::<Vec<Outcome>>()
                .await
                .into_iter()
                .collect();

            info!(
                responses = report.responses.len(),
                failures = report.failures.len(),
                timeouts = report.timeouts.len(),
                "Query finished"
            );
            report
        }
        .instrument(span)
        .await
    }

    /// Looks up a single pincode for `date`.
    pub async fn query_one(&self, date: &str, pincode: Pincode) -> Outcome {
        let url = self.url(&pincode, date);
        debug!("Fetching slots: {}", url);

        match self.fetch(&url).await {
            Ok((status, body)) => {
                debug!("Pincode {} answered with status {}", pincode, status);
                Outcome::Response(SlotResponse {
                    pincode,
                    status,
                    body,
                })
            }
            Err(error) if error.is_timeout() => {
                warn!("Request for pincode {} timed out: {}", pincode, error);
                Outcome::Timeout(FailedRequest { pincode, error })
            }
            Err(error) => {
                warn!("Request for pincode {} failed: {}", pincode, error);
                Outcome::RequestFailure(FailedRequest { pincode, error })
            }
        }
    }

    // The timeout covers the body read as well as the send.
    async fn fetch(&self, url: &str) -> Result<(u16, String), reqwest::Error> {
        let response = self.client.get(url).timeout(self.timeout).send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok((status, body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ok(pincode: u32, body: &str) -> Outcome {
        Outcome::Response(SlotResponse {
            pincode: Pincode::from(pincode),
            status: 200,
            body: body.to_string(),
        })
    }

    #[test]
    fn builds_find_by_pin_url() {
        let finder = SlotFinder::new("https://cdn-api.co-vin.in/").unwrap();
        assert_eq!(
            finder.url(&Pincode::from(560004), "30-07-2021"),
            "https://cdn-api.co-vin.in/api/v2/appointment/sessions/public/findByPin?pincode=560004&date=30-07-2021"
        );
    }

    #[test]
    fn concurrency_is_at_least_one() {
        let finder = SlotFinder::new(DEFAULT_BASE_URL).unwrap().with_concurrency(0);
        assert_eq!(finder.concurrency, 1);
    }

    #[test]
    fn report_keeps_input_order_and_totals_slots() {
        let report: SlotReport = vec![
            ok(530068, r#"{"sessions":[{"slots":["a"]}]}"#),
            ok(560004, "not json"),
            ok(560034, r#"{"sessions":[{"slots":["a","b"]},{"slots":[]}]}"#),
        ]
        .into_iter()
        .collect();

        let order: Vec<&str> = report.responses.iter().map(|r| r.pincode.as_str()).collect();
        assert_eq!(order, vec!["530068", "560004", "560034"]);
        assert_eq!(report.len(), 3);
        assert_eq!(report.total_slots(), 3);
    }

    #[test]
    fn empty_report() {
        let report = SlotReport::default();
        assert!(report.is_empty());
        assert_eq!(report.total_slots(), 0);
    }
}
