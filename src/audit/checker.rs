// src/audit/checker.rs
// =============================================================================
// This module checks if URLs are alive by making HTTP requests.
//
// Key functionality:
// - Makes exactly one GET request per unique URL (no retries)
// - Classifies every outcome into a category: "2xx", "4xx", Timeout, ...
// - Runs checks concurrently on a bounded pool of worker tasks
//
// How the pool works:
// 1. All unique URLs go into a shared queue
// 2. min(concurrency, number of URLs) workers are spawned
// 3. Each worker pops a URL, probes it, and sends the outcome to a channel
// 4. The caller collects outcomes until every worker has hung up
//
// Failures (timeouts, refused connections, bad URLs) are NOT errors here.
// They become outcomes like any other, so one dead host can never spoil
// the report for everything else.
//
// Rust concepts:
// - Traits: `Probe` lets tests swap the network out for a fake
// - Arc: Shared ownership of the probe and queue across tasks
// - mpsc channels: Workers publish results, one collector receives them
// =============================================================================

use futures::future::try_join_all;
use reqwest::Client;
use serde::{Serialize, Serializer};
use std::collections::VecDeque;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};
use url::Url;

use crate::error::Result;

/// Sent with every probe. Some hosts answer 403 to anything that does not
/// look like a browser.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/58.0.3029.110 Safari/537.36";

const MAX_REDIRECTS: usize = 10;

// The classification tag of a probe outcome
//
// Either an HTTP status class (Http(4) is "4xx") or one of the three
// terminal failure tags for probes that never got a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    /// HTTP status class: status code / 100
    Http(u16),
    /// The request did not complete within the per-request timeout
    Timeout,
    /// Refused connection, DNS failure, TLS failure, reset, ...
    ConnectionError,
    /// Rejected before or while building the request
    InvalidUrl,
}

impl Category {
    /// The tags that the "Other" filter token expands to
    pub const FAILURE_TAGS: [&'static str; 3] = ["Timeout", "ConnectionError", "InvalidURL"];

    pub fn from_status(status_code: u16) -> Self {
        Category::Http(status_code / 100)
    }

    /// True when the probe never produced an HTTP response
    pub fn is_failure(&self) -> bool {
        !matches!(self, Category::Http(_))
    }

    /// Client errors, server errors and failures all count as broken
    pub fn is_broken(&self) -> bool {
        self.is_failure() || matches!(self, Category::Http(class) if *class >= 4)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::Http(class) => write!(f, "{}xx", class),
            Category::Timeout => f.write_str("Timeout"),
            Category::ConnectionError => f.write_str("ConnectionError"),
            Category::InvalidUrl => f.write_str("InvalidURL"),
        }
    }
}

impl Serialize for Category {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

// The result of probing one unique URL
//
// Fields are private so the only way to build one is through the
// constructors below: a status code exists if and only if the category is
// an HTTP status class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckOutcome {
    url: String,
    status_code: Option<u16>,
    category: Category,
}

impl CheckOutcome {
    /// The server answered with `status_code`
    pub fn from_status(url: impl Into<String>, status_code: u16) -> Self {
        Self {
            url: url.into(),
            status_code: Some(status_code),
            category: Category::from_status(status_code),
        }
    }

    pub fn timeout(url: impl Into<String>) -> Self {
        Self::failed(url, Category::Timeout)
    }

    pub fn connection_error(url: impl Into<String>) -> Self {
        Self::failed(url, Category::ConnectionError)
    }

    pub fn invalid_url(url: impl Into<String>) -> Self {
        Self::failed(url, Category::InvalidUrl)
    }

    fn failed(url: impl Into<String>, category: Category) -> Self {
        Self {
            url: url.into(),
            status_code: None,
            category,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn status_code(&self) -> Option<u16> {
        self.status_code
    }

    pub fn category(&self) -> Category {
        self.category
    }
}

// Something that can check a single URL
//
// The production implementation is `HttpProbe`. Tests plug in fakes that
// count calls or measure concurrency instead of touching the network.
pub trait Probe: Send + Sync + 'static {
    fn probe(&self, url: &str) -> impl Future<Output = CheckOutcome> + Send;
}

// Probes URLs with real HTTP GET requests
//
// One client is shared by every worker (connection pooling). It carries
// the per-request timeout, the browser-like User-Agent and the redirect
// policy, so each probe is a plain `client.get(url).send()`.
#[derive(Debug, Clone)]
pub struct HttpProbe {
    client: Client,
}

impl HttpProbe {
    pub fn new(request_timeout: Duration, user_agent: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(request_timeout)
            .user_agent(user_agent)
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .build()?;

        Ok(Self { client })
    }
}

impl Probe for HttpProbe {
    fn probe(&self, url: &str) -> impl Future<Output = CheckOutcome> + Send {
        async move {
            // Reject anything that is not an absolute http(s) URL before
            // opening a socket
            let parsed = match Url::parse(url) {
                Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => parsed,
                _ => return CheckOutcome::invalid_url(url),
            };

            // Only the status line matters; the body is never read
            match self.client.get(parsed).send().await {
                Ok(response) => CheckOutcome::from_status(url, response.status().as_u16()),
                Err(e) => categorize_error(url, &e),
            }
        }
    }
}

// Maps a reqwest error onto one of the three failure categories
//
// The order matters: a timeout is also a "request" error, so it has to be
// checked first.
fn categorize_error(url: &str, error: &reqwest::Error) -> CheckOutcome {
    if error.is_timeout() {
        CheckOutcome::timeout(url)
    } else if error.is_connect() || error.is_request() {
        CheckOutcome::connection_error(url)
    } else {
        CheckOutcome::invalid_url(url)
    }
}

// Checks every URL exactly once on a bounded pool of workers
//
// Parameters:
//   probe: how to check one URL (shared by all workers)
//   urls: the unique URLs to check
//   concurrency: upper bound on probes in flight at the same time
//   cancel: once cancelled, workers stop claiming new URLs
//
// Returns one outcome per URL that was claimed, in completion order.
// Without cancellation that is every URL.
pub async fn check_all<P: Probe>(
    probe: Arc<P>,
    urls: &[String],
    concurrency: usize,
    cancel: &CancellationToken,
) -> Result<Vec<CheckOutcome>> {
    if urls.is_empty() {
        return Ok(Vec::new());
    }

    let worker_count = concurrency.max(1).min(urls.len());
    debug!(urls = urls.len(), workers = worker_count, "starting checker pool");

    let queue = Arc::new(Mutex::new(urls.iter().cloned().collect::<VecDeque<_>>()));

    // Capacity equals the number of URLs, so a send never waits on the collector
    let (tx, mut rx) = mpsc::channel::<CheckOutcome>(urls.len());

    let mut handles = Vec::with_capacity(worker_count);
    for worker_id in 0..worker_count {
        let probe = Arc::clone(&probe);
        let queue = Arc::clone(&queue);
        let tx = tx.clone();
        let cancel = cancel.clone();

        handles.push(tokio::spawn(async move {
            let mut checked = 0usize;

            loop {
                if cancel.is_cancelled() {
                    debug!(worker_id, "cancelled, leaving remaining URLs unclaimed");
                    break;
                }

                // The lock is released before the probe starts
                let next = queue.lock().await.pop_front();
                let Some(url) = next else {
                    break;
                };

                let outcome = probe.probe(&url).await;
                trace!(worker_id, url = %url, category = %outcome.category(), "checked");

                if tx.send(outcome).await.is_err() {
                    break;
                }
                checked += 1;
            }

            debug!(worker_id, checked, "checker worker finished");
        }));
    }

    // Only the workers hold senders now; the loop below ends when the last
    // one finishes
    drop(tx);

    let mut outcomes = Vec::with_capacity(urls.len());
    while let Some(outcome) = rx.recv().await {
        outcomes.push(outcome);
    }

    try_join_all(handles).await?;

    Ok(outcomes)
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why a queue + workers instead of spawning one task per URL?
//    - The worker count is the concurrency limit, no semaphore needed
//    - A worker only claims the next URL after its previous probe finished
//    - Cancellation is a simple check before each claim
//
// 2. Why tokio::sync::Mutex for the queue?
//    - The lock is taken inside async code
//    - It never panics on poisoning, so no unwrap() is needed
//
// 3. What does drop(tx) do?
//    - The channel closes when the LAST sender is dropped
//    - Each worker owns a clone; we drop ours so rx.recv() returns None
//      exactly when every worker is done
//
// 4. What is `impl Future<Output = ...> + Send` in a trait?
//    - It lets a trait method be async without extra crates
//    - The `+ Send` bound means the future can move between threads,
//      which tokio::spawn requires
// -----------------------------------------------------------------------------
