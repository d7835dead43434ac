// src/audit/mod.rs
// =============================================================================
// The link-audit engine.
//
// One audit goes through these phases, in order:
//   Deduplicating -> Checking -> Aggregating -> Done
//
// - occurrence: collapses raw link occurrences into unique URLs
// - checker: probes every unique URL on a bounded worker pool
// - filter: decides which outcomes the user wants to see
// - report: counts categories and joins outcomes back to occurrences
//
// Only the Checking phase is concurrent. Every call builds its own table,
// its own HTTP client and its own workers, so two audits never interfere.
// =============================================================================

mod checker;
mod filter;
mod occurrence;
mod report;

pub use checker::Category;
pub use occurrence::LinkOccurrence;
pub use report::{AuditReport, DetailRow};

use checker::{check_all, HttpProbe, Probe, BROWSER_USER_AGENT};
use filter::StatusFilter;
use occurrence::{deduplicate, OccurrenceTable};
use report::aggregate;

use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::Result;

pub const DEFAULT_CONCURRENCY: usize = 10;
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(7);

// Knobs for a single audit
//
// Everything the workers need travels in this value; there is no global
// thread limit, so concurrent audits can use different settings.
#[derive(Debug, Clone)]
pub struct AuditOptions {
    /// Upper bound on probes in flight at once
    pub concurrency: usize,
    /// Per-request timeout, covering connect, redirects and headers
    pub request_timeout: Duration,
    /// Status codes, category tags, "Other" or "*"
    pub requested_categories: Vec<String>,
    /// User-Agent header sent with every probe
    pub user_agent: String,
    /// Optional wall-clock budget for the whole check phase
    pub deadline: Option<Duration>,
}

impl Default for AuditOptions {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            requested_categories: Vec::new(),
            user_agent: BROWSER_USER_AGENT.to_string(),
            deadline: None,
        }
    }
}

impl AuditOptions {
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_requested_categories<I, S>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.requested_categories = categories.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_deadline(mut self, deadline: Option<Duration>) -> Self {
        self.deadline = deadline;
        self
    }
}

// Audits the given link occurrences over real HTTP
//
// Blocks (asynchronously) until every unique URL has an outcome, or until
// `cancel` fires. A cancelled audit still returns a report: it covers the
// URLs that were probed and has `cancelled` set.
//
// The only errors are batch-fatal ones: the HTTP client could not be built,
// or a worker task died.
pub async fn audit_links(
    occurrences: Vec<LinkOccurrence>,
    options: &AuditOptions,
    cancel: CancellationToken,
) -> Result<AuditReport> {
    let table = deduplicate(occurrences);
    if table.unique_urls().is_empty() {
        debug!("no probeable URLs, skipping network checks");
        return Ok(AuditReport::empty());
    }

    let probe = HttpProbe::new(options.request_timeout, &options.user_agent)?;
    audit_table(table, Arc::new(probe), options, cancel).await
}

// Runs the Checking and Aggregating phases with any probe
//
// Split out from `audit_links` so tests can drive the whole pipeline with
// a fake probe.
async fn audit_table<P: Probe>(
    table: OccurrenceTable,
    probe: Arc<P>,
    options: &AuditOptions,
    cancel: CancellationToken,
) -> Result<AuditReport> {
    let unique = table.unique_urls().len();
    info!(
        occurrences = table.occurrences().len(),
        unique,
        concurrency = options.concurrency,
        "checking links"
    );

    // A child token lets the deadline stop this audit without cancelling
    // the caller's token
    let cancel = cancel.child_token();
    let deadline_guard = options.deadline.map(|deadline| {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(deadline).await;
            warn!(?deadline, "audit deadline reached, abandoning unclaimed links");
            cancel.cancel();
        })
    });

    let outcomes = check_all(probe, table.unique_urls(), options.concurrency, &cancel).await;

    if let Some(guard) = deadline_guard {
        guard.abort();
    }
    let outcomes = outcomes?;

    let cancelled = outcomes.len() < unique;
    if cancelled {
        warn!(checked = outcomes.len(), unique, "audit cancelled before all links were checked");
    }

    for outcome in outcomes.iter().filter(|o| o.category().is_broken()) {
        debug!(
            url = outcome.url(),
            category = %outcome.category(),
            references = table.occurrences_of(outcome.url()).count(),
            "broken link"
        );
    }

    debug!("aggregating results");
    let filter = StatusFilter::new(&options.requested_categories);
    let report = aggregate(outcomes, &table, &filter, cancelled);

    info!(
        checked = report.total_checked,
        broken = report.broken_count(),
        rows = report.details.len(),
        "audit finished"
    );

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::checker::CheckOutcome;
    use super::*;
    use std::collections::HashMap;
    use std::future::Future;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    // Fake probe with canned answers; counts every call
    #[derive(Default)]
    struct ScriptedProbe {
        answers: HashMap<String, CheckOutcome>,
        calls: Mutex<HashMap<String, usize>>,
        total: AtomicUsize,
    }

    impl ScriptedProbe {
        fn with(mut self, outcome: CheckOutcome) -> Self {
            self.answers.insert(outcome.url().to_string(), outcome);
            self
        }
    }

    impl Probe for ScriptedProbe {
        fn probe(&self, url: &str) -> impl Future<Output = CheckOutcome> + Send {
            let url = url.to_string();
            async move {
                self.total.fetch_add(1, Ordering::SeqCst);
                *self.calls.lock().unwrap().entry(url.clone()).or_insert(0) += 1;
                self.answers
                    .get(&url)
                    .cloned()
                    .unwrap_or_else(|| CheckOutcome::from_status(url, 200))
            }
        }
    }

    // Fake probe that is slower than the test deadline
    struct HangingProbe;

    impl Probe for HangingProbe {
        fn probe(&self, url: &str) -> impl Future<Output = CheckOutcome> + Send {
            let url = url.to_string();
            async move {
                tokio::time::sleep(Duration::from_millis(300)).await;
                CheckOutcome::timeout(url)
            }
        }
    }

    const A: &str = "https://a.example";
    const B: &str = "https://b.example";

    fn scenario() -> Vec<LinkOccurrence> {
        vec![
            LinkOccurrence::new(A, "doc1", "x"),
            LinkOccurrence::new(B, "doc1", "y"),
            LinkOccurrence::new(A, "doc2", "z"),
        ]
    }

    fn scenario_probe() -> Arc<ScriptedProbe> {
        Arc::new(
            ScriptedProbe::default()
                .with(CheckOutcome::from_status(A, 200))
                .with(CheckOutcome::timeout(B)),
        )
    }

    #[tokio::test]
    async fn test_scenario_with_wildcard() {
        let options = AuditOptions::default().with_requested_categories(["*"]);
        let report = audit_table(deduplicate(scenario()), scenario_probe(), &options, CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(report.total_checked, 2);
        assert_eq!(report.status_counts.get("2xx"), Some(&1));
        assert_eq!(report.status_counts.get("Timeout"), Some(&1));
        assert_eq!(report.details.len(), 3);
        assert_eq!(report.details.iter().filter(|r| r.link == A).count(), 2);
        assert!(!report.cancelled);
    }

    #[tokio::test]
    async fn test_scenario_filtered_to_client_errors() {
        let options = AuditOptions::default().with_requested_categories(["4xx"]);
        let report = audit_table(deduplicate(scenario()), scenario_probe(), &options, CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(report.total_checked, 2);
        assert_eq!(report.status_counts.len(), 2);
        assert!(report.details.is_empty());
    }

    #[tokio::test]
    async fn test_each_url_probed_once() {
        let probe = Arc::new(ScriptedProbe::default());
        let occurrences: Vec<_> = (0..7)
            .map(|i| LinkOccurrence::new(A, format!("doc{}", i), "home"))
            .chain([LinkOccurrence::new(B, "doc0", "other")])
            .collect();

        let options = AuditOptions::default().with_requested_categories(["*"]);
        let report = audit_table(deduplicate(occurrences), Arc::clone(&probe), &options, CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(probe.total.load(Ordering::SeqCst), 2);
        assert!(probe.calls.lock().unwrap().values().all(|&n| n == 1));
        assert_eq!(report.details.iter().filter(|r| r.link == A).count(), 7);
    }

    #[tokio::test]
    async fn test_empty_input_short_circuits() {
        let probe = Arc::new(ScriptedProbe::default());
        let report = audit_table(deduplicate(Vec::new()), Arc::clone(&probe), &AuditOptions::default(), CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(report, AuditReport::empty());
        assert_eq!(probe.total.load(Ordering::SeqCst), 0);

        let report = audit_links(
            vec![LinkOccurrence::new("", "doc1", "empty")],
            &AuditOptions::default(),
            CancellationToken::new(),
        )
        .await
        .unwrap();
        assert_eq!(report.total_checked, 0);
        assert!(report.status_counts.is_empty());
        assert!(report.details.is_empty());
    }

    #[tokio::test]
    async fn test_deadline_cancels_remaining_work() {
        let occurrences: Vec<_> = (0..5)
            .map(|i| LinkOccurrence::new(format!("https://site{}.example", i), "doc", "x"))
            .collect();
        let options = AuditOptions::default()
            .with_concurrency(1)
            .with_requested_categories(["*"])
            .with_deadline(Some(Duration::from_millis(100)));

        let report = audit_table(deduplicate(occurrences), Arc::new(HangingProbe), &options, CancellationToken::new())
            .await
            .unwrap();

        // The first probe was in flight when the deadline hit and finished
        assert!(report.cancelled);
        assert_eq!(report.total_checked, 1);
        assert_eq!(report.status_counts.values().sum::<usize>(), 1);
    }

    #[tokio::test]
    async fn test_audit_over_http() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/ok"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/gone"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&server)
            .await;

        let ok = format!("{}/ok", server.uri());
        let gone = format!("{}/gone", server.uri());
        let occurrences = vec![
            LinkOccurrence::new(&ok, "README.md", "home"),
            LinkOccurrence::new(&gone, "README.md", "old page"),
            LinkOccurrence::new(&gone, "docs/guide.md", "[Image]"),
            LinkOccurrence::new("mailto:someone@example.com", "README.md", "mail"),
        ];

        let options = AuditOptions::default().with_requested_categories(["404", "Other"]);
        let report = audit_links(occurrences, &options, CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(report.total_checked, 3);
        assert_eq!(report.status_counts.get("2xx"), Some(&1));
        assert_eq!(report.status_counts.get("4xx"), Some(&1));
        assert_eq!(report.status_counts.get("InvalidURL"), Some(&1));

        let rows: Vec<_> = report
            .details
            .iter()
            .map(|r| (r.document.as_str(), r.status_code))
            .collect();
        assert_eq!(
            rows,
            vec![
                ("README.md", Some(404)),
                ("docs/guide.md", Some(404)),
                ("README.md", None),
            ]
        );
        // wiremock verifies the `expect(1)` calls when the server drops
    }
}
