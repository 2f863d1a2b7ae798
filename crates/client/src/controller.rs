//! Debounced, cancelable search scheduling
//!
//! A [`SearchController`] owns a single request slot. Starting a search
//! supersedes whatever occupies the slot: a superseded request is aborted and
//! its callback never runs, even if its response was already on the way.

use crate::client::{SolrClient, Transport};
use crate::config::ClientConfig;
use crate::error::ApiResult;
use crate::query::{QueryBuilder, SearchRequest};
use geosearch_core::config::SearchConfig;
use geosearch_documents::SearchResponse;
use geosearch_telemetry::{metrics, names, Timer};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error};

/// Delay between scheduling a search and dispatching it
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(50);

/// What currently occupies the slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotState {
    /// Nothing pending
    Idle,
    /// Waiting out the debounce delay
    Scheduled,
    /// Request sent, response not yet received
    InFlight,
}

/// How the most recent request left the slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The callback received the response
    Delivered,
    /// Superseded or cancelled before delivery
    Cancelled,
    /// The transport reported an error
    Failed,
}

/// A request that left the slot, as published by [`SearchController::subscribe`].
///
/// A cancellation is published under the generation it bumped the slot to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settled {
    pub generation: u64,
    pub outcome: Outcome,
    /// Transport error of a failed request
    pub error: Option<String>,
}

#[derive(Debug)]
struct Slot {
    generation: u64,
    state: SlotState,
    last_outcome: Option<Outcome>,
    handle: Option<JoinHandle<()>>,
    settled: watch::Sender<Option<Settled>>,
}

impl Slot {
    fn finish(&mut self, outcome: Outcome, error: Option<String>) {
        self.state = SlotState::Idle;
        self.last_outcome = Some(outcome);
        self.handle = None;
        self.settled.send_replace(Some(Settled {
            generation: self.generation,
            outcome,
            error,
        }));
    }

    /// Aborts the pending request, if any. Returns whether one was pending.
    fn cancel(&mut self) -> bool {
        if self.state == SlotState::Idle {
            return false;
        }
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
        self.generation += 1;
        self.finish(Outcome::Cancelled, None);
        metrics().increment(names::SEARCH_CANCELLED);
        true
    }
}

fn lock(slot: &Mutex<Slot>) -> MutexGuard<'_, Slot> {
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Schedules searches against a [`Transport`], at most one at a time.
///
/// Every call to [`SearchController::search`] bumps the slot generation. A
/// response is handed to its callback only if its generation is still current
/// when it arrives; the check and the transition to [`Outcome::Delivered`]
/// happen under the slot lock, the callback runs after the lock is released.
pub struct SearchController<T: Transport> {
    transport: Arc<T>,
    queries: Arc<QueryBuilder>,
    debounce: Duration,
    slot: Arc<Mutex<Slot>>,
}

impl SearchController<SolrClient> {
    /// Controller over a Solr client, using the client's query builder
    pub fn with_client(client: SolrClient, debounce: Duration) -> Self {
        let queries = client.queries().clone();
        Self::new(client, queries, debounce)
    }

    /// Controller over a Solr client for `config`, debounced by `search.debounce_ms`
    ///
    /// # Errors
    ///
    /// [`crate::ApiError::Config`] or [`crate::ApiError::InvalidUrl`] when
    /// `config` does not describe a usable index.
    pub fn from_config(config: ClientConfig, search: &SearchConfig) -> ApiResult<Self> {
        let client = SolrClient::with_config(config)?;
        Ok(Self::with_client(client, search.debounce()))
    }
}

impl<T: Transport> SearchController<T> {
    pub fn new(transport: T, queries: QueryBuilder, debounce: Duration) -> Self {
        let (settled, _) = watch::channel(None);
        Self {
            transport: Arc::new(transport),
            queries: Arc::new(queries),
            debounce,
            slot: Arc::new(Mutex::new(Slot {
                generation: 0,
                state: SlotState::Idle,
                last_outcome: None,
                handle: None,
                settled,
            })),
        }
    }

    /// Schedule a search, superseding any pending one.
    ///
    /// `on_result` receives the request generation and the response. It runs
    /// at most once, on a runtime worker, and only if no later search or
    /// [`SearchController::cancel`] intervened. Failures are logged and
    /// dropped. Returns the generation of the new request.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn search<F>(&self, request: &SearchRequest, on_result: F) -> u64
    where
        F: FnOnce(u64, SearchResponse) + Send + 'static,
    {
        let mut slot = lock(&self.slot);
        if slot.cancel() {
            debug!(generation = slot.generation, "Superseded pending search");
        }
        slot.generation += 1;
        slot.state = SlotState::Scheduled;
        let generation = slot.generation;

        let task = run(
            Arc::clone(&self.transport),
            Arc::clone(&self.queries),
            Arc::clone(&self.slot),
            request.clone(),
            self.debounce,
            generation,
            on_result,
        );
        slot.handle = Some(tokio::spawn(task));
        metrics().increment(names::SEARCH_SCHEDULED);
        debug!(
            generation,
            extent = %request.extent,
            mode = %request.mode,
            "Search scheduled"
        );
        generation
    }

    /// Abort the pending search, if any. No effect once a result was delivered.
    pub fn cancel(&self) {
        let mut slot = lock(&self.slot);
        if slot.cancel() {
            debug!(generation = slot.generation, "Search cancelled");
        }
    }

    pub fn state(&self) -> SlotState {
        lock(&self.slot).state
    }

    pub fn last_outcome(&self) -> Option<Outcome> {
        lock(&self.slot).last_outcome
    }

    /// Generation of the most recent search or cancellation
    pub fn generation(&self) -> u64 {
        lock(&self.slot).generation
    }

    /// Receiver of every request leaving the slot; starts at the latest one.
    pub fn subscribe(&self) -> watch::Receiver<Option<Settled>> {
        lock(&self.slot).settled.subscribe()
    }

    pub fn debounce(&self) -> Duration {
        self.debounce
    }

    pub fn queries(&self) -> &QueryBuilder {
        &self.queries
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }
}

impl<T: Transport> Drop for SearchController<T> {
    fn drop(&mut self) {
        if let Some(handle) = lock(&self.slot).handle.take() {
            handle.abort();
        }
    }
}

async fn run<T, F>(
    transport: Arc<T>,
    queries: Arc<QueryBuilder>,
    slot: Arc<Mutex<Slot>>,
    request: SearchRequest,
    debounce: Duration,
    generation: u64,
    on_result: F,
) where
    T: Transport,
    F: FnOnce(u64, SearchResponse) + Send + 'static,
{
    tokio::time::sleep(debounce).await;
    {
        let mut slot = lock(&slot);
        if slot.generation != generation {
            return;
        }
        slot.state = SlotState::InFlight;
    }

    let url = queries.search_url(&request);
    debug!(generation, url = %url, "Dispatching search");
    let timer = Timer::start(names::SEARCH_LATENCY_MS);
    let result = transport.fetch(&url).await;
    timer.stop();

    match result {
        Ok(response) => {
            {
                let mut slot = lock(&slot);
                if slot.generation != generation {
                    return;
                }
                slot.finish(Outcome::Delivered, None);
            }
            metrics().increment(names::SEARCH_DELIVERED);
            debug!(
                generation,
                docs = response.docs.len(),
                num_found = response.num_found,
                "Search delivered"
            );
            on_result(generation, response);
        }
        Err(e) => {
            {
                let mut slot = lock(&slot);
                if slot.generation != generation {
                    return;
                }
                slot.finish(Outcome::Failed, Some(e.to_string()));
            }
            metrics().increment(names::SEARCH_FAILED);
            error!(generation, error = %e, "Search request failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClientConfig;
    use crate::error::{ApiError, ApiResult};
    use crate::query::{SearchFilters, SpatialMode};
    use geosearch_geo::Extent;
    use tokio::sync::mpsc;

    struct FakeTransport {
        calls: Mutex<Vec<String>>,
        delay: Duration,
        fail: bool,
    }

    impl Transport for FakeTransport {
        async fn fetch(&self, url: &str) -> ApiResult<SearchResponse> {
            self.calls.lock().unwrap().push(url.to_string());
            tokio::time::sleep(self.delay).await;
            if self.fail {
                Err(ApiError::api_response(500, "index unavailable"))
            } else {
                Ok(SearchResponse {
                    docs: Vec::new(),
                    num_found: 7,
                })
            }
        }
    }

    fn controller(delay: Duration, fail: bool) -> SearchController<FakeTransport> {
        let transport = FakeTransport {
            calls: Mutex::new(Vec::new()),
            delay,
            fail,
        };
        SearchController::new(
            transport,
            QueryBuilder::new(&ClientConfig::default()).unwrap(),
            DEFAULT_DEBOUNCE,
        )
    }

    fn calls(controller: &SearchController<FakeTransport>) -> Vec<String> {
        controller.transport().calls.lock().unwrap().clone()
    }

    fn filters(url: &str) -> Vec<String> {
        reqwest::Url::parse(url)
            .unwrap()
            .query_pairs()
            .filter(|(key, _)| key == "fq")
            .map(|(_, value)| value.into_owned())
            .collect()
    }

    fn request(min_lon: f64, min_lat: f64) -> SearchRequest {
        SearchRequest::new(
            Extent::new(min_lon, min_lat, min_lon + 1.0, min_lat + 1.0),
            SpatialMode::Within,
            SearchFilters::default(),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_later_search_supersedes_scheduled_one() {
        let controller = controller(Duration::from_millis(10), false);
        let (tx, mut rx) = mpsc::unbounded_channel();

        let tx_a = tx.clone();
        let first = controller.search(&request(1.0, 2.0), move |g, r| {
            let _ = tx_a.send(("a", g, r.num_found));
        });
        let second = controller.search(&request(10.0, 20.0), move |g, r| {
            let _ = tx.send(("b", g, r.num_found));
        });
        assert!(second > first);

        assert_eq!(rx.recv().await, Some(("b", second, 7)));
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!(rx.try_recv().is_err());

        let calls = calls(&controller);
        assert_eq!(calls.len(), 1);
        assert!(filters(&calls[0]).iter().any(|fq| fq.contains("[[[10, 20],")));
        assert_eq!(controller.state(), SlotState::Idle);
        assert_eq!(controller.last_outcome(), Some(Outcome::Delivered));
    }

    #[tokio::test(start_paused = true)]
    async fn test_later_search_supersedes_in_flight_one() {
        let controller = controller(Duration::from_millis(100), false);
        let (tx, mut rx) = mpsc::unbounded_channel();

        let tx_a = tx.clone();
        controller.search(&request(1.0, 2.0), move |_, _| {
            let _ = tx_a.send("a");
        });
        tokio::time::sleep(Duration::from_millis(60)).await;
        assert_eq!(controller.state(), SlotState::InFlight);
        assert_eq!(calls(&controller).len(), 1);

        controller.search(&request(10.0, 20.0), move |_, _| {
            let _ = tx.send("b");
        });
        assert_eq!(controller.state(), SlotState::Scheduled);

        assert_eq!(rx.recv().await, Some("b"));
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!(rx.try_recv().is_err());
        assert_eq!(calls(&controller).len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_before_debounce() {
        let controller = controller(Duration::ZERO, false);
        let (tx, mut rx) = mpsc::unbounded_channel();

        let generation = controller.search(&request(1.0, 2.0), move |_, _| {
            let _ = tx.send(());
        });
        controller.cancel();
        tokio::time::sleep(Duration::from_secs(1)).await;

        assert!(rx.try_recv().is_err());
        assert!(calls(&controller).is_empty());
        assert_eq!(controller.state(), SlotState::Idle);
        assert_eq!(controller.last_outcome(), Some(Outcome::Cancelled));
        assert_eq!(controller.generation(), generation + 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_is_swallowed() {
        let controller = controller(Duration::from_millis(10), true);
        let (tx, mut rx) = mpsc::unbounded_channel();

        controller.search(&request(1.0, 2.0), move |_, _| {
            let _ = tx.send(());
        });
        tokio::time::sleep(Duration::from_secs(1)).await;

        assert!(rx.try_recv().is_err());
        assert_eq!(calls(&controller).len(), 1);
        assert_eq!(controller.state(), SlotState::Idle);
        assert_eq!(controller.last_outcome(), Some(Outcome::Failed));
    }

    #[tokio::test(start_paused = true)]
    async fn test_stalled_request_stays_in_flight() {
        let controller = controller(Duration::from_secs(3600), false);
        let (tx, mut rx) = mpsc::unbounded_channel();

        controller.search(&request(1.0, 2.0), move |_, _| {
            let _ = tx.send(());
        });
        let waited = tokio::time::timeout(Duration::from_secs(10), rx.recv()).await;

        assert!(waited.is_err());
        assert_eq!(controller.state(), SlotState::InFlight);
        assert_eq!(controller.last_outcome(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_after_delivery_has_no_effect() {
        let controller = controller(Duration::from_millis(10), false);
        let (tx, mut rx) = mpsc::unbounded_channel();

        controller.search(&request(1.0, 2.0), move |_, r| {
            let _ = tx.send(r.num_found);
        });
        assert_eq!(rx.recv().await, Some(7));

        let generation = controller.generation();
        controller.cancel();
        assert_eq!(controller.generation(), generation);
        assert_eq!(controller.last_outcome(), Some(Outcome::Delivered));
    }

    #[tokio::test(start_paused = true)]
    async fn test_search_counts_are_recorded() {
        let scheduled = metrics().counter(names::SEARCH_SCHEDULED);
        let controller = controller(Duration::ZERO, false);
        controller.search(&request(1.0, 2.0), |_, _| {});
        assert!(metrics().counter(names::SEARCH_SCHEDULED) > scheduled);
    }

    #[test]
    fn test_solr_controller_uses_client_queries() {
        let client = SolrClient::with_config(ClientConfig::default().with_index("kartenforum")).unwrap();
        let controller = SearchController::with_client(client, DEFAULT_DEBOUNCE);
        assert!(controller
            .queries()
            .search_url(&request(1.0, 2.0))
            .contains("/kartenforum/select?"));
        assert_eq!(controller.state(), SlotState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_configured_debounce_delays_dispatch() {
        let search = SearchConfig {
            debounce_ms: 400,
            ..SearchConfig::default()
        };
        let transport = FakeTransport {
            calls: Mutex::new(Vec::new()),
            delay: Duration::ZERO,
            fail: false,
        };
        let controller = SearchController::new(
            transport,
            QueryBuilder::new(&ClientConfig::default()).unwrap(),
            search.debounce(),
        );

        controller.search(&request(1.0, 2.0), |_, _| {});
        tokio::time::sleep(Duration::from_millis(300)).await;
        assert_eq!(controller.state(), SlotState::Scheduled);
        assert!(calls(&controller).is_empty());

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(calls(&controller).len(), 1);
        assert_eq!(controller.last_outcome(), Some(Outcome::Delivered));
    }

    #[test]
    fn test_from_config_uses_configured_debounce() {
        let search = SearchConfig {
            debounce_ms: 250,
            ..SearchConfig::default()
        };
        let config = ClientConfig::default().with_index("kartenforum");
        let controller = SearchController::from_config(config, &search).unwrap();
        assert_eq!(controller.debounce(), Duration::from_millis(250));
        assert!(controller
            .queries()
            .search_url(&request(1.0, 2.0))
            .contains("/kartenforum/select?"));

        let invalid = ClientConfig::default().with_endpoint("ftp://solr");
        assert!(SearchController::from_config(invalid, &search).is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_is_published() {
        let controller = controller(Duration::from_millis(10), true);
        let mut settled = controller.subscribe();

        let generation = controller.search(&request(1.0, 2.0), |_, _| {});
        settled.changed().await.unwrap();
        let last = settled.borrow_and_update().clone().unwrap();

        assert_eq!(last.generation, generation);
        assert_eq!(last.outcome, Outcome::Failed);
        assert!(last.error.unwrap().contains("index unavailable"));
    }
}
