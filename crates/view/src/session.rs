//! Async driver tying the view state to the search controller.

use crate::state::{Effect, Event, ViewState};
use geosearch_client::{
    ApiResult, ClientConfig, Outcome, SearchController, Settled, SolrClient, Transport,
};
use geosearch_core::config::ConfigSchema;
use geosearch_core::Error as CoreError;
use geosearch_telemetry::Event as TelemetryEvent;
use serde_json::json;
use tokio::sync::mpsc;
use tracing::debug;

/// A delivered response, tagged with the request it answers
struct Delivery {
    generation: u64,
    event: Event,
}

/// Runs [`ViewState`] transitions and carries out their searches.
///
/// Every [`Effect::Search`] is handed to the controller; delivered responses
/// come back through a channel and are applied by
/// [`SearchSession::next_delivery`] or [`SearchSession::settle`], unless a
/// later search has been scheduled in the meantime.
pub struct SearchSession<T: Transport> {
    state: ViewState,
    controller: SearchController<T>,
    delivered_tx: mpsc::UnboundedSender<Delivery>,
    delivered_rx: mpsc::UnboundedReceiver<Delivery>,
    applied: Option<u64>,
}

impl SearchSession<SolrClient> {
    /// Session over the configured index, starting from the configured view.
    ///
    /// # Errors
    ///
    /// Fails for an unknown `search.spatial_mode` or an unusable `client`
    /// configuration.
    pub fn from_config_schema(schema: &ConfigSchema, client: ClientConfig) -> ApiResult<Self> {
        let state = ViewState::from_config_schema(schema)?;
        let controller = SearchController::from_config(client, &schema.search)?;
        Ok(Self::new(state, controller))
    }
}

impl<T: Transport> SearchSession<T> {
    pub fn new(state: ViewState, controller: SearchController<T>) -> Self {
        let (delivered_tx, delivered_rx) = mpsc::unbounded_channel();
        Self {
            state,
            controller,
            delivered_tx,
            delivered_rx,
            applied: None,
        }
    }

    /// Applies `event` and schedules any search it asks for.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn dispatch(&mut self, event: Event) -> Vec<Effect> {
        let effects = self.state.update(event);
        for effect in &effects {
            match effect {
                Effect::Search(request) => {
                    let tx = self.delivered_tx.clone();
                    let extent = request.extent;
                    self.controller.search(request, move |generation, response| {
                        let event = Event::SearchCompleted { extent, response };
                        let _ = tx.send(Delivery { generation, event });
                    });
                }
                Effect::ResultsReplaced {
                    shown,
                    total,
                    truncated,
                } => {
                    TelemetryEvent::new(
                        "results_replaced",
                        json!({ "shown": shown, "total": total, "truncated": truncated }),
                    )
                    .log();
                }
                _ => {}
            }
        }
        effects
    }

    /// Waits for the next delivery of the current search and applies it.
    ///
    /// Deliveries of superseded searches are discarded. Pending forever
    /// while a request stalls or after it failed; the previous results stay
    /// in place meanwhile.
    pub async fn next_delivery(&mut self) -> Vec<Effect> {
        while let Some(delivery) = self.delivered_rx.recv().await {
            if let Some(effects) = self.apply(delivery) {
                return effects;
            }
        }
        Vec::new()
    }

    /// Waits until the current search leaves the slot.
    ///
    /// Returns the effects of applying its results, or nothing when they were
    /// applied already or no search was ever scheduled.
    ///
    /// # Errors
    ///
    /// [`geosearch_core::ErrorCode::IndexError`] when the search failed or
    /// was cancelled.
    pub async fn settle(&mut self) -> geosearch_core::Result<Vec<Effect>> {
        let mut settled = self.controller.subscribe();
        loop {
            let current = self.controller.generation();
            if current == 0 || self.applied == Some(current) {
                return Ok(Vec::new());
            }
            let latest = settled.borrow_and_update().clone();
            if let Some(last) = latest.filter(|last| last.generation == current) {
                check_settled(last)?;
            }

            tokio::select! {
                delivery = self.delivered_rx.recv() => match delivery {
                    Some(delivery) => {
                        if let Some(effects) = self.apply(delivery) {
                            return Ok(effects);
                        }
                    }
                    None => return Ok(Vec::new()),
                },
                changed = settled.changed() => {
                    if changed.is_err() {
                        return Ok(Vec::new());
                    }
                }
            }
        }
    }

    /// Applies a delivery of the current search, `None` for a stale one.
    fn apply(&mut self, delivery: Delivery) -> Option<Vec<Effect>> {
        let current = self.controller.generation();
        if delivery.generation != current {
            debug!(
                generation = delivery.generation,
                current, "Discarded delivery of a superseded search"
            );
            return None;
        }
        self.applied = Some(delivery.generation);
        Some(self.dispatch(delivery.event))
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn controller(&self) -> &SearchController<T> {
        &self.controller
    }
}

fn check_settled(settled: Settled) -> geosearch_core::Result<()> {
    match settled.outcome {
        Outcome::Delivered => Ok(()),
        Outcome::Failed => Err(CoreError::index(format!(
            "Search failed: {}",
            settled.error.unwrap_or_default()
        ))
        .with_suggestion("Check GEOSEARCH_SOLR_ENDPOINT or the [index] section of the config file")),
        Outcome::Cancelled => Err(CoreError::index("Search was cancelled")),
    }
}
