//! Autocomplete input field
//!
//! State machine per field:
//!
//! ```text
//! Idle ──input ≥ min──▶ Debouncing ──delay──▶ Searching ──response──▶ ShowingSuggestions
//!  ▲                                                                        │
//!  └──────────── select / click outside / input < min ─────────────────────┘
//! ```
//!
//! Every input bumps a generation counter. A debounce timer or search
//! response belonging to an older generation is dropped, so the suggestions
//! shown always belong to the latest query.

use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

use domain::{PlaceDetails, SearchResult};
use parking_lot::Mutex;
use tokio::{sync::broadcast, task::JoinHandle};
use tracing::{debug, warn};

use crate::{backend::AutocompleteBackend, config::WidgetConfig, error::WidgetError};

/// Where the field is in its search cycle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FieldState {
    #[default]
    Idle,
    Debouncing,
    Searching,
    ShowingSuggestions,
}

/// Content of the suggestion panel
#[derive(Debug, Clone, Default, PartialEq)]
pub enum SuggestionPanel {
    #[default]
    Hidden,
    Loading(String),
    Results(Vec<SearchResult>),
    NoResults(String),
    Error(String),
}

impl SuggestionPanel {
    /// Whether the panel is shown
    pub const fn is_visible(&self) -> bool {
        !matches!(self, Self::Hidden)
    }
}

/// Notification sent when a selection's details have arrived
#[derive(Debug, Clone, PartialEq)]
pub struct PlaceSelected {
    /// Name of the field the place was selected in
    pub field: String,
    pub details: PlaceDetails,
}

#[derive(Debug, Default)]
struct FieldView {
    value: String,
    place_id: String,
    state: FieldState,
    panel: SuggestionPanel,
    details: Option<PlaceDetails>,
}

struct Inner {
    name: String,
    backend: Arc<dyn AutocompleteBackend>,
    config: WidgetConfig,
    generation: AtomicU64,
    view: Mutex<FieldView>,
    pending: Mutex<Option<JoinHandle<()>>>,
    events: broadcast::Sender<PlaceSelected>,
}

/// One address input with its suggestion panel and hidden place-id value
#[derive(Clone)]
pub struct AutocompleteField {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for AutocompleteField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AutocompleteField")
            .field("name", &self.inner.name)
            .field("view", &*self.inner.view.lock())
            .finish_non_exhaustive()
    }
}

impl AutocompleteField {
    /// Create a field publishing selections on `events`
    pub fn new(
        name: impl Into<String>,
        backend: Arc<dyn AutocompleteBackend>,
        config: WidgetConfig,
        events: broadcast::Sender<PlaceSelected>,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                name: name.into(),
                backend,
                config,
                generation: AtomicU64::new(0),
                view: Mutex::new(FieldView::default()),
                pending: Mutex::new(None),
                events,
            }),
        }
    }

    /// Field name (the input's `name` attribute)
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Receive selection notifications
    pub fn subscribe(&self) -> broadcast::Receiver<PlaceSelected> {
        self.inner.events.subscribe()
    }

    /// Current text of the input
    pub fn value(&self) -> String {
        self.inner.view.lock().value.clone()
    }

    /// Value of the paired hidden place-id input
    pub fn place_id(&self) -> String {
        self.inner.view.lock().place_id.clone()
    }

    pub fn state(&self) -> FieldState {
        self.inner.view.lock().state
    }

    pub fn panel(&self) -> SuggestionPanel {
        self.inner.view.lock().panel.clone()
    }

    /// Details of the last completed selection
    pub fn details(&self) -> Option<PlaceDetails> {
        self.inner.view.lock().details.clone()
    }

    /// Handle an input event carrying the field's full value
    ///
    /// Must be called within a Tokio runtime.
    pub fn input(&self, value: &str) {
        let query = value.trim().to_string();
        let generation = self.inner.generation.fetch_add(1, Ordering::SeqCst) + 1;

        {
            let mut view = self.inner.view.lock();
            view.value = value.to_string();

            if query.chars().count() < self.inner.config.min_query_length {
                view.state = FieldState::Idle;
                view.panel = SuggestionPanel::Hidden;
                return;
            }

            view.state = FieldState::Debouncing;
            view.panel = SuggestionPanel::Loading(self.inner.config.strings.searching.clone());
        }

        let field = self.clone();
        let handle = tokio::spawn(async move { field.debounced_search(generation, query).await });
        *self.inner.pending.lock() = Some(handle);
    }

    /// Wait for the most recently scheduled search to finish
    pub async fn settled(&self) {
        let handle = self.inner.pending.lock().take();
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                warn!(field = %self.inner.name, error = %e, "Search task failed");
            }
        }
    }

    /// Handle a click anywhere on the page
    pub fn document_click(&self, inside_field_or_panel: bool) {
        if inside_field_or_panel {
            return;
        }
        let mut view = self.inner.view.lock();
        view.panel = SuggestionPanel::Hidden;
        view.state = FieldState::Idle;
    }

    /// Select the suggestion at `index` and fetch its details
    ///
    /// Writes the description into the input and the place id into the
    /// paired hidden value, hides the panel, then fetches details once. On
    /// success the details are stored and a [`PlaceSelected`] is published.
    pub async fn select(&self, index: usize) -> Result<PlaceDetails, WidgetError> {
        let suggestion = {
            let mut view = self.inner.view.lock();
            let suggestion = match &view.panel {
                SuggestionPanel::Results(results) => results.get(index).cloned(),
                _ => None,
            }
            .ok_or(WidgetError::NoSuchSuggestion(index))?;

            // Responses still in flight must not reopen the panel
            self.inner.generation.fetch_add(1, Ordering::SeqCst);

            view.value.clone_from(&suggestion.description);
            view.place_id.clone_from(&suggestion.place_id);
            view.panel = SuggestionPanel::Hidden;
            view.state = FieldState::Idle;
            view.details = None;
            suggestion
        };

        let details = self
            .inner
            .backend
            .place_details(&suggestion.place_id)
            .await
            .inspect_err(|e| {
                warn!(field = %self.inner.name, place_id = %suggestion.place_id, error = %e, "Place details failed");
            })?;

        {
            let mut view = self.inner.view.lock();
            if view.place_id != suggestion.place_id {
                debug!(field = %self.inner.name, "Selection changed while loading details");
                return Ok(details);
            }
            view.details = Some(details.clone());
        }

        // No subscribers is fine
        let _ = self.inner.events.send(PlaceSelected {
            field: self.inner.name.clone(),
            details: details.clone(),
        });

        Ok(details)
    }

    fn is_current(&self, generation: u64) -> bool {
        self.inner.generation.load(Ordering::SeqCst) == generation
    }

    async fn debounced_search(&self, generation: u64, query: String) {
        tokio::time::sleep(self.inner.config.search_delay).await;

        {
            let mut view = self.inner.view.lock();
            if !self.is_current(generation) {
                return;
            }
            view.state = FieldState::Searching;
        }

        debug!(field = %self.inner.name, query = %query, "Searching");
        let result = self.inner.backend.search(&query).await;

        let mut view = self.inner.view.lock();
        if !self.is_current(generation) {
            debug!(field = %self.inner.name, query = %query, "Discarding stale search response");
            return;
        }

        let strings = &self.inner.config.strings;
        view.panel = match result {
            Ok(results) if results.is_empty() => SuggestionPanel::NoResults(strings.no_results.clone()),
            Ok(results) => SuggestionPanel::Results(results),
            Err(e) => {
                warn!(field = %self.inner.name, error = %e, "Search failed");
                SuggestionPanel::Error(e.panel_message(&strings.error))
            },
        };
        view.state = FieldState::ShowingSuggestions;
    }
}
