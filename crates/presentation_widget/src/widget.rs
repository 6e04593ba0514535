//! Page-level widget
//!
//! Owns every autocomplete field on the page and the maps that follow them.
//! Fields publish selections on a shared channel; map plans are recomputed
//! from the details each field stored.

use std::{collections::BTreeMap, sync::Arc};

use domain::PlaceDetails;
use parking_lot::RwLock;
use tokio::{sync::broadcast, task::JoinHandle};
use tracing::{debug, info};

use crate::{
    backend::AutocompleteBackend,
    config::WidgetConfig,
    field::{AutocompleteField, PlaceSelected},
    map::{MapLibrary, MapPlan, MapSpec},
};

const EVENT_CAPACITY: usize = 64;

/// The autocomplete widget for one page
pub struct Widget {
    backend: Arc<dyn AutocompleteBackend>,
    config: WidgetConfig,
    events: broadcast::Sender<PlaceSelected>,
    fields: RwLock<BTreeMap<String, AutocompleteField>>,
    maps: RwLock<Vec<MapSpec>>,
}

impl std::fmt::Debug for Widget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Widget")
            .field("config", &self.config)
            .field("fields", &self.fields.read().keys().collect::<Vec<_>>())
            .field("maps", &self.maps.read().len())
            .finish_non_exhaustive()
    }
}

impl Widget {
    pub fn new(backend: Arc<dyn AutocompleteBackend>, config: WidgetConfig) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            backend,
            config,
            events,
            fields: RwLock::new(BTreeMap::new()),
            maps: RwLock::new(Vec::new()),
        }
    }

    pub const fn config(&self) -> &WidgetConfig {
        &self.config
    }

    /// Attach autocomplete to the input named `name`
    ///
    /// Adding the same name twice returns the existing field.
    pub fn add_field(&self, name: &str) -> AutocompleteField {
        self.fields
            .write()
            .entry(name.to_string())
            .or_insert_with(|| {
                debug!(field = %name, "Attaching autocomplete");
                AutocompleteField::new(
                    name,
                    Arc::clone(&self.backend),
                    self.config.clone(),
                    self.events.clone(),
                )
            })
            .clone()
    }

    pub fn field(&self, name: &str) -> Option<AutocompleteField> {
        self.fields.read().get(name).cloned()
    }

    /// Register a map container
    pub fn add_map(&self, spec: MapSpec) {
        self.maps.write().push(spec);
    }

    /// Receive selections from every field
    pub fn subscribe(&self) -> broadcast::Receiver<PlaceSelected> {
        self.events.subscribe()
    }

    /// Map library to load, `None` when maps stay uninitialised
    pub fn map_library(&self) -> Option<MapLibrary> {
        MapLibrary::for_provider(&self.config.provider, &self.config.map_script_url)
    }

    fn stored_details(&self, name: &str) -> Option<PlaceDetails> {
        self.fields.read().get(name).and_then(AutocompleteField::details)
    }

    /// Current plan for every registered map, in registration order
    ///
    /// Empty when no map library is available.
    pub fn plan_maps(&self) -> Vec<Option<MapPlan>> {
        if self.map_library().is_none() {
            return Vec::new();
        }
        self.maps
            .read()
            .iter()
            .map(|spec| spec.plan(|name| self.stored_details(name)))
            .collect()
    }

    /// Recompute map plans after every selection and hand them to `redraw`
    ///
    /// The task stops once the widget is dropped and its fields go quiet.
    pub fn spawn_map_updates<F>(self: &Arc<Self>, redraw: F) -> JoinHandle<()>
    where
        F: Fn(usize, MapPlan) + Send + Sync + 'static,
    {
        let mut rx = self.subscribe();
        let widget = Arc::downgrade(self);

        tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(event) => {
                        let Some(widget) = widget.upgrade() else {
                            break;
                        };
                        debug!(field = %event.field, "Updating maps");
                        for (index, plan) in widget.plan_maps().into_iter().enumerate() {
                            if let Some(plan) = plan {
                                redraw(index, plan);
                            }
                        }
                    },
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        debug!(skipped, "Map updates lagged");
                    },
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
            info!("Map update task stopped");
        })
    }
}
