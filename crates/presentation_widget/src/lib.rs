//! Address autocomplete widget logic
//!
//! Headless implementation of the browser widget: per-field search-as-you-type
//! with debounce and last-write-wins ordering, the heuristics that pair a
//! field with its suggestion panel and hidden place-id input across host
//! form markups, and map update planning. Rendering is left to the host; the
//! widget exposes state it can draw.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use presentation_widget::{HttpAutocompleteBackend, Widget, WidgetConfig};
//!
//! let backend = HttpAutocompleteBackend::connect("http://localhost:3000", Default::default()).await?;
//! let config = WidgetConfig::from_session(backend.session());
//! let widget = Widget::new(Arc::new(backend), config);
//!
//! let field = widget.add_field("address");
//! field.input("10 Downing");
//! field.settled().await;
//! ```

#![forbid(unsafe_code)]

mod backend;
mod config;
mod error;
mod field;
pub mod map;
pub mod pairing;
mod widget;

pub use backend::{AutocompleteBackend, HttpAutocompleteBackend, SessionInfo};
pub use config::{WidgetConfig, WidgetStrings};
pub use error::WidgetError;
pub use field::{AutocompleteField, FieldState, PlaceSelected, SuggestionPanel};
pub use map::{MapLibrary, MapMode, MapPlan, MapSpec};
pub use pairing::{Document, Element, NodeId, Position, nearest};
pub use widget::Widget;
