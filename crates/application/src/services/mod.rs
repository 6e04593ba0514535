//! Application services

mod autocomplete_service;
mod input_sanitizer;

pub use autocomplete_service::{AutocompleteService, clear_cache_message};
pub use input_sanitizer::sanitize_text_field;
