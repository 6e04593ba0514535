//! Request and formatting pipeline shared by all providers
//!
//! Providers differ only in URLs, parameters and field mapping. The
//! outbound call, the error classification and the two extension points
//! live here.

use std::{fmt, sync::Arc, time::Duration};

use domain::{GeocodingError, SearchResult};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::GeocodingConfig;

/// Query parameters of one outbound request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestParams(Vec<(String, String)>);

impl RequestParams {
    /// Create an empty parameter list
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Append a parameter
    #[must_use]
    pub fn with(mut self, name: &str, value: impl Into<String>) -> Self {
        self.0.push((name.to_string(), value.into()));
        self
    }

    /// Set a parameter, replacing every existing value for the name
    pub fn set(&mut self, name: &str, value: impl Into<String>) {
        self.remove(name);
        self.0.push((name.to_string(), value.into()));
    }

    /// First value for the name
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Remove every value for the name
    pub fn remove(&mut self, name: &str) {
        self.0.retain(|(k, _)| k != name);
    }

    /// Parameters in insertion order
    pub fn as_pairs(&self) -> &[(String, String)] {
        &self.0
    }
}

/// Called before every outbound request with the provider id and URL; may
/// rewrite the query parameters
pub type PreRequestHook = Arc<dyn Fn(&str, &str, &mut RequestParams) + Send + Sync>;

/// Called on every normalised search result list with the provider id
pub type ResultsHook = Arc<dyn Fn(&str, Vec<SearchResult>) -> Vec<SearchResult> + Send + Sync>;

/// Extension points passed explicitly into each provider
#[derive(Clone, Default)]
pub struct ProviderHooks {
    pre_request: Option<PreRequestHook>,
    transform_results: Option<ResultsHook>,
}

impl fmt::Debug for ProviderHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderHooks")
            .field("pre_request", &self.pre_request.is_some())
            .field("transform_results", &self.transform_results.is_some())
            .finish()
    }
}

impl ProviderHooks {
    /// No hooks
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// Install the pre-request hook
    #[must_use]
    pub fn with_pre_request<F>(mut self, hook: F) -> Self
    where
        F: Fn(&str, &str, &mut RequestParams) + Send + Sync + 'static,
    {
        self.pre_request = Some(Arc::new(hook));
        self
    }

    /// Install the result transform hook
    #[must_use]
    pub fn with_transform_results<F>(mut self, hook: F) -> Self
    where
        F: Fn(&str, Vec<SearchResult>) -> Vec<SearchResult> + Send + Sync + 'static,
    {
        self.transform_results = Some(Arc::new(hook));
        self
    }
}

/// Outbound HTTP call plus result formatting for one provider
#[derive(Debug, Clone)]
pub(crate) struct HttpPipeline {
    client: Client,
    provider_id: &'static str,
    hooks: ProviderHooks,
    timeout_secs: u64,
}

impl HttpPipeline {
    pub(crate) fn new(
        provider_id: &'static str,
        config: &GeocodingConfig,
        hooks: ProviderHooks,
    ) -> Result<Self, GeocodingError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| GeocodingError::NetworkError(e.to_string()))?;

        Ok(Self {
            client,
            provider_id,
            hooks,
            timeout_secs: config.timeout_secs,
        })
    }

    /// Issue one GET and parse the body as JSON
    ///
    /// Transport failures map to `NetworkError`, non-2xx statuses to
    /// `ApiError` carrying the upstream message when there is one, and
    /// bodies that are not JSON to `InvalidResponse`.
    pub(crate) async fn get_json(
        &self,
        url: &str,
        mut params: RequestParams,
    ) -> Result<Value, GeocodingError> {
        if let Some(hook) = &self.hooks.pre_request {
            hook(self.provider_id, url, &mut params);
        }

        debug!(provider = self.provider_id, url = %url, "Sending geocoding request");

        let response = self
            .client
            .get(url)
            .query(params.as_pairs())
            .send()
            .await
            .map_err(|e| {
                let err = if e.is_timeout() {
                    GeocodingError::NetworkError(format!(
                        "request timed out after {}s",
                        self.timeout_secs
                    ))
                } else {
                    // the URL may carry an API key
                    GeocodingError::NetworkError(e.without_url().to_string())
                };
                warn!(provider = self.provider_id, error = %err, "Geocoding request failed");
                err
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| GeocodingError::NetworkError(e.without_url().to_string()))?;

        if !status.is_success() {
            let message = serde_json::from_str::<Value>(&body)
                .ok()
                .as_ref()
                .and_then(upstream_message)
                .unwrap_or_else(|| format!("HTTP {status}"));
            warn!(provider = self.provider_id, %status, message = %message, "Geocoding API error");
            return Err(GeocodingError::ApiError(message));
        }

        serde_json::from_str(&body).map_err(|e| {
            warn!(provider = self.provider_id, error = %e, "Geocoding API returned non-JSON body");
            GeocodingError::InvalidResponse(e.to_string())
        })
    }

    /// Apply the result transform hook
    pub(crate) fn format_results(&self, results: Vec<SearchResult>) -> Vec<SearchResult> {
        match &self.hooks.transform_results {
            Some(hook) => hook(self.provider_id, results),
            None => results,
        }
    }
}

/// Deserialize a JSON body into a provider's raw response type
pub(crate) fn decode<T: DeserializeOwned>(value: Value) -> Result<T, GeocodingError> {
    serde_json::from_value(value).map_err(|e| GeocodingError::InvalidResponse(e.to_string()))
}

/// Error text from a JSON error body (Google, Nominatim and generic shapes)
fn upstream_message(body: &Value) -> Option<String> {
    body.get("error_message")
        .or_else(|| body.get("error").and_then(|e| e.get("message")))
        .or_else(|| body.get("error"))
        .and_then(Value::as_str)
        .map(str::to_string)
}
