//! Autocomplete backend
//!
//! The widget reaches the server through [`AutocompleteBackend`]; the HTTP
//! implementation speaks the `{success, data}` envelope of the AJAX
//! endpoints.

use std::time::Duration;

use async_trait::async_trait;
use domain::{PlaceDetails, SearchResult};
#[cfg(test)]
use mockall::automock;
use reqwest::Client;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use tracing::{debug, instrument};
use url::Url;

use crate::{config::WidgetStrings, error::WidgetError};

/// Session bootstrap data from `/ajax/session`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionInfo {
    pub session: String,
    pub nonce: String,
    pub provider: String,
    #[serde(default)]
    pub map_script_url: String,
    pub search_delay_ms: u64,
    pub min_query_length: usize,
    #[serde(default)]
    pub strings: WidgetStrings,
}

/// Server operations the widget depends on
#[cfg_attr(test, automock)]
#[async_trait]
pub trait AutocompleteBackend: Send + Sync {
    /// Search for suggestions
    async fn search(&self, query: &str) -> Result<Vec<SearchResult>, WidgetError>;

    /// Fetch full details for a selected suggestion
    async fn place_details(&self, place_id: &str) -> Result<PlaceDetails, WidgetError>;
}

#[derive(Deserialize)]
struct RawEnvelope {
    success: bool,
    #[serde(default)]
    data: serde_json::Value,
}

#[derive(Deserialize)]
struct SearchData {
    #[serde(default)]
    results: Vec<SearchResult>,
}

#[derive(Deserialize)]
struct DetailsData {
    details: PlaceDetails,
}

/// Backend talking to the autocomplete server over HTTP
#[derive(Debug, Clone)]
pub struct HttpAutocompleteBackend {
    client: Client,
    base_url: Url,
    session: SessionInfo,
}

impl HttpAutocompleteBackend {
    /// Open a session against the server at `base_url`
    pub async fn connect(base_url: &str, timeout: Duration) -> Result<Self, WidgetError> {
        let base_url = normalize_base(base_url)?;
        let client = Client::builder()
            .timeout(if timeout.is_zero() {
                Duration::from_secs(15)
            } else {
                timeout
            })
            .build()
            .map_err(|e| WidgetError::Network(e.to_string()))?;

        let response = client
            .get(join(&base_url, "ajax/session")?)
            .send()
            .await
            .map_err(|e| WidgetError::Network(e.without_url().to_string()))?;
        let session: SessionInfo = read_envelope(response).await?;

        debug!(provider = %session.provider, "Autocomplete session established");
        Ok(Self {
            client,
            base_url,
            session,
        })
    }

    /// The session this backend signs requests with
    pub const fn session(&self) -> &SessionInfo {
        &self.session
    }

    async fn post<T: DeserializeOwned>(
        &self,
        path: &str,
        fields: &[(&str, &str)],
    ) -> Result<T, WidgetError> {
        let mut form = vec![
            ("nonce", self.session.nonce.as_str()),
            ("session", self.session.session.as_str()),
        ];
        form.extend_from_slice(fields);

        let response = self
            .client
            .post(join(&self.base_url, path)?)
            .form(&form)
            .send()
            .await
            .map_err(|e| WidgetError::Network(e.without_url().to_string()))?;

        read_envelope(response).await
    }
}

#[async_trait]
impl AutocompleteBackend for HttpAutocompleteBackend {
    #[instrument(skip(self))]
    async fn search(&self, query: &str) -> Result<Vec<SearchResult>, WidgetError> {
        let data: SearchData = self.post("ajax/search", &[("query", query)]).await?;
        Ok(data.results)
    }

    #[instrument(skip(self))]
    async fn place_details(&self, place_id: &str) -> Result<PlaceDetails, WidgetError> {
        let data: DetailsData = self
            .post("ajax/place-details", &[("place_id", place_id)])
            .await?;
        Ok(data.details)
    }
}

fn normalize_base(base_url: &str) -> Result<Url, WidgetError> {
    let mut base = base_url.trim().to_string();
    if !base.ends_with('/') {
        base.push('/');
    }
    Url::parse(&base).map_err(|e| WidgetError::Network(format!("invalid server URL: {e}")))
}

fn join(base: &Url, path: &str) -> Result<Url, WidgetError> {
    base.join(path)
        .map_err(|e| WidgetError::Network(format!("invalid endpoint {path}: {e}")))
}

async fn read_envelope<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, WidgetError> {
    let status = response.status();
    let bytes = response
        .bytes()
        .await
        .map_err(|e| WidgetError::Network(e.without_url().to_string()))?;

    let envelope: RawEnvelope = match serde_json::from_slice(&bytes) {
        Ok(envelope) => envelope,
        Err(_) if !status.is_success() => {
            return Err(WidgetError::Network(format!("HTTP {status}")));
        },
        Err(e) => return Err(WidgetError::InvalidResponse(e.to_string())),
    };

    if !envelope.success {
        let message = envelope
            .data
            .get("message")
            .and_then(serde_json::Value::as_str)
            .unwrap_or_default();
        return Err(WidgetError::Rejected(message.to_string()));
    }

    serde_json::from_value(envelope.data).map_err(|e| WidgetError::InvalidResponse(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_gains_trailing_slash() {
        let base = normalize_base("http://localhost:3000/wp").unwrap();
        assert_eq!(
            join(&base, "ajax/search").unwrap().as_str(),
            "http://localhost:3000/wp/ajax/search"
        );
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        assert!(matches!(
            normalize_base("not a url"),
            Err(WidgetError::Network(_))
        ));
    }
}
