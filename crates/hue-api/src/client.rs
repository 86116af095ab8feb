// Bridge client
//
// Owns the bridge address and the current username, and composes endpoint
// building, transport and decoding. Resource operations live in
// `resources/*` as inherent methods so this module stays focused on the
// request pipeline and pairing.

use std::sync::Arc;

use arc_swap::ArcSwapOption;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::codec::{self, KeyedCollection, LinkOutcome, RequestBody};
use crate::endpoint::{self, Endpoint};
use crate::error::Error;
use crate::models::ModificationResult;
use crate::transport::{Method, Transport, TransportConfig};

/// Async client for one bridge.
///
/// Cheap to share behind an `Arc`; every method takes `&self` and may run
/// concurrently with any other. The username is the only mutable state: it
/// is swapped atomically on successful pairing and read as a snapshot by
/// each request.
pub struct HueClient {
    transport: Transport,
    bridge_url: String,
    username: ArcSwapOption<SecretString>,
}

impl std::fmt::Debug for HueClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HueClient")
            .field("bridge_url", &self.bridge_url)
            .field("paired", &self.is_paired())
            .finish_non_exhaustive()
    }
}

impl HueClient {
    /// Create a client for the bridge at `bridge_url` (scheme + host, e.g.
    /// `https://192.168.1.2`), building the HTTP client from `config`.
    pub fn new(bridge_url: impl Into<String>, config: &TransportConfig) -> Result<Self, Error> {
        Ok(Self::with_transport(Transport::from_config(config)?, bridge_url))
    }

    /// Create a client around a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, bridge_url: impl Into<String>) -> Self {
        Self::with_transport(Transport::new(http), bridge_url)
    }

    fn with_transport(transport: Transport, bridge_url: impl Into<String>) -> Self {
        Self {
            transport,
            bridge_url: bridge_url.into(),
            username: ArcSwapOption::empty(),
        }
    }

    /// Start out paired with a username obtained earlier.
    pub fn with_username(self, username: impl Into<String>) -> Self {
        self.store_username(username.into());
        self
    }

    /// The bridge address this client talks to.
    pub fn bridge_url(&self) -> &str {
        &self.bridge_url
    }

    /// The current username, if paired.
    pub fn username(&self) -> Option<String> {
        self.username
            .load_full()
            .map(|secret| secret.expose_secret().to_owned())
    }

    pub fn is_paired(&self) -> bool {
        self.username.load().is_some()
    }

    /// Forget the username so the client can be paired again.
    pub fn clear_username(&self) {
        debug!("clearing username");
        self.username.store(None);
    }

    fn store_username(&self, username: String) {
        self.username
            .store(Some(Arc::new(SecretString::from(username))));
    }

    /// Full URL for `endpoint` with the current username, if any.
    pub fn url_for(&self, endpoint: &Endpoint) -> Result<Url, Error> {
        let username = self.username.load_full();
        endpoint::build_url(
            &self.bridge_url,
            username.as_deref().map(|secret| secret.expose_secret()),
            endpoint,
        )
    }

    // ── Pairing ──────────────────────────────────────────────────────

    /// Ask the bridge for a new username.
    ///
    /// `device_type` names the application, e.g. `"my-app#laptop"`. Returns
    /// [`LinkOutcome::LinkRequired`] until the bridge's link button has been
    /// pressed; on [`LinkOutcome::Linked`] the username is stored and used by
    /// every later request.
    ///
    /// The link error is recognised by its body at any status, but a bridge
    /// replying with HTTP status 101 loses that body to the protocol switch
    /// and yields [`Error::Http`] with status 101.
    pub async fn link(&self, device_type: &str) -> Result<LinkOutcome, Error> {
        let url = endpoint::build_url(&self.bridge_url, None, &Endpoint::login())?;
        let body = RequestBody::link(device_type)?;
        debug!(device_type, "requesting pairing");

        let resp = self.transport.round_trip(Method::Post, url, Some(&body)).await?;
        let outcome = codec::interpret_link_response(resp.status, &resp.body)?;

        if let LinkOutcome::Linked(username) = &outcome {
            self.store_username(username.clone());
        }
        Ok(outcome)
    }

    // ── Request helpers ──────────────────────────────────────────────

    async fn execute(
        &self,
        method: Method,
        endpoint: &Endpoint,
        body: Option<&RequestBody>,
    ) -> Result<bytes::Bytes, Error> {
        let url = self.url_for(endpoint)?;
        debug!(%method, path = %endpoint, "bridge request");
        self.transport.send(method, url, body).await
    }

    /// GET a single record.
    pub(crate) async fn get<T: DeserializeOwned>(&self, endpoint: &Endpoint) -> Result<T, Error> {
        let body = self.execute(Method::Get, endpoint, None).await?;
        codec::decode(&body)
    }

    /// GET a collection keyed by resource ID.
    pub(crate) async fn get_collection<T: DeserializeOwned>(
        &self,
        endpoint: &Endpoint,
    ) -> Result<KeyedCollection<T>, Error> {
        let body = self.execute(Method::Get, endpoint, None).await?;
        codec::decode_collection(&body)
    }

    /// PUT a body and decode the bridge's acknowledgment list.
    pub(crate) async fn put(
        &self,
        endpoint: &Endpoint,
        body: &RequestBody,
    ) -> Result<Vec<ModificationResult>, Error> {
        let body = self.execute(Method::Put, endpoint, Some(body)).await?;
        codec::decode(&body)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::endpoint::ResourceKind;

    fn client() -> HueClient {
        HueClient::with_client(reqwest::Client::new(), "http://10.0.0.2")
    }

    #[test]
    fn urls_follow_pairing_state() {
        let client = client();
        let endpoint = Endpoint::collection(ResourceKind::Lights);

        assert!(!client.is_paired());
        assert_eq!(client.url_for(&endpoint).unwrap().as_str(), "http://10.0.0.2/api/lights");

        let client = client.with_username("abc123");
        assert!(client.is_paired());
        assert_eq!(client.username().as_deref(), Some("abc123"));
        assert_eq!(
            client.url_for(&endpoint).unwrap().as_str(),
            "http://10.0.0.2/api/abc123/lights"
        );

        client.clear_username();
        assert_eq!(client.username(), None);
        assert_eq!(client.url_for(&endpoint).unwrap().as_str(), "http://10.0.0.2/api/lights");
    }

    #[test]
    fn debug_hides_username() {
        let client = client().with_username("very-secret-token");
        let rendered = format!("{client:?}");
        assert!(!rendered.contains("very-secret-token"));
        assert!(rendered.contains("paired: true"));
    }

    #[test]
    fn client_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<HueClient>();
    }
}
