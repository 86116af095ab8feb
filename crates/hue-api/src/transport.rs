// HTTP transport
//
// One request, one response. This layer only knows about methods, URLs,
// status codes and bytes; JSON lives in `codec`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use bytes::Bytes;
use reqwest::header::{CONTENT_TYPE, HeaderValue};
use reqwest::{Certificate, ClientBuilder};
use strum::Display;
use tracing::trace;
use url::Url;

use crate::codec::RequestBody;
use crate::error::Error;

/// TLS verification mode.
#[derive(Debug, Clone)]
pub enum TlsMode {
    /// Use the system certificate store.
    System,
    /// Use a custom CA certificate from the given PEM file.
    CustomCa(PathBuf),
    /// Accept any certificate (bridges serve self-signed certificates).
    DangerAcceptInvalid,
}

/// Settings for building the underlying `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub tls: TlsMode,
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            tls: TlsMode::DangerAcceptInvalid,
            timeout: Duration::from_secs(30),
            user_agent: concat!("hue-api/", env!("CARGO_PKG_VERSION")).to_owned(),
        }
    }
}

impl TlsMode {
    /// Apply this verification mode to a client under construction.
    fn configure(&self, builder: ClientBuilder) -> Result<ClientBuilder, Error> {
        Ok(match self {
            Self::System => builder,
            Self::CustomCa(path) => builder.add_root_certificate(read_ca(path)?),
            Self::DangerAcceptInvalid => builder.danger_accept_invalid_certs(true),
        })
    }
}

fn read_ca(path: &Path) -> Result<Certificate, Error> {
    let unusable = |e: &dyn std::fmt::Display| {
        Error::UnsupportedPlatform(format!("CA bundle {} unusable: {e}", path.display()))
    };
    let pem = std::fs::read(path).map_err(|e| unusable(&e))?;
    Certificate::from_pem(&pem).map_err(|e| unusable(&e))
}

impl TransportConfig {
    /// Build a `reqwest::Client` from this config.
    ///
    /// Failures mean the host cannot provide an HTTP/TLS stack with these
    /// settings and are reported as [`Error::UnsupportedPlatform`].
    pub fn build_client(&self) -> Result<reqwest::Client, Error> {
        let builder = reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(self.user_agent.as_str());

        self.tls
            .configure(builder)?
            .build()
            .map_err(|e| Error::UnsupportedPlatform(format!("HTTP client unavailable: {e}")))
    }
}

/// HTTP methods the bridge API uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "UPPERCASE")]
pub enum Method {
    Get,
    Post,
    Put,
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => Self::GET,
            Method::Post => Self::POST,
            Method::Put => Self::PUT,
        }
    }
}

/// Status code and body of one round trip, before status classification.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub body: Bytes,
}

impl RawResponse {
    /// The body if the status is exactly 200, otherwise [`Error::Http`].
    pub fn into_body(self) -> Result<Bytes, Error> {
        if self.status == 200 {
            Ok(self.body)
        } else {
            Err(Error::Http {
                status: self.status,
            })
        }
    }
}

/// Thin wrapper over `reqwest::Client` that maps every failure into
/// [`Error`].
#[derive(Debug, Clone)]
pub struct Transport {
    http: reqwest::Client,
}

impl Transport {
    pub fn new(http: reqwest::Client) -> Self {
        Self { http }
    }

    pub fn from_config(config: &TransportConfig) -> Result<Self, Error> {
        Ok(Self::new(config.build_client()?))
    }

    /// Perform one request and return status + body without judging the
    /// status.
    pub async fn round_trip(
        &self,
        method: Method,
        url: Url,
        body: Option<&RequestBody>,
    ) -> Result<RawResponse, Error> {
        let mut request = self.http.request(method.into(), url);
        if let Some(body) = body {
            request = request
                .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
                .body(body.to_bytes());
        }

        let resp = request.send().await?;
        let status = resp.status().as_u16();
        let body = resp
            .bytes()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        trace!(%method, status, len = body.len(), "response received");
        Ok(RawResponse { status, body })
    }

    /// Perform one request; anything but 200 becomes [`Error::Http`].
    pub async fn send(
        &self,
        method: Method,
        url: Url,
        body: Option<&RequestBody>,
    ) -> Result<Bytes, Error> {
        self.round_trip(method, url, body).await?.into_body()
    }
}
