use thiserror::Error;

/// Top-level error type for the `hue-api` crate.
///
/// A closed set: every failure inside the client (URL building, transport,
/// HTTP status, JSON decoding) is converted into one of these kinds at its
/// origin, so callers can match exhaustively. No `reqwest`, `url` or
/// `serde_json` error escapes the client boundary.
///
/// Variants are listed in precedence order: when a single underlying failure
/// could fit several kinds, the earlier one wins.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Failure that matches none of the specific kinds below.
    #[error("Unknown error")]
    Unknown,

    /// The host cannot provide a usable HTTP/TLS stack with the requested
    /// settings (client construction failed).
    #[error("Unsupported platform: {0}")]
    UnsupportedPlatform(String),

    /// The bridge address plus endpoint did not form a valid URL.
    #[error("Failed to parse endpoint URL: {0}")]
    InvalidUrl(String),

    /// Connection refused, DNS failure, timeout, TLS handshake, body read.
    #[error("Network request error: {0}")]
    Network(String),

    /// The bridge answered with a status other than 200.
    #[error("HTTP error: {status}")]
    Http { status: u16 },

    /// The response body could not be decoded into the expected shape.
    #[error("Failed to parse API response: {message}")]
    Parsing { message: String },
}

impl Error {
    /// HTTP status code, if this is an [`Error::Http`].
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status } => Some(*status),
            _ => None,
        }
    }

    /// Returns `true` if the bridge answered 404.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Http { status: 404 })
    }

    /// Returns `true` for network-level failures, which may succeed when
    /// issued again. The client itself never retries.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Network(_))
    }

    pub(crate) fn parsing(message: impl Into<String>) -> Self {
        Self::Parsing {
            message: message.into(),
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_builder() {
            Self::InvalidUrl(err.to_string())
        } else if err.is_connect()
            || err.is_timeout()
            || err.is_request()
            || err.is_body()
            || err.is_redirect()
        {
            Self::Network(err.to_string())
        } else if let Some(status) = err.status() {
            Self::Http {
                status: status.as_u16(),
            }
        } else if err.is_decode() {
            Self::parsing(err.to_string())
        } else {
            Self::Unknown
        }
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Self::InvalidUrl(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::parsing(err.to_string())
    }
}
