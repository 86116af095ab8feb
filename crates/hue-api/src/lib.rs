// hue-api: Async Rust client for the local REST API of a Hue-style bridge
//
// Pipeline: endpoint path -> authenticated URL -> HTTP round trip -> status
// check -> JSON decode, with every failure classified into `Error`.

pub mod client;
pub mod codec;
pub mod endpoint;
pub mod error;
pub mod models;
mod resources;
pub mod transport;

pub use client::HueClient;
pub use codec::{KeyedCollection, LinkOutcome};
pub use endpoint::{Endpoint, ResourceKind};
pub use error::Error;
pub use transport::{TlsMode, TransportConfig};
