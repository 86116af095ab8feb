// Request/response codec
//
// Outbound payloads are fixed flat JSON objects. Inbound bodies are decoded
// with serde; collections arrive as JSON objects keyed by resource ID and go
// through the single generic `KeyedCollection` decoder below.

use std::collections::HashMap;
use std::collections::hash_map;
use std::fmt;
use std::marker::PhantomData;

use bytes::Bytes;
use serde::de::{self, DeserializeOwned, MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::{debug, warn};

use crate::error::Error;

/// Bridge error type for "link button not pressed".
pub const LINK_BUTTON_NOT_PRESSED: u16 = 101;

const BODY_PREVIEW_LEN: usize = 200;

// ── Outbound payloads ────────────────────────────────────────────────

/// `{"devicetype": "<name>"}` — body of the pairing request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkRequest {
    #[serde(rename = "devicetype")]
    pub device_type: String,
}

/// `{"on": <bool>}` — body of a light state / group action change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OnOffRequest {
    pub on: bool,
}

/// An encoded JSON request body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestBody {
    bytes: Bytes,
}

impl RequestBody {
    /// Encode any serializable payload.
    ///
    /// Encoding failures are reported as [`Error::Unknown`]; the fixed
    /// payload shapes used by the client cannot fail in practice.
    pub fn from_payload<T: Serialize>(payload: &T) -> Result<Self, Error> {
        let bytes = serde_json::to_vec(payload).map_err(|e| {
            warn!(error = %e, "failed to encode request body");
            Error::Unknown
        })?;
        Ok(Self {
            bytes: Bytes::from(bytes),
        })
    }

    /// Pairing request body.
    pub fn link(device_type: &str) -> Result<Self, Error> {
        Self::from_payload(&LinkRequest {
            device_type: device_type.to_owned(),
        })
    }

    /// On/off body for lights and groups.
    pub fn on(state: bool) -> Result<Self, Error> {
        Self::from_payload(&OnOffRequest { on: state })
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub(crate) fn to_bytes(&self) -> Bytes {
        self.bytes.clone()
    }
}

// ── Bridge error entries ─────────────────────────────────────────────

/// An error object reported by the bridge inside a response array:
/// `{"error": {"type": 101, "address": "", "description": "..."}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeError {
    #[serde(rename = "type")]
    pub kind: u16,
    #[serde(default)]
    pub address: Option<String>,
    pub description: String,
}

impl fmt::Display for BridgeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.address.as_deref() {
            Some(address) if !address.is_empty() => {
                write!(f, "bridge error {} at {address}: {}", self.kind, self.description)
            }
            _ => write!(f, "bridge error {}: {}", self.kind, self.description),
        }
    }
}

#[derive(Debug, Deserialize)]
struct BridgeErrorEntry {
    error: BridgeError,
}

/// Parse a body as a non-empty array of bridge error entries.
fn bridge_errors(body: &[u8]) -> Option<Vec<BridgeError>> {
    let entries: Vec<BridgeErrorEntry> = serde_json::from_slice(body).ok()?;
    if entries.is_empty() {
        return None;
    }
    Some(entries.into_iter().map(|entry| entry.error).collect())
}

// ── Decoding ─────────────────────────────────────────────────────────

/// Decode a response body into `T`.
///
/// On failure the message names the bridge error when the body is an error
/// array (the bridge reports unknown IDs this way, with HTTP 200), otherwise
/// it carries the decoder message and a short body preview.
pub fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T, Error> {
    serde_json::from_slice(body).map_err(|e| {
        if let Some(errors) = bridge_errors(body) {
            let described: Vec<String> = errors.iter().map(ToString::to_string).collect();
            warn!(errors = ?described, "bridge reported errors in response");
            return Error::parsing(described.join("; "));
        }
        let text = String::from_utf8_lossy(body);
        let preview: String = text.chars().take(BODY_PREVIEW_LEN).collect();
        Error::parsing(format!("{e} (body preview: {preview:?})"))
    })
}

/// Decode a response body as a collection keyed by resource ID.
///
/// The one decoding routine shared by every collection type.
pub fn decode_collection<T: DeserializeOwned>(body: &[u8]) -> Result<KeyedCollection<T>, Error> {
    decode(body)
}

// ── Keyed collections ────────────────────────────────────────────────

/// Resources keyed by their bridge-assigned ID.
///
/// The bridge returns collections as JSON objects (`{"1": {...}, "2": {...}}`)
/// rather than arrays. Keys carry no ordering. An empty object is an empty
/// collection.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyedCollection<T> {
    items: HashMap<String, T>,
}

impl<T> KeyedCollection<T> {
    pub fn new() -> Self {
        Self {
            items: HashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&T> {
        self.items.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.items.contains_key(id)
    }

    /// Resource IDs, in no particular order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.items.keys().map(String::as_str)
    }

    pub fn iter(&self) -> hash_map::Iter<'_, String, T> {
        self.items.iter()
    }

    pub fn into_inner(self) -> HashMap<String, T> {
        self.items
    }
}

impl<T> Default for KeyedCollection<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> From<HashMap<String, T>> for KeyedCollection<T> {
    fn from(items: HashMap<String, T>) -> Self {
        Self { items }
    }
}

impl<T> FromIterator<(String, T)> for KeyedCollection<T> {
    fn from_iter<I: IntoIterator<Item = (String, T)>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

impl<T> IntoIterator for KeyedCollection<T> {
    type Item = (String, T);
    type IntoIter = hash_map::IntoIter<String, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a KeyedCollection<T> {
    type Item = (&'a String, &'a T);
    type IntoIter = hash_map::Iter<'a, String, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl<T: Serialize> Serialize for KeyedCollection<T> {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.items.serialize(serializer)
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for KeyedCollection<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(KeyedCollectionVisitor(PhantomData))
    }
}

struct KeyedCollectionVisitor<T>(PhantomData<T>);

impl<'de, T: Deserialize<'de>> Visitor<'de> for KeyedCollectionVisitor<T> {
    type Value = KeyedCollection<T>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a JSON object keyed by resource ID")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
        let mut items = HashMap::with_capacity(map.size_hint().unwrap_or(0));
        while let Some(id) = map.next_key::<String>()? {
            let value = map
                .next_value::<T>()
                .map_err(|e| <A::Error as de::Error>::custom(format_args!("resource `{id}`: {e}")))?;
            if items.contains_key(&id) {
                return Err(de::Error::custom(format_args!("duplicate resource id `{id}`")));
            }
            items.insert(id, value);
        }
        Ok(KeyedCollection { items })
    }
}

// ── Pairing response ─────────────────────────────────────────────────

/// Result of a successful pairing attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkOutcome {
    /// The link button on the bridge must be pressed; try again afterwards.
    LinkRequired,
    /// Pairing succeeded; carries the new username.
    Linked(String),
}

#[derive(Debug, Deserialize)]
struct LinkSuccessEntry {
    success: LinkSuccess,
}

#[derive(Debug, Deserialize)]
struct LinkSuccess {
    username: String,
}

/// Interpret the bridge's answer to a pairing request.
///
/// The error shape is checked first (discriminated on `type == 101`), and
/// before the status code, so a "link button not pressed" answer is never
/// misreported as an HTTP failure. This only applies to bodies that reach
/// the client: an HTTP/1.1 `101` is a protocol switch whose body is dropped
/// in transit, and arrives here empty.
pub fn interpret_link_response(status: u16, body: &[u8]) -> Result<LinkOutcome, Error> {
    let errors = bridge_errors(body);

    if let Some(errors) = &errors {
        if errors.iter().any(|e| e.kind == LINK_BUTTON_NOT_PRESSED) {
            debug!("link button not pressed");
            return Ok(LinkOutcome::LinkRequired);
        }
    }

    if status != 200 {
        return Err(Error::Http { status });
    }

    if let Some(errors) = errors {
        let described: Vec<String> = errors.iter().map(ToString::to_string).collect();
        warn!(errors = ?described, "bridge rejected pairing request");
        return Err(Error::parsing(described.join("; ")));
    }

    let entries: Vec<LinkSuccessEntry> = decode(body)?;
    let entry = entries
        .into_iter()
        .next()
        .ok_or_else(|| Error::parsing("pairing response contained no entries"))?;

    debug!("pairing succeeded");
    Ok(LinkOutcome::Linked(entry.success.username))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[derive(Debug, PartialEq, Deserialize)]
    struct Named {
        name: String,
    }

    #[test]
    fn link_payload_round_trip() {
        let body = RequestBody::link("test-app").unwrap();
        let value: serde_json::Value = serde_json::from_slice(body.as_bytes()).unwrap();
        assert_eq!(value, json!({ "devicetype": "test-app" }));

        let decoded: LinkRequest = decode(body.as_bytes()).unwrap();
        assert_eq!(decoded.device_type, "test-app");
    }

    #[test]
    fn on_payload_uses_flag() {
        let on: serde_json::Value = serde_json::from_slice(RequestBody::on(true).unwrap().as_bytes()).unwrap();
        let off: serde_json::Value =
            serde_json::from_slice(RequestBody::on(false).unwrap().as_bytes()).unwrap();
        assert_eq!(on, json!({ "on": true }));
        assert_eq!(off, json!({ "on": false }));
    }

    #[test]
    fn empty_object_is_empty_collection() {
        let named: KeyedCollection<Named> = decode_collection(b"{}").unwrap();
        assert!(named.is_empty());
        let values: KeyedCollection<serde_json::Value> = decode_collection(b" { } ").unwrap();
        assert_eq!(values.len(), 0);
    }

    #[test]
    fn collection_keys_map_to_elements() {
        let body = br#"{"1": {"name": "Hall"}, "abc": {"name": "Kitchen"}}"#;
        let named: KeyedCollection<Named> = decode_collection(body).unwrap();

        let mut ids: Vec<_> = named.ids().collect();
        ids.sort_unstable();
        assert_eq!(ids, ["1", "abc"]);
        assert_eq!(named.get("abc").unwrap().name, "Kitchen");
        assert!(named.contains("1"));
        assert!(!named.contains("2"));
    }

    #[test]
    fn one_bad_element_fails_the_collection() {
        let body = br#"{"1": {"name": "Hall"}, "2": {"title": "Kitchen"}}"#;
        let err = decode_collection::<Named>(body).unwrap_err();
        match err {
            Error::Parsing { message } => {
                assert!(message.contains("resource `2`"), "message: {message}");
                assert!(message.contains("name"), "message: {message}");
            }
            other => panic!("expected Parsing, got {other:?}"),
        }
    }

    #[test]
    fn array_is_not_a_collection() {
        let err = decode_collection::<Named>(br#"[{"name": "Hall"}]"#).unwrap_err();
        assert!(matches!(err, Error::Parsing { .. }));
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let body = br#"{"1": {"name": "a"}, "1": {"name": "b"}}"#;
        let err = decode_collection::<Named>(body).unwrap_err();
        match err {
            Error::Parsing { message } => assert!(message.contains("duplicate"), "{message}"),
            other => panic!("expected Parsing, got {other:?}"),
        }
    }

    #[test]
    fn invalid_json_has_message_and_preview() {
        let err = decode::<Named>(b"<html>oops").unwrap_err();
        match err {
            Error::Parsing { message } => {
                assert!(!message.is_empty());
                assert!(message.contains("<html>oops"), "{message}");
            }
            other => panic!("expected Parsing, got {other:?}"),
        }
    }

    #[test]
    fn bridge_error_array_is_described() {
        let body = br#"[{"error":{"type":3,"address":"/lights/99","description":"resource, /lights/99, not available"}}]"#;
        let err = decode::<Named>(body).unwrap_err();
        assert_eq!(
            err,
            Error::parsing("bridge error 3 at /lights/99: resource, /lights/99, not available")
        );
    }

    #[test]
    fn link_required_wins_over_status() {
        let body = br#"[{"error":{"type":101,"description":"link button not pressed"}}]"#;
        assert_eq!(interpret_link_response(101, body).unwrap(), LinkOutcome::LinkRequired);
        assert_eq!(interpret_link_response(200, body).unwrap(), LinkOutcome::LinkRequired);
    }

    #[test]
    fn bodiless_switching_protocols_is_http_error() {
        assert_eq!(
            interpret_link_response(101, b"").unwrap_err(),
            Error::Http { status: 101 }
        );
    }

    #[test]
    fn link_success_yields_username() {
        let body = br#"[{"success":{"username":"abc123"}}]"#;
        assert_eq!(
            interpret_link_response(200, body).unwrap(),
            LinkOutcome::Linked("abc123".into())
        );
    }

    #[test]
    fn link_other_outcomes() {
        assert_eq!(
            interpret_link_response(404, b"not found").unwrap_err(),
            Error::Http { status: 404 }
        );

        let other_error = br#"[{"error":{"type":7,"address":"/devicetype","description":"invalid value"}}]"#;
        assert!(matches!(
            interpret_link_response(200, other_error).unwrap_err(),
            Error::Parsing { .. }
        ));

        assert!(matches!(
            interpret_link_response(200, b"[]").unwrap_err(),
            Error::Parsing { .. }
        ));
        assert!(matches!(
            interpret_link_response(200, br#"{"username":"x"}"#).unwrap_err(),
            Error::Parsing { .. }
        ));
    }
}
