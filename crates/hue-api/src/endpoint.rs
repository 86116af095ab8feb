// Endpoint paths and URL construction
//
// Paths are relative to `{bridge}/api/[{username}/]`. Building a path never
// touches the network or the client's token; the token only enters at the
// URL step.

use strum::{AsRefStr, Display, EnumIter};
use url::Url;

use crate::error::Error;

/// Top-level resource collections exposed by the bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, AsRefStr, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum ResourceKind {
    Lights,
    Groups,
    Config,
    Schedules,
    Scenes,
    Sensors,
    Rules,
}

/// A relative API path such as `lights/1/state`, kept as segments.
///
/// The pairing endpoint has no segments. Segments are percent-encoded only
/// when the URL is built, so an ID can never add, drop or reorder path
/// components.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Endpoint {
    segments: Vec<String>,
}

impl Endpoint {
    /// The pairing endpoint (`POST {bridge}/api/`).
    pub fn login() -> Self {
        Self {
            segments: Vec::new(),
        }
    }

    /// `<kind>`
    pub fn collection(kind: ResourceKind) -> Self {
        Self {
            segments: vec![kind.as_ref().to_owned()],
        }
    }

    /// `<kind>/<id>`
    pub fn element(kind: ResourceKind, id: &str) -> Self {
        Self {
            segments: vec![kind.as_ref().to_owned(), id.to_owned()],
        }
    }

    /// `<kind>/<id>/<sub_path>`; `sub_path` may itself contain `/`.
    pub fn element_sub_path(kind: ResourceKind, id: &str, sub_path: &str) -> Self {
        let mut endpoint = Self::element(kind, id);
        endpoint
            .segments
            .extend(sub_path.split('/').filter(|s| !s.is_empty()).map(str::to_owned));
        endpoint
    }

    /// `lights/<id>/state`
    pub fn light_state(id: &str) -> Self {
        Self::element_sub_path(ResourceKind::Lights, id, "state")
    }

    /// `groups/<id>/action`
    pub fn group_action(id: &str) -> Self {
        Self::element_sub_path(ResourceKind::Groups, id, "action")
    }

    /// The unencoded path, for logs and display.
    pub fn path(&self) -> String {
        self.segments.join("/")
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn is_login(&self) -> bool {
        self.segments.is_empty()
    }
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.path())
    }
}

/// Build the full URL: `{bridge}/api/` + `{username}/` (when set) + path.
///
/// Trailing slashes on `bridge_url` are ignored. The username and every
/// path segment are percent-encoded, so `/`, `?` and `#` inside an ID stay
/// part of that ID.
pub fn build_url(bridge_url: &str, username: Option<&str>, endpoint: &Endpoint) -> Result<Url, Error> {
    let base = bridge_url.trim_end_matches('/');
    let mut url = Url::parse(&format!("{base}/api/"))?;

    {
        let mut segments = url
            .path_segments_mut()
            .map_err(|()| Error::InvalidUrl(format!("{bridge_url}: not a hierarchical URL")))?;
        segments.pop_if_empty().extend(username).extend(endpoint.segments());
        if endpoint.is_login() {
            segments.push("");
        }
    }

    Ok(url)
}
