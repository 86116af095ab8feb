//! Bridge configuration for `hue-api` consumers.
//!
//! TOML profiles layered with `HUE_*` environment variables, username
//! resolution (env var + plaintext), and translation into a ready
//! [`HueClient`]. Read-only: nothing is ever written back.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use hue_api::{HueClient, TlsMode, TransportConfig};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;
use url::Url;

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no bridge configured")]
    NoBridge,

    #[error("no bridge named '{name}' in config")]
    UnknownBridge { name: String },

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("failed to build client: {0}")]
    Client(#[from] hue_api::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    /// Bridge used when none is named explicitly.
    pub default_bridge: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named bridge profiles.
    #[serde(default)]
    pub bridges: HashMap<String, BridgeProfile>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Accept self-signed certificates.
    #[serde(default = "default_insecure")]
    pub insecure: bool,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            timeout: default_timeout(),
            insecure: default_insecure(),
        }
    }
}

fn default_timeout() -> u64 {
    30
}
fn default_insecure() -> bool {
    true
}

/// A named bridge profile.
#[derive(Debug, Deserialize, Serialize)]
pub struct BridgeProfile {
    /// Bridge base URL (e.g., "https://192.168.1.2").
    pub url: String,

    /// Username from an earlier pairing (plaintext — prefer `username_env`).
    pub username: Option<String>,

    /// Environment variable name holding the username.
    pub username_env: Option<String>,

    /// Path to a custom CA certificate.
    pub ca_cert: Option<PathBuf>,

    /// Override the insecure TLS default.
    pub insecure: Option<bool>,

    /// Override the timeout default.
    pub timeout: Option<u64>,
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "hue", "hue").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("hue");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the config from the canonical path + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load the config from `path` + environment.
///
/// Layers: defaults, then the TOML file (a missing file is skipped), then
/// `HUE_*` variables with `__` separating nested keys
/// (`HUE_BRIDGES__HOME__USERNAME`).
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    debug!(path = %path.display(), "loading config");

    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("HUE_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

impl Config {
    /// Pick a bridge: the named one, else `default_bridge`, else the only
    /// configured bridge.
    pub fn select(&self, name: Option<&str>) -> Result<(&str, &BridgeProfile), ConfigError> {
        let wanted = name.or(self.default_bridge.as_deref());

        match wanted {
            Some(name) => self
                .bridges
                .get_key_value(name)
                .map(|(k, v)| (k.as_str(), v))
                .ok_or_else(|| ConfigError::UnknownBridge { name: name.into() }),
            None => {
                let mut iter = self.bridges.iter();
                match (iter.next(), iter.next()) {
                    (Some((k, v)), None) => Ok((k.as_str(), v)),
                    (None, _) => Err(ConfigError::NoBridge),
                    (Some(_), Some(_)) => Err(ConfigError::Validation {
                        field: "default_bridge".into(),
                        reason: "several bridges configured; name one or set default_bridge".into(),
                    }),
                }
            }
        }
    }
}

// ── Resolution ──────────────────────────────────────────────────────

/// Resolve the username: the profile's `username_env` variable first, then
/// the plaintext value.
pub fn resolve_username(profile: &BridgeProfile) -> Option<SecretString> {
    if let Some(ref env_name) = profile.username_env {
        if let Ok(val) = std::env::var(env_name) {
            return Some(SecretString::from(val));
        }
    }

    profile.username.clone().map(SecretString::from)
}

/// Validate the profile's bridge URL.
pub fn bridge_url(profile: &BridgeProfile) -> Result<Url, ConfigError> {
    let url: Url = profile.url.parse().map_err(|e| ConfigError::Validation {
        field: "url".into(),
        reason: format!("invalid URL '{}': {e}", profile.url),
    })?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ConfigError::Validation {
            field: "url".into(),
            reason: format!("expected http or https, got '{other}'"),
        }),
    }
}

/// Translate TLS and timeout settings, falling back to `defaults`.
pub fn transport_config(profile: &BridgeProfile, defaults: &Defaults) -> TransportConfig {
    let tls = if let Some(ref ca_path) = profile.ca_cert {
        TlsMode::CustomCa(ca_path.clone())
    } else if profile.insecure.unwrap_or(defaults.insecure) {
        TlsMode::DangerAcceptInvalid
    } else {
        TlsMode::System
    };

    TransportConfig {
        tls,
        timeout: Duration::from_secs(profile.timeout.unwrap_or(defaults.timeout)),
        ..TransportConfig::default()
    }
}

/// Build a client for the selected bridge, paired if a username resolves.
pub fn build_client(config: &Config, name: Option<&str>) -> Result<HueClient, ConfigError> {
    let (name, profile) = config.select(name)?;
    let url = bridge_url(profile)?;
    let transport = transport_config(profile, &config.defaults);

    debug!(bridge = name, url = %url, "building client");
    let client = HueClient::new(url.as_str(), &transport)?;

    Ok(match resolve_username(profile) {
        Some(username) => client.with_username(username.expose_secret()),
        None => client,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use figment::Jail;

    use super::*;

    const TWO_BRIDGES: &str = r#"
default_bridge = "home"

[defaults]
timeout = 12

[bridges.home]
url = "https://192.168.1.2"
username = "abc123"
timeout = 5

[bridges.cabin]
url = "http://10.0.0.9"
insecure = false
"#;

    fn load(path: &str) -> figment::error::Result<Config> {
        load_config_from(Path::new(path)).map_err(|e| e.to_string().into())
    }

    fn profile(url: &str) -> BridgeProfile {
        BridgeProfile {
            url: url.into(),
            username: None,
            username_env: None,
            ca_cert: None,
            insecure: None,
            timeout: None,
        }
    }

    #[test]
    fn loads_profiles_and_defaults() {
        Jail::expect_with(|jail| {
            jail.create_file("hue.toml", TWO_BRIDGES)?;

            let config = load("hue.toml")?;

            assert_eq!(config.default_bridge.as_deref(), Some("home"));
            assert_eq!(config.defaults.timeout, 12);
            assert!(config.defaults.insecure);
            assert_eq!(config.bridges.len(), 2);
            assert_eq!(config.bridges["home"].timeout, Some(5));
            assert_eq!(config.bridges["cabin"].insecure, Some(false));
            Ok(())
        });
    }

    #[test]
    fn missing_file_yields_defaults() {
        Jail::expect_with(|_| {
            let config = load("absent.toml")?;

            assert!(config.bridges.is_empty());
            assert_eq!(config.defaults.timeout, 30);
            assert!(matches!(config.select(None), Err(ConfigError::NoBridge)));
            Ok(())
        });
    }

    #[test]
    fn env_overrides_nested_keys() {
        Jail::expect_with(|jail| {
            jail.create_file("hue.toml", TWO_BRIDGES)?;
            jail.set_env("HUE_BRIDGES__HOME__TIMEOUT", 7);
            jail.set_env("HUE_BRIDGES__HOME__USERNAME", "from-env");
            jail.set_env("HUE_DEFAULTS__INSECURE", false);

            let config = load("hue.toml")?;
            let home = &config.bridges["home"];

            assert_eq!(home.timeout, Some(7));
            assert_eq!(home.username.as_deref(), Some("from-env"));
            assert_eq!(home.url, "https://192.168.1.2");
            assert!(!config.defaults.insecure);
            assert_eq!(config.bridges["cabin"].timeout, None);
            Ok(())
        });
    }

    #[test]
    fn env_alone_can_define_a_bridge() {
        Jail::expect_with(|jail| {
            jail.set_env("HUE_BRIDGES__OFFICE__URL", "http://10.1.0.2");

            let config = load("absent.toml")?;

            assert_eq!(config.select(None).unwrap().0, "office");
            Ok(())
        });
    }

    #[test]
    fn selection_rules() {
        let mut config = Config::default();
        config.bridges.insert("home".into(), profile("https://192.168.1.2"));

        assert_eq!(config.select(None).unwrap().0, "home");
        assert!(matches!(
            config.select(Some("office")),
            Err(ConfigError::UnknownBridge { .. })
        ));

        config.bridges.insert("cabin".into(), profile("http://10.0.0.9"));
        assert!(matches!(config.select(None), Err(ConfigError::Validation { .. })));

        config.default_bridge = Some("cabin".into());
        assert_eq!(config.select(None).unwrap().0, "cabin");
        assert_eq!(config.select(Some("home")).unwrap().0, "home");
    }

    #[test]
    fn username_env_beats_plaintext() {
        Jail::expect_with(|jail| {
            let mut p = profile("https://192.168.1.2");
            p.username = Some("abc123".into());
            p.username_env = Some("HUE_CONFIG_TEST_HOME_USERNAME".into());

            assert_eq!(resolve_username(&p).unwrap().expose_secret(), "abc123");

            jail.set_env("HUE_CONFIG_TEST_HOME_USERNAME", "env-token");
            assert_eq!(resolve_username(&p).unwrap().expose_secret(), "env-token");

            p.username = None;
            assert_eq!(resolve_username(&p).unwrap().expose_secret(), "env-token");
            Ok(())
        });
    }

    #[test]
    fn username_absent_without_sources() {
        assert!(resolve_username(&profile("https://192.168.1.2")).is_none());
    }

    #[test]
    fn url_validation() {
        assert!(bridge_url(&profile("https://192.168.1.2")).is_ok());
        assert!(matches!(
            bridge_url(&profile("192.168.1.2")),
            Err(ConfigError::Validation { .. })
        ));
        assert!(matches!(
            bridge_url(&profile("ftp://192.168.1.2")),
            Err(ConfigError::Validation { .. })
        ));
    }

    #[test]
    fn transport_settings() {
        let defaults = Defaults::default();

        let insecure = transport_config(&profile("https://b"), &defaults);
        assert!(matches!(insecure.tls, TlsMode::DangerAcceptInvalid));
        assert_eq!(insecure.timeout, Duration::from_secs(30));

        let mut strict = profile("https://b");
        strict.insecure = Some(false);
        strict.timeout = Some(3);
        let strict = transport_config(&strict, &defaults);
        assert!(matches!(strict.tls, TlsMode::System));
        assert_eq!(strict.timeout, Duration::from_secs(3));

        let mut pinned = profile("https://b");
        pinned.ca_cert = Some(PathBuf::from("/etc/hue/bridge.pem"));
        assert!(matches!(
            transport_config(&pinned, &defaults).tls,
            TlsMode::CustomCa(_)
        ));
    }

    #[test]
    fn builds_paired_client() {
        let mut config = Config::default();
        let mut home = profile("https://192.168.1.2");
        home.username = Some("abc123".into());
        config.bridges.insert("home".into(), home);

        let client = build_client(&config, None).unwrap();

        assert!(client.is_paired());
        assert_eq!(client.username().as_deref(), Some("abc123"));
        assert!(client.bridge_url().starts_with("https://192.168.1.2"));
    }
}
