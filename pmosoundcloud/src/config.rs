//! Configuration of the SoundCloud backend
//!
//! The configuration is YAML, like the rest of PMOMusic:
//!
//! ```yaml
//! soundcloud:
//!   enabled: true
//!   auth_token: "1-12345-67890-abcdef"
//!   explore_songs: 25
//! proxy:
//!   url: "http://proxy.local:3128"
//! ```
//!
//! Loading merges, in order:
//! 1. the embedded default configuration (`soundcloud.yaml`)
//! 2. the user file or string
//! 3. environment overrides `PMOSOUNDCLOUD__<SECTION>__<KEY>=<yaml value>`
//!
//! Keys are case-insensitive.

use crate::client::{
    DEFAULT_API_BASE, DEFAULT_CLIENT_ID, DEFAULT_EXPLORE_SONGS, DEFAULT_REQUEST_TIMEOUT_SECS,
};
use anyhow::{anyhow, Result};
use serde::{Deserialize, Deserializer, Serialize};
use serde_yaml::{Mapping, Value};
use std::{env, fs, io::ErrorKind, path::Path, time::Duration};
use tracing::info;

// Configuration par défaut intégrée
const DEFAULT_CONFIG: &str = include_str!("soundcloud.yaml");

const ENV_PREFIX: &str = "PMOSOUNDCLOUD__";

/// Accept any YAML scalar where a string is expected
///
/// Environment overrides are parsed as YAML, so a purely numeric token
/// arrives as a number.
fn deserialize_string<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Null => Ok(String::new()),
        _ => Err(Error::custom("expected a string")),
    }
}

/// `soundcloud:` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoundCloudSettings {
    pub enabled: bool,
    #[serde(deserialize_with = "deserialize_string")]
    pub auth_token: String,
    pub explore_songs: usize,
    #[serde(deserialize_with = "deserialize_string")]
    pub client_id: String,
    pub api_base: String,
    pub timeout_secs: u64,
}

impl Default for SoundCloudSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            auth_token: String::new(),
            explore_songs: DEFAULT_EXPLORE_SONGS,
            client_id: DEFAULT_CLIENT_ID.to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
            timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

/// `proxy:` section
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProxySettings {
    #[serde(default)]
    pub url: Option<String>,
}

/// Full backend configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SoundCloudConfig {
    pub soundcloud: SoundCloudSettings,
    #[serde(default)]
    pub proxy: ProxySettings,
}

impl SoundCloudConfig {
    /// Load the configuration from a YAML file
    ///
    /// A missing file is not an error: the embedded defaults are used.
    /// Any other read failure is.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let external = match fs::read_to_string(path) {
            Ok(yaml) => {
                info!(config_file=%path.display(), "Loaded SoundCloud config file");
                Some(serde_yaml::from_str(&yaml)?)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!(config_file=%path.display(), "Config file not found, using default embedded config");
                None
            }
            Err(e) => {
                return Err(anyhow!("Cannot read config file {}: {}", path.display(), e));
            }
        };
        Self::build(external, env::vars())
    }

    /// Load the configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        Self::build(Some(serde_yaml::from_str(yaml)?), env::vars())
    }

    /// Merge defaults, an optional user document and environment overrides
    pub(crate) fn build(
        external: Option<Value>,
        vars: impl IntoIterator<Item = (String, String)>,
    ) -> Result<Self> {
        let mut value: Value = serde_yaml::from_str(DEFAULT_CONFIG)?;
        // an empty document parses as null and must not wipe the defaults
        if let Some(external) = external.filter(|v| !v.is_null()) {
            merge_yaml(&mut value, &lower_keys(external));
        }
        apply_env_overrides(&mut value, vars);

        let config: SoundCloudConfig = serde_yaml::from_value(value)?;
        Ok(config)
    }

    /// Check that the configuration can be used to build a backend
    pub fn validate(&self) -> Result<()> {
        if self.soundcloud.enabled && self.soundcloud.auth_token.trim().is_empty() {
            return Err(anyhow!(
                "soundcloud.auth_token must be set when the backend is enabled"
            ));
        }
        if self.soundcloud.explore_songs == 0 {
            return Err(anyhow!("soundcloud.explore_songs must be at least 1"));
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.soundcloud.timeout_secs)
    }

    /// The embedded default configuration, as shipped
    pub fn default_yaml() -> &'static str {
        DEFAULT_CONFIG
    }
}

fn apply_env_overrides(config: &mut Value, vars: impl IntoIterator<Item = (String, String)>) {
    for (key, value) in vars {
        let Some(path) = key.strip_prefix(ENV_PREFIX) else {
            continue;
        };
        let path: Vec<String> = path.split("__").map(str::to_lowercase).collect();
        let yaml_value = serde_yaml::from_str::<Value>(&value).unwrap_or(Value::String(value));
        set_path(config, &path, yaml_value);
    }
}

fn set_path(node: &mut Value, path: &[String], value: Value) {
    let Some((first, rest)) = path.split_first() else {
        *node = value;
        return;
    };
    if !matches!(node, Value::Mapping(_)) {
        *node = Value::Mapping(Mapping::new());
    }
    if let Value::Mapping(map) = node {
        let entry = map
            .entry(Value::String(first.clone()))
            .or_insert(Value::Null);
        set_path(entry, rest, value);
    }
}

fn lower_keys(value: Value) -> Value {
    match value {
        Value::Mapping(map) => Value::Mapping(
            map.into_iter()
                .map(|(k, v)| {
                    let k = match k {
                        Value::String(s) => Value::String(s.to_lowercase()),
                        other => other,
                    };
                    (k, lower_keys(v))
                })
                .collect(),
        ),
        Value::Sequence(seq) => Value::Sequence(seq.into_iter().map(lower_keys).collect()),
        other => other,
    }
}

fn merge_yaml(default: &mut Value, external: &Value) {
    match (default, external) {
        (Value::Mapping(dmap), Value::Mapping(emap)) => {
            for (k, v) in emap {
                match dmap.get_mut(k) {
                    Some(dv) => merge_yaml(dv, v),
                    None => {
                        dmap.insert(k.clone(), v.clone());
                    }
                }
            }
        }
        // scalars and sequences are replaced
        (d, e) => *d = e.clone(),
    }
}
