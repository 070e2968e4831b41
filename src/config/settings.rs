// src/config/settings.rs
//! Process configuration, built once at startup and handed to the router.

use std::fs;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// Points at a TOML settings file; takes precedence over the individual variables.
pub const ENV_CONFIG_PATH: &str = "FEED_MIXER_CONFIG";

const ENV_FREQUENCY: &str = "ADS_FREQUENCY";
const ENV_DEFAULT_LABEL: &str = "ADV_DEFAULT_TEXT";
const ENV_CONTENT_URL: &str = "ARTICLES_ARCHIVE";
const ENV_ADS_URL: &str = "ADS_ARCHIVE";
const ENV_REQUEST_PATH: &str = "REQUEST_URL";
const ENV_BIND: &str = "SERVER_HOST";
const ENV_METRICS: &str = "METRICS_ENABLED";

const DEFAULT_REQUEST_PATH: &str = "/";
const DEFAULT_BIND: &str = "0.0.0.0:8080";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("ADS_FREQUENCY is missing")]
    MissingFrequency,

    #[error("ADS_FREQUENCY can not be converted to integer more then 0: {0:?}")]
    InvalidFrequency(String),

    #[error("{0} is missing or empty")]
    MissingUrl(&'static str),

    #[error("request path must start with '/': {0:?}")]
    InvalidRequestPath(String),

    #[error("invalid bind address {0:?}")]
    InvalidBind(String),

    #[error("reading settings from {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parsing settings file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("FEED_MIXER_CONFIG points to non-existent path {}", .0.display())]
    MissingFile(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Content items between consecutive advertisement slots.
    pub frequency: NonZeroUsize,
    /// `type` label of the placeholder used once the ads run out.
    pub default_adv_label: String,
    pub content_url: String,
    pub ads_url: String,
    pub request_path: String,
    /// `host:port` to listen on; hostnames are resolved when binding.
    pub bind: String,
    pub metrics_enabled: bool,
}

/// Raw, unvalidated form shared by the env and file loaders.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawSettings {
    frequency: Option<toml::Value>,
    default_adv_label: Option<String>,
    content_url: Option<String>,
    ads_url: Option<String>,
    request_path: Option<String>,
    bind: Option<String>,
    metrics_enabled: Option<bool>,
}

impl Settings {
    pub fn new(
        frequency: NonZeroUsize,
        content_url: impl Into<String>,
        ads_url: impl Into<String>,
    ) -> Self {
        Self {
            frequency,
            default_adv_label: String::new(),
            content_url: content_url.into(),
            ads_url: ads_url.into(),
            request_path: DEFAULT_REQUEST_PATH.to_string(),
            bind: DEFAULT_BIND.to_string(),
            metrics_enabled: false,
        }
    }

    pub fn with_default_label(mut self, label: impl Into<String>) -> Self {
        self.default_adv_label = label.into();
        self
    }

    pub fn with_request_path(mut self, path: impl Into<String>) -> Self {
        self.request_path = path.into();
        self
    }

    /// Load using env var + fallback:
    /// 1) TOML file at $FEED_MIXER_CONFIG
    /// 2) individual environment variables
    pub fn load_default() -> Result<Self, ConfigError> {
        if let Ok(p) = std::env::var(ENV_CONFIG_PATH) {
            let path = PathBuf::from(p);
            if !path.exists() {
                return Err(ConfigError::MissingFile(path));
            }
            return Self::from_toml_file(&path);
        }
        Self::from_env()
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup using the environment variable names.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let raw = RawSettings {
            frequency: lookup(ENV_FREQUENCY).map(toml::Value::String),
            default_adv_label: lookup(ENV_DEFAULT_LABEL),
            content_url: lookup(ENV_CONTENT_URL),
            ads_url: lookup(ENV_ADS_URL),
            request_path: lookup(ENV_REQUEST_PATH),
            bind: lookup(ENV_BIND),
            metrics_enabled: lookup(ENV_METRICS).map(|v| parse_flag(&v)),
        };
        raw.validate()
    }

    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content).map_err(|e| match e {
            ConfigError::Parse { source, .. } => ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        })
    }

    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let raw: RawSettings = toml::from_str(s).map_err(|source| ConfigError::Parse {
            path: PathBuf::from("<inline>"),
            source,
        })?;
        raw.validate()
    }
}

impl RawSettings {
    fn validate(self) -> Result<Settings, ConfigError> {
        let frequency = parse_frequency(self.frequency.ok_or(ConfigError::MissingFrequency)?)?;

        let content_url = require_url(self.content_url, ENV_CONTENT_URL)?;
        let ads_url = require_url(self.ads_url, ENV_ADS_URL)?;

        let request_path = self
            .request_path
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .unwrap_or_else(|| DEFAULT_REQUEST_PATH.to_string());
        if !request_path.starts_with('/') {
            return Err(ConfigError::InvalidRequestPath(request_path));
        }

        let bind = self
            .bind
            .map(|b| b.trim().to_string())
            .filter(|b| !b.is_empty())
            .unwrap_or_else(|| DEFAULT_BIND.to_string());
        let bind = parse_bind(&bind)?;

        Ok(Settings {
            frequency,
            default_adv_label: self.default_adv_label.unwrap_or_default(),
            content_url,
            ads_url,
            request_path,
            bind,
            metrics_enabled: self.metrics_enabled.unwrap_or(false),
        })
    }
}

// Accepts both `frequency = 5` and `frequency = "5"` in TOML; env values arrive as strings.
fn parse_frequency(v: toml::Value) -> Result<NonZeroUsize, ConfigError> {
    let parsed = match &v {
        toml::Value::Integer(i) => usize::try_from(*i).ok(),
        toml::Value::String(s) => s.trim().parse::<usize>().ok(),
        _ => None,
    };
    parsed.and_then(NonZeroUsize::new).ok_or_else(|| {
        let shown = match v {
            toml::Value::String(s) => s,
            other => other.to_string(),
        };
        ConfigError::InvalidFrequency(shown)
    })
}

fn require_url(v: Option<String>, name: &'static str) -> Result<String, ConfigError> {
    v.map(|u| u.trim().to_string())
        .filter(|u| !u.is_empty())
        .ok_or(ConfigError::MissingUrl(name))
}

// `:8080` means every interface, as in the classic `host:port` listen form.
// The host may be a name; only the shape and the port are checked here.
fn parse_bind(s: &str) -> Result<String, ConfigError> {
    let full = if s.starts_with(':') {
        format!("0.0.0.0{s}")
    } else {
        s.to_string()
    };
    let invalid = || ConfigError::InvalidBind(s.to_string());
    let (host, port) = full.rsplit_once(':').ok_or_else(invalid)?;
    port.parse::<u16>().map_err(|_| invalid())?;
    let bare = host.trim_start_matches('[').trim_end_matches(']');
    if bare.is_empty() || bare.chars().any(char::is_whitespace) {
        return Err(invalid());
    }
    Ok(full)
}

fn parse_flag(v: &str) -> bool {
    matches!(
        v.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k| map.get(k).cloned()
    }

    fn base() -> Vec<(&'static str, &'static str)> {
        vec![
            ("ADS_FREQUENCY", "5"),
            ("ARTICLES_ARCHIVE", "http://feeds.test/articles"),
            ("ADS_ARCHIVE", "http://feeds.test/ads"),
        ]
    }

    #[test]
    fn minimal_env_uses_defaults() {
        let s = Settings::from_lookup(lookup_from(&base())).unwrap();
        assert_eq!(s.frequency.get(), 5);
        assert_eq!(s.request_path, "/");
        assert_eq!(s.bind, "0.0.0.0:8080");
        assert_eq!(s.default_adv_label, "");
        assert!(!s.metrics_enabled);
    }

    #[test]
    fn frequency_must_be_a_positive_integer() {
        for bad in ["0", "-3", "five", "", "2.5"] {
            let mut env = base();
            env[0] = ("ADS_FREQUENCY", bad);
            let err = Settings::from_lookup(lookup_from(&env)).unwrap_err();
            assert!(
                matches!(err, ConfigError::InvalidFrequency(_)),
                "{bad:?} -> {err:?}"
            );
        }

        let env: Vec<_> = base().into_iter().skip(1).collect();
        assert!(matches!(
            Settings::from_lookup(lookup_from(&env)),
            Err(ConfigError::MissingFrequency)
        ));
    }

    #[test]
    fn feed_urls_are_required() {
        let mut env = base();
        env[2] = ("ADS_ARCHIVE", "  ");
        assert!(matches!(
            Settings::from_lookup(lookup_from(&env)),
            Err(ConfigError::MissingUrl("ADS_ARCHIVE"))
        ));
    }

    #[test]
    fn bind_shorthand_and_path_validation() {
        let mut env = base();
        env.push(("SERVER_HOST", ":9090"));
        env.push(("REQUEST_URL", "/mixed"));
        env.push(("ADV_DEFAULT_TEXT", "Your ad here"));
        env.push(("METRICS_ENABLED", "true"));
        let s = Settings::from_lookup(lookup_from(&env)).unwrap();
        assert_eq!(s.bind, "0.0.0.0:9090");
        assert_eq!(s.request_path, "/mixed");
        assert_eq!(s.default_adv_label, "Your ad here");
        assert!(s.metrics_enabled);

        let mut env = base();
        env.push(("REQUEST_URL", "mixed"));
        assert!(matches!(
            Settings::from_lookup(lookup_from(&env)),
            Err(ConfigError::InvalidRequestPath(_))
        ));

        let mut env = base();
        env.push(("SERVER_HOST", "localhost"));
        assert!(matches!(
            Settings::from_lookup(lookup_from(&env)),
            Err(ConfigError::InvalidBind(_))
        ));
    }

    #[test]
    fn bind_accepts_hostnames_and_ipv6() {
        for ok in ["localhost:8080", "api.internal:80", "127.0.0.1:9000", "[::1]:8443"] {
            let mut env = base();
            env.push(("SERVER_HOST", ok));
            let s = Settings::from_lookup(lookup_from(&env)).unwrap();
            assert_eq!(s.bind, ok);
        }

        for bad in ["localhost:http", ":", "localhost:70000", "my host:80"] {
            let mut env = base();
            env.push(("SERVER_HOST", bad));
            assert!(
                matches!(
                    Settings::from_lookup(lookup_from(&env)),
                    Err(ConfigError::InvalidBind(_))
                ),
                "{bad:?}"
            );
        }
    }

    #[test]
    fn toml_accepts_integer_or_string_frequency() {
        let s = Settings::from_toml_str(
            r#"
frequency = 3
content_url = "http://feeds.test/a"
ads_url = "http://feeds.test/b"
default_adv_label = "Promo"
bind = "127.0.0.1:7000"
"#,
        )
        .unwrap();
        assert_eq!(s.frequency.get(), 3);
        assert_eq!(s.default_adv_label, "Promo");

        let s = Settings::from_toml_str(
            r#"
frequency = "4"
content_url = "http://feeds.test/a"
ads_url = "http://feeds.test/b"
"#,
        )
        .unwrap();
        assert_eq!(s.frequency.get(), 4);

        let err = Settings::from_toml_str(
            r#"
frequency = 0
content_url = "http://feeds.test/a"
ads_url = "http://feeds.test/b"
"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidFrequency(_)));
    }
}
