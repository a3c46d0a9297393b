//! Deciding whether to link against the Vite dev server and where that server lives.
//!
//! Nothing here reads ambient state: the current request origin and the environment are passed
//! in explicitly by the caller.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Deserializer};
use tracing::{debug, warn};

/// Port the Vite dev server listens on unless told otherwise.
pub const DEFAULT_PORT: u16 = 5173;

/// Environment variable holding the complete dev server URI.
pub const SERVER_URI_ENV: &str = "VITE_SERVER_URI";

/// Environment variable holding only the dev server port.
pub const PRIMARY_PORT_ENV: &str = "VITE_PRIMARY_PORT";

/// Path of the Vite client script served by the dev server.
pub const CLIENT_PATH: &str = "@vite/client";

/// Read access to environment variables.
pub trait EnvLookup {
    /// Value of `key`, or `None` when unset.
    fn var(&self, key: &str) -> Option<String>;
}

/// [`EnvLookup`] reading the process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvLookup for ProcessEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

impl EnvLookup for HashMap<String, String> {
    fn var(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

/// Whether assets should be served by the dev server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DevServerMode {
    /// Follow the application context: on in development, off otherwise.
    #[default]
    Auto,
    /// Always use the dev server.
    Enabled,
    /// Always use built assets.
    Disabled,
}

impl DevServerMode {
    /// Resolve the mode for an application running in development or not.
    pub fn is_enabled(self, is_development: bool) -> bool {
        match self {
            Self::Auto => is_development,
            Self::Enabled => true,
            Self::Disabled => false,
        }
    }
}

impl<'de> Deserialize<'de> for DevServerMode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Flag(bool),
            Number(u64),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Flag(true) => Ok(Self::Enabled),
            Raw::Flag(false) => Ok(Self::Disabled),
            Raw::Number(0) => Ok(Self::Disabled),
            Raw::Number(_) => Ok(Self::Enabled),
            Raw::Text(text) => match text.trim() {
                "auto" => Ok(Self::Auto),
                "1" | "true" => Ok(Self::Enabled),
                "" | "0" | "false" => Ok(Self::Disabled),
                other => Err(serde::de::Error::custom(format!(
                    "invalid dev server mode \"{other}\", expected \"auto\", true or false"
                ))),
            },
        }
    }
}

/// Configured location of the dev server.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DevServerUri {
    /// Derive the URI from the environment and the current request.
    #[default]
    Auto,
    /// Use this URI verbatim.
    Fixed(String),
}

impl<'de> Deserialize<'de> for DevServerUri {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        let value = value.trim();
        if value.is_empty() || value == "auto" {
            Ok(Self::Auto)
        } else {
            Ok(Self::Fixed(value.to_string()))
        }
    }
}

/// Scheme, host and port of the request currently being served.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestOrigin {
    /// URI scheme, e.g. `https`.
    pub scheme: String,
    /// Host name or address literal.
    pub host: String,
    /// Explicit port, when present.
    pub port: Option<u16>,
}

impl RequestOrigin {
    /// Origin from its parts, without an explicit port.
    pub fn new(scheme: impl Into<String>, host: impl Into<String>) -> Self {
        Self {
            scheme: scheme.into(),
            host: host.into(),
            port: None,
        }
    }

    /// Extract the origin of an absolute URI such as `https://example.com:8443/path?q`.
    pub fn parse(uri: &str) -> Option<Self> {
        let (scheme, rest) = uri.split_once("://")?;
        let authority = rest.split(['/', '?', '#']).next().unwrap_or_default();
        let authority = authority.rsplit_once('@').map_or(authority, |(_, host)| host);

        let (host, port) = match authority.rfind(':') {
            Some(index) if !authority[index..].contains(']') => {
                let port = authority[index + 1..].parse().ok()?;
                (&authority[..index], Some(port))
            }
            _ => (authority, None),
        };

        if scheme.is_empty() || host.is_empty() {
            return None;
        }

        Some(Self {
            scheme: scheme.to_string(),
            host: host.to_string(),
            port,
        })
    }
}

/// Base URI of a running dev server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DevServer {
    base: String,
}

impl DevServer {
    /// Wrap a base URI; trailing slashes are dropped.
    pub fn new(base: impl Into<String>) -> Self {
        let base = base.into();
        Self {
            base: base.trim_end_matches('/').to_string(),
        }
    }

    /// Base URI without trailing slash.
    pub fn base(&self) -> &str {
        &self.base
    }

    /// URI of `path` served by the dev server.
    pub fn url_for(&self, path: &str) -> String {
        format!("{}/{}", self.base, path.trim_start_matches('/'))
    }

    /// URI of the Vite client script.
    pub fn client_url(&self) -> String {
        self.url_for(CLIENT_PATH)
    }
}

impl fmt::Display for DevServer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.base)
    }
}

/// Determine the dev server for the current request.
///
/// A fixed setting wins. Otherwise `VITE_SERVER_URI` is used when set, falling back to the
/// request's scheme and host combined with `VITE_PRIMARY_PORT` or [`DEFAULT_PORT`].
pub fn determine_dev_server<E: EnvLookup + ?Sized>(
    setting: &DevServerUri,
    origin: &RequestOrigin,
    env: &E,
) -> DevServer {
    if let DevServerUri::Fixed(uri) = setting {
        return DevServer::new(uri.as_str());
    }

    if let Some(uri) = env.var(SERVER_URI_ENV).filter(|uri| !uri.trim().is_empty()) {
        debug!(uri = %uri, "using dev server from {SERVER_URI_ENV}");
        return DevServer::new(uri.trim());
    }

    let port = match env.var(PRIMARY_PORT_ENV) {
        Some(raw) if !raw.trim().is_empty() => raw.trim().parse().unwrap_or_else(|_| {
            warn!(value = %raw, "ignoring invalid {PRIMARY_PORT_ENV}");
            DEFAULT_PORT
        }),
        _ => DEFAULT_PORT,
    };

    let server = DevServer::new(format!("{}://{}:{}", origin.scheme, origin.host, port));
    debug!(uri = %server, "derived dev server from request origin");
    server
}
