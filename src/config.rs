//! Configuration loader describing where manifests live and when to use the dev server.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::warn;

use crate::dev_server::{DevServerMode, DevServerUri};
use crate::error::{ManifestError, ManifestResult};

/// File name searched for by [`ViteConfig::discover`].
pub const DEFAULT_CONFIG_FILE: &str = "vite_assets.json";

/// Manifest location used when neither the caller nor the configuration names one.
pub const DEFAULT_MANIFEST: &str = "_assets/vite/.vite/manifest.json";

/// Discoverable configuration for resolving Vite assets.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ViteConfig {
    /// Manifest used when a lookup does not name one, relative to the project root.
    pub default_manifest: String,
    /// Whether to link against the dev server.
    pub use_dev_server: DevServerMode,
    /// Location of the dev server.
    pub dev_server_uri: DevServerUri,
}

impl Default for ViteConfig {
    fn default() -> Self {
        Self {
            default_manifest: DEFAULT_MANIFEST.into(),
            use_dev_server: DevServerMode::Auto,
            dev_server_uri: DevServerUri::Auto,
        }
    }
}

impl ViteConfig {
    /// Attempt to load configuration from the provided directory.
    ///
    /// When the configuration file does not exist or fails to parse the defaults are used.
    pub fn discover(dir: &Path) -> Self {
        let candidate = dir.join(DEFAULT_CONFIG_FILE);
        match Self::from_path(&candidate) {
            Ok(config) => config,
            Err(ManifestError::ConfigIo { source, .. }) if source.kind() == ErrorKind::NotFound => {
                Self::default()
            }
            Err(err) => {
                warn!("{err}; falling back to default configuration");
                Self::default()
            }
        }
    }

    /// Read configuration from a specific JSON file.
    pub fn from_path(path: &Path) -> ManifestResult<Self> {
        let content = fs::read_to_string(path).map_err(|source| ManifestError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| ManifestError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Default manifest resolved against the project root.
    pub fn default_manifest_path(&self, project_root: &Path) -> PathBuf {
        project_root.join(&self.default_manifest)
    }
}
