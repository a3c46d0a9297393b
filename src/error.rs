//! Error taxonomy shared by manifest parsing, resolution and asset planning.

use std::path::PathBuf;

use thiserror::Error;

/// Result alias used throughout the crate.
pub type ManifestResult<T> = Result<T, ManifestError>;

/// Errors raised while loading manifests or resolving assets from them.
#[derive(Debug, Error)]
pub enum ManifestError {
    /// The manifest file could not be opened or read.
    #[error("unable to open manifest file {}", path.display())]
    ManifestUnreadable {
        /// Path that was read.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// The manifest content is not a JSON object of manifest items.
    #[error("invalid vite manifest file \"{label}\": {source}")]
    InvalidManifest {
        /// Label of the manifest source, usually its path.
        label: String,
        /// Parser diagnostic.
        #[source]
        source: serde_json::Error,
    },

    /// A single manifest item is malformed, e.g. lacks its `file` field.
    #[error("invalid vite manifest file \"{label}\": entry \"{identifier}\": {source}")]
    InvalidManifestItem {
        /// Label of the manifest source, usually its path.
        label: String,
        /// Identifier of the offending item.
        identifier: String,
        /// Parser diagnostic naming the bad or missing field.
        #[source]
        source: serde_json::Error,
    },

    /// Neither the requested manifest nor its legacy location exists.
    #[error("vite manifest file \"{}\" was resolved to \"{}\" and cannot be opened", requested.display(), resolved.display())]
    ManifestNotFound {
        /// Path as requested by the caller.
        requested: PathBuf,
        /// Path the request resolved to.
        resolved: PathBuf,
    },

    /// Exactly one entry point was required but the manifest has a different count.
    #[error(
        "appropriate vite entrypoint could not be determined automatically: expected 1 entrypoint in \"{label}\", found {found}"
    )]
    AmbiguousOrMissingEntrypoint {
        /// Label of the manifest source.
        label: String,
        /// Number of valid entry points observed.
        found: usize,
    },

    /// The requested identifier is absent or not marked as an entry point.
    #[error("invalid vite entry point \"{identifier}\" in manifest file \"{label}\"")]
    UnknownEntry {
        /// Requested entry identifier.
        identifier: String,
        /// Label of the manifest source.
        label: String,
    },

    /// The requested identifier is absent from the manifest.
    #[error("invalid asset file \"{identifier}\" in vite manifest file \"{label}\"")]
    UnknownAsset {
        /// Requested asset identifier.
        identifier: String,
        /// Label of the manifest source.
        label: String,
    },

    /// A package path (`EXT:`) does not point to an existing directory.
    #[error("the specified package path \"{identifier}\" does not exist")]
    PackagePathMissing {
        /// Identifier as given by the caller.
        identifier: String,
    },

    /// A resolved package path lies outside of the project root.
    #[error("package path \"{identifier}\" resolves outside of the project root {}", root.display())]
    OutsideProjectRoot {
        /// Identifier as given by the caller.
        identifier: String,
        /// Project root the path was expected under.
        root: PathBuf,
    },

    /// The configuration file could not be read.
    #[error("failed to read {}: {source}", path.display())]
    ConfigIo {
        /// Path that caused the error.
        path: PathBuf,
        /// Source I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid JSON for [`crate::ViteConfig`].
    #[error("failed to parse {}: {source}", path.display())]
    ConfigParse {
        /// Path that caused the error.
        path: PathBuf,
        /// Source parse error.
        #[source]
        source: serde_json::Error,
    },
}

impl ManifestError {
    /// Returns true for errors describing malformed manifest content.
    pub fn is_invalid_manifest(&self) -> bool {
        matches!(
            self,
            Self::InvalidManifest { .. } | Self::InvalidManifestItem { .. }
        )
    }
}
