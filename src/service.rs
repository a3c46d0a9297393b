//! High-level entry point combining configuration, manifest caching and resolution.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::debug;

use crate::cache::ManifestCache;
use crate::config::ViteConfig;
use crate::dev_server::{DevServer, EnvLookup, RequestOrigin, determine_dev_server};
use crate::error::{ManifestError, ManifestResult};
use crate::manifest::{FileReader, FsReader, Manifest};
use crate::paths::{
    NoPackages, PackagePathResolver, normalize_identifier, output_dir_for_manifest, output_path,
    resolve_manifest_file,
};
use crate::resolver::determine_sole_entrypoint;
use crate::tags::{AssetTag, TagOptions, tags_from_dev_server, tags_from_manifest};

/// Resolves Vite assets for a project, caching parsed manifests across lookups.
///
/// Manifest paths are taken relative to the project root unless absolute. Entry and asset
/// identifiers may use the `EXT:` package syntax, which is resolved through the configured
/// [`PackagePathResolver`].
#[derive(Debug)]
pub struct ViteAssets<R = FsReader, P = NoPackages> {
    config: ViteConfig,
    project_root: PathBuf,
    cache: ManifestCache<R>,
    packages: P,
}

impl ViteAssets {
    /// Assets for `project_root` read from the local file system, without package support.
    pub fn new(config: ViteConfig, project_root: impl Into<PathBuf>) -> Self {
        Self::with_parts(config, project_root, FsReader, NoPackages)
    }
}

impl<R: FileReader, P: PackagePathResolver> ViteAssets<R, P> {
    /// Assets using a custom manifest reader and package resolver.
    pub fn with_parts(
        config: ViteConfig,
        project_root: impl Into<PathBuf>,
        reader: R,
        packages: P,
    ) -> Self {
        Self {
            config,
            project_root: project_root.into(),
            cache: ManifestCache::new(reader),
            packages,
        }
    }

    /// Active configuration.
    pub fn config(&self) -> &ViteConfig {
        &self.config
    }

    /// Manifest cache shared by all lookups.
    pub fn cache(&self) -> &ManifestCache<R> {
        &self.cache
    }

    /// Configured default manifest, resolved against the project root.
    pub fn default_manifest_file(&self) -> PathBuf {
        self.config.default_manifest_path(&self.project_root)
    }

    /// Whether assets should be linked from the dev server.
    pub fn use_dev_server(&self, is_development: bool) -> bool {
        self.config.use_dev_server.is_enabled(is_development)
    }

    /// Dev server for a request from `origin`.
    pub fn determine_dev_server<E: EnvLookup + ?Sized>(
        &self,
        origin: &RequestOrigin,
        env: &E,
    ) -> DevServer {
        determine_dev_server(&self.config.dev_server_uri, origin, env)
    }

    /// Identifier of the only entry point in `manifest_file`.
    pub fn determine_entrypoint_from_manifest(&self, manifest_file: &Path) -> ManifestResult<String> {
        let (_, manifest) = self.load(manifest_file)?;
        determine_sole_entrypoint(&manifest).map(str::to_string)
    }

    /// Tags for a built entry point described by `manifest_file`.
    pub fn tags_from_manifest(
        &self,
        manifest_file: &Path,
        entry: &str,
        options: &TagOptions,
    ) -> ManifestResult<Vec<AssetTag>> {
        let entry = self.normalize(entry)?;
        let (path, manifest) = self.load(manifest_file)?;
        tags_from_manifest(&manifest, &output_dir_for_manifest(&path), &entry, options)
    }

    /// Tags loading `entry` through the dev server.
    pub fn tags_from_dev_server(
        &self,
        server: &DevServer,
        entry: &str,
        options: &TagOptions,
    ) -> ManifestResult<Vec<AssetTag>> {
        let entry = self.normalize(entry)?;
        Ok(tags_from_dev_server(server, &entry, options))
    }

    /// Built output path of `asset` as listed in `manifest_file`.
    pub fn asset_path_from_manifest(&self, manifest_file: &Path, asset: &str) -> ManifestResult<String> {
        let asset = self.normalize(asset)?;
        let (path, manifest) = self.load(manifest_file)?;
        let item = manifest
            .get(&asset)
            .ok_or_else(|| ManifestError::UnknownAsset {
                identifier: asset.clone(),
                label: manifest.label().to_string(),
            })?;
        Ok(output_path(&output_dir_for_manifest(&path), &item.output_file))
    }

    /// URI of `asset` served by the dev server.
    pub fn asset_path_from_dev_server(&self, server: &DevServer, asset: &str) -> ManifestResult<String> {
        let asset = self.normalize(asset)?;
        Ok(server.url_for(&asset))
    }

    fn normalize(&self, identifier: &str) -> ManifestResult<String> {
        normalize_identifier(identifier, &self.packages, &self.project_root)
    }

    fn load(&self, manifest_file: &Path) -> ManifestResult<(PathBuf, Arc<Manifest>)> {
        let absolute = self.project_root.join(manifest_file);
        let path = resolve_manifest_file(self.cache.reader(), &absolute).map_err(|err| match err {
            ManifestError::ManifestNotFound { resolved, .. } => ManifestError::ManifestNotFound {
                requested: manifest_file.to_path_buf(),
                resolved,
            },
            other => other,
        })?;
        if path != absolute {
            debug!(
                requested = %absolute.display(),
                resolved = %path.display(),
                "using legacy manifest location"
            );
        }
        let manifest = self.cache.get_or_load(&path)?;
        Ok((path, manifest))
    }
}
