//! Path helpers for locating manifests, their output directories and package-relative assets.

use std::fs;
use std::path::{Component, Path, PathBuf};

use crate::error::{ManifestError, ManifestResult};
use crate::manifest::FileReader;

/// Prefix marking identifiers that point into an installed package.
pub const PACKAGE_PATH_PREFIX: &str = "EXT:";

/// Directory Vite 5+ places the manifest in, below the output directory.
const VITE_METADATA_DIR: &str = ".vite";

/// Resolves `EXT:` package identifiers to absolute file system paths.
pub trait PackagePathResolver {
    /// Resolve `identifier` to an absolute path, or `None` when the package is unknown.
    fn resolve_package_path(&self, identifier: &str) -> Option<PathBuf>;
}

/// Resolver for setups without packages; every lookup fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPackages;

impl PackagePathResolver for NoPackages {
    fn resolve_package_path(&self, _identifier: &str) -> Option<PathBuf> {
        None
    }
}

/// Directory that manifest output files are relative to.
///
/// Vite 5 writes `manifest.json` into `<outDir>/.vite/`, older releases into `<outDir>/`.
pub fn output_dir_for_manifest(manifest_file: &Path) -> PathBuf {
    let parent = manifest_file.parent().unwrap_or_else(|| Path::new(""));
    if parent.file_name().is_some_and(|name| name == VITE_METADATA_DIR) {
        parent.parent().unwrap_or_else(|| Path::new("")).to_path_buf()
    } else {
        parent.to_path_buf()
    }
}

/// Join an output file onto the output directory using forward slashes.
pub fn output_path(output_dir: &Path, file: &str) -> String {
    let dir = output_dir.to_string_lossy().replace('\\', "/");
    let dir = dir.trim_end_matches('/');
    if dir.is_empty() {
        file.to_string()
    } else {
        format!("{dir}/{}", file.trim_start_matches('/'))
    }
}

/// Locate the manifest file, falling back to the layout used before Vite 5.
///
/// `<outDir>/.vite/manifest.json` falls back to `<outDir>/manifest.json`.
pub fn resolve_manifest_file<R: FileReader + ?Sized>(
    reader: &R,
    manifest_file: &Path,
) -> ManifestResult<PathBuf> {
    if reader.is_file(manifest_file) {
        return Ok(manifest_file.to_path_buf());
    }

    if let Some(file_name) = manifest_file.file_name() {
        let legacy = output_dir_for_manifest(manifest_file).join(file_name);
        if reader.is_file(&legacy) {
            return Ok(legacy);
        }
    }

    Err(ManifestError::ManifestNotFound {
        requested: manifest_file.to_path_buf(),
        resolved: manifest_file.to_path_buf(),
    })
}

/// Turn a package identifier into a path relative to the project root.
///
/// Identifiers without the [`PACKAGE_PATH_PREFIX`] are returned unchanged. For package paths the
/// containing directory must exist; symlinks are resolved before relativising.
pub fn normalize_identifier<P: PackagePathResolver + ?Sized>(
    identifier: &str,
    resolver: &P,
    project_root: &Path,
) -> ManifestResult<String> {
    if !identifier.starts_with(PACKAGE_PATH_PREFIX) {
        return Ok(identifier.to_string());
    }

    let missing = || ManifestError::PackagePathMissing {
        identifier: identifier.to_string(),
    };

    let absolute = resolver.resolve_package_path(identifier).ok_or_else(missing)?;
    let file_name = absolute.file_name().ok_or_else(missing)?;
    let dir = absolute
        .parent()
        .and_then(|parent| fs::canonicalize(parent).ok())
        .ok_or_else(missing)?;

    let root = fs::canonicalize(project_root).unwrap_or_else(|_| project_root.to_path_buf());
    let relative_dir = dir
        .strip_prefix(&root)
        .map_err(|_| ManifestError::OutsideProjectRoot {
            identifier: identifier.to_string(),
            root: root.clone(),
        })?;

    let mut segments: Vec<String> = relative_dir
        .components()
        .filter_map(|component| match component {
            Component::Normal(segment) => Some(segment.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();
    segments.push(file_name.to_string_lossy().into_owned());

    Ok(segments.join("/"))
}
