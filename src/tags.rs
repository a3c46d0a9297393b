//! Planning the ordered script and stylesheet references for an entry point.
//!
//! The planner only produces data. Rendering markup and registering tags with a page is left to
//! the embedding application.

use std::collections::HashSet;
use std::path::Path;

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::dev_server::DevServer;
use crate::error::{ManifestError, ManifestResult};
use crate::manifest::Manifest;
use crate::paths::output_path;
use crate::resolver::imports_for_entrypoint;

/// Key of the dev server client script tag.
const CLIENT_TAG_KEY: &str = "vite";

/// What kind of tag a reference should be emitted as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetKind {
    /// `<script type="module">`.
    Script,
    /// `<link rel="stylesheet">`.
    Stylesheet,
}

/// Ordered HTML attributes for a tag.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagAttributes {
    entries: Vec<(String, String)>,
}

impl TagAttributes {
    /// Empty attribute list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `name` to `value`, replacing an existing value in place.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(existing, _)| *existing == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
        self
    }

    /// Set or drop a boolean attribute such as `async` or `disabled`.
    ///
    /// Enabled flags are written as `name="name"`.
    pub fn flag(&mut self, name: &str, enabled: bool) -> &mut Self {
        if enabled {
            self.set(name, name)
        } else {
            self.entries.retain(|(existing, _)| existing != name);
            self
        }
    }

    /// Value of `name`, if set.
    pub fn get(&self, name: &str) -> Option<&str> {
        self
            .entries
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, value)| value.as_str())
    }

    /// Attributes in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self
            .entries
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    /// Number of attributes.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no attributes are set.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn module_script(overrides: &TagAttributes) -> Self {
        let mut attributes = Self::new();
        attributes.set("type", "module");
        for (name, value) in overrides.iter() {
            attributes.set(name, value);
        }
        attributes
    }
}

impl Serialize for TagAttributes {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, value) in &self.entries {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// A single script or stylesheet reference.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct AssetTag {
    /// Stable key used to de-duplicate registrations.
    pub key: String,
    /// Tag kind.
    pub kind: AssetKind,
    /// URI or path of the referenced file.
    pub uri: String,
    /// Additional HTML attributes.
    pub attributes: TagAttributes,
}

/// Options controlling which tags are produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagOptions {
    /// Emit stylesheet tags for the entry and its imports.
    pub add_css: bool,
    /// Follow imports transitively when collecting stylesheets.
    pub recursive_css: bool,
    /// Attributes added to script tags.
    pub script_attributes: TagAttributes,
    /// Attributes added to stylesheet tags.
    pub css_attributes: TagAttributes,
}

impl Default for TagOptions {
    fn default() -> Self {
        Self {
            add_css: true,
            recursive_css: false,
            script_attributes: TagAttributes::default(),
            css_attributes: TagAttributes::default(),
        }
    }
}

/// Tags for a built entry point, with URIs below `output_dir`.
///
/// The entry must exist and be flagged `isEntry`, otherwise [`ManifestError::UnknownEntry`] is
/// returned. Stylesheets come in link order: the entry itself when it is a stylesheet, then the
/// css of imported chunks, then the entry's own css.
pub fn tags_from_manifest(
    manifest: &Manifest,
    output_dir: &Path,
    entry: &str,
    options: &TagOptions,
) -> ManifestResult<Vec<AssetTag>> {
    let item = manifest
        .get(entry)
        .filter(|item| item.is_entry)
        .ok_or_else(|| ManifestError::UnknownEntry {
            identifier: entry.to_string(),
            label: manifest.label().to_string(),
        })?;

    let mut tags = Vec::new();
    let entry_key = format!("vite:{entry}");

    if !item.is_stylesheet() {
        tags.push(AssetTag {
            key: entry_key.clone(),
            kind: AssetKind::Script,
            uri: output_path(output_dir, &item.output_file),
            attributes: TagAttributes::module_script(&options.script_attributes),
        });
    }

    if !options.add_css {
        return Ok(tags);
    }

    let mut seen: HashSet<&str> = HashSet::new();

    if item.is_stylesheet() {
        seen.insert(item.output_file.as_str());
        tags.push(AssetTag {
            key: entry_key,
            kind: AssetKind::Stylesheet,
            uri: output_path(output_dir, &item.output_file),
            attributes: options.css_attributes.clone(),
        });
    }

    let imported = imports_for_entrypoint(manifest, entry, options.recursive_css);
    let owned_css = imported
        .iter()
        .flat_map(|import| import.css.iter().map(move |file| (import.identifier.as_str(), file)))
        .chain(item.css.iter().map(|file| (entry, file)));

    for (owner, file) in owned_css {
        if !seen.insert(file.as_str()) {
            continue;
        }
        tags.push(AssetTag {
            key: format!("vite:{owner}:{file}"),
            kind: AssetKind::Stylesheet,
            uri: output_path(output_dir, file),
            attributes: options.css_attributes.clone(),
        });
    }

    Ok(tags)
}

/// Tags loading `entry` through the dev server, preceded by the Vite client.
pub fn tags_from_dev_server(server: &DevServer, entry: &str, options: &TagOptions) -> Vec<AssetTag> {
    let attributes = TagAttributes::module_script(&options.script_attributes);
    vec![
        AssetTag {
            key: CLIENT_TAG_KEY.to_string(),
            kind: AssetKind::Script,
            uri: server.client_url(),
            attributes: attributes.clone(),
        },
        AssetTag {
            key: format!("vite:{entry}"),
            kind: AssetKind::Script,
            uri: server.url_for(entry),
            attributes,
        },
    ]
}
