use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::de::{Deserialize, Deserializer, MapAccess, Visitor};
use serde_json::Value;
use tracing::debug;

use crate::error::{ManifestError, ManifestResult};
use crate::manifest::item::{ManifestItem, is_stylesheet_path};
use crate::manifest::reader::{FileReader, FsReader};

/// Label used when parsing manifest text that did not come from a file.
pub const DEFAULT_MANIFEST_LABEL: &str = "manifest.json";

/// Parsed, immutable view of a Vite manifest.
///
/// Items keep the order of the manifest's top-level keys. When a key appears more than once the
/// last value wins but the item keeps the position of its first occurrence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
    label: String,
    items: Vec<ManifestItem>,
    index: HashMap<String, usize>,
}

impl Manifest {
    /// Parse manifest JSON text. `label` names the source in error messages.
    pub fn parse(raw: &str, label: impl Into<String>) -> ManifestResult<Self> {
        Self::parse_slice(raw.as_bytes(), label)
    }

    /// Parse manifest JSON from raw bytes.
    pub fn parse_slice(raw: &[u8], label: impl Into<String>) -> ManifestResult<Self> {
        let label = label.into();
        let entries: OrderedEntries =
            serde_json::from_slice(raw).map_err(|source| ManifestError::InvalidManifest {
                label: label.clone(),
                source,
            })?;

        let mut items: Vec<ManifestItem> = Vec::with_capacity(entries.0.len());
        let mut index = HashMap::with_capacity(entries.0.len());

        for (identifier, value) in entries.0 {
            let mut item: ManifestItem =
                serde_json::from_value(value).map_err(|source| ManifestError::InvalidManifestItem {
                    label: label.clone(),
                    identifier: identifier.clone(),
                    source,
                })?;
            item.identifier = identifier.clone();

            match index.get(&identifier).copied() {
                Some(position) => items[position] = item,
                None => {
                    index.insert(identifier, items.len());
                    items.push(item);
                }
            }
        }

        Ok(Self {
            label,
            items,
            index,
        })
    }

    /// Read and parse a manifest from the local file system.
    pub fn load_from_file(path: &Path) -> ManifestResult<Self> {
        Self::load_with(&FsReader, path)
    }

    /// Read a manifest through the supplied reader and parse it, labelled by its path.
    pub fn load_with<R: FileReader + ?Sized>(reader: &R, path: &Path) -> ManifestResult<Self> {
        let bytes = reader
            .read(path)
            .map_err(|source| ManifestError::ManifestUnreadable {
                path: path.to_path_buf(),
                source,
            })?;
        let manifest = Self::parse_slice(&bytes, path.display().to_string())?;
        debug!(
            path = %path.display(),
            items = manifest.len(),
            "loaded vite manifest"
        );
        Ok(manifest)
    }

    /// Label of the source this manifest was parsed from.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Look up an item by identifier.
    pub fn get(&self, identifier: &str) -> Option<&ManifestItem> {
        self.index.get(identifier).map(|&position| &self.items[position])
    }

    /// Whether the manifest contains `identifier`.
    pub fn contains(&self, identifier: &str) -> bool {
        self.index.contains_key(identifier)
    }

    /// Items flagged as build entry points, in manifest order.
    pub fn valid_entrypoints(&self) -> Vec<&ManifestItem> {
        self.items.iter().filter(|item| item.is_entry).collect()
    }

    /// Whether an item's output is a stylesheet.
    pub fn is_stylesheet(item: &ManifestItem) -> bool {
        is_stylesheet_path(&item.output_file)
    }

    /// All items in manifest order.
    pub fn iter(&self) -> impl Iterator<Item = &ManifestItem> {
        self.items.iter()
    }

    /// Number of distinct items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the manifest has no items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl FromStr for Manifest {
    type Err = ManifestError;

    fn from_str(raw: &str) -> ManifestResult<Self> {
        Self::parse(raw, DEFAULT_MANIFEST_LABEL)
    }
}

/// Top-level manifest object kept as key/value pairs in document order.
struct OrderedEntries(Vec<(String, Value)>);

impl<'de> Deserialize<'de> for OrderedEntries {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct EntriesVisitor;

        impl<'de> Visitor<'de> for EntriesVisitor {
            type Value = OrderedEntries;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a JSON object mapping entry identifiers to manifest items")
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((key, value)) = map.next_entry::<String, Value>()? {
                    entries.push((key, value));
                }
                Ok(OrderedEntries(entries))
            }
        }

        deserializer.deserialize_map(EntriesVisitor)
    }
}
