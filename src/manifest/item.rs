use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

fn stylesheet_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\.(css|less|sass|scss|styl|stylus|pcss|postcss)$")
            .expect("invalid stylesheet regex")
    })
}

/// Determine whether a file name refers to a stylesheet or a stylesheet preprocessor source.
///
/// The match is case-sensitive and only considers the final extension, so `app.css.js` is a
/// script while `theme.scss` is a stylesheet.
pub fn is_stylesheet_path(file: &str) -> bool {
    stylesheet_pattern().is_match(file)
}

/// A single chunk or entry point described by a Vite manifest.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestItem {
    /// Key of the item within the manifest.
    #[serde(skip_deserializing)]
    pub identifier: String,
    /// Original source file the item was built from.
    #[serde(rename = "src", default, skip_serializing_if = "Option::is_none")]
    pub source_path: Option<String>,
    /// Chunk name assigned by the bundler, when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Hashed output file relative to the output directory.
    #[serde(rename = "file")]
    pub output_file: String,
    /// Whether the item is a top-level build entry point.
    #[serde(default)]
    pub is_entry: bool,
    /// Whether the item is only reachable through a dynamic import.
    #[serde(default)]
    pub is_dynamic_entry: bool,
    /// Static assets referenced by the item. Not traversed.
    #[serde(default)]
    pub assets: Vec<String>,
    /// Stylesheets emitted for the item.
    #[serde(default)]
    pub css: Vec<String>,
    /// Identifiers of statically imported items.
    #[serde(default)]
    pub imports: Vec<String>,
    /// Identifiers of dynamically imported items. Not traversed.
    #[serde(default)]
    pub dynamic_imports: Vec<String>,
}

impl ManifestItem {
    /// Whether the item's output file is a stylesheet.
    pub fn is_stylesheet(&self) -> bool {
        is_stylesheet_path(&self.output_file)
    }
}
