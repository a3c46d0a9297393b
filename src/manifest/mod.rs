//! Vite manifest model split into the item schema, the parsed manifest and the reader seam.

mod item;
mod parse;
mod reader;

pub use item::{ManifestItem, is_stylesheet_path};
pub use parse::{DEFAULT_MANIFEST_LABEL, Manifest};
pub use reader::{FileReader, FsReader};
