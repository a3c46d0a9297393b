#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

pub mod cache;
pub mod config;
pub mod dev_server;
pub mod error;
pub mod manifest;
pub mod paths;
pub mod resolver;
pub mod service;
pub mod tags;

pub use cache::ManifestCache;
pub use config::ViteConfig;
pub use dev_server::{DevServer, DevServerMode, DevServerUri, RequestOrigin};
pub use error::{ManifestError, ManifestResult};
pub use manifest::{FileReader, FsReader, Manifest, ManifestItem, is_stylesheet_path};
pub use resolver::{css_for_entrypoint, determine_sole_entrypoint, imports_for_entrypoint};
pub use service::ViteAssets;
pub use tags::{AssetKind, AssetTag, TagAttributes, TagOptions};
