use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::EnvFilter;
use vite_asset_manifest::paths::{output_dir_for_manifest, resolve_manifest_file};
use vite_asset_manifest::tags::{tags_from_dev_server, tags_from_manifest};
use vite_asset_manifest::{
    AssetKind, DevServer, FsReader, Manifest, TagOptions, css_for_entrypoint,
    determine_sole_entrypoint, imports_for_entrypoint,
};

/// Inspect Vite build manifests
#[derive(Parser)]
#[command(name = "vite-manifest")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Print machine-readable JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the entry points of a manifest
    Entrypoints {
        /// Path to the manifest file
        manifest: PathBuf,
    },

    /// Print the only entry point, failing when there is not exactly one
    Entrypoint {
        /// Path to the manifest file
        manifest: PathBuf,
    },

    /// List the chunks statically imported by an entry point
    Imports {
        /// Path to the manifest file
        manifest: PathBuf,
        /// Entry identifier
        entry: String,
        /// Follow imports transitively
        #[arg(short, long)]
        recursive: bool,
    },

    /// List the stylesheets required by an entry point
    Css {
        /// Path to the manifest file
        manifest: PathBuf,
        /// Entry identifier
        entry: String,
        /// Follow imports transitively
        #[arg(short, long)]
        recursive: bool,
    },

    /// Show the script and stylesheet tags for an entry point
    Tags {
        /// Path to the manifest file
        manifest: PathBuf,
        /// Entry identifier
        entry: String,
        /// Skip stylesheet tags
        #[arg(long)]
        no_css: bool,
        /// Collect stylesheets from nested imports
        #[arg(short, long)]
        recursive: bool,
        /// Link against this dev server instead of built files
        #[arg(long)]
        dev_server: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();

    match cli.command {
        Commands::Entrypoints { manifest } => cmd_entrypoints(&manifest, cli.json),
        Commands::Entrypoint { manifest } => cmd_entrypoint(&manifest, cli.json),
        Commands::Imports {
            manifest,
            entry,
            recursive,
        } => cmd_imports(&manifest, &entry, recursive, cli.json),
        Commands::Css {
            manifest,
            entry,
            recursive,
        } => cmd_css(&manifest, &entry, recursive, cli.json),
        Commands::Tags {
            manifest,
            entry,
            no_css,
            recursive,
            dev_server,
        } => {
            let options = TagOptions {
                add_css: !no_css,
                recursive_css: recursive,
                ..TagOptions::default()
            };
            cmd_tags(&manifest, &entry, &options, dev_server, cli.json)
        }
    }
}

fn load(path: &Path) -> Result<(PathBuf, Manifest)> {
    let resolved = resolve_manifest_file(&FsReader, path)?;
    let manifest = Manifest::load_from_file(&resolved)
        .with_context(|| format!("failed to load manifest {}", resolved.display()))?;
    Ok((resolved, manifest))
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn cmd_entrypoints(path: &Path, json: bool) -> Result<()> {
    let (_, manifest) = load(path)?;
    let entrypoints = manifest.valid_entrypoints();

    if json {
        return print_json(&entrypoints);
    }

    for item in entrypoints {
        println!("{}\t{}", item.identifier, item.output_file);
    }
    Ok(())
}

fn cmd_entrypoint(path: &Path, json: bool) -> Result<()> {
    let (_, manifest) = load(path)?;
    let entry = determine_sole_entrypoint(&manifest)?;

    if json {
        return print_json(entry);
    }

    println!("{entry}");
    Ok(())
}

fn cmd_imports(path: &Path, entry: &str, recursive: bool, json: bool) -> Result<()> {
    let (_, manifest) = load(path)?;
    if !manifest.contains(entry) {
        tracing::warn!(entry, "entry is not part of the manifest");
    }
    let imports = imports_for_entrypoint(&manifest, entry, recursive);

    if json {
        return print_json(&imports);
    }

    for item in imports {
        println!("{}\t{}", item.identifier, item.output_file);
    }
    Ok(())
}

fn cmd_css(path: &Path, entry: &str, recursive: bool, json: bool) -> Result<()> {
    let (_, manifest) = load(path)?;
    if !manifest.contains(entry) {
        tracing::warn!(entry, "entry is not part of the manifest");
    }
    let files = css_for_entrypoint(&manifest, entry, recursive);

    if json {
        return print_json(&files);
    }

    for file in files {
        println!("{file}");
    }
    Ok(())
}

fn cmd_tags(
    path: &Path,
    entry: &str,
    options: &TagOptions,
    dev_server: Option<String>,
    json: bool,
) -> Result<()> {
    let tags = match dev_server {
        Some(uri) => tags_from_dev_server(&DevServer::new(uri), entry, options),
        None => {
            let (resolved, manifest) = load(path)?;
            tags_from_manifest(
                &manifest,
                &output_dir_for_manifest(&resolved),
                entry,
                options,
            )?
        }
    };

    if json {
        return print_json(&tags);
    }

    for tag in tags {
        let kind = match tag.kind {
            AssetKind::Script => "script",
            AssetKind::Stylesheet => "stylesheet",
        };
        println!("{kind}\t{}\t{}", tag.key, tag.uri);
    }
    Ok(())
}
