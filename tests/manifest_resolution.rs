use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::thread;

use tempfile::tempdir;
use vite_asset_manifest::{
    Manifest, ManifestCache, ManifestError, ViteAssets, ViteConfig, css_for_entrypoint,
    determine_sole_entrypoint, imports_for_entrypoint,
};

const SCENARIO: &str = r#"{
    "Main.js": {
        "file": "assets/Main-4483b920.js",
        "isEntry": true,
        "css": ["assets/Main-973bb662.css"],
        "imports": ["_Shared.js"]
    },
    "_Shared.js": {"file": "assets/Shared.js", "css": ["assets/Shared.css"]}
}"#;

#[test]
fn resolves_entrypoint_scenario() {
    let manifest = Manifest::parse(SCENARIO, "manifest.json").unwrap();

    assert_eq!(
        manifest.get("Main.js").unwrap().output_file,
        "assets/Main-4483b920.js"
    );

    let entrypoints: Vec<&str> = manifest
        .valid_entrypoints()
        .iter()
        .map(|item| item.identifier.as_str())
        .collect();
    assert_eq!(entrypoints, vec!["Main.js"]);
    assert_eq!(determine_sole_entrypoint(&manifest).unwrap(), "Main.js");

    let imports = imports_for_entrypoint(&manifest, "Main.js", false);
    assert_eq!(imports.len(), 1);
    assert_eq!(imports[0].identifier, "_Shared.js");
    assert_eq!(imports[0].css, vec!["assets/Shared.css"]);

    assert_eq!(css_for_entrypoint(&manifest, "Main.js", true), vec![
        "assets/Shared.css",
        "assets/Main-973bb662.css"
    ]);
}

#[test]
fn shared_manifest_is_readable_from_many_threads() {
    let manifest = Arc::new(Manifest::parse(SCENARIO, "manifest.json").unwrap());

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let manifest = Arc::clone(&manifest);
            thread::spawn(move || css_for_entrypoint(&manifest, "Main.js", true))
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap().len(), 2);
    }
}

#[test]
fn cache_shares_one_manifest_across_threads() {
    let temp = tempdir().expect("failed to create temp dir");
    let path = temp.path().join("manifest.json");
    fs::write(&path, SCENARIO).expect("failed to write manifest");

    let cache: ManifestCache = ManifestCache::default();
    let (cache_ref, path_ref) = (&cache, path.as_path());
    let loaded: Vec<Arc<Manifest>> = thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| scope.spawn(move || cache_ref.get_or_load(path_ref).unwrap()))
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .collect()
    });

    assert!(loaded.windows(2).all(|pair| Arc::ptr_eq(&pair[0], &pair[1])));
    assert_eq!(cache.len(), 1);
}

#[test]
fn service_reports_missing_manifest() {
    let temp = tempdir().expect("failed to create temp dir");
    let assets = ViteAssets::new(ViteConfig::default(), temp.path());

    let err = assets
        .determine_entrypoint_from_manifest(Path::new("build/.vite/manifest.json"))
        .unwrap_err();
    assert!(matches!(err, ManifestError::ManifestNotFound { .. }));
}
