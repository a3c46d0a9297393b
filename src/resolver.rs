//! Dependency resolution over the static import graph of a manifest.
//!
//! Imports are weak references: an identifier that is missing from the manifest is dropped from
//! the results and never traversed. Recursive traversal keeps a visited set seeded with the entry
//! itself, so cycles terminate and an entry is never reported as its own import. A direct listing
//! reports exactly the entry's `imports`, a self-import included.

use std::collections::{HashSet, VecDeque};

use tracing::debug;

use crate::error::{ManifestError, ManifestResult};
use crate::manifest::{Manifest, ManifestItem};

/// Items statically imported by `entry`, in first-discovery order.
///
/// With `recursive == false` only the entry's direct imports are returned. With
/// `recursive == true` the import graph is walked breadth-first. An unknown entry yields an
/// empty list.
pub fn imports_for_entrypoint<'m>(
    manifest: &'m Manifest,
    entry: &str,
    recursive: bool,
) -> Vec<&'m ManifestItem> {
    let Some(root) = manifest.get(entry) else {
        return Vec::new();
    };

    let mut visited: HashSet<&str> = HashSet::new();
    if recursive {
        visited.insert(root.identifier.as_str());
    }

    let mut queue: VecDeque<&str> = VecDeque::new();
    let mut resolved = Vec::new();

    enqueue_imports(root, &mut visited, &mut queue);

    while let Some(identifier) = queue.pop_front() {
        let Some(item) = manifest.get(identifier) else {
            debug!(
                entry,
                import = identifier,
                manifest = manifest.label(),
                "dropping dangling manifest import"
            );
            continue;
        };

        resolved.push(item);
        if recursive {
            enqueue_imports(item, &mut visited, &mut queue);
        }
    }

    resolved
}

fn enqueue_imports<'m>(
    item: &'m ManifestItem,
    visited: &mut HashSet<&'m str>,
    queue: &mut VecDeque<&'m str>,
) {
    for import in &item.imports {
        if visited.insert(import.as_str()) {
            queue.push_back(import.as_str());
        }
    }
}

/// Stylesheets to link for `entry`: every imported item's css followed by the entry's own css.
///
/// Each file is listed once, at its first occurrence.
pub fn css_for_entrypoint(manifest: &Manifest, entry: &str, recursive: bool) -> Vec<String> {
    let Some(root) = manifest.get(entry) else {
        return Vec::new();
    };

    let mut seen: HashSet<&str> = HashSet::new();
    let mut files = Vec::new();
    let imported = imports_for_entrypoint(manifest, entry, recursive);

    for file in imported
        .iter()
        .flat_map(|item| item.css.iter())
        .chain(root.css.iter())
    {
        if seen.insert(file.as_str()) {
            files.push(file.clone());
        }
    }

    files
}

/// Identifier of the only entry point in the manifest.
///
/// Fails with [`ManifestError::AmbiguousOrMissingEntrypoint`] when the manifest has zero or
/// several entry points.
pub fn determine_sole_entrypoint(manifest: &Manifest) -> ManifestResult<&str> {
    let entrypoints = manifest.valid_entrypoints();
    match entrypoints.as_slice() {
        [only] => Ok(only.identifier.as_str()),
        entries => Err(ManifestError::AmbiguousOrMissingEntrypoint {
            label: manifest.label().to_string(),
            found: entries.len(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identifiers(items: &[&ManifestItem]) -> Vec<String> {
        items.iter().map(|item| item.identifier.clone()).collect()
    }

    const SCENARIO: &str = r#"{
        "Main.js": {
            "file": "assets/Main-4483b920.js",
            "isEntry": true,
            "css": ["assets/Main-973bb662.css"],
            "imports": ["_Shared.js"]
        },
        "_Shared.js": {"file": "assets/Shared.js", "css": ["assets/Shared.css"]}
    }"#;

    const NESTED: &str = r#"{
        "Main.js": {
            "file": "assets/Main.js",
            "isEntry": true,
            "css": ["assets/Main.css"],
            "imports": ["_Shared-To-v4Zbq.js"]
        },
        "_Shared-To-v4Zbq.js": {
            "file": "assets/Shared-To-v4Zbq.js",
            "css": ["assets/Shared-pjWofKK4.css"],
            "imports": ["_Nested-abcdef.js"]
        },
        "_Nested-abcdef.js": {
            "file": "assets/Nested-abcdef.js",
            "css": ["assets/Nested-defghi.css"]
        }
    }"#;

    #[test]
    fn resolves_direct_imports() {
        let manifest = Manifest::parse(SCENARIO, "manifest.json").unwrap();
        let imports = imports_for_entrypoint(&manifest, "Main.js", false);

        assert_eq!(identifiers(&imports), vec!["_Shared.js"]);
        assert_eq!(imports[0].css, vec!["assets/Shared.css"]);
    }

    #[test]
    fn unknown_entry_has_no_imports() {
        let manifest = Manifest::parse(SCENARIO, "manifest.json").unwrap();
        assert!(imports_for_entrypoint(&manifest, "Undefined.js", true).is_empty());
        assert!(css_for_entrypoint(&manifest, "Undefined.js", true).is_empty());
    }

    #[test]
    fn nested_imports_require_recursion() {
        let manifest = Manifest::parse(NESTED, "manifest.json").unwrap();

        let direct = imports_for_entrypoint(&manifest, "Main.js", false);
        assert_eq!(identifiers(&direct), vec!["_Shared-To-v4Zbq.js"]);

        let all = imports_for_entrypoint(&manifest, "Main.js", true);
        assert_eq!(
            identifiers(&all),
            vec!["_Shared-To-v4Zbq.js", "_Nested-abcdef.js"]
        );
    }

    #[test]
    fn import_cycles_terminate() {
        let manifest = Manifest::parse(
            r#"{
                "A.js": {"file": "a.js", "isEntry": true, "imports": ["B.js"]},
                "B.js": {"file": "b.js", "imports": ["A.js", "C.js"]},
                "C.js": {"file": "c.js", "imports": ["B.js"]}
            }"#,
            "cycle.json",
        )
        .unwrap();

        let imports = imports_for_entrypoint(&manifest, "A.js", true);
        assert_eq!(identifiers(&imports), vec!["B.js", "C.js"]);
    }

    #[test]
    fn self_import_is_listed_only_without_recursion() {
        let manifest = Manifest::parse(
            r#"{
                "A.js": {"file": "a.js", "isEntry": true, "imports": ["A.js", "B.js"]},
                "B.js": {"file": "b.js", "imports": ["A.js"]}
            }"#,
            "self.json",
        )
        .unwrap();

        assert_eq!(
            identifiers(&imports_for_entrypoint(&manifest, "A.js", false)),
            vec!["A.js", "B.js"]
        );
        assert_eq!(
            identifiers(&imports_for_entrypoint(&manifest, "A.js", true)),
            vec!["B.js"]
        );
    }

    #[test]
    fn duplicate_imports_keep_first_occurrence() {
        let manifest = Manifest::parse(
            r#"{
                "Main.js": {"file": "main.js", "isEntry": true, "imports": ["B.js", "C.js", "B.js"]},
                "B.js": {"file": "b.js", "imports": ["C.js"]},
                "C.js": {"file": "c.js"}
            }"#,
            "dup.json",
        )
        .unwrap();

        assert_eq!(
            identifiers(&imports_for_entrypoint(&manifest, "Main.js", false)),
            vec!["B.js", "C.js"]
        );
        assert_eq!(
            identifiers(&imports_for_entrypoint(&manifest, "Main.js", true)),
            vec!["B.js", "C.js"]
        );
    }

    #[test]
    fn recursive_walk_is_breadth_first() {
        let manifest = Manifest::parse(
            r#"{
                "Main.js": {"file": "main.js", "isEntry": true, "imports": ["A.js", "B.js"]},
                "A.js": {"file": "a.js", "imports": ["A1.js"]},
                "B.js": {"file": "b.js", "imports": ["B1.js"]},
                "A1.js": {"file": "a1.js"},
                "B1.js": {"file": "b1.js"}
            }"#,
            "bfs.json",
        )
        .unwrap();

        assert_eq!(
            identifiers(&imports_for_entrypoint(&manifest, "Main.js", true)),
            vec!["A.js", "B.js", "A1.js", "B1.js"]
        );
    }

    #[test]
    fn dangling_imports_are_dropped_silently() {
        let manifest = Manifest::parse(
            r#"{
                "Main.js": {"file": "main.js", "isEntry": true, "imports": ["_Gone.js", "_Shared.js"]},
                "_Shared.js": {"file": "shared.js", "imports": ["_AlsoGone.js"], "css": ["shared.css"]}
            }"#,
            "dangling.json",
        )
        .unwrap();

        assert_eq!(
            identifiers(&imports_for_entrypoint(&manifest, "Main.js", false)),
            vec!["_Shared.js"]
        );
        assert_eq!(
            identifiers(&imports_for_entrypoint(&manifest, "Main.js", true)),
            vec!["_Shared.js"]
        );
        assert_eq!(
            css_for_entrypoint(&manifest, "Main.js", true),
            vec!["shared.css"]
        );
    }

    #[test]
    fn dynamic_imports_are_not_traversed() {
        let manifest = Manifest::parse(
            r#"{
                "Main.js": {"file": "main.js", "isEntry": true, "dynamicImports": ["Lazy.js"]},
                "Lazy.js": {"file": "lazy.js", "isDynamicEntry": true, "css": ["lazy.css"]}
            }"#,
            "dynamic.json",
        )
        .unwrap();

        assert!(imports_for_entrypoint(&manifest, "Main.js", true).is_empty());
        assert!(css_for_entrypoint(&manifest, "Main.js", true).is_empty());
    }

    #[test]
    fn collects_imported_css_before_entry_css() {
        let manifest = Manifest::parse(NESTED, "manifest.json").unwrap();

        assert_eq!(
            css_for_entrypoint(&manifest, "Main.js", false),
            vec!["assets/Shared-pjWofKK4.css", "assets/Main.css"]
        );
        assert_eq!(
            css_for_entrypoint(&manifest, "Main.js", true),
            vec![
                "assets/Shared-pjWofKK4.css",
                "assets/Nested-defghi.css",
                "assets/Main.css"
            ]
        );
    }

    #[test]
    fn css_files_are_listed_once() {
        let manifest = Manifest::parse(
            r#"{
                "Main.js": {"file": "main.js", "isEntry": true, "imports": ["A.js", "B.js"], "css": ["shared.css"]},
                "A.js": {"file": "a.js", "css": ["shared.css", "a.css"]},
                "B.js": {"file": "b.js", "css": ["a.css"]}
            }"#,
            "css.json",
        )
        .unwrap();

        assert_eq!(
            css_for_entrypoint(&manifest, "Main.js", false),
            vec!["shared.css", "a.css"]
        );
    }

    #[test]
    fn sole_entrypoint_is_returned() {
        let manifest = Manifest::parse(SCENARIO, "manifest.json").unwrap();
        assert_eq!(determine_sole_entrypoint(&manifest).unwrap(), "Main.js");
    }

    #[test]
    fn sole_entrypoint_requires_exactly_one() {
        let none = Manifest::parse(r#"{"_Shared.js": {"file": "shared.js"}}"#, "none.json").unwrap();
        match determine_sole_entrypoint(&none).unwrap_err() {
            ManifestError::AmbiguousOrMissingEntrypoint { found, .. } => assert_eq!(found, 0),
            other => panic!("unexpected error: {other:?}"),
        }

        let two = Manifest::parse(
            r#"{
                "Main.js": {"file": "main.js", "isEntry": true},
                "Alt.js": {"file": "alt.js", "isEntry": true}
            }"#,
            "two.json",
        )
        .unwrap();
        match determine_sole_entrypoint(&two).unwrap_err() {
            ManifestError::AmbiguousOrMissingEntrypoint { found, label } => {
                assert_eq!(found, 2);
                assert_eq!(label, "two.json");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
