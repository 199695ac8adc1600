//! Integration tests for chains, stages and directory walks

use std::fs;
use std::path::{Path, PathBuf};

use rstest::rstest;
use splash::prelude::*;
use splash::{BuiltinTransform, FileKind};

/// Chain with its own registry so tests never share mutable state.
fn chain() -> Chain {
    Chain::with_registry(TransformRegistry::with_defaults().into_shared())
}

fn joined<S: Sequence>(sequence: &S) -> String {
    sequence
        .to_array()
        .expect("sequence to materialize")
        .iter()
        .map(|item| item.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

/// A small project tree:
///
/// ```text
/// root/
///   Cargo.toml
///   src/main.rs
///   src/util/mod.rs
///   src/util/strings.rs
///   docs/guide.md
/// ```
fn project_tree() -> tempfile::TempDir {
    let dir = tempfile::tempdir().expect("create tempdir");
    let root = dir.path();
    fs::create_dir_all(root.join("src/util")).unwrap();
    fs::create_dir_all(root.join("docs")).unwrap();
    fs::write(root.join("Cargo.toml"), "[package]\n").unwrap();
    fs::write(root.join("src/main.rs"), "fn main() {}\n").unwrap();
    fs::write(root.join("src/util/mod.rs"), "mod strings;\n").unwrap();
    fs::write(root.join("src/util/strings.rs"), "\n").unwrap();
    fs::write(root.join("docs/guide.md"), "# guide\n").unwrap();
    dir
}

fn relative(items: Vec<Item>, root: &Path) -> Vec<String> {
    items
        .iter()
        .map(|item| {
            let path = item.as_path().expect("walk item to carry a path");
            path.strip_prefix(root)
                .expect("walk item under root")
                .to_string_lossy()
                .replace('\\', "/")
        })
        .collect()
}

#[rstest]
#[case::by_value(Comparison::values([4]), DiffMode::Value)]
#[case::by_key(Comparison::keyed([(3usize, "delete")]), DiffMode::Key)]
#[case::by_key_array(Comparison::values([3]), DiffMode::KeyArray)]
fn test_diff_drops_the_fourth_element(#[case] comparison: Comparison, #[case] mode: DiffMode) {
    let mut chain = chain();
    chain.push_all([1, 2, 3, 4]);
    let diffed = chain.diff(comparison, mode);
    assert_eq!(joined(&diffed), "1 2 3");
}

#[test]
fn test_counting() {
    assert_eq!(chain().count().unwrap(), 0);

    let mut filled = chain();
    filled.append_array(vec!["x"; 7]);
    assert_eq!(filled.count().unwrap(), 7);

    let mut pushed = chain();
    pushed.push(1).push(1).push(1);
    assert_eq!(pushed.count().unwrap(), 3);
}

#[test]
fn test_splash_constructors_agree() {
    let from_macro = splash!["a", "b", "c"];
    let from_fn = splash::splash(["a", "b", "c"]);
    assert_eq!(from_macro.to_array().unwrap(), from_fn.to_array().unwrap());
}

#[test]
fn test_recursive_walk_then_regex_finds_one_file() {
    let tree = project_tree();
    let root = tree.path().canonicalize().unwrap();

    let mut chain = chain();
    chain.push(root.clone());
    let found = chain
        .recursive_directory(WalkFlags::CURRENT_AS_PATHNAME)
        .regex(r"(?:^|/)strings\.rs$", RegexMode::Match)
        .to_array()
        .unwrap();

    assert_eq!(found.len(), 1);
    let hit = found[0].as_path().unwrap().canonicalize().unwrap();
    assert_eq!(hit, root.join("src/util/strings.rs"));
}

#[test]
fn test_recursive_walk_lists_every_leaf() {
    let tree = project_tree();
    let mut chain = chain();
    chain.push(tree.path());
    let leaves = chain
        .recursive_directory(WalkFlags::CURRENT_AS_PATHNAME)
        .to_array()
        .unwrap();
    insta::assert_snapshot!(
        relative(leaves, tree.path()).join(" "),
        @"Cargo.toml docs/guide.md src/main.rs src/util/mod.rs src/util/strings.rs"
    );
}

#[test]
fn test_append_recursive_directory_yields_file_info() {
    let tree = project_tree();
    let mut chain = chain();
    chain.append_recursive_directory(tree.path());

    let items = chain.to_array().unwrap();
    assert_eq!(items.len(), 5);
    for item in &items {
        let info = item.as_file().expect("file info");
        assert_eq!(info.kind, FileKind::File);
        assert!(info.path.starts_with(tree.path()));
    }
}

#[test]
fn test_append_directory_yields_direct_children() {
    let tree = project_tree();
    let mut chain = chain();
    chain.append_directory(tree.path());

    let items = chain.to_array().unwrap();
    let names: Vec<&str> = items
        .iter()
        .map(|item| item.as_file().and_then(|info| info.file_name()).unwrap())
        .collect();
    assert_eq!(names, ["Cargo.toml", "docs", "src"]);
    assert!(items[1].as_file().unwrap().is_dir());
}

#[test]
fn test_directory_sources_mix_with_literals() {
    let tree = project_tree();
    let mut chain = chain();
    chain
        .push("first")
        .append_directory_with(tree.path().join("docs"), true, WalkFlags::CURRENT_AS_PATHNAME)
        .push("last");

    assert_eq!(chain.len_sources(), 3);
    let items = chain.to_array().unwrap();
    assert_eq!(items.len(), 3);
    assert_eq!(items[0], Item::from("first"));
    assert_eq!(items[1], Item::Path(tree.path().join("docs/guide.md")));
    assert_eq!(items[2], Item::from("last"));
}

#[test]
fn test_unique_walk_of_repeated_root() {
    let tree = project_tree();
    let mut chain = chain();
    chain.push(tree.path()).push(tree.path());

    let unique = chain.unique().recursive_directory(WalkFlags::CURRENT_AS_PATHNAME);
    assert_eq!(unique.count().unwrap(), 5);

    let doubled = chain.recursive_directory(WalkFlags::CURRENT_AS_PATHNAME);
    assert_eq!(doubled.count().unwrap(), 10);
    assert_eq!(doubled.unique().count().unwrap(), 5);
}

#[test]
fn test_unique_file_items_from_overlapping_roots() {
    let tree = project_tree();
    let mut chain = chain();
    chain.push(tree.path()).push(tree.path().join("src"));

    let mains = chain
        .recursive_directory(WalkFlags::empty())
        .unique()
        .regex(r"(?:^|/)main\.rs$", RegexMode::Match);
    let found = mains.to_array().unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(
        found[0].as_file().map(|info| info.path.clone()),
        Some(tree.path().join("src/main.rs"))
    );

    let every = chain.recursive_directory(WalkFlags::empty()).unique();
    assert_eq!(every.count().unwrap(), 5);
}

#[test]
fn test_shallow_walk_then_pathnames() {
    let tree = project_tree();
    let mut chain = chain();
    chain.push(tree.path());
    let paths = chain
        .directory(WalkFlags::empty())
        .pathnames()
        .to_array()
        .unwrap();
    assert_eq!(relative(paths, tree.path()), ["Cargo.toml", "docs", "src"]);
}

#[test]
fn test_walk_keys_by_filename() {
    let tree = project_tree();
    let mut chain = chain();
    chain.push(tree.path().join("src/util"));
    let keys: Vec<Key> = chain
        .recursive_directory(WalkFlags::KEY_AS_FILENAME)
        .to_entries()
        .unwrap()
        .into_iter()
        .map(|entry| entry.key)
        .collect();
    assert_eq!(keys, [Key::from("mod.rs"), Key::from("strings.rs")]);
}

#[test]
fn test_walk_of_missing_root_fails_on_pull() {
    let tree = project_tree();
    let mut chain = chain();
    chain.push(tree.path().join("nope"));
    let view = chain.recursive_directory(WalkFlags::empty());
    assert!(matches!(view.count(), Err(SplashError::Filesystem { .. })));
}

#[test]
fn test_walk_of_non_path_item_is_invalid() {
    let mut chain = chain();
    chain.push(7);
    let view = chain.directory(WalkFlags::empty());
    assert!(matches!(view.count(), Err(SplashError::InvalidArgument(_))));
}

#[test]
fn test_walk_sees_files_created_after_building() {
    let tree = project_tree();
    let mut chain = chain();
    chain.push(tree.path().join("docs"));
    let view = chain.recursive_directory(WalkFlags::CURRENT_AS_PATHNAME);
    assert_eq!(view.count().unwrap(), 1);

    fs::write(tree.path().join("docs/later.md"), "\n").unwrap();
    assert_eq!(view.count().unwrap(), 2);
}

#[rstest]
#[case("inverseregex")]
#[case("InverseRegex")]
#[case("INVERSEREGEX")]
fn test_registry_names_are_case_insensitive(#[case] name: &str) {
    let mut chain = chain();
    chain.push_all(["src/main.rs", "README.md"]);
    let view = chain.apply_with(name, StageArgs::new().pattern(r"\.md$"));
    assert_eq!(joined(&view), "src/main.rs");
}

#[rstest]
#[case::regex("regex", "a.rs a.rs a.rs")]
#[case::unique("unique", "a.rs b.md")]
fn test_builtin_names_resolve_without_registration(#[case] name: &str, #[case] expected: &str) {
    let registry = TransformRegistry::new().into_shared();
    let mut chain = Chain::with_registry(registry);
    chain.push_all(["a.rs", "b.md", "a.rs", "a.rs"]);
    let view = chain.apply_with(name, StageArgs::new().pattern(r"\.rs$"));
    assert_eq!(joined(&view), expected);
}

#[test]
fn test_registered_stage_is_used_by_name() {
    let mut registry = TransformRegistry::with_defaults();
    registry.register_transform(
        "rust-only",
        splash::filter_fn("rust-only", |entry| entry.value.to_string().ends_with(".rs")),
    );
    let mut chain = Chain::with_registry(registry.into_shared());
    chain.push_all(["lib.rs", "notes.txt", "main.rs"]);
    assert_eq!(joined(&chain.apply("Rust-Only")), "lib.rs main.rs");
}

#[test]
fn test_alias_points_at_builtin() {
    let mut registry = TransformRegistry::new();
    registry.alias("dedupe", BuiltinTransform::Unique);
    let mut chain = Chain::with_registry(registry.into_shared());
    chain.push_all([1, 1, 2, 1]);
    assert_eq!(joined(&chain.apply("dedupe")), "1 2");
}

#[test]
fn test_regex_get_match_replaces_items() {
    let mut chain = chain();
    chain.push_all(["v1.2.3", "latest", "v10.0.0"]);
    let versions = chain.regex(r"\d+\.\d+\.\d+", RegexMode::GetMatch);
    assert_eq!(joined(&versions), "1.2.3 10.0.0");
}

#[test]
fn test_bad_pattern_surfaces_on_pull() {
    let mut chain = chain();
    chain.push("anything");
    let view = chain.regex("(unclosed", RegexMode::Match);
    match view.count() {
        Err(SplashError::InvalidArgument(message)) => assert!(message.contains("(unclosed")),
        other => panic!("Expected InvalidArgument, got {:?}", other),
    }
}

#[test]
fn test_long_pipeline_over_tree() {
    let tree = project_tree();
    let mut chain = chain();
    chain.push(tree.path()).push(tree.path());

    let rust_sources = chain
        .recursive_directory(WalkFlags::CURRENT_AS_PATHNAME)
        .unique()
        .regex(r"\.rs$", RegexMode::Match)
        .inverse_regex(r"(?:^|/)mod\.rs$");
    let found = relative(rust_sources.to_array().unwrap(), tree.path());
    assert_eq!(found, ["src/main.rs", "src/util/strings.rs"]);

    let mut by_loop = Vec::new();
    for item in &rust_sources {
        by_loop.push(item.unwrap());
    }
    assert_eq!(relative(by_loop, tree.path()), found);
}

#[test]
fn test_default_chain_is_one_instance() {
    let marker = PathBuf::from("default-chain-marker");
    let before = go().len_sources();
    go().push(marker.clone());
    let guard = go();
    assert_eq!(guard.len_sources(), before + 1);
    assert!(guard
        .to_array()
        .unwrap()
        .contains(&Item::Path(marker)));
}
