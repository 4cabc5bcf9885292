//! Integration tests for sem-engine
//!
//! End-to-end behavior across modules: git bridge → plugins → matcher →
//! report, plus the store and the blame/history walkers. Repositories are
//! built on the fly with tempfile and the real git binary.

mod common;

use common::TestRepo;

use sem_engine::{
    blame_file, compute_semantic_diff, create_default_registry, detect_scope, entity_history,
    get_changed_files, match_entities, ChangeFilter, ChangeType, DiffReport, DiffScope,
    SemDatabase,
};

// ---------------------------------------------------------------------------
// Git bridge → orchestrator
// ---------------------------------------------------------------------------

#[test]
fn test_working_tree_modification_is_reported() {
    let repo = TestRepo::with_git();
    repo.add_file("src/app.ts", "function greet() { return 'hi'; }\n");
    repo.commit("initial");
    repo.add_file("src/app.ts", "function greet() { return 'hello'; }\n");

    let scope = detect_scope(Some(repo.path())).unwrap();
    assert_eq!(scope, DiffScope::Working);

    let files = get_changed_files(&scope, Some(repo.path())).unwrap();
    assert_eq!(files.len(), 1);

    let registry = create_default_registry();
    let result = compute_semantic_diff(&files, &registry, None, None);
    assert_eq!(result.modified_count, 1);
    assert_eq!(result.changes[0].entity_name, "greet");
    assert_eq!(
        result.changes[0].before_content.as_deref(),
        Some("function greet() { return 'hi'; }")
    );
}

#[test]
fn test_untracked_file_surfaces_as_added() {
    let repo = TestRepo::with_git();
    repo.add_file("keep.ts", "function keep() {}\n");
    repo.commit("initial");
    repo.add_file("fresh.ts", "function fresh() { return 1; }\n");

    let scope = detect_scope(Some(repo.path())).unwrap();
    assert_eq!(scope, DiffScope::Working);

    let files = get_changed_files(&scope, Some(repo.path())).unwrap();
    assert_eq!(files.len(), 1);
    assert_eq!(files[0].file_path, "fresh.ts");

    let registry = create_default_registry();
    let result = compute_semantic_diff(&files, &registry, None, None);
    assert_eq!(result.added_count, 1);
}

#[test]
fn test_staged_scope_wins_over_working() {
    let repo = TestRepo::with_git();
    repo.add_file("a.ts", "function a() { return 1; }\n");
    repo.commit("initial");
    repo.add_file("a.ts", "function a() { return 2; }\n");
    repo.git(&["add", "-A"]);

    let scope = detect_scope(Some(repo.path())).unwrap();
    assert_eq!(scope, DiffScope::Staged);

    let files = get_changed_files(&scope, Some(repo.path())).unwrap();
    let registry = create_default_registry();
    let result = compute_semantic_diff(&files, &registry, None, None);
    assert_eq!(result.modified_count, 1);
}

#[test]
fn test_commit_scope_diffs_against_parent() {
    let repo = TestRepo::with_git();
    repo.add_file("lib.ts", "function one() { return 1; }\n");
    repo.commit("first");
    repo.add_file(
        "lib.ts",
        "function one() { return 1; }\nfunction two() { return 2; }\n",
    );
    repo.commit("second");
    let sha = repo.head_sha();

    let scope = DiffScope::Commit { sha: sha.clone() };
    let files = get_changed_files(&scope, Some(repo.path())).unwrap();
    let registry = create_default_registry();
    let result = compute_semantic_diff(&files, &registry, Some(&sha), Some("Test User"));

    assert_eq!(result.added_count, 1);
    assert_eq!(result.changes[0].entity_name, "two");
    assert_eq!(result.changes[0].commit_sha.as_deref(), Some(sha.as_str()));
}

#[test]
fn test_git_rename_classifies_surviving_entities_as_moved() {
    let repo = TestRepo::with_git();
    repo.add_file("old.ts", "function survivor() { return 42; }\n");
    repo.commit("initial");
    repo.git_mv("old.ts", "new.ts");
    repo.commit("rename");
    let sha = repo.head_sha();

    let files =
        get_changed_files(&DiffScope::Commit { sha }, Some(repo.path())).unwrap();
    assert_eq!(files.len(), 1);
    assert_eq!(files[0].old_file_path.as_deref(), Some("old.ts"));

    let registry = create_default_registry();
    let result = compute_semantic_diff(&files, &registry, None, None);
    assert_eq!(result.moved_count, 1);
    assert_eq!(result.changes[0].old_file_path.as_deref(), Some("old.ts"));
    assert_eq!(result.changes[0].file_path, "new.ts");
}

#[test]
fn test_range_scope() {
    let repo = TestRepo::with_git();
    repo.add_file("a.md", "# One\n\nfirst\n");
    repo.commit("first");
    let from = repo.head_sha();
    repo.add_file("a.md", "# One\n\nfirst edited\n");
    repo.commit("second");
    let to = repo.head_sha();

    let files = get_changed_files(&DiffScope::Range { from, to }, Some(repo.path())).unwrap();
    let registry = create_default_registry();
    let result = compute_semantic_diff(&files, &registry, None, None);
    assert_eq!(result.modified_count, 1);
    assert_eq!(result.changes[0].entity_type, "heading");
}

#[test]
fn test_state_dir_is_filtered_from_diffs() {
    let repo = TestRepo::with_git();
    repo.add_file("tracked.ts", "function t() {}\n");
    repo.commit("initial");
    repo.add_file(".sem/sem.db", "not a real database");
    repo.add_file("visible.ts", "function v() {}\n");

    let files = get_changed_files(&DiffScope::Working, Some(repo.path())).unwrap();
    let paths: Vec<&str> = files.iter().map(|f| f.file_path.as_str()).collect();
    assert!(paths.contains(&"visible.ts"));
    assert!(!paths.iter().any(|p| p.starts_with(".sem/")));
}

// ---------------------------------------------------------------------------
// Spec scenarios over config formats
// ---------------------------------------------------------------------------

#[test]
fn test_json_property_change_scenario() {
    let registry = create_default_registry();
    let plugin = registry.get_plugin("config.json").unwrap();
    let before = plugin.extract_entities("{\"version\": \"1.0.0\"}", "config.json");
    let after = plugin.extract_entities(
        "{\"version\": \"2.0.0\", \"logLevel\": \"info\"}",
        "config.json",
    );

    let result = match_entities(&before, &after, "config.json", None, None, None);
    assert_eq!(result.changes.len(), 2);
    assert_eq!(result.changes[0].change_type, ChangeType::Modified);
    assert_eq!(result.changes[0].entity_name, "/version");
    assert_eq!(result.changes[1].change_type, ChangeType::Added);
    assert_eq!(result.changes[1].entity_name, "/logLevel");
}

#[test]
fn test_yaml_nested_addition_scenario() {
    let registry = create_default_registry();
    let plugin = registry.get_plugin("config.yaml").unwrap();
    let before = plugin.extract_entities("server:\n  host: localhost\n", "config.yaml");
    let after = plugin.extract_entities(
        "server:\n  host: 0.0.0.0\ndatabase:\n  pool_size: 10\n",
        "config.yaml",
    );

    let result = match_entities(&before, &after, "config.yaml", None, None, None);
    let by_name = |name: &str| {
        result
            .changes
            .iter()
            .find(|c| c.entity_name == name)
            .unwrap_or_else(|| panic!("no change for {name}"))
    };
    assert_eq!(by_name("server.host").change_type, ChangeType::Modified);
    assert_eq!(by_name("database").change_type, ChangeType::Added);
    assert_eq!(by_name("database.pool_size").change_type, ChangeType::Added);
    let added = result
        .changes
        .iter()
        .filter(|c| c.change_type == ChangeType::Added)
        .count();
    assert_eq!(added, 2);
}

#[test]
fn test_csv_row_change_end_to_end() {
    let registry = create_default_registry();
    let plugin = registry.get_plugin("data.csv").unwrap();
    let before = plugin.extract_entities("id,name\n1,Ada\n2,Grace\n", "data.csv");
    let after = plugin.extract_entities("id,name\n1,Ada Lovelace\n2,Grace\n", "data.csv");

    let result = match_entities(&before, &after, "data.csv", None, None, None);
    assert_eq!(result.changes.len(), 1);
    assert_eq!(result.changes[0].change_type, ChangeType::Modified);
    assert_eq!(result.changes[0].entity_name, "row[1]");
}

// ---------------------------------------------------------------------------
// Determinism
// ---------------------------------------------------------------------------

#[test]
fn test_full_diff_is_byte_identical_across_runs() {
    let repo = TestRepo::with_git();
    repo.add_file("app.ts", "function a() { return 1; }\nfunction b() { return 2; }\n");
    repo.add_file("config.json", "{\"version\": \"1.0.0\", \"debug\": false}");
    repo.add_file("notes.md", "# Notes\n\nsome text\n");
    repo.commit("initial");
    repo.add_file("app.ts", "function a() { return 10; }\nfunction c() { return 3; }\n");
    repo.add_file("config.json", "{\"version\": \"2.0.0\", \"debug\": false}");

    let registry = create_default_registry();
    let render = || {
        let files = get_changed_files(&DiffScope::Working, Some(repo.path())).unwrap();
        let result = compute_semantic_diff(&files, &registry, None, None);
        DiffReport::new(&result).to_json()
    };

    let first = render();
    let second = render();
    assert_eq!(first, second);

    let parsed: serde_json::Value = serde_json::from_str(&first).unwrap();
    assert!(parsed["summary"]["total"].as_u64().unwrap() > 0);
}

// ---------------------------------------------------------------------------
// Store round-trips through real extraction
// ---------------------------------------------------------------------------

#[test]
fn test_extracted_entities_round_trip_through_store() {
    let registry = create_default_registry();
    let plugin = registry.get_plugin("app.ts").unwrap();
    let entities = plugin.extract_entities(
        "function a() { return 1; }\nclass B {\n  run() {}\n}\n",
        "app.ts",
    );
    assert!(!entities.is_empty());

    let dir = tempfile::tempdir().unwrap();
    let mut db = SemDatabase::open(&dir.path().join(".sem").join("sem.db")).unwrap();
    db.upsert_entities(&entities, "current", None).unwrap();

    let read = db.get_entities("current", None).unwrap();
    assert_eq!(read.len(), entities.len());
    for entity in &entities {
        let stored = read.iter().find(|e| e.id == entity.id).unwrap();
        assert_eq!(stored.content, entity.content);
        assert_eq!(stored.content_hash, entity.content_hash);
        assert_eq!(stored.parent_id, entity.parent_id);
    }
}

#[test]
fn test_recorded_diff_is_queryable() {
    let registry = create_default_registry();
    let plugin = registry.get_plugin("a.ts").unwrap();
    let before = plugin.extract_entities("function f() { return 1; }\n", "a.ts");
    let after = plugin.extract_entities("function f() { return 2; }\n", "a.ts");
    let result = match_entities(&before, &after, "a.ts", None, Some("abc123"), None);

    let mut db = SemDatabase::open_in_memory().unwrap();
    db.record_changes(&result.changes).unwrap();

    let stored = db
        .get_changes(&ChangeFilter {
            commit_sha: Some("abc123".to_string()),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].change_type, ChangeType::Modified);

    let rows = db
        .query("SELECT entity_name, change_type FROM changes")
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(
        rows[0].get("entity_name"),
        Some(&serde_json::Value::String("f".to_string()))
    );
}

// ---------------------------------------------------------------------------
// Blame and history
// ---------------------------------------------------------------------------

#[test]
fn test_blame_attributes_entities_to_the_right_commits() {
    let repo = TestRepo::with_git();
    repo.add_file(
        "lib.ts",
        "function stable() { return 1; }\nfunction edited() { return 2; }\n",
    );
    repo.commit("first");
    let first_sha = repo.head_sha();
    repo.add_file(
        "lib.ts",
        "function stable() { return 1; }\nfunction edited() { return 20; }\n",
    );
    repo.commit("second");
    let second_sha = repo.head_sha();

    let registry = create_default_registry();
    let results = blame_file(repo.path(), "lib.ts", &registry, 10).unwrap();
    assert_eq!(results.len(), 2);

    let stable = results.iter().find(|b| b.name == "stable").unwrap();
    let edited = results.iter().find(|b| b.name == "edited").unwrap();
    assert_eq!(stable.commit.as_ref().unwrap().sha, first_sha);
    assert_eq!(edited.commit.as_ref().unwrap().sha, second_sha);
}

#[test]
fn test_blame_marks_uncommitted_entities() {
    let repo = TestRepo::with_git();
    repo.add_file("lib.ts", "function old() { return 1; }\n");
    repo.commit("first");
    repo.add_file(
        "lib.ts",
        "function old() { return 1; }\nfunction brand_new() { return 2; }\n",
    );

    let registry = create_default_registry();
    let results = blame_file(repo.path(), "lib.ts", &registry, 10).unwrap();
    let fresh = results.iter().find(|b| b.name == "brand_new").unwrap();
    assert!(fresh.commit.is_none());
}

#[test]
fn test_history_records_added_then_modified() {
    let repo = TestRepo::with_git();
    repo.add_file("util.ts", "function pad() { return ' '; }\n");
    repo.commit("introduce pad");
    let added_sha = repo.head_sha();
    repo.add_file("util.ts", "function pad() { return '  '; }\n");
    repo.commit("widen pad");
    let modified_sha = repo.head_sha();

    let registry = create_default_registry();
    let history = entity_history(
        repo.path(),
        "util.ts::function::pad",
        &registry,
        10,
    )
    .unwrap();

    assert_eq!(history.file_path, "util.ts");
    assert_eq!(history.events.len(), 2);
    // Newest first: the modification, then the introduction
    assert_eq!(history.events[0].change_type, ChangeType::Modified);
    assert_eq!(history.events[0].commit.sha, modified_sha);
    assert_eq!(history.events[1].change_type, ChangeType::Added);
    assert_eq!(history.events[1].commit.sha, added_sha);
}

#[test]
fn test_history_resolves_bare_names() {
    let repo = TestRepo::with_git();
    repo.add_file("a.ts", "function solo() { return 1; }\n");
    repo.commit("add solo");

    let registry = create_default_registry();
    let history = entity_history(repo.path(), "solo", &registry, 10).unwrap();
    assert_eq!(history.entity_id, "a.ts::function::solo");
    assert_eq!(history.events.len(), 1);
    assert_eq!(history.events[0].change_type, ChangeType::Added);
}

#[test]
fn test_history_unknown_entity_errors() {
    let repo = TestRepo::with_git();
    repo.add_file("a.ts", "function f() {}\n");
    repo.commit("initial");

    let registry = create_default_registry();
    let result = entity_history(repo.path(), "does_not_exist", &registry, 10);
    assert!(result.is_err());
}
