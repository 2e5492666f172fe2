// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::fs;

#[test]
fn list_skills_returns_empty_for_missing_dir() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope");
    assert!(list_skills(&missing).unwrap().is_empty());
}

#[test]
fn load_strips_frontmatter() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("deploy.md"), "---\ndescription: ship it\n---\nRun the deploy steps.").unwrap();

    let content = load(dir.path(), "deploy").unwrap();
    assert_eq!(content, "Run the deploy steps.");
}

#[test]
fn load_without_frontmatter_is_unchanged() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("plain.md"), "Just some text.").unwrap();

    let content = load(dir.path(), "plain").unwrap();
    assert_eq!(content, "Just some text.");
}

#[test]
fn load_rejects_traversal_names() {
    let dir = tempfile::tempdir().unwrap();
    assert!(load(dir.path(), "../escape").is_err());
    assert!(load(dir.path(), "/abs").is_err());
    assert!(load(dir.path(), "").is_err());
}

#[test]
fn load_unknown_skill_errors() {
    let dir = tempfile::tempdir().unwrap();
    let err = load(dir.path(), "ghost").unwrap_err();
    assert!(matches!(err, ContextError::UnknownSkill(_)));
}

#[test]
fn inject_joins_multiple_blocks() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("a.md"), "alpha").unwrap();
    fs::write(dir.path().join("b.md"), "beta").unwrap();

    let block = inject(dir.path(), &["a".to_string(), "b".to_string()]).unwrap();
    assert_eq!(block, "<skills>\nalpha\n\n---\n\nbeta\n</skills>");
}

#[test]
fn inject_with_no_names_is_empty() {
    let dir = tempfile::tempdir().unwrap();
    assert_eq!(inject(dir.path(), &[]).unwrap(), "");
}

#[test]
fn list_skills_sorted_by_name() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("zeta.md"), "z").unwrap();
    fs::write(dir.path().join("alpha.md"), "a").unwrap();
    fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

    assert_eq!(list_skills(dir.path()).unwrap(), vec!["alpha".to_string(), "zeta".to_string()]);
}
