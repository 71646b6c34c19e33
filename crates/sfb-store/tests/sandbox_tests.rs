//! Sandbox resolution and store boundary tests

use sfb_store::{FileStore, Sandbox, StoreError};

fn sandbox() -> (tempfile::TempDir, Sandbox) {
    let dir = tempfile::tempdir().unwrap();
    let sandbox = Sandbox::new(dir.path()).unwrap();
    (dir, sandbox)
}

#[test]
fn rejects_parent_traversal() {
    let (_dir, sandbox) = sandbox();
    assert!(matches!(
        sandbox.resolve("../../etc/passwd"),
        Err(StoreError::InvalidPath { .. })
    ));
    assert!(matches!(
        sandbox.resolve("a/../../outside.txt"),
        Err(StoreError::InvalidPath { .. })
    ));
}

#[test]
fn rejects_absolute_injection() {
    let (_dir, sandbox) = sandbox();
    assert!(matches!(
        sandbox.resolve("/etc/passwd"),
        Err(StoreError::InvalidPath { .. })
    ));
}

#[test]
fn accepts_nested_relative_path() {
    let (dir, sandbox) = sandbox();
    let resolved = sandbox.resolve("a/b.txt").unwrap();
    assert_eq!(resolved, dir.path().canonicalize().unwrap().join("a/b.txt"));
}

#[test]
fn accepts_base_itself_and_inner_dotdot() {
    let (dir, sandbox) = sandbox();
    let base = dir.path().canonicalize().unwrap();
    assert_eq!(sandbox.resolve(".").unwrap(), base);
    assert_eq!(sandbox.resolve("a/../b.txt").unwrap(), base.join("b.txt"));
}

#[test]
fn rejects_sibling_with_common_prefix() {
    let root = tempfile::tempdir().unwrap();
    std::fs::create_dir(root.path().join("fw")).unwrap();
    std::fs::create_dir(root.path().join("fw2")).unwrap();
    let sandbox = Sandbox::new(root.path().join("fw")).unwrap();

    assert!(matches!(
        sandbox.resolve("../fw2/x.hpp"),
        Err(StoreError::InvalidPath { .. })
    ));
}

#[test]
fn empty_path_is_invalid_input() {
    let (_dir, sandbox) = sandbox();
    assert!(matches!(sandbox.resolve("  "), Err(StoreError::InvalidInput(_))));
}

#[cfg(unix)]
#[test]
fn rejects_symlink_escape() {
    let outside = tempfile::tempdir().unwrap();
    let (dir, sandbox) = sandbox();
    std::os::unix::fs::symlink(outside.path(), dir.path().join("link")).unwrap();

    assert!(matches!(
        sandbox.resolve("link/secret.txt"),
        Err(StoreError::InvalidPath { .. })
    ));
}

#[tokio::test]
async fn rejected_write_touches_nothing() {
    let root = tempfile::tempdir().unwrap();
    let base = root.path().join("fw");
    let store = FileStore::new(Sandbox::new(&base).unwrap());

    let err = store.write("../escaped/seq.hpp", "x").await.unwrap_err();
    assert!(matches!(err, StoreError::InvalidPath { .. }));
    assert!(!root.path().join("escaped").exists());
    assert!(!base.exists());
    assert!(store.audit().is_empty());
}

#[tokio::test]
async fn base_is_created_on_first_write() {
    let root = tempfile::tempdir().unwrap();
    let base = root.path().join("firmware");
    let store = FileStore::new(Sandbox::new(&base).unwrap());

    let out = store.write("M5Stampfly/src/direction_sequence.hpp", "x").await.unwrap();
    assert!(base.join("M5Stampfly/src/direction_sequence.hpp").exists());
    assert!(out.path.starts_with(base.canonicalize().unwrap()));
}

#[cfg(unix)]
#[tokio::test]
async fn dangling_symlink_cannot_create_files_outside() {
    let outside = tempfile::tempdir().unwrap();
    let victim = outside.path().join("created.txt");
    let (dir, sandbox) = sandbox();
    std::os::unix::fs::symlink(&victim, dir.path().join("seq.hpp")).unwrap();

    assert!(matches!(
        sandbox.resolve("seq.hpp"),
        Err(StoreError::InvalidPath { .. })
    ));

    let store = FileStore::new(sandbox);
    let err = store.write("seq.hpp", "escaped").await.unwrap_err();
    assert!(matches!(err, StoreError::InvalidPath { .. }));
    assert!(!victim.exists());
    assert!(store.audit().is_empty());
}

#[cfg(unix)]
#[test]
fn dangling_symlink_inside_base_resolves_to_its_target() {
    let (dir, sandbox) = sandbox();
    std::os::unix::fs::symlink("generated/seq.hpp", dir.path().join("seq.hpp")).unwrap();

    let resolved = sandbox.resolve("seq.hpp").unwrap();
    assert_eq!(
        resolved,
        dir.path().canonicalize().unwrap().join("generated/seq.hpp")
    );
}
