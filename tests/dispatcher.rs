
use std::sync::Arc;
use tempfile::tempdir;

use smb_opener::error::OpenerError;
use smb_opener::protocol::Outcome;
use test_utils::{dispatcher, FailingMount, PanickingMount, RecordingMount, RecordingOpen};

#[tokio::test]
async fn mounts_then_opens_target() {
    let root = tempdir().unwrap();
    let mount = Arc::new(RecordingMount::new(root.path()).with_files(&["report.pdf"]));
    let (open, _rx) = RecordingOpen::new();
    let open = Arc::new(open);
    let d = dispatcher(root.path(), mount.clone(), open.clone());

    let outcome = d.dispatch("smb://server1/docs/report.pdf").await;
    let expected = root.path().join("docs/report.pdf");
    assert!(matches!(outcome, Outcome::Opened(ref p) if p == &expected), "got {outcome:?}");
    assert_eq!(mount.calls(), vec![("server1".to_string(), "docs".to_string())]);
    assert_eq!(open.opened(), vec![expected]);
}

#[tokio::test]
async fn share_root_is_opened_when_no_path_given() {
    let root = tempdir().unwrap();
    let mount = Arc::new(RecordingMount::new(root.path()));
    let (open, _rx) = RecordingOpen::new();
    let open = Arc::new(open);
    let d = dispatcher(root.path(), mount.clone(), open.clone());

    let outcome = d.dispatch("smb://server1/docs").await;
    assert!(matches!(outcome, Outcome::Opened(_)), "got {outcome:?}");
    assert_eq!(open.opened(), vec![root.path().join("docs")]);
}

#[tokio::test]
async fn existing_mount_point_skips_mount() {
    let root = tempdir().unwrap();
    std::fs::create_dir_all(root.path().join("docs")).unwrap();
    std::fs::write(root.path().join("docs/report.pdf"), b"%PDF").unwrap();

    let mount = Arc::new(RecordingMount::new(root.path()));
    let (open, _rx) = RecordingOpen::new();
    let open = Arc::new(open);
    let d = dispatcher(root.path(), mount.clone(), open.clone());

    let outcome = d.dispatch("smb://server1/docs/report.pdf").await;
    assert!(matches!(outcome, Outcome::Opened(_)), "got {outcome:?}");
    assert!(mount.calls().is_empty(), "mount should not run for a mounted share");
    assert_eq!(open.opened(), vec![root.path().join("docs/report.pdf")]);
}

#[tokio::test]
async fn missing_target_is_not_opened() {
    let root = tempdir().unwrap();
    let mount = Arc::new(RecordingMount::new(root.path()));
    let (open, _rx) = RecordingOpen::new();
    let open = Arc::new(open);
    let d = dispatcher(root.path(), mount.clone(), open.clone());

    let outcome = d.dispatch("smb://server1/docs/nope.txt").await;
    match outcome {
        Outcome::Failed(OpenerError::PathNotFound(path)) => {
            assert_eq!(path, root.path().join("docs/nope.txt"));
        }
        other => panic!("expected PathNotFound, got {other:?}"),
    }
    assert_eq!(mount.calls().len(), 1);
    assert!(open.opened().is_empty());
}

#[tokio::test]
async fn other_schemes_are_ignored() {
    let root = tempdir().unwrap();
    let mount = Arc::new(RecordingMount::new(root.path()));
    let (open, _rx) = RecordingOpen::new();
    let open = Arc::new(open);
    let d = dispatcher(root.path(), mount.clone(), open.clone());

    assert!(matches!(d.dispatch("ftp://server1/docs/a").await, Outcome::Ignored));
    assert!(matches!(d.dispatch("   \r\n").await, Outcome::Empty));
    assert!(mount.calls().is_empty());
    assert!(open.opened().is_empty());
}

#[tokio::test]
async fn malformed_locator_never_mounts() {
    let root = tempdir().unwrap();
    let mount = Arc::new(RecordingMount::new(root.path()));
    let (open, _rx) = RecordingOpen::new();
    let d = dispatcher(root.path(), mount.clone(), Arc::new(open));

    let outcome = d.dispatch("smb://server1/").await;
    assert!(matches!(outcome, Outcome::Failed(OpenerError::MalformedLocator(_))));
    assert!(mount.calls().is_empty());
}

#[tokio::test]
async fn mount_failure_is_contained() {
    let root = tempdir().unwrap();
    let mount = Arc::new(FailingMount::new());
    let (open, _rx) = RecordingOpen::new();
    let open = Arc::new(open);
    let d = dispatcher(root.path(), mount.clone(), open.clone());

    let outcome = d.dispatch("smb://server1/docs/report.pdf").await;
    assert!(matches!(outcome, Outcome::Failed(OpenerError::MountFailure { .. })));
    assert_eq!(*mount.calls.lock().unwrap(), 1);
    assert!(open.opened().is_empty());
}

#[tokio::test]
async fn panic_in_a_stage_is_contained() {
    let root = tempdir().unwrap();
    let (open, _rx) = RecordingOpen::new();
    let d = dispatcher(root.path(), Arc::new(PanickingMount), Arc::new(open));

    let outcome = d.dispatch("smb://server1/docs").await;
    match outcome {
        Outcome::Failed(OpenerError::Unexpected(msg)) => assert!(msg.contains("crashed")),
        other => panic!("expected Unexpected, got {other:?}"),
    }

    // The dispatcher is still usable afterwards.
    assert!(matches!(d.dispatch("http://x").await, Outcome::Ignored));
}

#[tokio::test]
async fn escaped_separators_cannot_leave_the_share() {
    let root = tempdir().unwrap();
    std::fs::create_dir_all(root.path().join("docs")).unwrap();

    let mount = Arc::new(RecordingMount::new(root.path()));
    let (open, _rx) = RecordingOpen::new();
    let open = Arc::new(open);
    let d = dispatcher(root.path(), mount.clone(), open.clone());

    for locator in [
        "smb://server1/docs/%2Fetc%2Fpasswd",
        "smb://server1/docs/sub%2F..%2F..%2F..%2Fetc%2Fpasswd",
        "smb://server1/%2Fetc/passwd",
    ] {
        let outcome = d.dispatch(locator).await;
        assert!(
            matches!(outcome, Outcome::Failed(OpenerError::MalformedLocator(_))),
            "{locator}: got {outcome:?}"
        );
    }
    assert!(mount.calls().is_empty());
    assert!(open.opened().is_empty());
}
