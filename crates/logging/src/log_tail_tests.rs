use super::*;
use std::io::Write as _;
use std::sync::{Arc, Mutex};
use tempfile::tempdir;

fn cfg(buffer_size: usize) -> LogTailConfig {
    LogTailConfig {
        file_wait_timeout: Duration::from_millis(200),
        poll_interval: Duration::from_millis(10),
        buffer_size,
    }
}

#[tokio::test]
async fn fails_when_file_never_appears() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("never.log");
    let err = follow(&path, 0, cfg(1024), |_, _| {}).await.unwrap_err();
    assert!(matches!(err, LogTailError::TimedOutWaitingForFile(_)));
}

#[tokio::test]
async fn rejects_negative_offset() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("a.log");
    std::fs::write(&path, b"hello\n").expect("write");
    let err = follow(&path, -1, cfg(1024), |_, _| {}).await.unwrap_err();
    assert!(matches!(err, LogTailError::InvalidOffset { .. }));
}

#[tokio::test]
async fn rejects_offset_beyond_eof() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("a.log");
    std::fs::write(&path, b"hello\n").expect("write");
    let err = follow(&path, 1000, cfg(1024), |_, _| {}).await.unwrap_err();
    assert!(matches!(err, LogTailError::InvalidOffset { .. }));
}

#[tokio::test]
async fn emits_lines_as_they_are_appended() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("a.log");
    std::fs::write(&path, b"first\n").expect("write");

    let collected = Arc::new(Mutex::new(Vec::new()));
    let collected2 = collected.clone();
    let path2 = path.clone();

    let appender = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        let mut f = std::fs::OpenOptions::new()
            .append(true)
            .open(&path2)
            .expect("open for append");
        writeln!(f, "second").expect("append");
    });

    let _ = tokio::time::timeout(
        Duration::from_millis(300),
        follow(&path, 0, cfg(1024), move |offset, line| {
            collected2.lock().expect("lock").push((offset, line.to_vec()));
        }),
    )
    .await;

    appender.await.expect("appender task");
    let lines = collected.lock().expect("lock");
    assert_eq!(lines[0], (0, b"first".to_vec()));
    assert_eq!(lines[1], (6, b"second".to_vec()));
}

#[tokio::test]
async fn line_without_newline_exceeding_buffer_is_flushed_as_partial() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("a.log");
    // No trailing newline, and longer than the 4-byte test buffer.
    std::fs::write(&path, b"abcdefgh").expect("write");

    let collected = Arc::new(Mutex::new(Vec::new()));
    let collected2 = collected.clone();

    let _ = tokio::time::timeout(
        Duration::from_millis(150),
        follow(&path, 0, cfg(4), move |offset, line| {
            collected2.lock().expect("lock").push((offset, line.to_vec()));
        }),
    )
    .await;

    let lines = collected.lock().expect("lock");
    assert_eq!(lines[0], (0, b"abcd".to_vec()));
    assert_eq!(lines[1], (4, b"efgh".to_vec()));
}

#[tokio::test]
async fn pending_partial_line_is_flushed_at_eof_before_the_next_append() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("a.log");
    // No trailing newline: "3" sits in `pending` and must be flushed once
    // the reader hits EOF, rather than waiting to be merged with whatever
    // gets appended next.
    std::fs::write(&path, b"1\n2\n3").expect("write");

    let collected = Arc::new(Mutex::new(Vec::new()));
    let collected2 = collected.clone();
    let path2 = path.clone();

    let appender = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        let mut f = std::fs::OpenOptions::new()
            .append(true)
            .open(&path2)
            .expect("open for append");
        write!(f, "4\n5\n6").expect("append");
    });

    let _ = tokio::time::timeout(
        Duration::from_millis(300),
        follow(&path, 0, cfg(1024), move |offset, line| {
            collected2.lock().expect("lock").push((offset, line.to_vec()));
        }),
    )
    .await;

    appender.await.expect("appender task");
    let lines = collected.lock().expect("lock");
    assert_eq!(lines[0], (0, b"1".to_vec()));
    assert_eq!(lines[1], (2, b"2".to_vec()));
    assert_eq!(lines[2], (4, b"3".to_vec()));
    assert_eq!(lines[3], (5, b"4".to_vec()));
    assert_eq!(lines[4], (7, b"5".to_vec()));
    assert_eq!(lines[5], (9, b"6".to_vec()));
}
