use dupescan::duplicates::{ClassifierConfig, Criterion, ScanSession, ScanStatus, SessionError};
use dupescan::progress::ProgressCallback;
use dupescan::scanner::{FileEntry, MemoryFile, Walker, WalkerConfig};
use dupescan::trace::TraceSink;
use std::fs;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::tempdir;

struct Lines(Mutex<Vec<String>>);

impl TraceSink for Lines {
    fn on_line(&self, line: &str) {
        self.0.lock().unwrap().push(line.to_string());
    }
}

/// Requests cancellation once a given number of files is done.
struct StopAfter {
    after: usize,
    flag: Arc<AtomicBool>,
}

impl ProgressCallback for StopAfter {
    fn on_phase_start(&self, _phase: &str, _total: usize) {}

    fn on_progress(&self, current: usize, _path: &str) {
        if current >= self.after {
            self.flag.store(true, Ordering::SeqCst);
        }
    }

    fn on_phase_end(&self, _phase: &str) {}
}

#[test]
fn test_scenarios_through_session() {
    let mut session = ScanSession::new(ClassifierConfig::default());

    session.select(vec![
        MemoryFile::new("f1/a.txt", "1"),
        MemoryFile::new("f2/b.txt", "2"),
        MemoryFile::new("f3/a.txt", "3"),
    ]);
    let results = session.scan(Criterion::ByName).unwrap().unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(
        results.get("a.txt").unwrap().display_paths(),
        vec!["f1/a.txt", "f3/a.txt"]
    );

    session.select(vec![
        MemoryFile::new("f1", vec![0u8; 10]),
        MemoryFile::new("f2", vec![0u8; 20]),
        MemoryFile::new("f3", vec![1u8; 10]),
    ]);
    let results = session.scan(Criterion::BySize).unwrap().unwrap();
    assert_eq!(results.get("10").unwrap().display_paths(), vec!["f1", "f3"]);

    session.select(vec![
        MemoryFile::new("f1", "hello"),
        MemoryFile::new("f2", "hello"),
        MemoryFile::new("f3", "world"),
    ]);
    let results = session.scan(Criterion::ByContentHash).unwrap().unwrap();
    assert_eq!(
        results.groups[0].key,
        "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
    );
    assert_eq!(session.status(), ScanStatus::Completed);

    session.select(vec![
        MemoryFile::new("f1", "one"),
        MemoryFile::new("f2", "two"),
        MemoryFile::new("f3", "three"),
    ]);
    let results = session.scan(Criterion::ByContentHash).unwrap().unwrap();
    assert!(results.is_empty());
    assert_eq!(results.unique_keys, 3);
    assert_eq!(session.status(), ScanStatus::Completed);
    assert_eq!(session.progress(), 1.0);
}

#[test]
fn test_session_over_walked_folder() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("one.txt"), "same").unwrap();
    fs::write(dir.path().join("two.txt"), "same").unwrap();
    fs::write(dir.path().join("three.txt"), "diff").unwrap();

    let files: Vec<FileEntry> = Walker::new(dir.path(), WalkerConfig::default())
        .walk()
        .map(Result::unwrap)
        .collect();

    let mut session = ScanSession::new(ClassifierConfig::default());
    session.select(files);
    let results = session.scan(Criterion::ByContentHash).unwrap().unwrap();

    assert_eq!(results.len(), 1);
    assert_eq!(results.groups[0].len(), 2);
    assert_eq!(session.progress(), 1.0);
}

#[test]
fn test_trace_sink_sees_every_line() {
    let sink = Arc::new(Lines(Mutex::new(Vec::new())));
    let mut session = ScanSession::new(ClassifierConfig::default().with_trace_sink(sink.clone()));
    session.select(vec![MemoryFile::new("a", "x"), MemoryFile::new("b", "x")]);
    session.scan(Criterion::ByContentHash).unwrap();

    let seen = sink.0.lock().unwrap().join("\n");
    assert_eq!(seen, session.trace_text());
    assert!(seen.contains("Selected criterion: hash"));
    assert!(seen.contains("[hash] hashing complete. Unique digests: 1"));
}

#[test]
fn test_cancel_mid_scan_through_callback() {
    let flag = Arc::new(AtomicBool::new(false));
    let config = ClassifierConfig::default()
        .with_yield_every(5)
        .with_shutdown_flag(flag.clone())
        .with_progress_callback(Arc::new(StopAfter {
            after: 5,
            flag: flag.clone(),
        }));

    let mut session = ScanSession::new(config);
    session.select(
        (0..20)
            .map(|i| MemoryFile::new(format!("f{i}"), "x"))
            .collect(),
    );

    let err = session.scan(Criterion::ByContentHash).unwrap_err();
    assert!(matches!(err, SessionError::Classify(_)));
    assert!(err.is_cancelled());
    assert_eq!(session.status(), ScanStatus::Cancelled);
    assert!(session.results().is_none());

    let progress = session.progress();
    assert!(progress > 0.0 && progress < 1.0, "progress {progress}");
    assert!(session
        .trace_text()
        .contains("[hash] scan cancelled after 5/20 files"));
    assert!(!flag.load(Ordering::SeqCst));
}

#[test]
fn test_shared_session_between_threads() {
    let mut session = ScanSession::new(ClassifierConfig::default());
    session.select(
        (0..200)
            .map(|i| MemoryFile::new(format!("f{i}"), vec![(i % 7) as u8; 4096]))
            .collect(),
    );

    let outcomes: Vec<Result<_, SessionError>> = std::thread::scope(|s| {
        let handles: Vec<_> = (0..4)
            .map(|_| s.spawn(|| session.scan(Criterion::ByContentHash)))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    let completed = outcomes.iter().filter(|o| o.is_ok()).count();
    let busy = outcomes
        .iter()
        .filter(|o| matches!(o, Err(SessionError::Busy)))
        .count();
    assert!(completed >= 1);
    assert_eq!(completed + busy, 4);

    for outcome in outcomes.into_iter().flatten() {
        assert_eq!(outcome.unwrap().len(), 7);
    }
    assert_eq!(session.status(), ScanStatus::Completed);
}
