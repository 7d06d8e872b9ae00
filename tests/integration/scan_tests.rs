use dupescan::duplicates::{Classifier, ClassifierConfig, Criterion};
use dupescan::scanner::{FileEntry, FileHandle, Walker, WalkerConfig};
use dupescan::trace::ScanTrace;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use tempfile::tempdir;

fn write_file(path: &Path, content: &[u8]) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    File::create(path).unwrap().write_all(content).unwrap();
}

fn walk(root: &Path) -> Vec<FileEntry> {
    Walker::new(root, WalkerConfig::default())
        .walk()
        .map(Result::unwrap)
        .collect()
}

fn classify(files: &[FileEntry], criterion: Criterion) -> dupescan::duplicates::ResultSet<FileEntry> {
    Classifier::with_defaults()
        .classify(files, criterion, &mut ScanTrace::default())
        .unwrap()
}

#[test]
fn test_scan_empty_directory() {
    let dir = tempdir().unwrap();
    let files = walk(dir.path());
    assert!(files.is_empty());

    let results = classify(&files, Criterion::ByContentHash);
    assert!(results.is_empty());
    assert_eq!(results.total_files, 0);
}

#[test]
fn test_scan_unique_files() {
    let dir = tempdir().unwrap();
    write_file(&dir.path().join("a.txt"), b"content a");
    write_file(&dir.path().join("b.txt"), b"content bb");
    write_file(&dir.path().join("c.txt"), b"content ccc");

    let files = walk(dir.path());
    for criterion in [Criterion::ByName, Criterion::BySize, Criterion::ByContentHash] {
        let results = classify(&files, criterion);
        assert!(results.is_empty(), "unexpected groups by {criterion}");
        assert_eq!(results.total_files, 3);
    }
}

#[test]
fn test_scan_duplicate_content() {
    let dir = tempdir().unwrap();
    write_file(&dir.path().join("a.txt"), b"duplicate");
    write_file(&dir.path().join("b.txt"), b"duplicate");
    write_file(&dir.path().join("c.txt"), b"unique");

    let files = walk(dir.path());
    let results = classify(&files, Criterion::ByContentHash);

    assert_eq!(results.len(), 1);
    let names: Vec<&str> = results.groups[0].files.iter().map(|f| f.name()).collect();
    assert_eq!(names, vec!["a.txt", "b.txt"]);
    assert_eq!(results.duplicate_files(), 1);
}

#[test]
fn test_same_name_in_nested_directories() {
    let dir = tempdir().unwrap();
    write_file(&dir.path().join("notes.md"), b"top");
    write_file(&dir.path().join("sub/notes.md"), b"nested, different");
    write_file(&dir.path().join("sub/deeper/notes.md"), b"third");
    write_file(&dir.path().join("sub/other.md"), b"other");

    let files = walk(dir.path());
    let results = classify(&files, Criterion::ByName);

    assert_eq!(results.len(), 1);
    let group = results.get("notes.md").unwrap();
    assert_eq!(group.len(), 3);

    let label = dir
        .path()
        .canonicalize()
        .unwrap()
        .file_name()
        .unwrap()
        .to_string_lossy()
        .into_owned();
    for path in group.display_paths() {
        assert!(path.starts_with(&format!("{label}/")), "{path}");
        assert!(path.ends_with("notes.md"));
    }

    // Content differs, so no content groups.
    assert!(classify(&files, Criterion::ByContentHash).is_empty());
}

#[test]
fn test_same_size_different_content() {
    let dir = tempdir().unwrap();
    write_file(&dir.path().join("x.bin"), b"aaaa");
    write_file(&dir.path().join("y.bin"), b"bbbb");

    let files = walk(dir.path());
    let by_size = classify(&files, Criterion::BySize);
    assert_eq!(by_size.len(), 1);
    assert_eq!(by_size.groups[0].key, "4");

    assert!(classify(&files, Criterion::ByContentHash).is_empty());
}

#[test]
fn test_empty_files_are_content_duplicates() {
    let dir = tempdir().unwrap();
    write_file(&dir.path().join("e1"), b"");
    write_file(&dir.path().join("e2"), b"");

    let files = walk(dir.path());
    let results = classify(&files, Criterion::ByContentHash);

    assert_eq!(results.len(), 1);
    assert_eq!(
        results.groups[0].key,
        "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
    );
}

#[test]
fn test_repeated_scans_are_identical() {
    let dir = tempdir().unwrap();
    for i in 0..20 {
        write_file(
            &dir.path().join(format!("d{}/f{}.dat", i % 3, i)),
            format!("payload {}", i % 4).as_bytes(),
        );
    }

    let first = walk(dir.path());
    let second = walk(dir.path());
    assert_eq!(first, second);

    for criterion in [Criterion::ByName, Criterion::BySize, Criterion::ByContentHash] {
        assert_eq!(classify(&first, criterion), classify(&second, criterion));
    }
}

#[test]
fn test_ignore_patterns_exclude_files() {
    let dir = tempdir().unwrap();
    write_file(&dir.path().join("keep.txt"), b"same");
    write_file(&dir.path().join("skip.tmp"), b"same");
    write_file(&dir.path().join("cache/keep.txt"), b"same");

    let walker = Walker::new(
        dir.path(),
        WalkerConfig::new(false, vec!["*.tmp".to_string(), "cache/".to_string()]),
    );
    let files: Vec<FileEntry> = walker.walk().map(Result::unwrap).collect();
    assert_eq!(files.len(), 1);
    assert!(classify(&files, Criterion::ByContentHash).is_empty());
}

#[test]
fn test_small_yield_interval_gives_same_result() {
    let dir = tempdir().unwrap();
    for i in 0..12 {
        write_file(
            &dir.path().join(format!("f{i:02}")),
            format!("{}", i % 5).as_bytes(),
        );
    }
    let files = walk(dir.path());

    let reference = classify(&files, Criterion::ByContentHash);
    let stepped = Classifier::new(ClassifierConfig::default().with_yield_every(1))
        .classify(&files, Criterion::ByContentHash, &mut ScanTrace::default())
        .unwrap();

    assert_eq!(reference, stepped);
    assert_eq!(reference.len(), 5);
}

#[test]
fn test_file_deleted_after_walk_fails_hash_scan() {
    let dir = tempdir().unwrap();
    write_file(&dir.path().join("a.txt"), b"one");
    write_file(&dir.path().join("b.txt"), b"two");

    let files = walk(dir.path());
    fs::remove_file(dir.path().join("b.txt")).unwrap();

    let mut trace = ScanTrace::default();
    let err = Classifier::with_defaults()
        .classify(&files, Criterion::ByContentHash, &mut trace)
        .unwrap_err();
    assert!(err.to_string().contains("b.txt"));
    assert!(trace.to_text().contains("[hash] read failed for"));

    // Name and size were captured by the walk.
    assert_eq!(classify(&files, Criterion::ByName).total_files, 2);
}
