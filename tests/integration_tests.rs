/// Integration tests for regmove
///
/// These tests run whole batches against real temporary directories.
///
/// Test categories:
/// 1. Single-file moves
/// 2. Pattern selection
/// 3. Failure handling
/// 4. Options (dry run, keep going, rename)
use regmove::{
    BatchError, BatchOptions, FailurePolicy, FileStatus, MoveConfig, MoveErrorKind, MoveMethod,
    MoveStrategy, move_file, move_files, move_files_with,
};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

// ============================================================================
// Test Utilities
// ============================================================================

/// A temporary source and destination directory pair.
struct TestFixture {
    _temp_dir: TempDir,
    source: PathBuf,
    destination: PathBuf,
}

impl TestFixture {
    fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let source = temp_dir.path().join("source");
        let destination = temp_dir.path().join("destination");
        fs::create_dir(&source).expect("Failed to create source directory");
        fs::create_dir(&destination).expect("Failed to create destination directory");
        TestFixture {
            _temp_dir: temp_dir,
            source,
            destination,
        }
    }

    fn config(&self, pattern: &str) -> MoveConfig {
        MoveConfig {
            source: self.source.clone(),
            destination: self.destination.clone(),
            pattern: pattern.to_string(),
        }
    }

    /// Create a file with content in the source directory.
    fn create_file(&self, name: &str, content: &[u8]) {
        let file_path = self.source.join(name);
        let mut file = File::create(&file_path).expect("Failed to create file");
        file.write_all(content).expect("Failed to write file content");
    }

    fn create_subdir(&self, name: &str) {
        fs::create_dir(self.source.join(name)).expect("Failed to create subdirectory");
    }

    fn assert_in_source(&self, name: &str) {
        let path = self.source.join(name);
        assert!(path.exists(), "File should remain in source: {}", path.display());
    }

    fn assert_not_in_source(&self, name: &str) {
        let path = self.source.join(name);
        assert!(!path.exists(), "File should be gone from source: {}", path.display());
    }

    fn assert_in_destination(&self, name: &str) {
        let path = self.destination.join(name);
        assert!(
            path.is_file(),
            "File should exist in destination: {}",
            path.display()
        );
    }

    fn assert_not_in_destination(&self, name: &str) {
        let path = self.destination.join(name);
        assert!(
            !path.exists(),
            "File should not exist in destination: {}",
            path.display()
        );
    }

    fn destination_names(&self) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(&self.destination)
            .expect("Failed to read directory")
            .filter_map(|entry| entry.ok())
            .map(|e| e.file_name().to_string_lossy().to_string())
            .collect();
        names.sort();
        names
    }
}

const WALLPAPER_PATTERN: &str = r".*unsplash.*\.jpg";

// ============================================================================
// Single-file moves
// ============================================================================

#[test]
fn test_move_file_round_trip() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let source = temp_dir.path().join("foo.txt");
    let destination = temp_dir.path().join("bar.txt");
    let content: Vec<u8> = (0..=255u8).cycle().take(64 * 1024 + 7).collect();
    fs::write(&source, &content).expect("Failed to write source");

    move_file(&source, &destination).expect("Error while moving the file");

    assert_eq!(fs::read(&destination).unwrap(), content);
    assert!(!source.exists());
}

#[test]
fn test_move_empty_file() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let source = temp_dir.path().join("empty");
    let destination = temp_dir.path().join("empty.moved");
    File::create(&source).unwrap();

    move_file(&source, &destination).expect("Error while moving the file");

    assert_eq!(fs::read(&destination).unwrap().len(), 0);
    assert!(!source.exists());
}

#[test]
fn test_move_file_into_missing_directory_keeps_source() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let source = temp_dir.path().join("keep.jpg");
    let destination = temp_dir.path().join("nowhere").join("keep.jpg");
    fs::write(&source, "data").unwrap();

    let err = move_file(&source, &destination).unwrap_err();

    assert_eq!(err.kind(), MoveErrorKind::DestinationCreate);
    assert_eq!(fs::read_to_string(&source).unwrap(), "data");
    assert!(!destination.exists());
}

#[cfg(unix)]
#[test]
fn test_batch_preserves_permissions() {
    use std::os::unix::fs::PermissionsExt;

    let fixture = TestFixture::new();
    fixture.create_file("ro_unsplash.jpg", b"pixels");
    fs::set_permissions(
        fixture.source.join("ro_unsplash.jpg"),
        fs::Permissions::from_mode(0o640),
    )
    .unwrap();

    move_files(fixture.config(WALLPAPER_PATTERN)).expect("Batch failed");

    let mode = fs::metadata(fixture.destination.join("ro_unsplash.jpg"))
        .unwrap()
        .permissions()
        .mode();
    assert_eq!(mode & 0o777, 0o640);
}

// ============================================================================
// Pattern selection
// ============================================================================

#[test]
fn test_filter_moves_only_matching_files() {
    let fixture = TestFixture::new();
    fixture.create_file("a_unsplash.jpg", b"a");
    fixture.create_file("b_unsplash.jpg", b"b");
    fixture.create_file("c.txt", b"c");
    fixture.create_subdir("sub");

    move_files(fixture.config(WALLPAPER_PATTERN)).expect("Batch failed");

    fixture.assert_not_in_source("a_unsplash.jpg");
    fixture.assert_not_in_source("b_unsplash.jpg");
    fixture.assert_in_destination("a_unsplash.jpg");
    fixture.assert_in_destination("b_unsplash.jpg");
    fixture.assert_in_source("c.txt");
    fixture.assert_not_in_destination("c.txt");
    assert!(fixture.source.join("sub").is_dir());
    assert_eq!(
        fs::read_to_string(fixture.destination.join("b_unsplash.jpg")).unwrap(),
        "b"
    );
}

#[test]
fn test_second_run_is_a_no_op() {
    let fixture = TestFixture::new();
    fixture.create_file("file1_unsplash.jpg", b"content1");
    fixture.create_file("file3.txt", b"content3");

    move_files(fixture.config(WALLPAPER_PATTERN)).expect("First run failed");
    let report = move_files_with(fixture.config(WALLPAPER_PATTERN), &BatchOptions::default())
        .expect("Second run failed");

    assert!(report.is_empty());
    assert_eq!(fixture.destination_names(), vec!["file1_unsplash.jpg"]);
    fixture.assert_in_source("file3.txt");
}

#[test]
fn test_nested_matching_files_are_not_moved() {
    let fixture = TestFixture::new();
    fixture.create_subdir("nested");
    fs::write(fixture.source.join("nested").join("deep_unsplash.jpg"), "x").unwrap();

    move_files(fixture.config(WALLPAPER_PATTERN)).expect("Batch failed");

    assert!(fixture.source.join("nested").join("deep_unsplash.jpg").exists());
    assert!(fixture.destination_names().is_empty());
}

#[test]
fn test_directory_with_matching_name_is_skipped() {
    let fixture = TestFixture::new();
    fixture.create_subdir("folder_unsplash.jpg");

    move_files(fixture.config(WALLPAPER_PATTERN)).expect("Batch failed");

    assert!(fixture.source.join("folder_unsplash.jpg").is_dir());
    assert!(fixture.destination_names().is_empty());
}

#[test]
fn test_pattern_matches_name_not_path() {
    let fixture = TestFixture::new();
    fixture.create_file("photo.jpg", b"x");

    // "source" appears in the full path but not in the file name.
    move_files(fixture.config("source")).expect("Batch failed");

    fixture.assert_in_source("photo.jpg");
}

#[test]
fn test_anchored_pattern() {
    let fixture = TestFixture::new();
    fixture.create_file("IMG_001.png", b"1");
    fixture.create_file("old_IMG_002.png", b"2");

    move_files(fixture.config(r"^IMG_\d+\.png$")).expect("Batch failed");

    assert_eq!(fixture.destination_names(), vec!["IMG_001.png"]);
    fixture.assert_in_source("old_IMG_002.png");
}

#[test]
fn test_special_characters_in_filename() {
    let fixture = TestFixture::new();
    fixture.create_file("my photo (1)_unsplash.jpg", b"x");

    move_files(fixture.config(WALLPAPER_PATTERN)).expect("Batch failed");

    fixture.assert_in_destination("my photo (1)_unsplash.jpg");
}

// ============================================================================
// Failure handling
// ============================================================================

#[test]
fn test_invalid_pattern_moves_nothing() {
    let fixture = TestFixture::new();
    fixture.create_file("a_unsplash.jpg", b"a");

    let result = move_files(fixture.config("[unclosed"));

    assert!(matches!(result, Err(BatchError::Pattern { .. })));
    fixture.assert_in_source("a_unsplash.jpg");
}

#[test]
fn test_missing_source_directory() {
    let fixture = TestFixture::new();
    let config = MoveConfig {
        source: fixture.source.join("missing"),
        ..fixture.config(".*")
    };

    let result = move_files(config);

    assert!(matches!(result, Err(BatchError::DirectoryList { .. })));
}

#[cfg(unix)]
#[test]
fn test_unreadable_source_directory() {
    use std::os::unix::fs::PermissionsExt;

    let fixture = TestFixture::new();
    fixture.create_file("a_unsplash.jpg", b"a");
    fs::set_permissions(&fixture.source, fs::Permissions::from_mode(0o000)).unwrap();

    // Privileged users can list the directory anyway.
    let privileged = fs::read_dir(&fixture.source).is_ok();
    let result = move_files(fixture.config(WALLPAPER_PATTERN));
    fs::set_permissions(&fixture.source, fs::Permissions::from_mode(0o755)).unwrap();
    if privileged {
        return;
    }

    assert!(matches!(result, Err(BatchError::DirectoryList { .. })));
    fixture.assert_in_source("a_unsplash.jpg");
    assert!(fixture.destination_names().is_empty());
}

#[test]
fn test_same_source_and_destination_keeps_files() {
    let fixture = TestFixture::new();
    fixture.create_file("a_unsplash.jpg", b"data");
    let config = MoveConfig {
        destination: fixture.source.clone(),
        ..fixture.config(WALLPAPER_PATTERN)
    };

    let result = move_files(config);

    assert!(matches!(result, Err(BatchError::SameDirectory { .. })));
    assert_eq!(
        fs::read_to_string(fixture.source.join("a_unsplash.jpg")).unwrap(),
        "data"
    );
}

#[test]
fn test_fail_fast_stops_at_first_failure() {
    let fixture = TestFixture::new();
    fixture.create_file("a.jpg", b"a");
    fixture.create_file("b.jpg", b"b");
    fixture.create_file("c.jpg", b"c");
    // A directory in the way makes the destination for b.jpg unwritable.
    fs::create_dir(fixture.destination.join("b.jpg")).unwrap();

    let err = move_files(fixture.config(r"\.jpg$")).unwrap_err();

    match err {
        BatchError::Move { path, source } => {
            assert_eq!(path, fixture.source.join("b.jpg"));
            assert_eq!(source.kind(), MoveErrorKind::DestinationCreate);
        }
        other => panic!("unexpected error: {other}"),
    }
    fixture.assert_not_in_source("a.jpg");
    fixture.assert_in_destination("a.jpg");
    fixture.assert_in_source("b.jpg");
    fixture.assert_in_source("c.jpg");
    fixture.assert_not_in_destination("c.jpg");
}

// ============================================================================
// Options
// ============================================================================

#[test]
fn test_keep_going_moves_files_after_failure() {
    let fixture = TestFixture::new();
    fixture.create_file("a.jpg", b"a");
    fixture.create_file("b.jpg", b"b");
    fixture.create_file("c.jpg", b"c");
    fs::create_dir(fixture.destination.join("b.jpg")).unwrap();
    let options = BatchOptions {
        failure_policy: FailurePolicy::Continue,
        ..Default::default()
    };

    let report = move_files_with(fixture.config(r"\.jpg$"), &options).expect("Batch failed");

    assert_eq!(report.moved(), 2);
    assert_eq!(report.failed(), 1);
    assert!(report.has_failures());
    assert_eq!(report.outcomes[1].file_name, "b.jpg");
    assert!(matches!(
        report.outcomes[1].status,
        FileStatus::Failed {
            kind: MoveErrorKind::DestinationCreate,
            ..
        }
    ));
    fixture.assert_in_destination("c.jpg");
    fixture.assert_in_source("b.jpg");
}

#[test]
fn test_dry_run_lists_matches_in_order() {
    let fixture = TestFixture::new();
    fixture.create_file("z_unsplash.jpg", b"z");
    fixture.create_file("a_unsplash.jpg", b"a");
    fixture.create_file("notes.txt", b"n");
    let options = BatchOptions {
        dry_run: true,
        ..Default::default()
    };

    let report = move_files_with(fixture.config(WALLPAPER_PATTERN), &options).unwrap();

    let names: Vec<_> = report.outcomes.iter().map(|o| o.file_name.as_str()).collect();
    assert_eq!(names, vec!["a_unsplash.jpg", "z_unsplash.jpg"]);
    assert_eq!(report.moved(), 0);
    fixture.assert_in_source("a_unsplash.jpg");
    fixture.assert_in_source("z_unsplash.jpg");
    assert!(fixture.destination_names().is_empty());
}

#[test]
fn test_rename_strategy_moves_within_filesystem() {
    let fixture = TestFixture::new();
    fixture.create_file("a_unsplash.jpg", b"a");
    let options = BatchOptions {
        strategy: MoveStrategy::RenameFirst,
        ..Default::default()
    };

    let report = move_files_with(fixture.config(WALLPAPER_PATTERN), &options).unwrap();

    assert!(matches!(
        report.outcomes[0].status,
        FileStatus::Moved {
            method: MoveMethod::Renamed
        }
    ));
    fixture.assert_not_in_source("a_unsplash.jpg");
    fixture.assert_in_destination("a_unsplash.jpg");
}

#[test]
fn test_default_strategy_copies() {
    let fixture = TestFixture::new();
    fixture.create_file("a_unsplash.jpg", b"a");

    let report =
        move_files_with(fixture.config(WALLPAPER_PATTERN), &BatchOptions::default()).unwrap();

    assert!(matches!(
        report.outcomes[0].status,
        FileStatus::Moved {
            method: MoveMethod::Copied
        }
    ));
}

#[test]
fn test_many_files() {
    let fixture = TestFixture::new();
    for i in 0..50 {
        fixture.create_file(&format!("img{:02}_unsplash.jpg", i), format!("{i}").as_bytes());
        fixture.create_file(&format!("doc{:02}.txt", i), b"keep");
    }

    move_files(fixture.config(WALLPAPER_PATTERN)).expect("Batch failed");

    assert_eq!(fixture.destination_names().len(), 50);
    let remaining = fs::read_dir(&fixture.source).unwrap().count();
    assert_eq!(remaining, 50);
    assert_eq!(
        fs::read_to_string(Path::new(&fixture.destination).join("img07_unsplash.jpg")).unwrap(),
        "7"
    );
}
