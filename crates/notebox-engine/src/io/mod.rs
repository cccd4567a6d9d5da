use crate::error::{Result, StoreError};
use crate::models::NOTE_EXTENSION;
use chrono::{DateTime, Utc};
use std::fs::{self, File, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Create a directory (and any missing parents) if it doesn't exist yet
pub fn ensure_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path).map_err(|e| StoreError::io(path, e))
}

/// Scan the top level of `dir` for note files.
///
/// Subdirectories are not descended into. Results keep the order the
/// filesystem enumerates them in.
pub fn scan_note_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(dir).map_err(|e| StoreError::io(dir, e))?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| StoreError::io(dir, e))?;
        let path = entry.path();

        if path.is_file()
            && let Some(ext) = path.extension()
            && ext == NOTE_EXTENSION
        {
            files.push(path);
        }
    }

    Ok(files)
}

/// Read a note file, returning its body and creation time.
///
/// Bodies that aren't valid UTF-8 are decoded lossily rather than refused.
/// Filesystems that don't record a birth time report the last modification
/// time instead.
pub fn read_note_file(path: &Path) -> Result<(String, DateTime<Utc>)> {
    let bytes = fs::read(path).map_err(|e| StoreError::io(path, e))?;
    let content = String::from_utf8(bytes).unwrap_or_else(|e| {
        log::warn!("{} is not valid UTF-8, invalid bytes replaced", path.display());
        String::from_utf8_lossy(e.as_bytes()).into_owned()
    });
    let metadata = fs::metadata(path).map_err(|e| StoreError::io(path, e))?;
    let created = metadata
        .created()
        .or_else(|_| metadata.modified())
        .map_err(|e| StoreError::io(path, e))?;

    Ok((content, created.into()))
}

/// Write a note body, replacing whatever the file held before
pub fn write_note_file(path: &Path, content: &str) -> Result<()> {
    fs::write(path, content).map_err(|e| StoreError::io(path, e))
}

/// Move a file to a new name.
///
/// Renaming to a name that differs only in case is fine on case-insensitive
/// filesystems.
pub fn rename_file(from: &Path, to: &Path) -> Result<()> {
    fs::rename(from, to).map_err(|e| StoreError::io(from, e))
}

/// Remove a file, treating an already-missing file as success.
///
/// Returns whether a file was actually removed.
pub fn remove_file_if_exists(path: &Path) -> Result<bool> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(StoreError::io(path, e)),
    }
}

/// Open a brand new file for writing; fails if anything already exists at `path`
pub fn create_new_file(path: &Path) -> Result<File> {
    OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .map_err(|e| StoreError::io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::{create_test_file, create_test_notes_dir};
    use std::io::Write;

    #[test]
    fn test_scan_finds_only_top_level_markdown() {
        // Given a notes directory with notes, foreign files and a subfolder
        let notes_dir = create_test_notes_dir();
        create_test_file(&notes_dir, "1_First.md", "one");
        create_test_file(&notes_dir, "2_Second.md", "two");
        create_test_file(&notes_dir, "image.png", "fake image data");

        let sub_dir = notes_dir.path().join("pictures");
        fs::create_dir(&sub_dir).unwrap();
        fs::write(sub_dir.join("3_Nested.md"), "nested").unwrap();

        // When scanning
        let files = scan_note_files(notes_dir.path()).unwrap();

        // Then only the top-level markdown files are returned
        assert_eq!(files.len(), 2);
        assert!(files.iter().any(|f| f.file_name().unwrap() == "1_First.md"));
        assert!(files.iter().any(|f| f.file_name().unwrap() == "2_Second.md"));
    }

    #[test]
    fn test_scan_missing_directory_is_io_error() {
        let result = scan_note_files(Path::new("/this/path/does/not/exist"));
        assert!(matches!(result, Err(StoreError::Io { .. })));
    }

    #[test]
    fn test_ensure_dir_creates_nested_directories() {
        let notes_dir = create_test_notes_dir();
        let nested = notes_dir.path().join("a").join("b");

        ensure_dir(&nested).unwrap();
        assert!(nested.is_dir());

        // Calling again on an existing directory is fine
        ensure_dir(&nested).unwrap();
    }

    #[test]
    fn test_write_then_read_note_file() {
        let notes_dir = create_test_notes_dir();
        let path = notes_dir.path().join("1_Test.md");

        let before = Utc::now() - chrono::Duration::seconds(5);
        write_note_file(&path, "# Test\n\nBody").unwrap();
        let (content, created) = read_note_file(&path).unwrap();

        assert_eq!(content, "# Test\n\nBody");
        assert!(created >= before);
    }

    #[test]
    fn test_read_note_file_replaces_invalid_utf8() {
        let notes_dir = create_test_notes_dir();
        let path = notes_dir.path().join("2_Binary.md");
        fs::write(&path, [b'a', 0xff, b'b']).unwrap();

        let (content, _) = read_note_file(&path).unwrap();
        assert_eq!(content, "a\u{FFFD}b");
    }

    #[test]
    fn test_rename_file() {
        let notes_dir = create_test_notes_dir();
        let from = create_test_file(&notes_dir, "1_Old.md", "body");
        let to = notes_dir.path().join("1_New.md");

        rename_file(&from, &to).unwrap();

        assert!(!from.exists());
        assert_eq!(fs::read_to_string(&to).unwrap(), "body");
        assert!(matches!(rename_file(&from, &to), Err(StoreError::Io { .. })));
    }

    #[test]
    fn test_read_missing_note_file() {
        let notes_dir = create_test_notes_dir();
        let result = read_note_file(&notes_dir.path().join("missing.md"));
        assert!(matches!(result, Err(StoreError::Io { .. })));
    }

    #[test]
    fn test_remove_file_if_exists() {
        let notes_dir = create_test_notes_dir();
        let path = create_test_file(&notes_dir, "1_Gone.md", "bye");

        assert!(remove_file_if_exists(&path).unwrap());
        assert!(!path.exists());
        assert!(!remove_file_if_exists(&path).unwrap());
    }

    #[test]
    fn test_create_new_file_refuses_to_overwrite() {
        let notes_dir = create_test_notes_dir();
        let path = notes_dir.path().join("photo.png");

        let mut file = create_new_file(&path).unwrap();
        file.write_all(b"first").unwrap();
        drop(file);

        let result = create_new_file(&path);
        match result {
            Err(StoreError::Io { source, .. }) => {
                assert_eq!(source.kind(), ErrorKind::AlreadyExists)
            }
            other => panic!("expected AlreadyExists, got {other:?}"),
        }
        assert_eq!(fs::read(&path).unwrap(), b"first");
    }
}
