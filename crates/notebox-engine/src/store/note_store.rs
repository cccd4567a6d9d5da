use crate::error::{Result, StoreError};
use crate::io;
use crate::models::{Note, NoteDraft, NoteId, NoteUpdate, note_file_name, parse_note_file_name};
use chrono::Utc;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// A cached note together with the file currently backing it.
///
/// The path is the one actually on disk, which need not be what
/// `note_file_name` would produce (`007_Bond.md` loads as note 7).
#[derive(Debug, Clone)]
struct StoredNote {
    note: Note,
    path: PathBuf,
}

/// File-backed note storage with an in-memory cache.
///
/// Each note is one markdown file in `notes_dir` whose name carries the id and
/// title and whose body is the note content. The cache is the read path; every
/// mutation finishes its file I/O before touching the cache, so a cached note
/// always has a backing file.
///
/// All operations hold one lock for their full duration (file I/O included),
/// so a store shared between request handlers never exposes a cache that
/// disagrees with the directory.
#[derive(Debug)]
pub struct NoteStore {
    notes_dir: PathBuf,
    cache: Mutex<Vec<StoredNote>>,
}

impl NoteStore {
    /// Open the store, creating `notes_dir` if needed and loading every note in it
    pub fn open(notes_dir: impl Into<PathBuf>) -> Result<Self> {
        let notes_dir = notes_dir.into();
        io::ensure_dir(&notes_dir)?;

        let notes = load_notes(&notes_dir)?;
        log::info!("Loaded {} notes from {}", notes.len(), notes_dir.display());

        Ok(Self {
            notes_dir,
            cache: Mutex::new(notes),
        })
    }

    /// Re-scan the notes directory, replacing the cache
    pub fn reload(&self) -> Result<()> {
        let mut cache = self.cache.lock();
        *cache = load_notes(&self.notes_dir)?;
        log::info!("Reloaded {} notes", cache.len());
        Ok(())
    }

    pub fn notes_dir(&self) -> &Path {
        &self.notes_dir
    }

    /// Snapshot of all notes in cache order (load order, then creation order)
    pub fn get_all(&self) -> Vec<Note> {
        self.cache.lock().iter().map(|s| s.note.clone()).collect()
    }

    pub fn get_by_id(&self, id: NoteId) -> Option<Note> {
        self.cache
            .lock()
            .iter()
            .find(|s| s.note.id == id)
            .map(|s| s.note.clone())
    }

    pub fn len(&self) -> usize {
        self.cache.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.lock().is_empty()
    }

    /// Persist a new note under the next free id.
    ///
    /// The id is one more than the highest id currently held, so ids grow
    /// monotonically until the highest note is deleted.
    pub fn create(&self, draft: NoteDraft) -> Result<Note> {
        let mut cache = self.cache.lock();

        let id = cache.iter().map(|s| s.note.id).max().unwrap_or(0) + 1;
        let note = Note {
            id,
            title: draft.title,
            content: draft.content,
            created_date: Utc::now(),
        };

        let path = self.path_for(note.id, &note.title);
        io::write_note_file(&path, &note.content)?;
        log::info!("Created note {} \"{}\"", note.id, note.title);

        cache.push(StoredNote {
            note: note.clone(),
            path,
        });
        Ok(note)
    }

    /// Replace the title and content of an existing note.
    ///
    /// The id and creation date never change. When the new title encodes to a
    /// different file name the existing file is renamed first and then
    /// rewritten, so there is never a second copy on disk.
    pub fn update(&self, update: NoteUpdate) -> Result<Note> {
        let mut cache = self.cache.lock();

        let existing = cache
            .iter_mut()
            .find(|s| s.note.id == update.id)
            .ok_or(StoreError::NoteNotFound { id: update.id })?;

        let new_path = self.path_for(existing.note.id, &update.title);
        if existing.path != new_path {
            io::rename_file(&existing.path, &new_path)?;
            log::debug!(
                "Renamed note {} from {} to {}",
                existing.note.id,
                existing.path.display(),
                new_path.display()
            );
            existing.path = new_path;
        }

        io::write_note_file(&existing.path, &update.content)?;

        existing.note.title = update.title;
        existing.note.content = update.content;
        log::info!("Updated note {}", existing.note.id);

        Ok(existing.note.clone())
    }

    /// Remove a note and its file. Unknown ids are ignored.
    pub fn delete(&self, id: NoteId) -> Result<()> {
        let mut cache = self.cache.lock();

        let Some(index) = cache.iter().position(|s| s.note.id == id) else {
            log::debug!("Delete of unknown note {id} ignored");
            return Ok(());
        };

        let path = &cache[index].path;
        if !io::remove_file_if_exists(path)? {
            log::debug!("Note file {} was already gone", path.display());
        }

        cache.remove(index);
        log::info!("Deleted note {id}");
        Ok(())
    }

    fn path_for(&self, id: NoteId, title: &str) -> PathBuf {
        self.notes_dir.join(note_file_name(id, title))
    }
}

/// Build notes from every recognisable file in `notes_dir`.
///
/// Files whose names don't parse are left alone. A second file claiming an
/// id that was already loaded is skipped so ids stay unique.
fn load_notes(notes_dir: &Path) -> Result<Vec<StoredNote>> {
    let mut notes = Vec::new();
    let mut seen = HashSet::new();

    for path in io::scan_note_files(notes_dir)? {
        let Some((id, title)) = parse_note_file_name(&path) else {
            log::debug!("Skipping unrecognised file {}", path.display());
            continue;
        };

        if !seen.insert(id) {
            log::warn!(
                "Skipping {}: note id {id} is already taken by another file",
                path.display()
            );
            continue;
        }

        let (content, created_date) = io::read_note_file(&path)?;
        notes.push(StoredNote {
            note: Note {
                id,
                title,
                content,
                created_date,
            },
            path,
        });
    }

    Ok(notes)
}
