use crate::error::Result;
use crate::io;
use crate::store::{NoteStore, PhotoStore};
use std::path::{Path, PathBuf};

/// Directory name used when nothing else says where the workspace lives
pub const DEFAULT_WORKSPACE_DIR: &str = "Workspace";

/// The notes and pictures kept under one root directory.
///
/// Notes are files directly in the root; uploads go to `pictures/` beneath it.
/// Open once at startup and hand the stores to whatever serves requests.
#[derive(Debug)]
pub struct Workspace {
    root: PathBuf,
    notes: NoteStore,
    photos: PhotoStore,
}

impl Workspace {
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        io::ensure_dir(&root)?;

        let notes = NoteStore::open(&root)?;
        let photos = PhotoStore::open(&root)?;

        Ok(Self {
            root,
            notes,
            photos,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn notes(&self) -> &NoteStore {
        &self.notes
    }

    pub fn photos(&self) -> &PhotoStore {
        &self.photos
    }
}
