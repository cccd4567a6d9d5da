use crate::error::{Result, StoreError};
use crate::io;
use crate::workspace::DEFAULT_WORKSPACE_DIR;
use relative_path::{RelativePath, RelativePathBuf};
use std::fmt;
use std::io::Read;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Subdirectory of the workspace that holds uploaded pictures
pub const PICTURES_DIR: &str = "pictures";

/// Accepted upload extensions, lowercase and without the dot
pub const ALLOWED_EXTENSIONS: &[&str] = &["jpeg", "jpg", "svg", "gif", "png"];

/// Where an uploaded photo can be fetched from, relative to the serving root.
///
/// Displays with a leading slash, e.g. `/Workspace/pictures/<uuid>.png`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoReference(RelativePathBuf);

impl PhotoReference {
    pub fn as_relative_path(&self) -> &RelativePath {
        &self.0
    }

    /// The generated `<uuid>.<ext>` name of the stored file
    pub fn file_name(&self) -> &str {
        self.0.file_name().unwrap_or_default()
    }
}

impl fmt::Display for PhotoReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}", self.0)
    }
}

/// Stores uploaded images under `<workspace>/pictures`.
///
/// Uploads are accepted on their claimed extension alone; file contents are
/// not inspected.
#[derive(Debug)]
pub struct PhotoStore {
    pictures_dir: PathBuf,
    reference_root: RelativePathBuf,
}

impl PhotoStore {
    /// Open the store for `workspace_root`, creating its pictures directory if needed
    pub fn open(workspace_root: impl AsRef<Path>) -> Result<Self> {
        let workspace_root = workspace_root.as_ref();
        let pictures_dir = workspace_root.join(PICTURES_DIR);
        io::ensure_dir(&pictures_dir)?;

        // `.` or `..` have no name of their own, so resolve them first
        let canonical_root = workspace_root
            .canonicalize()
            .map_err(|e| StoreError::io(workspace_root, e))?;
        let workspace_name = canonical_root
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| DEFAULT_WORKSPACE_DIR.to_string());

        Ok(Self {
            pictures_dir,
            reference_root: RelativePathBuf::from(workspace_name).join(PICTURES_DIR),
        })
    }

    pub fn pictures_dir(&self) -> &Path {
        &self.pictures_dir
    }

    /// Validate and store an upload, returning where it can be fetched from.
    ///
    /// `file_name` is the client's original name and only its extension is
    /// used. An empty name or an empty payload counts as no file at all.
    pub fn upload(&self, file_name: &str, mut payload: impl Read) -> Result<PhotoReference> {
        if file_name.is_empty() {
            return Err(StoreError::InvalidUpload("no file selected".to_string()));
        }
        let extension = allowed_extension(file_name)?;

        let stored_name = format!("{}.{extension}", Uuid::new_v4());
        let path = self.pictures_dir.join(&stored_name);

        let mut file = io::create_new_file(&path)?;
        let written = match std::io::copy(&mut payload, &mut file) {
            Ok(n) => n,
            Err(e) => {
                drop(file);
                let _ = io::remove_file_if_exists(&path);
                return Err(StoreError::io(&path, e));
            }
        };
        drop(file);

        if written == 0 {
            io::remove_file_if_exists(&path)?;
            return Err(StoreError::InvalidUpload("no file selected".to_string()));
        }

        log::info!("Stored upload \"{file_name}\" as {stored_name} ({written} bytes)");
        Ok(PhotoReference(self.reference_root.join(stored_name)))
    }
}

/// Lowercased extension of `file_name` if it is on the allow-list.
///
/// The extension is whatever follows the last dot of the final path
/// component, so a bare `.png` counts as a PNG.
fn allowed_extension(file_name: &str) -> Result<String> {
    let extension = Path::new(file_name)
        .file_name()
        .and_then(|name| name.to_str())
        .and_then(|name| name.rsplit_once('.'))
        .map(|(_, ext)| ext.to_lowercase())
        .unwrap_or_default();

    if ALLOWED_EXTENSIONS.contains(&extension.as_str()) {
        Ok(extension)
    } else {
        Err(StoreError::InvalidUpload(
            "unsupported file format, allowed formats: JPEG, SVG, GIF, PNG".to_string(),
        ))
    }
}
