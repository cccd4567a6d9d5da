pub mod error;
pub mod io;
pub mod models;
pub mod store;
pub mod workspace;

#[cfg(test)]
pub mod tests;

// Re-export key types for easier usage
pub use error::{Result, StoreError};
pub use models::{note::*, note_file_name::*};
pub use store::{note_store::NoteStore, photo_store::*};
pub use workspace::{DEFAULT_WORKSPACE_DIR, Workspace};
