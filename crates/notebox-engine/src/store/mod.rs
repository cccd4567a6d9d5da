pub mod note_store;
pub mod photo_store;

pub use note_store::NoteStore;
pub use photo_store::{ALLOWED_EXTENSIONS, PICTURES_DIR, PhotoReference, PhotoStore};
