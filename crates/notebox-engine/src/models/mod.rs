pub mod note;
pub mod note_file_name;

pub use note::{Note, NoteDraft, NoteId, NoteUpdate};
pub use note_file_name::{
    ID_SEPARATOR, NOTE_EXTENSION, note_file_name, parse_note_file_name, sanitize_title,
};
