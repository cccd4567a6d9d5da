//! Mapping between notes and the names of the files that hold them.
//!
//! A note with id 12 and title "Groceries" lives in `12_Groceries.md`. The id
//! ends at the first underscore; everything after it up to the extension is
//! the title, so titles may themselves contain underscores.

use super::NoteId;
use std::path::Path;

/// Extension (without the dot) of files that hold notes
pub const NOTE_EXTENSION: &str = "md";

/// Separates the id prefix from the title in a note file name
pub const ID_SEPARATOR: char = '_';

#[cfg(windows)]
fn is_invalid_file_name_char(c: char) -> bool {
    matches!(c, '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*') || (c as u32) < 32
}

#[cfg(not(windows))]
fn is_invalid_file_name_char(c: char) -> bool {
    matches!(c, '/' | '\0')
}

/// Drop every character the host filesystem won't accept in a file name
pub fn sanitize_title(title: &str) -> String {
    title
        .chars()
        .filter(|c| !is_invalid_file_name_char(*c))
        .collect()
}

/// Build the file name a note is stored under, e.g. `12_Groceries.md`
pub fn note_file_name(id: NoteId, title: &str) -> String {
    format!(
        "{id}{ID_SEPARATOR}{}.{NOTE_EXTENSION}",
        sanitize_title(title)
    )
}

/// Recover the id and title encoded in a note file's name.
///
/// Returns `None` for anything that isn't a note file: wrong extension, no
/// separator, or a prefix that isn't a plain decimal number.
pub fn parse_note_file_name(path: &Path) -> Option<(NoteId, String)> {
    if path.extension()? != NOTE_EXTENSION {
        return None;
    }

    let stem = path.file_stem()?.to_str()?;
    let (prefix, title) = stem.split_once(ID_SEPARATOR)?;

    if prefix.is_empty() || !prefix.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let id = prefix.parse::<NoteId>().ok()?;

    Some((id, title.to_string()))
}
