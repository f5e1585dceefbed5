//! Identifier generation port.

use crate::job::domain::NoteId;

/// Supplies identifiers for newly appended notes.
pub trait NoteIdGenerator: Send + Sync {
    /// Returns an identifier not previously handed out.
    fn next_note_id(&self) -> NoteId;
}

/// Generator backed by random v4 UUIDs.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomNoteIds;

impl NoteIdGenerator for RandomNoteIds {
    fn next_note_id(&self) -> NoteId {
        NoteId::new()
    }
}
