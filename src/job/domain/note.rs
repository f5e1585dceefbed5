//! Status-tracked note ledgers embedded in each job.
//!
//! A job owns three independent ledgers. Entries are only ever appended or
//! have their status mutated in place; they are never removed or reordered.

use super::{JobDomainError, NoteId, ParseJobValueError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle status of a single note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoteStatus {
    /// Nobody has acted on the note yet.
    Undone,
    /// Someone is working on the note.
    InProgress,
    /// The note has been dealt with.
    Done,
}

impl NoteStatus {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Undone => "undone",
            Self::InProgress => "in_progress",
            Self::Done => "done",
        }
    }
}

impl fmt::Display for NoteStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for NoteStatus {
    type Error = ParseJobValueError;

    /// Parses storage keys as well as the labels field forms use
    /// ("Not done", "In Progress", "Complete").
    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        match normalized.as_str() {
            "undone" | "not_done" | "todo" | "pending" => Ok(Self::Undone),
            "in_progress" | "started" | "working_on_it" => Ok(Self::InProgress),
            "done" | "complete" | "completed" => Ok(Self::Done),
            _ => Err(ParseJobValueError::NoteStatus(value.to_owned())),
        }
    }
}

/// Identifies one of a job's three ledgers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LedgerKind {
    /// Notes from the office or manager (`boss_notes_status`).
    Boss,
    /// Field notes from technicians (`additional_notes_status`).
    Additional,
    /// Parts and materials requests (`materials_notes_status`).
    Materials,
}

impl LedgerKind {
    /// Every ledger kind in storage column order.
    pub const ALL: [Self; 3] = [Self::Boss, Self::Additional, Self::Materials];

    /// Returns the persisted column name for the ledger.
    #[must_use]
    pub const fn column_name(self) -> &'static str {
        match self {
            Self::Boss => "boss_notes_status",
            Self::Additional => "additional_notes_status",
            Self::Materials => "materials_notes_status",
        }
    }
}

impl fmt::Display for LedgerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column_name())
    }
}

impl TryFrom<&str> for LedgerKind {
    type Error = ParseJobValueError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "boss" | "boss_notes" | "boss_notes_status" => Ok(Self::Boss),
            "additional" | "additional_notes" | "additional_notes_status" => Ok(Self::Additional),
            "materials" | "materials_notes" | "materials_notes_status" => Ok(Self::Materials),
            _ => Err(ParseJobValueError::Ledger(value.to_owned())),
        }
    }
}

/// A single ledger entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    /// Identifier, unique within the owning ledger.
    pub id: NoteId,
    /// Free-form note text.
    pub note_text: String,
    /// Current lifecycle status.
    pub status: NoteStatus,
    /// When the note was appended.
    pub created_at: DateTime<Utc>,
    /// Author of the note.
    pub created_by: String,
    /// When the status last changed.
    pub updated_at: DateTime<Utc>,
    /// When the note was last synchronised from its external source.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub synced_at: Option<DateTime<Utc>>,
    /// External submission the note was extracted from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submission_id: Option<String>,
}

/// Input for appending a note to a ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewNote {
    /// Identifier to assign.
    pub id: NoteId,
    /// Note text; must be non-empty after trimming.
    pub text: String,
    /// Author recorded on the note.
    pub author: String,
    /// Originating external submission, if any.
    pub submission_id: Option<String>,
}

impl NewNote {
    /// Creates an append request without a submission back-reference.
    #[must_use]
    pub fn new(id: NoteId, text: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
            author: author.into(),
            submission_id: None,
        }
    }

    /// Tags the note with the submission it was extracted from.
    #[must_use]
    pub fn with_submission(mut self, submission_id: impl Into<String>) -> Self {
        self.submission_id = Some(submission_id.into());
        self
    }
}

/// Append-only ordered collection of notes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NoteLedger(Vec<Note>);

impl NoteLedger {
    /// Creates an empty ledger.
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Appends a new `undone` note stamped with `now`.
    ///
    /// Synced submissions carry `synced_at = now` as well.
    ///
    /// # Errors
    ///
    /// Returns [`JobDomainError::EmptyNoteText`] when the text is blank, or
    /// [`JobDomainError::DuplicateNoteId`] when the identifier is already in
    /// use in this ledger.
    pub fn append(&mut self, note: NewNote, now: DateTime<Utc>) -> Result<Note, JobDomainError> {
        let text = note.text.trim();
        if text.is_empty() {
            return Err(JobDomainError::EmptyNoteText);
        }
        if self.contains(note.id) {
            return Err(JobDomainError::DuplicateNoteId(note.id));
        }
        let synced_at = note.submission_id.as_ref().map(|_| now);
        let entry = Note {
            id: note.id,
            note_text: text.to_owned(),
            status: NoteStatus::Undone,
            created_at: now,
            created_by: note.author,
            updated_at: now,
            synced_at,
            submission_id: note.submission_id,
        };
        self.0.push(entry.clone());
        Ok(entry)
    }

    /// Replaces the status of the note with `note_id`.
    ///
    /// Returns `None` when no entry matches.
    pub fn set_status(
        &mut self,
        note_id: NoteId,
        status: NoteStatus,
        now: DateTime<Utc>,
    ) -> Option<&Note> {
        let note = self.0.iter_mut().find(|note| note.id == note_id)?;
        note.status = status;
        note.updated_at = now;
        Some(note)
    }

    /// Stamps `synced_at = created_at` on every entry lacking it.
    ///
    /// Returns the number of entries stamped.
    pub fn backfill_synced_at(&mut self) -> usize {
        let mut stamped = 0;
        for note in self.0.iter_mut().filter(|note| note.synced_at.is_none()) {
            note.synced_at = Some(note.created_at);
            stamped += 1;
        }
        stamped
    }

    /// Returns the note with `note_id`, if present.
    #[must_use]
    pub fn get(&self, note_id: NoteId) -> Option<&Note> {
        self.0.iter().find(|note| note.id == note_id)
    }

    /// Returns `true` when any entry was extracted from `submission_id`.
    #[must_use]
    pub fn has_submission(&self, submission_id: &str) -> bool {
        self.0
            .iter()
            .any(|note| note.submission_id.as_deref() == Some(submission_id))
    }

    /// Returns `true` when an entry with `note_id` exists.
    #[must_use]
    pub fn contains(&self, note_id: NoteId) -> bool {
        self.get(note_id).is_some()
    }

    /// Iterates over entries in append order.
    pub fn iter(&self) -> impl Iterator<Item = &Note> {
        self.0.iter()
    }

    /// Returns entries in append order.
    #[must_use]
    pub fn as_slice(&self) -> &[Note] {
        &self.0
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` when the ledger has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
