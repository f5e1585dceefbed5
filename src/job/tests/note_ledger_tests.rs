//! Tests for append-only note ledgers and their job-level operations.

use super::{clock, job};
use crate::clock::ManualClock;
use crate::job::domain::{
    Job, JobDomainError, LedgerKind, NewNote, NoteId, NoteLedger, NoteStatus,
};
use chrono::Duration;
use mockable::Clock;
use rstest::rstest;

fn ledger_with(texts: &[&str], clock: &ManualClock) -> (NoteLedger, Vec<NoteId>) {
    let mut ledger = NoteLedger::new();
    let ids = texts
        .iter()
        .map(|text| {
            ledger
                .append(NewNote::new(NoteId::new(), *text, "dispatch"), clock.utc())
                .expect("valid note")
                .id
        })
        .collect();
    (ledger, ids)
}

#[rstest]
fn append_creates_undone_note(clock: ManualClock) {
    let mut ledger = NoteLedger::new();
    let id = NoteId::new();

    let note = ledger
        .append(NewNote::new(id, "  Bring a ladder  ", "dispatch"), clock.utc())
        .expect("valid note");

    assert_eq!(note.id, id);
    assert_eq!(note.note_text, "Bring a ladder");
    assert_eq!(note.status, NoteStatus::Undone);
    assert_eq!(note.created_by, "dispatch");
    assert_eq!(note.created_at, clock.utc());
    assert_eq!(note.updated_at, clock.utc());
    assert_eq!(note.synced_at, None);
    assert_eq!(ledger.as_slice(), [note]);
}

#[rstest]
fn append_from_submission_is_synced(clock: ManualClock) {
    let mut ledger = NoteLedger::new();
    let note = ledger
        .append(
            NewNote::new(NoteId::new(), "Filter clogged", "Sam").with_submission("ct-1"),
            clock.utc(),
        )
        .expect("valid note");

    assert_eq!(note.submission_id.as_deref(), Some("ct-1"));
    assert_eq!(note.synced_at, Some(clock.utc()));
    assert!(ledger.has_submission("ct-1"));
    assert!(!ledger.has_submission("ct-2"));
}

#[rstest]
#[case("")]
#[case("   ")]
fn append_rejects_blank_text(clock: ManualClock, #[case] text: &str) {
    let mut ledger = NoteLedger::new();
    let result = ledger.append(NewNote::new(NoteId::new(), text, "dispatch"), clock.utc());
    assert_eq!(result, Err(JobDomainError::EmptyNoteText));
    assert!(ledger.is_empty());
}

#[rstest]
fn append_rejects_reused_identifier(clock: ManualClock) {
    let (mut ledger, ids) = ledger_with(&["first"], &clock);
    let reused = *ids.first().expect("one id");

    let result = ledger.append(NewNote::new(reused, "second", "dispatch"), clock.utc());

    assert_eq!(result, Err(JobDomainError::DuplicateNoteId(reused)));
    assert_eq!(ledger.len(), 1);
}

#[rstest]
fn set_status_changes_only_the_target(clock: ManualClock) {
    let (mut ledger, ids) = ledger_with(&["one", "two", "three"], &clock);
    let before = ledger.clone();
    let target = *ids.get(1).expect("second id");
    clock.advance(Duration::minutes(30));

    let updated = ledger
        .set_status(target, NoteStatus::Done, clock.utc())
        .cloned()
        .expect("note exists");

    assert_eq!(updated.status, NoteStatus::Done);
    assert_eq!(updated.updated_at, clock.utc());
    let after = ledger.as_slice();
    assert_eq!(after.len(), 3);
    for (old, new) in before.iter().zip(after) {
        if old.id == target {
            assert_eq!(new.note_text, old.note_text);
            assert_eq!(new.created_at, old.created_at);
        } else {
            assert_eq!(new, old);
        }
    }
}

#[rstest]
fn set_status_on_missing_note_returns_none(clock: ManualClock) {
    let (mut ledger, _) = ledger_with(&["one"], &clock);
    let before = ledger.clone();

    assert!(
        ledger
            .set_status(NoteId::new(), NoteStatus::Done, clock.utc())
            .is_none()
    );
    assert_eq!(ledger, before);
}

#[rstest]
fn backfill_stamps_created_at_once(clock: ManualClock) {
    let (mut ledger, _) = ledger_with(&["one", "two"], &clock);
    clock.advance(Duration::days(1));
    ledger
        .append(
            NewNote::new(NoteId::new(), "synced", "Sam").with_submission("ct-9"),
            clock.utc(),
        )
        .expect("valid note");

    assert_eq!(ledger.backfill_synced_at(), 2);
    assert!(ledger.iter().all(|note| note.synced_at.is_some()));
    assert!(
        ledger
            .iter()
            .all(|note| note.synced_at == Some(note.created_at))
    );
    assert_eq!(ledger.backfill_synced_at(), 0);
}

#[rstest]
fn job_ledgers_are_independent(mut job: Job, clock: ManualClock) {
    let note = job
        .append_note(
            LedgerKind::Materials,
            NewNote::new(NoteId::new(), "3 ton condenser", "Sam"),
            &clock,
        )
        .expect("valid note");

    assert_eq!(job.ledger(LedgerKind::Materials).len(), 1);
    assert!(job.ledger(LedgerKind::Boss).is_empty());
    assert!(job.ledger(LedgerKind::Additional).is_empty());
    assert_eq!(
        job.find_note(note.id).map(|(kind, _)| kind),
        Some(LedgerKind::Materials)
    );
}

#[rstest]
fn job_set_note_status_locates_the_ledger(mut job: Job, clock: ManualClock) {
    let note = job
        .append_note(
            LedgerKind::Additional,
            NewNote::new(NoteId::new(), "Dog in yard", "Sam"),
            &clock,
        )
        .expect("valid note");

    let (kind, updated) = job
        .set_note_status(note.id, NoteStatus::InProgress, &clock)
        .expect("note exists");

    assert_eq!(kind, LedgerKind::Additional);
    assert_eq!(updated.status, NoteStatus::InProgress);
}

#[rstest]
fn job_set_note_status_rejects_unknown_note(mut job: Job, clock: ManualClock) {
    let missing = NoteId::new();
    let result = job.set_note_status(missing, NoteStatus::Done, &clock);
    assert_eq!(
        result,
        Err(JobDomainError::NoteNotFound {
            job_id: job.id(),
            note_id: missing,
        })
    );
}
