//! Tests for the stage table, identifiers and status ordering.

use crate::job::domain::{
    JobDomainError, JobNumber, JobStatus, LedgerKind, NoteStatus, ParseJobValueError,
    ProposalStatus, Stage, StageTable, UnifiedStatus,
};
use chrono::NaiveDate;
use rstest::rstest;

#[rstest]
fn stage_table_is_linear_and_ends_in_completed() {
    let mut stage = StageTable::initial();
    let mut visited = vec![stage];
    while let Some(next) = stage.next() {
        assert!(!visited.contains(&next), "stage {next} visited twice");
        visited.push(next);
        stage = next;
    }

    assert_eq!(visited, Stage::ALL.to_vec());
    assert!(stage.is_terminal());
    assert!(stage.definition().required_steps.is_empty());
}

#[rstest]
fn every_non_terminal_stage_requires_steps() {
    for definition in StageTable::all() {
        if definition.stage.is_terminal() {
            continue;
        }
        assert!(
            !definition.required_steps.is_empty(),
            "{} has no required steps",
            definition.stage
        );
        assert_eq!(definition.next, definition.stage.next());
    }
}

#[rstest]
fn beginning_requires_its_checklist() {
    let keys: Vec<&str> = Stage::Beginning.definition().step_keys().collect();
    assert_eq!(keys, ["permit_pulled", "equipment_ordered", "site_prepped"]);
    assert!(Stage::Beginning.definition().requires("site_prepped"));
    assert!(!Stage::Beginning.definition().requires("equipment_set"));
}

#[rstest]
#[case("rough_in", Stage::RoughIn)]
#[case("Rough-In", Stage::RoughIn)]
#[case("trim out", Stage::TrimOut)]
#[case(" completed ", Stage::Completed)]
fn stage_parses_storage_and_display_forms(#[case] raw: &str, #[case] expected: Stage) {
    assert_eq!(Stage::try_from(raw), Ok(expected));
}

#[rstest]
fn stage_rejects_unknown_key() {
    assert_eq!(
        Stage::try_from("demolition"),
        Err(ParseJobValueError::Stage("demolition".to_owned()))
    );
}

#[rstest]
fn job_number_renders_day_and_padded_sequence() {
    let day = NaiveDate::from_ymd_opt(2026, 3, 2).expect("valid date");
    let number = JobNumber::for_day(day, 7).expect("valid job number");

    assert_eq!(number.to_string(), "20260302-007");
    assert_eq!(JobNumber::try_from("20260302-007"), Ok(number));
}

#[rstest]
#[case("20260302-000")]
#[case("2026-03-02")]
#[case("20261302-001")]
#[case("")]
fn job_number_rejects_malformed_text(#[case] raw: &str) {
    assert!(matches!(
        JobNumber::try_from(raw),
        Err(JobDomainError::InvalidJobNumber(_))
    ));
}

#[rstest]
fn job_status_order_ranks_progress() {
    assert!(JobStatus::NotScheduled < JobStatus::Scheduled);
    assert!(JobStatus::WorkingOnIt < JobStatus::Done);
    assert_eq!(
        JobStatus::most_advanced([JobStatus::Scheduled, JobStatus::Done, JobStatus::PartsNeeded]),
        Some(JobStatus::Done)
    );
    assert!(!JobStatus::Archived.is_active());
    assert!(JobStatus::Cancelled.is_active());
}

#[rstest]
#[case(Stage::Beginning, None)]
#[case(Stage::TrimOut, Some(JobStatus::WorkingOnIt))]
#[case(Stage::Completed, Some(JobStatus::Done))]
fn stages_imply_minimum_status(#[case] stage: Stage, #[case] expected: Option<JobStatus>) {
    assert_eq!(JobStatus::implied_by(stage), expected);
}

#[rstest]
fn unified_status_places_jobs_after_proposals() {
    let statuses = [
        UnifiedStatus::from(ProposalStatus::Approved),
        UnifiedStatus::from(JobStatus::NotScheduled),
        UnifiedStatus::from(ProposalStatus::Viewed),
    ];
    assert_eq!(
        UnifiedStatus::most_advanced(statuses),
        Some(UnifiedStatus::Job(JobStatus::NotScheduled))
    );
    assert!(UnifiedStatus::from(ProposalStatus::Sent) < UnifiedStatus::from(ProposalStatus::Approved));
}

#[rstest]
#[case("undone", NoteStatus::Undone)]
#[case("Not done", NoteStatus::Undone)]
#[case("In Progress", NoteStatus::InProgress)]
#[case("complete", NoteStatus::Done)]
fn note_status_accepts_form_labels(#[case] raw: &str, #[case] expected: NoteStatus) {
    assert_eq!(NoteStatus::try_from(raw), Ok(expected));
}

#[rstest]
fn ledger_kinds_map_to_storage_columns() {
    let columns: Vec<&str> = LedgerKind::ALL
        .into_iter()
        .map(LedgerKind::column_name)
        .collect();
    assert_eq!(
        columns,
        [
            "boss_notes_status",
            "additional_notes_status",
            "materials_notes_status"
        ]
    );
}
