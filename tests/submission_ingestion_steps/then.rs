//! Then steps for submission ingestion BDD scenarios.

use super::world::{IngestionWorld, run_async};
use eyre::WrapErr;
use jobflow::intake::{domain::SubmissionId, ports::SubmissionRepository};
use jobflow::job::{
    domain::{JobId, LedgerKind},
    ports::JobRepository,
};
use rstest_bdd_macros::then;

#[then("the summary reports {linked:usize} linked and {unmatched:usize} unmatched")]
fn summary_reports(
    world: &IngestionWorld,
    linked: usize,
    unmatched: usize,
) -> Result<(), eyre::Report> {
    let summary = world
        .last_summary
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing ingestion summary"))?;
    eyre::ensure!(
        summary.linked == linked && summary.unmatched == unmatched,
        "expected {linked} linked and {unmatched} unmatched, got {summary:?}"
    );
    eyre::ensure!(summary.errors.is_empty(), "unexpected errors: {summary:?}");
    Ok(())
}

#[then(r#"submission "{id}" is linked to the job"#)]
fn submission_is_linked(world: &IngestionWorld, id: String) -> Result<(), eyre::Report> {
    let expected = world.job()?.id();
    let submission_id = SubmissionId::new(id).wrap_err("scenario submission id")?;
    let stored = run_async(world.submissions.find_by_id(&submission_id))
        .wrap_err("load submission")?
        .ok_or_else(|| eyre::eyre!("submission {submission_id} not stored"))?;
    eyre::ensure!(
        stored.linked_job_id() == Some(expected),
        "submission linked to {:?}, expected {expected}",
        stored.linked_job_id()
    );
    Ok(())
}

fn ledger_len(
    world: &IngestionWorld,
    job_id: JobId,
    ledger: &str,
) -> Result<usize, eyre::Report> {
    let kind = match ledger {
        "boss" => LedgerKind::Boss,
        "additional" => LedgerKind::Additional,
        "materials" => LedgerKind::Materials,
        other => return Err(eyre::eyre!("unknown ledger in scenario: {other}")),
    };
    let job = run_async(world.jobs.find_by_id(job_id))
        .wrap_err("load job")?
        .ok_or_else(|| eyre::eyre!("job {job_id} not stored"))?;
    Ok(job.ledger(kind).len())
}

#[then(r#"the job holds {count:usize} "{ledger}" notes"#)]
fn job_holds_notes(
    world: &IngestionWorld,
    count: usize,
    ledger: String,
) -> Result<(), eyre::Report> {
    let actual = ledger_len(world, world.job()?.id(), &ledger)?;
    eyre::ensure!(actual == count, "expected {count} {ledger} notes, found {actual}");
    Ok(())
}

#[then(r#"the newer job holds {count:usize} "{ledger}" notes"#)]
fn newer_job_holds_notes(
    world: &IngestionWorld,
    count: usize,
    ledger: String,
) -> Result<(), eyre::Report> {
    let actual = ledger_len(world, world.newer_job()?.id(), &ledger)?;
    eyre::ensure!(
        actual == count,
        "expected {count} {ledger} notes on the newer job, found {actual}"
    );
    Ok(())
}
