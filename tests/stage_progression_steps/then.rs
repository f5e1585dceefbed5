//! Then steps for stage progression BDD scenarios.

use super::world::{StageProgressionWorld, run_async};
use jobflow::job::{
    domain::{JobDomainError, JobStatus, Stage},
    services::JobServiceError,
};
use rstest_bdd_macros::then;

#[then(r#"the job is at stage "{stage}""#)]
fn job_is_at_stage(world: &StageProgressionWorld, stage: String) -> Result<(), eyre::Report> {
    let expected = Stage::try_from(stage.as_str())
        .map_err(|err| eyre::eyre!("invalid expected stage in scenario: {err}"))?;
    let job = world.job()?;
    eyre::ensure!(
        job.stage() == expected,
        "expected stage {}, found {}",
        expected,
        job.stage()
    );
    Ok(())
}

#[then("the stage history has {count:usize} entries")]
fn stage_history_has(world: &StageProgressionWorld, count: usize) -> Result<(), eyre::Report> {
    let history = world.job()?.stage_history();
    eyre::ensure!(
        history.len() == count,
        "expected {count} history entries, found {}",
        history.len()
    );
    Ok(())
}

#[then(r#"the job status is "{status}""#)]
fn job_status_is(world: &StageProgressionWorld, status: String) -> Result<(), eyre::Report> {
    let expected = JobStatus::try_from(status.as_str())
        .map_err(|err| eyre::eyre!("invalid expected status in scenario: {err}"))?;
    let actual = world.job()?.status();
    eyre::ensure!(actual == expected, "expected status {expected}, found {actual}");
    Ok(())
}

#[then("stage progress is {completed:u32} of {total:u32}")]
fn stage_progress_is(
    world: &StageProgressionWorld,
    completed: u32,
    total: u32,
) -> Result<(), eyre::Report> {
    let job_id = world.job()?.id();
    let progress = run_async(world.progression.stage_progress(job_id))
        .map_err(|err| eyre::eyre!("stage progress lookup failed: {err}"))?;
    eyre::ensure!(
        progress.completed == completed && progress.total == total,
        "expected {completed} of {total}, found {} of {}",
        progress.completed,
        progress.total
    );
    Ok(())
}

#[then("the step is rejected as invalid")]
fn step_rejected(world: &StageProgressionWorld) -> Result<(), eyre::Report> {
    let result = world
        .last_result
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing step result"))?;
    if !matches!(
        result,
        Err(JobServiceError::Domain(JobDomainError::InvalidStep { .. }))
    ) {
        return Err(eyre::eyre!("expected InvalidStep error, got {result:?}"));
    }
    Ok(())
}

#[then("the latest stage entry is a manual override")]
fn latest_entry_is_manual(world: &StageProgressionWorld) -> Result<(), eyre::Report> {
    let latest = world
        .job()?
        .stage_history()
        .latest()
        .ok_or_else(|| eyre::eyre!("stage history is empty"))?;
    eyre::ensure!(latest.manual, "latest stage entry was not manual");
    Ok(())
}
