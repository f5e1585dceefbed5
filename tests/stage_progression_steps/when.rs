//! When steps for stage progression BDD scenarios.

use super::world::{StageProgressionWorld, run_async};
use jobflow::job::{domain::Job, services::JobServiceError};
use rstest_bdd_macros::when;

fn record(world: &mut StageProgressionWorld, result: Result<Job, JobServiceError>) {
    if let Ok(ref updated) = result {
        world.job = Some(updated.clone());
    }
    world.last_result = Some(result);
}

#[when(r#"step "{step}" is completed"#)]
fn complete_step(world: &mut StageProgressionWorld, step: String) -> Result<(), eyre::Report> {
    let job_id = world.job()?.id();
    let result = run_async(world.progression.complete_step(job_id, &step));
    record(world, result);
    Ok(())
}

#[when(r#"the job is moved to "{stage}""#)]
fn move_job(world: &mut StageProgressionWorld, stage: String) -> Result<(), eyre::Report> {
    let job_id = world.job()?.id();
    let result = run_async(world.progression.move_to_stage_named(job_id, &stage));
    record(world, result);
    Ok(())
}
