//! Given steps for stage progression BDD scenarios.

use super::world::{StageProgressionWorld, run_async};
use eyre::WrapErr;
use jobflow::job::services::CreateJobRequest;
use rstest_bdd_macros::given;

#[given(r#"a new job at "{address}""#)]
fn new_job(world: &mut StageProgressionWorld, address: String) -> Result<(), eyre::Report> {
    let created = run_async(world.registry.create_job(CreateJobRequest::new(address)))
        .wrap_err("create job for stage scenario")?;
    world.job = Some(created);
    Ok(())
}

#[given(r#"the job has been moved to "{stage}""#)]
fn job_has_been_moved(
    world: &mut StageProgressionWorld,
    stage: String,
) -> Result<(), eyre::Report> {
    let job_id = world.job()?.id();
    let moved = run_async(world.progression.move_to_stage_named(job_id, &stage))
        .wrap_err("move job in scenario setup")?;
    world.job = Some(moved);
    Ok(())
}
