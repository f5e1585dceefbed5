//! When steps for submission ingestion BDD scenarios.

use super::world::{IngestionWorld, run_async};
use eyre::WrapErr;
use jobflow::job::services::CreateJobRequest;
use rstest_bdd_macros::when;

#[when("pending submissions are ingested")]
fn ingest_pending(world: &mut IngestionWorld) -> Result<(), eyre::Report> {
    let summary = run_async(world.service.ingest_pending()).wrap_err("ingest pending")?;
    world.last_summary = Some(summary);
    Ok(())
}

#[when("linked submissions are re-synchronised")]
fn resync_linked(world: &mut IngestionWorld) -> Result<(), eyre::Report> {
    let summary = run_async(world.service.resync_linked()).wrap_err("resync linked")?;
    world.last_summary = Some(summary);
    Ok(())
}

#[when("the received submissions are ingested")]
fn ingest_received(world: &mut IngestionWorld) {
    let summary = run_async(world.service.ingest(&world.received));
    world.last_summary = Some(summary);
}

#[when(r#"another job is created at "{address}""#)]
fn another_job_at(world: &mut IngestionWorld, address: String) -> Result<(), eyre::Report> {
    let created = run_async(world.registry.create_job(CreateJobRequest::new(address)))
        .wrap_err("create newer job")?;
    world.newer_job = Some(created);
    Ok(())
}
