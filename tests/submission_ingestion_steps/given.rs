//! Given steps for submission ingestion BDD scenarios.

use super::world::{IngestionWorld, run_async};
use chrono::Utc;
use eyre::WrapErr;
use jobflow::intake::domain::{IncomingSubmission, RawAnswer, SubmissionId};
use jobflow::job::services::CreateJobRequest;
use rstest_bdd_macros::given;

#[given(r#"a job at "{address}""#)]
fn job_at(world: &mut IngestionWorld, address: String) -> Result<(), eyre::Report> {
    let created = run_async(world.registry.create_job(CreateJobRequest::new(address)))
        .wrap_err("create job for ingestion scenario")?;
    world.job = Some(created);
    Ok(())
}

#[given(r#"a submission "{id}" at "{location}" with additional notes "{notes}""#)]
fn submission_with_notes(
    world: &mut IngestionWorld,
    id: String,
    location: String,
    notes: String,
) -> Result<(), eyre::Report> {
    let incoming = IncomingSubmission {
        submission_id: SubmissionId::new(id).wrap_err("scenario submission id")?,
        job_location: location,
        job_type: None,
        submission_timestamp: Utc::now(),
        technician_name: Some("Sam".to_owned()),
        answers: vec![RawAnswer::text("additional_notes", notes)],
    };
    let received =
        run_async(world.service.receive(incoming)).wrap_err("receive scenario submission")?;
    world.received.push(received);
    Ok(())
}
