//! Unit tests for the intake bounded context.


use crate::clock::ManualClock;
use crate::intake::domain::{IncomingSubmission, RawAnswer, SubmissionId};
use chrono::{DateTime, TimeZone, Utc};
use rstest::fixture;

fn at(hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 2, hour, 0, 0)
        .single()
        .expect("valid timestamp")
}

/// Clock frozen at 2026-03-02 08:00 UTC.
#[fixture]
pub(super) fn clock() -> ManualClock {
    ManualClock::new(at(8))
}

/// Builds a delivery for `location` submitted at `hour` o'clock.
pub(super) fn incoming(
    id: &str,
    location: &str,
    hour: u32,
    answers: Vec<RawAnswer>,
) -> IncomingSubmission {
    IncomingSubmission {
        submission_id: SubmissionId::new(id).expect("valid submission id"),
        job_location: location.to_owned(),
        job_type: Some("Install".to_owned()),
        submission_timestamp: at(hour),
        technician_name: Some("Dana".to_owned()),
        answers,
    }
}
