//! Unit tests for the job bounded context.

mod domain_tests;
mod note_ledger_tests;
mod service_tests;

use crate::clock::ManualClock;
use crate::job::domain::{Job, JobNumber};
use chrono::{NaiveDate, TimeZone, Utc};
use rstest::fixture;

/// Clock frozen at 2026-03-02 08:00 UTC.
#[fixture]
pub(super) fn clock() -> ManualClock {
    ManualClock::new(
        Utc.with_ymd_and_hms(2026, 3, 2, 8, 0, 0)
            .single()
            .expect("valid timestamp"),
    )
}

/// A fresh job at the first stage.
#[fixture]
pub(super) fn job(clock: ManualClock) -> Job {
    let day = NaiveDate::from_ymd_opt(2026, 3, 2).expect("valid date");
    let number = JobNumber::for_day(day, 1).expect("valid job number");
    Job::new(number, "123 Main Street", &clock).expect("valid job")
}
