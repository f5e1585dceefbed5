//! Service orchestration tests over the in-memory job repository.

use super::clock;
use crate::clock::ManualClock;
use crate::job::{
    adapters::memory::InMemoryJobRepository,
    domain::{
        Job, JobDomainError, JobId, JobNumber, JobStatus, JobVersion, LedgerKind, NoteId, NoteStatus,
        Stage,
    },
    ports::{JobRepository, JobRepositoryError, JobRepositoryResult, RandomNoteIds},
    services::{
        AppendNoteRequest, CreateJobRequest, JobRegistryService, JobServiceError, JobWriter,
        NoteLedgerService, StageProgressionService, WriteRetryConfig,
    },
};
use async_trait::async_trait;
use chrono::{Duration, NaiveDate};
use rstest::{fixture, rstest};
use std::sync::Arc;

struct Services {
    repository: Arc<InMemoryJobRepository>,
    clock: Arc<ManualClock>,
    registry: JobRegistryService<InMemoryJobRepository, ManualClock>,
    progression: StageProgressionService<InMemoryJobRepository, ManualClock>,
    notes: NoteLedgerService<InMemoryJobRepository, ManualClock>,
}

#[fixture]
fn services(clock: ManualClock) -> Services {
    let repository = Arc::new(InMemoryJobRepository::new());
    let shared_clock = Arc::new(clock);
    let config = WriteRetryConfig { max_attempts: 50 };
    Services {
        registry: JobRegistryService::with_config(
            Arc::clone(&repository),
            Arc::clone(&shared_clock),
            config,
        ),
        progression: StageProgressionService::with_config(
            Arc::clone(&repository),
            Arc::clone(&shared_clock),
            config,
        ),
        notes: NoteLedgerService::with_config(
            Arc::clone(&repository),
            Arc::clone(&shared_clock),
            Arc::new(RandomNoteIds),
            config,
        ),
        repository,
        clock: shared_clock,
    }
}

async fn create(services: &Services, address: &str) -> Job {
    services
        .registry
        .create_job(CreateJobRequest::new(address))
        .await
        .expect("job creation should succeed")
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn job_numbers_are_sequenced_per_day(services: Services) {
    let first = create(&services, "1 Elm St").await;
    let second = create(&services, "2 Elm St").await;
    services.clock.advance(Duration::days(1));
    let next_day = create(&services, "3 Elm St").await;

    assert_eq!(first.job_number().to_string(), "20260302-001");
    assert_eq!(second.job_number().to_string(), "20260302-002");
    assert_eq!(next_day.job_number().to_string(), "20260303-001");
    assert_eq!(first.version(), JobVersion::new(1));
    assert_eq!(
        services
            .repository
            .count_created_on(NaiveDate::from_ymd_opt(2026, 3, 2).expect("valid date"))
            .await
            .expect("count should succeed"),
        2
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn store_rejects_a_taken_job_number(services: Services) {
    let day = NaiveDate::from_ymd_opt(2026, 3, 2).expect("valid date");
    let number = JobNumber::for_day(day, 1).expect("valid job number");
    let first = Job::new(number.clone(), "1 Elm St", &*services.clock).expect("valid job");
    let second = Job::new(number.clone(), "2 Elm St", &*services.clock).expect("valid job");

    services.repository.store(&first).await.expect("first store");
    let result = services.repository.store(&second).await;

    assert!(matches!(
        &result,
        Err(JobRepositoryError::DuplicateJobNumber(taken)) if *taken == number
    ));
    assert!(result.is_err_and(|err| err.is_retryable()));
    assert!(
        services
            .repository
            .find_by_id(second.id())
            .await
            .expect("lookup should succeed")
            .is_none()
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn concurrent_creations_get_distinct_job_numbers(services: Services) {
    let registry = Arc::new(services.registry);
    let mut handles = Vec::new();
    for index in 0..8 {
        let creator = Arc::clone(&registry);
        handles.push(tokio::spawn(async move {
            creator
                .create_job(CreateJobRequest::new(format!("{index} Elm St")))
                .await
        }));
    }

    let mut numbers = Vec::new();
    for handle in handles {
        let job = handle
            .await
            .expect("task should not panic")
            .expect("creation should succeed");
        numbers.push(job.job_number().to_string());
    }
    numbers.sort();

    let expected: Vec<String> = (1..=8).map(|seq| format!("20260302-{seq:03}")).collect();
    assert_eq!(numbers, expected);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn create_job_rejects_blank_address(services: Services) {
    let result = services.registry.create_job(CreateJobRequest::new("  ")).await;
    assert!(matches!(
        result,
        Err(JobServiceError::Domain(JobDomainError::EmptyServiceAddress))
    ));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn archived_jobs_leave_the_active_list(services: Services) {
    let kept = create(&services, "1 Elm St").await;
    let archived = create(&services, "2 Elm St").await;

    services
        .registry
        .set_status(archived.id(), JobStatus::Archived)
        .await
        .expect("status change should succeed");

    let active: Vec<JobId> = services
        .repository
        .list_active()
        .await
        .expect("listing should succeed")
        .iter()
        .map(Job::id)
        .collect();
    assert_eq!(active, [kept.id()]);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn completing_the_last_step_auto_advances(services: Services) {
    let job = create(&services, "1 Elm St").await;
    for step in ["permit_pulled", "equipment_ordered"] {
        let updated = services
            .progression
            .complete_step(job.id(), step)
            .await
            .expect("step should complete");
        assert_eq!(updated.stage(), Stage::Beginning);
    }

    let advanced = services
        .progression
        .complete_step(job.id(), "site_prepped")
        .await
        .expect("step should complete");

    assert_eq!(advanced.stage(), Stage::RoughIn);
    assert_eq!(advanced.status(), JobStatus::WorkingOnIt);
    let progress = services
        .progression
        .stage_progress(job.id())
        .await
        .expect("progress should load");
    assert_eq!((progress.completed, progress.total), (0, 3));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn invalid_step_is_not_retryable_and_not_written(services: Services) {
    let job = create(&services, "1 Elm St").await;

    let err = services
        .progression
        .complete_step(job.id(), "nonexistent_step")
        .await
        .expect_err("unknown step should be rejected");

    assert!(matches!(
        err,
        JobServiceError::Domain(JobDomainError::InvalidStep { .. })
    ));
    assert!(!err.is_retryable());
    let stored = services.registry.get(job.id()).await.expect("job exists");
    assert_eq!(stored.version(), job.version());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn manual_move_accepts_stage_names(services: Services) {
    let job = create(&services, "1 Elm St").await;

    let moved = services
        .progression
        .move_to_stage_named(job.id(), "closing")
        .await
        .expect("manual move should succeed");
    assert_eq!(moved.stage(), Stage::Closing);

    let err = services
        .progression
        .move_to_stage_named(job.id(), "demolition")
        .await
        .expect_err("unknown stage should be rejected");
    assert!(matches!(err, JobServiceError::InvalidValue(_)));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn missing_job_is_reported_as_not_found(services: Services) {
    let err = services
        .progression
        .advance_if_ready(JobId::new())
        .await
        .expect_err("missing job should fail");
    assert!(err.is_not_found());
    assert!(!err.is_retryable());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn note_status_is_set_through_the_note_index(services: Services) {
    let job = create(&services, "1 Elm St").await;
    let _other = create(&services, "2 Elm St").await;
    let appended = services
        .notes
        .append_note(AppendNoteRequest::new(
            job.id(),
            LedgerKind::Boss,
            "Call customer before arrival",
            "office",
        ))
        .await
        .expect("append should succeed");

    let updated = services
        .notes
        .set_note_status(appended.note.id, NoteStatus::Done)
        .await
        .expect("status change should succeed");

    assert_eq!(updated.job_id, job.id());
    assert_eq!(updated.ledger, LedgerKind::Boss);
    assert_eq!(updated.note.status, NoteStatus::Done);
    let found = services
        .notes
        .find_note(appended.note.id)
        .await
        .expect("note should be found");
    assert_eq!(found, updated);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn unknown_note_is_not_found(services: Services) {
    let missing = NoteId::new();
    let err = services
        .notes
        .set_note_status(missing, NoteStatus::Done)
        .await
        .expect_err("missing note should fail");
    assert!(matches!(err, JobServiceError::NoteNotFound(id) if id == missing));
    assert!(err.is_not_found());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn backfill_counts_each_note_once(services: Services) {
    for address in ["1 Elm St", "2 Elm St"] {
        let job = create(&services, address).await;
        for ledger in [LedgerKind::Boss, LedgerKind::Materials] {
            services
                .notes
                .append_note(AppendNoteRequest::new(job.id(), ledger, "check", "office"))
                .await
                .expect("append should succeed");
        }
    }

    assert_eq!(
        services.notes.backfill_synced_at().await.expect("backfill"),
        4
    );
    assert_eq!(
        services.notes.backfill_synced_at().await.expect("backfill"),
        0
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn concurrent_writers_do_not_lose_updates(services: Services) {
    let job = create(&services, "1 Elm St").await;
    let progression = Arc::new(services.progression);
    let notes = Arc::new(services.notes);

    let mut handles = Vec::new();
    for step in ["permit_pulled", "equipment_ordered", "site_prepped"] {
        let worker = Arc::clone(&progression);
        let job_id = job.id();
        handles.push(tokio::spawn(async move {
            worker.complete_step(job_id, step).await.map(|_| ())
        }));
    }
    for index in 0..10 {
        let ledger = Arc::clone(&notes);
        let job_id = job.id();
        handles.push(tokio::spawn(async move {
            ledger
                .append_note(AppendNoteRequest::new(
                    job_id,
                    LedgerKind::Additional,
                    format!("note {index}"),
                    "tech",
                ))
                .await
                .map(|_| ())
        }));
    }
    for handle in handles {
        handle
            .await
            .expect("task should not panic")
            .expect("write should succeed");
    }

    let stored = services
        .repository
        .find_by_id(job.id())
        .await
        .expect("lookup should succeed")
        .expect("job exists");
    assert_eq!(stored.stage(), Stage::RoughIn);
    for step in Stage::Beginning.definition().step_keys() {
        assert!(stored.stage_steps().is_done(Stage::Beginning, step));
    }
    assert_eq!(stored.ledger(LedgerKind::Additional).len(), 10);
}

/// Repository whose updates always lose the version race.
struct AlwaysConflicting(InMemoryJobRepository);

#[async_trait]
impl JobRepository for AlwaysConflicting {
    async fn store(&self, job: &Job) -> JobRepositoryResult<JobVersion> {
        self.0.store(job).await
    }

    async fn update(&self, job: &Job) -> JobRepositoryResult<JobVersion> {
        Err(JobRepositoryError::VersionConflict {
            job_id: job.id(),
            expected: job.version(),
        })
    }

    async fn find_by_id(&self, id: JobId) -> JobRepositoryResult<Option<Job>> {
        self.0.find_by_id(id).await
    }

    async fn list_active(&self) -> JobRepositoryResult<Vec<Job>> {
        self.0.list_active().await
    }

    async fn find_by_note_id(&self, note_id: NoteId) -> JobRepositoryResult<Option<Job>> {
        self.0.find_by_note_id(note_id).await
    }

    async fn count_created_on(&self, day: NaiveDate) -> JobRepositoryResult<u32> {
        self.0.count_created_on(day).await
    }
}

#[rstest]
#[case(WriteRetryConfig::no_retry(), 1)]
#[case(WriteRetryConfig { max_attempts: 3 }, 3)]
#[case(WriteRetryConfig { max_attempts: 0 }, 1)]
#[tokio::test(flavor = "multi_thread")]
async fn writer_reports_contention_after_max_attempts(
    clock: ManualClock,
    #[case] config: WriteRetryConfig,
    #[case] expected_attempts: u32,
) {
    let repository = Arc::new(AlwaysConflicting(InMemoryJobRepository::new()));
    let registry = JobRegistryService::new(Arc::clone(&repository), Arc::new(clock.clone()));
    let job = registry
        .create_job(CreateJobRequest::new("1 Elm St"))
        .await
        .expect("store is not affected");
    let writer = JobWriter::new(repository, config);

    let err = writer
        .mutate(job.id(), |current| {
            current.set_status(JobStatus::Scheduled, &clock);
            Ok(())
        })
        .await
        .expect_err("every update conflicts");

    assert!(matches!(
        err,
        JobServiceError::Contention { attempts, .. } if attempts == expected_attempts
    ));
    assert!(err.is_retryable());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn writer_skips_unchanged_jobs(clock: ManualClock) {
    let repository = Arc::new(AlwaysConflicting(InMemoryJobRepository::new()));
    let registry = JobRegistryService::new(Arc::clone(&repository), Arc::new(clock));
    let job = registry
        .create_job(CreateJobRequest::new("1 Elm St"))
        .await
        .expect("store is not affected");
    let writer = JobWriter::new(repository, WriteRetryConfig::no_retry());

    let (unchanged, ()) = writer
        .mutate(job.id(), |_| Ok(()))
        .await
        .expect("no write should be attempted");
    assert_eq!(unchanged, job);
}
