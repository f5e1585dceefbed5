//! `PostgreSQL` repository implementation for job storage.

use super::{
    models::{JobChangeset, JobRow, NewJobRow, NoteIndexRow},
    schema::{job_note_index, jobs},
};
use crate::job::{
    domain::{
        Job, JobId, JobNumber, JobStatus, JobVersion, LedgerKind, NoteId, PersistedJobData,
        Stage, StageHistory, StageSteps,
    },
    ports::{JobRepository, JobRepositoryError, JobRepositoryResult},
};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::{DatabaseErrorKind, Error as DieselError};

/// `PostgreSQL` connection pool type used by job and intake adapters.
pub type JobPgPool = Pool<ConnectionManager<PgConnection>>;

/// Unique constraint on `jobs.job_number`.
const JOB_NUMBER_CONSTRAINT: &str = "jobs_job_number_key";

/// `PostgreSQL`-backed job repository.
#[derive(Debug, Clone)]
pub struct PostgresJobRepository {
    pool: JobPgPool,
}

impl PostgresJobRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: JobPgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> JobRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> JobRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(JobRepositoryError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(JobRepositoryError::persistence)?
    }
}

#[async_trait]
impl JobRepository for PostgresJobRepository {
    async fn store(&self, job: &Job) -> JobRepositoryResult<JobVersion> {
        let job_id = job.id();
        let job_number = job.job_number().clone();
        let version = JobVersion::INITIAL.next();
        let new_row = to_new_row(job, version)?;
        let index_rows = note_index_rows(job);

        self.run_blocking(move |connection| {
            connection.transaction::<_, JobRepositoryError, _>(|tx| {
                diesel::insert_into(jobs::table)
                    .values(&new_row)
                    .execute(tx)
                    .map_err(|err| match err {
                        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info)
                            if info.constraint_name() == Some(JOB_NUMBER_CONSTRAINT) =>
                        {
                            JobRepositoryError::DuplicateJobNumber(job_number.clone())
                        }
                        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                            JobRepositoryError::DuplicateJob(job_id)
                        }
                        _ => JobRepositoryError::persistence(err),
                    })?;
                write_note_index(tx, job_id, &index_rows)?;
                Ok(version)
            })
        })
        .await
    }

    async fn update(&self, job: &Job) -> JobRepositoryResult<JobVersion> {
        let job_id = job.id();
        let expected = job.version();
        let version = expected.next();
        let expected_raw = version_to_db(expected)?;
        let changeset = to_changeset(job, version)?;
        let index_rows = note_index_rows(job);

        self.run_blocking(move |connection| {
            connection.transaction::<_, JobRepositoryError, _>(|tx| {
                let affected = diesel::update(
                    jobs::table
                        .filter(jobs::id.eq(job_id.into_inner()))
                        .filter(jobs::version.eq(expected_raw)),
                )
                .set(&changeset)
                .execute(tx)?;

                if affected == 0 {
                    let exists: i64 = jobs::table
                        .filter(jobs::id.eq(job_id.into_inner()))
                        .count()
                        .get_result(tx)?;
                    return Err(if exists == 0 {
                        JobRepositoryError::NotFound(job_id)
                    } else {
                        JobRepositoryError::VersionConflict { job_id, expected }
                    });
                }

                write_note_index(tx, job_id, &index_rows)?;
                Ok(version)
            })
        })
        .await
    }

    async fn find_by_id(&self, id: JobId) -> JobRepositoryResult<Option<Job>> {
        self.run_blocking(move |connection| {
            let row = jobs::table
                .filter(jobs::id.eq(id.into_inner()))
                .select(JobRow::as_select())
                .first::<JobRow>(connection)
                .optional()?;
            row.map(row_to_job).transpose()
        })
        .await
    }

    async fn list_active(&self) -> JobRepositoryResult<Vec<Job>> {
        self.run_blocking(move |connection| {
            let rows = jobs::table
                .filter(jobs::status.ne(JobStatus::Archived.as_str()))
                .order((jobs::created_at.desc(), jobs::job_number.desc()))
                .select(JobRow::as_select())
                .load::<JobRow>(connection)?;
            rows.into_iter().map(row_to_job).collect()
        })
        .await
    }

    async fn find_by_note_id(&self, note_id: NoteId) -> JobRepositoryResult<Option<Job>> {
        self.run_blocking(move |connection| {
            let row = jobs::table
                .inner_join(job_note_index::table)
                .filter(job_note_index::note_id.eq(note_id.into_inner()))
                .select(JobRow::as_select())
                .first::<JobRow>(connection)
                .optional()?;
            row.map(row_to_job).transpose()
        })
        .await
    }

    async fn count_created_on(&self, day: NaiveDate) -> JobRepositoryResult<u32> {
        let start = day.and_time(NaiveTime::MIN).and_utc();
        let end = day
            .succ_opt()
            .map_or(DateTime::<Utc>::MAX_UTC, |next| {
                next.and_time(NaiveTime::MIN).and_utc()
            });

        self.run_blocking(move |connection| {
            let count: i64 = jobs::table
                .filter(jobs::created_at.ge(start))
                .filter(jobs::created_at.lt(end))
                .count()
                .get_result(connection)?;
            u32::try_from(count).map_err(JobRepositoryError::persistence)
        })
        .await
    }
}

fn write_note_index(
    connection: &mut PgConnection,
    job_id: JobId,
    rows: &[NoteIndexRow],
) -> JobRepositoryResult<()> {
    diesel::delete(job_note_index::table.filter(job_note_index::job_id.eq(job_id.into_inner())))
        .execute(connection)?;
    if !rows.is_empty() {
        diesel::insert_into(job_note_index::table)
            .values(rows)
            .execute(connection)?;
    }
    Ok(())
}

fn note_index_rows(job: &Job) -> Vec<NoteIndexRow> {
    let job_id = job.id().into_inner();
    job.note_ids()
        .map(|note_id| NoteIndexRow {
            note_id: note_id.into_inner(),
            job_id,
        })
        .collect()
}

fn version_to_db(version: JobVersion) -> JobRepositoryResult<i64> {
    i64::try_from(version.value()).map_err(JobRepositoryError::persistence)
}

fn to_json<T: serde::Serialize>(value: &T) -> JobRepositoryResult<serde_json::Value> {
    serde_json::to_value(value).map_err(JobRepositoryError::persistence)
}

fn from_json<T: serde::de::DeserializeOwned>(value: serde_json::Value) -> JobRepositoryResult<T> {
    serde_json::from_value(value).map_err(JobRepositoryError::persistence)
}

fn to_new_row(job: &Job, version: JobVersion) -> JobRepositoryResult<NewJobRow> {
    Ok(NewJobRow {
        id: job.id().into_inner(),
        job_number: job.job_number().to_string(),
        service_address: job.service_address().to_owned(),
        status: job.status().as_str().to_owned(),
        stage: job.stage().as_str().to_owned(),
        stage_steps: to_json(job.stage_steps())?,
        stage_history: to_json(job.stage_history())?,
        boss_notes_status: to_json(job.ledger(LedgerKind::Boss))?,
        additional_notes_status: to_json(job.ledger(LedgerKind::Additional))?,
        materials_notes_status: to_json(job.ledger(LedgerKind::Materials))?,
        version: version_to_db(version)?,
        created_at: job.created_at(),
        updated_at: job.updated_at(),
    })
}

fn to_changeset(job: &Job, version: JobVersion) -> JobRepositoryResult<JobChangeset> {
    let row = to_new_row(job, version)?;
    Ok(JobChangeset {
        status: row.status,
        stage: row.stage,
        stage_steps: row.stage_steps,
        stage_history: row.stage_history,
        boss_notes_status: row.boss_notes_status,
        additional_notes_status: row.additional_notes_status,
        materials_notes_status: row.materials_notes_status,
        version: row.version,
        updated_at: row.updated_at,
    })
}

fn row_to_job(row: JobRow) -> JobRepositoryResult<Job> {
    let JobRow {
        id,
        job_number,
        service_address,
        status,
        stage,
        stage_steps,
        stage_history,
        boss_notes_status,
        additional_notes_status,
        materials_notes_status,
        version,
        created_at,
        updated_at,
    } = row;

    let data = PersistedJobData {
        id: JobId::from_uuid(id),
        job_number: JobNumber::try_from(job_number.as_str())
            .map_err(JobRepositoryError::persistence)?,
        service_address,
        status: JobStatus::try_from(status.as_str()).map_err(JobRepositoryError::persistence)?,
        stage: Stage::try_from(stage.as_str()).map_err(JobRepositoryError::persistence)?,
        stage_steps: from_json::<StageSteps>(stage_steps)?,
        stage_history: from_json::<StageHistory>(stage_history)?,
        boss_notes_status: from_json(boss_notes_status)?,
        additional_notes_status: from_json(additional_notes_status)?,
        materials_notes_status: from_json(materials_notes_status)?,
        version: JobVersion::new(u64::try_from(version).map_err(JobRepositoryError::persistence)?),
        created_at,
        updated_at,
    };
    Ok(Job::from_persisted(data))
}
