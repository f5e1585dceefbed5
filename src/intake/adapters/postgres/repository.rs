//! `PostgreSQL` repositories for submissions and material entries.

use super::{
    models::{MaterialRow, SubmissionChangeset, SubmissionRow},
    schema::{connectteam_submissions, material_checklist},
};
use crate::intake::{
    domain::{
        MaterialEntry, MaterialId, PersistedSubmissionData, Submission, SubmissionFilter,
        SubmissionId,
    },
    ports::{
        IntakeRepositoryError, IntakeRepositoryResult, MaterialRepository, SubmissionRepository,
    },
};
use crate::job::{adapters::postgres::JobPgPool, domain::JobId};
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};

async fn run_blocking<F, T>(pool: &JobPgPool, f: F) -> IntakeRepositoryResult<T>
where
    F: FnOnce(&mut PgConnection) -> IntakeRepositoryResult<T> + Send + 'static,
    T: Send + 'static,
{
    let pool = pool.clone();
    tokio::task::spawn_blocking(move || {
        let mut connection = pool.get().map_err(IntakeRepositoryError::persistence)?;
        f(&mut connection)
    })
    .await
    .map_err(IntakeRepositoryError::persistence)?
}

/// `PostgreSQL`-backed submission repository.
#[derive(Debug, Clone)]
pub struct PostgresSubmissionRepository {
    pool: JobPgPool,
}

impl PostgresSubmissionRepository {
    /// Creates a repository over `pool`.
    #[must_use]
    pub const fn new(pool: JobPgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SubmissionRepository for PostgresSubmissionRepository {
    async fn upsert(&self, submission: &Submission) -> IntakeRepositoryResult<()> {
        let row = to_submission_row(submission)?;
        let changes = SubmissionChangeset::from(&row);
        run_blocking(&self.pool, move |connection| {
            connection.transaction::<_, IntakeRepositoryError, _>(|tx| {
                diesel::insert_into(connectteam_submissions::table)
                    .values(&row)
                    .on_conflict(connectteam_submissions::submission_id)
                    .do_update()
                    .set(&changes)
                    .execute(tx)?;
                fill_link(tx, &row.submission_id, row.linked_job_id)
            })
        })
        .await
    }

    async fn find_by_id(&self, id: &SubmissionId) -> IntakeRepositoryResult<Option<Submission>> {
        let key = id.as_str().to_owned();
        run_blocking(&self.pool, move |connection| {
            let row = connectteam_submissions::table
                .filter(connectteam_submissions::submission_id.eq(key))
                .select(SubmissionRow::as_select())
                .first::<SubmissionRow>(connection)
                .optional()?;
            row.map(row_to_submission).transpose()
        })
        .await
    }

    async fn list(&self, filter: SubmissionFilter) -> IntakeRepositoryResult<Vec<Submission>> {
        run_blocking(&self.pool, move |connection| {
            let mut query = connectteam_submissions::table
                .select(SubmissionRow::as_select())
                .order((
                    connectteam_submissions::submission_timestamp.asc(),
                    connectteam_submissions::submission_id.asc(),
                ))
                .into_boxed();
            query = match filter {
                SubmissionFilter::All => query,
                SubmissionFilter::Unlinked => {
                    query.filter(connectteam_submissions::linked_job_id.is_null())
                }
                SubmissionFilter::Linked => {
                    query.filter(connectteam_submissions::linked_job_id.is_not_null())
                }
            };
            let rows = query.load::<SubmissionRow>(connection)?;
            rows.into_iter().map(row_to_submission).collect()
        })
        .await
    }

    async fn update(&self, submission: &Submission) -> IntakeRepositoryResult<()> {
        let id = submission.submission_id().clone();
        let row = to_submission_row(submission)?;
        let changes = SubmissionChangeset::from(&row);
        run_blocking(&self.pool, move |connection| {
            connection.transaction::<_, IntakeRepositoryError, _>(|tx| {
                let affected = diesel::update(
                    connectteam_submissions::table
                        .filter(connectteam_submissions::submission_id.eq(id.as_str())),
                )
                .set(&changes)
                .execute(tx)?;
                if affected == 0 {
                    return Err(IntakeRepositoryError::SubmissionNotFound(id));
                }
                fill_link(tx, &row.submission_id, row.linked_job_id)
            })
        })
        .await
    }
}

/// `PostgreSQL`-backed material checklist repository.
#[derive(Debug, Clone)]
pub struct PostgresMaterialRepository {
    pool: JobPgPool,
}

impl PostgresMaterialRepository {
    /// Creates a repository over `pool`.
    #[must_use]
    pub const fn new(pool: JobPgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MaterialRepository for PostgresMaterialRepository {
    async fn insert(&self, entry: &MaterialEntry) -> IntakeRepositoryResult<MaterialId> {
        let id = entry.id;
        let row = to_material_row(entry);
        run_blocking(&self.pool, move |connection| {
            diesel::insert_into(material_checklist::table)
                .values(&row)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                        IntakeRepositoryError::DuplicateMaterial(id)
                    }
                    _ => IntakeRepositoryError::persistence(err),
                })?;
            Ok(id)
        })
        .await
    }

    async fn link_to_job(
        &self,
        submission_id: &SubmissionId,
        job_id: JobId,
    ) -> IntakeRepositoryResult<usize> {
        let key = submission_id.as_str().to_owned();
        run_blocking(&self.pool, move |connection| {
            let linked = diesel::update(
                material_checklist::table
                    .filter(material_checklist::submission_id.eq(key))
                    .filter(material_checklist::job_id.is_null()),
            )
            .set(material_checklist::job_id.eq(Some(job_id.into_inner())))
            .execute(connection)?;
            Ok(linked)
        })
        .await
    }

    async fn find_by_submission(
        &self,
        submission_id: &SubmissionId,
    ) -> IntakeRepositoryResult<Vec<MaterialEntry>> {
        let key = submission_id.as_str().to_owned();
        run_blocking(&self.pool, move |connection| {
            let rows = material_checklist::table
                .filter(material_checklist::submission_id.eq(key))
                .order(material_checklist::created_at.asc())
                .select(MaterialRow::as_select())
                .load::<MaterialRow>(connection)?;
            rows.into_iter().map(row_to_material).collect()
        })
        .await
    }
}

/// Records `link` on the submission unless it already has one.
fn fill_link(
    tx: &mut PgConnection,
    submission_id: &str,
    link: Option<uuid::Uuid>,
) -> IntakeRepositoryResult<()> {
    let Some(job_id) = link else {
        return Ok(());
    };
    diesel::update(
        connectteam_submissions::table
            .filter(connectteam_submissions::submission_id.eq(submission_id))
            .filter(connectteam_submissions::linked_job_id.is_null()),
    )
    .set(connectteam_submissions::linked_job_id.eq(Some(job_id)))
    .execute(tx)?;
    Ok(())
}

fn to_submission_row(submission: &Submission) -> IntakeRepositoryResult<SubmissionRow> {
    Ok(SubmissionRow {
        submission_id: submission.submission_id().as_str().to_owned(),
        job_location: submission.job_location().to_owned(),
        job_type: submission.job_type().map(ToOwned::to_owned),
        submission_timestamp: submission.submission_timestamp(),
        technician_name: submission.technician_name().map(ToOwned::to_owned),
        answers: serde_json::to_value(submission.answers())
            .map_err(IntakeRepositoryError::persistence)?,
        work_description: submission.work_description().map(ToOwned::to_owned),
        additional_notes: submission.additional_notes().map(ToOwned::to_owned),
        parts_materials_needed: submission.parts_materials_needed().map(ToOwned::to_owned),
        linked_job_id: submission.linked_job_id().map(JobId::into_inner),
        created_at: submission.created_at(),
        updated_at: submission.updated_at(),
    })
}

fn row_to_submission(row: SubmissionRow) -> IntakeRepositoryResult<Submission> {
    let data = PersistedSubmissionData {
        submission_id: SubmissionId::new(row.submission_id)
            .map_err(IntakeRepositoryError::persistence)?,
        job_location: row.job_location,
        job_type: row.job_type,
        submission_timestamp: row.submission_timestamp,
        technician_name: row.technician_name,
        answers: serde_json::from_value(row.answers).map_err(IntakeRepositoryError::persistence)?,
        work_description: row.work_description,
        additional_notes: row.additional_notes,
        parts_materials_needed: row.parts_materials_needed,
        linked_job_id: row.linked_job_id.map(JobId::from_uuid),
        created_at: row.created_at,
        updated_at: row.updated_at,
    };
    Ok(Submission::from_persisted(data))
}

fn to_material_row(entry: &MaterialEntry) -> MaterialRow {
    MaterialRow {
        id: entry.id.into_inner(),
        submission_id: entry.submission_id.as_str().to_owned(),
        job_id: entry.job_id.map(JobId::into_inner),
        material_description: entry.material_description.clone(),
        ordered: entry.ordered,
        ordered_at: entry.ordered_at,
        created_at: entry.created_at,
    }
}

fn row_to_material(row: MaterialRow) -> IntakeRepositoryResult<MaterialEntry> {
    Ok(MaterialEntry {
        id: MaterialId::from_uuid(row.id),
        submission_id: SubmissionId::new(row.submission_id)
            .map_err(IntakeRepositoryError::persistence)?,
        job_id: row.job_id.map(JobId::from_uuid),
        material_description: row.material_description,
        ordered: row.ordered,
        ordered_at: row.ordered_at,
        created_at: row.created_at,
    })
}
