//! Diesel row models for intake persistence.

use super::schema::{connectteam_submissions, material_checklist};
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde_json::Value;

/// Submission row used for reads and inserts.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = connectteam_submissions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[diesel(primary_key(submission_id))]
pub struct SubmissionRow {
    /// Provider identifier.
    pub submission_id: String,
    /// Raw service address.
    pub job_location: String,
    /// Visit type.
    pub job_type: Option<String>,
    /// Submission time.
    pub submission_timestamp: DateTime<Utc>,
    /// Technician name.
    pub technician_name: Option<String>,
    /// Raw answers JSON.
    pub answers: Value,
    /// Extracted work description.
    pub work_description: Option<String>,
    /// Extracted field notes.
    pub additional_notes: Option<String>,
    /// Extracted materials request.
    pub parts_materials_needed: Option<String>,
    /// Linked job.
    pub linked_job_id: Option<uuid::Uuid>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Columns rewritten when an existing submission is written again.
///
/// The job link and creation time are absent; links are only ever filled in.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = connectteam_submissions)]
#[diesel(treat_none_as_null = true)]
pub struct SubmissionChangeset {
    /// Raw service address.
    pub job_location: String,
    /// Visit type.
    pub job_type: Option<String>,
    /// Submission time.
    pub submission_timestamp: DateTime<Utc>,
    /// Technician name.
    pub technician_name: Option<String>,
    /// Raw answers JSON.
    pub answers: Value,
    /// Extracted work description.
    pub work_description: Option<String>,
    /// Extracted field notes.
    pub additional_notes: Option<String>,
    /// Extracted materials request.
    pub parts_materials_needed: Option<String>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl From<&SubmissionRow> for SubmissionChangeset {
    fn from(row: &SubmissionRow) -> Self {
        Self {
            job_location: row.job_location.clone(),
            job_type: row.job_type.clone(),
            submission_timestamp: row.submission_timestamp,
            technician_name: row.technician_name.clone(),
            answers: row.answers.clone(),
            work_description: row.work_description.clone(),
            additional_notes: row.additional_notes.clone(),
            parts_materials_needed: row.parts_materials_needed.clone(),
            updated_at: row.updated_at,
        }
    }
}

/// Material checklist row.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = material_checklist)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct MaterialRow {
    /// Entry identifier.
    pub id: uuid::Uuid,
    /// Originating submission.
    pub submission_id: String,
    /// Linked job.
    pub job_id: Option<uuid::Uuid>,
    /// Requested materials.
    pub material_description: String,
    /// Ordered flag.
    pub ordered: bool,
    /// Order time.
    pub ordered_at: Option<DateTime<Utc>>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}
