//! Diesel row models for job persistence.

use super::schema::{job_note_index, jobs};
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde_json::Value;

/// Query result row for job records.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = jobs)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct JobRow {
    /// Internal job identifier.
    pub id: uuid::Uuid,
    /// Job number.
    pub job_number: String,
    /// Service address.
    pub service_address: String,
    /// Coarse status.
    pub status: String,
    /// Pipeline stage.
    pub stage: String,
    /// Step flags JSON.
    pub stage_steps: Value,
    /// Stage history JSON.
    pub stage_history: Value,
    /// Boss notes JSON.
    pub boss_notes_status: Value,
    /// Field notes JSON.
    pub additional_notes_status: Value,
    /// Materials notes JSON.
    pub materials_notes_status: Value,
    /// Version counter.
    pub version: i64,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Insert model for job records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = jobs)]
pub struct NewJobRow {
    /// Internal job identifier.
    pub id: uuid::Uuid,
    /// Job number.
    pub job_number: String,
    /// Service address.
    pub service_address: String,
    /// Coarse status.
    pub status: String,
    /// Pipeline stage.
    pub stage: String,
    /// Step flags JSON.
    pub stage_steps: Value,
    /// Stage history JSON.
    pub stage_history: Value,
    /// Boss notes JSON.
    pub boss_notes_status: Value,
    /// Field notes JSON.
    pub additional_notes_status: Value,
    /// Materials notes JSON.
    pub materials_notes_status: Value,
    /// Version counter.
    pub version: i64,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Changeset written by conditional job updates.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = jobs)]
pub struct JobChangeset {
    /// Coarse status.
    pub status: String,
    /// Pipeline stage.
    pub stage: String,
    /// Step flags JSON.
    pub stage_steps: Value,
    /// Stage history JSON.
    pub stage_history: Value,
    /// Boss notes JSON.
    pub boss_notes_status: Value,
    /// Field notes JSON.
    pub additional_notes_status: Value,
    /// Materials notes JSON.
    pub materials_notes_status: Value,
    /// New version counter.
    pub version: i64,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Insert model for note index entries.
#[derive(Debug, Clone, Copy, Insertable)]
#[diesel(table_name = job_note_index)]
pub struct NoteIndexRow {
    /// Note identifier.
    pub note_id: uuid::Uuid,
    /// Owning job identifier.
    pub job_id: uuid::Uuid,
}
