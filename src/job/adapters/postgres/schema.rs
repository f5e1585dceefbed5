//! Diesel schema for job persistence.

diesel::table! {
    /// Job records with embedded workflow state and note ledgers.
    jobs (id) {
        /// Internal job identifier.
        id -> Uuid,
        /// Day-sequenced human-readable number.
        #[max_length = 32]
        job_number -> Varchar,
        /// Free-text service address.
        service_address -> Text,
        /// Coarse lifecycle status.
        #[max_length = 50]
        status -> Varchar,
        /// Current pipeline stage.
        #[max_length = 50]
        stage -> Varchar,
        /// Per-stage step completion flags.
        stage_steps -> Jsonb,
        /// Append-only stage audit trail.
        stage_history -> Jsonb,
        /// Boss notes ledger.
        boss_notes_status -> Jsonb,
        /// Field notes ledger.
        additional_notes_status -> Jsonb,
        /// Materials notes ledger.
        materials_notes_status -> Jsonb,
        /// Optimistic concurrency version.
        version -> Int8,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Secondary index from note identifier to owning job.
    job_note_index (note_id) {
        /// Note identifier.
        note_id -> Uuid,
        /// Owning job identifier.
        job_id -> Uuid,
    }
}

diesel::joinable!(job_note_index -> jobs (job_id));
diesel::allow_tables_to_appear_in_same_query!(jobs, job_note_index);
