//! Diesel schema for intake persistence.

diesel::table! {
    /// Field-form submissions keyed by provider identifier.
    connectteam_submissions (submission_id) {
        /// Provider submission identifier.
        #[max_length = 255]
        submission_id -> Varchar,
        /// Raw service address.
        job_location -> Text,
        /// Visit type.
        #[max_length = 100]
        job_type -> Nullable<Varchar>,
        /// Submission time reported by the provider.
        submission_timestamp -> Timestamptz,
        /// Technician name.
        technician_name -> Nullable<Text>,
        /// Raw answer list.
        answers -> Jsonb,
        /// Extracted work description.
        work_description -> Nullable<Text>,
        /// Extracted field notes.
        additional_notes -> Nullable<Text>,
        /// Extracted materials request.
        parts_materials_needed -> Nullable<Text>,
        /// Linked job, once matched.
        linked_job_id -> Nullable<Uuid>,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Materials requested on submissions.
    material_checklist (id) {
        /// Entry identifier.
        id -> Uuid,
        /// Originating submission.
        #[max_length = 255]
        submission_id -> Varchar,
        /// Linked job.
        job_id -> Nullable<Uuid>,
        /// Requested materials.
        material_description -> Text,
        /// Whether the materials were ordered.
        ordered -> Bool,
        /// Order time.
        ordered_at -> Nullable<Timestamptz>,
        /// Creation timestamp.
        created_at -> Timestamptz,
    }
}

diesel::allow_tables_to_appear_in_same_query!(connectteam_submissions, material_checklist);
