//! Extraction of structured fields from a submission's answer list.

use super::{AnswerValue, RawAnswer};
use crate::job::domain::NoteStatus;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// External question identifiers for each extracted field.
///
/// # Examples
///
/// ```
/// use jobflow::intake::domain::QuestionMap;
///
/// let map = QuestionMap::default();
/// assert_eq!(map.parts_materials_needed, "parts_materials_needed");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionMap {
    /// Question holding the technician's work summary.
    pub work_description: String,
    /// Question holding free-form field notes.
    pub additional_notes: String,
    /// Question holding the parts and materials request.
    pub parts_materials_needed: String,
    /// Question holding the manager's note.
    pub manager_note: String,
    /// Question holding the manager's status choice.
    pub manager_status: String,
}

impl Default for QuestionMap {
    fn default() -> Self {
        Self {
            work_description: "what_was_done".to_owned(),
            additional_notes: "additional_notes".to_owned(),
            parts_materials_needed: "parts_materials_needed".to_owned(),
            manager_note: "manager_notes".to_owned(),
            manager_status: "manager_status".to_owned(),
        }
    }
}

/// Structured content extracted from one submission.
///
/// Every field is `None` when its question is missing or answered with a
/// not-applicable placeholder.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransformedSubmission {
    /// What the technician did on site.
    pub work_description: Option<String>,
    /// Field notes.
    pub additional_notes: Option<String>,
    /// Requested parts and materials.
    pub parts_materials_needed: Option<String>,
    /// Note addressed to the office.
    pub manager_note: Option<String>,
    /// Status the manager assigned to their note.
    pub manager_status: Option<NoteStatus>,
}

impl TransformedSubmission {
    /// Returns `true` when nothing was extracted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// Pure answer-list transformer.
#[derive(Debug, Clone, Default)]
pub struct SubmissionTransformer {
    questions: QuestionMap,
}

impl SubmissionTransformer {
    /// Creates a transformer for the given question identifiers.
    #[must_use]
    pub const fn new(questions: QuestionMap) -> Self {
        Self { questions }
    }

    /// Returns the question identifiers in use.
    #[must_use]
    pub const fn questions(&self) -> &QuestionMap {
        &self.questions
    }

    /// Extracts the known fields from `answers`.
    ///
    /// Unknown question identifiers are ignored. When a question appears more
    /// than once the first meaningful answer wins.
    ///
    /// # Examples
    ///
    /// ```
    /// use jobflow::intake::domain::{RawAnswer, SubmissionTransformer};
    ///
    /// let transformer = SubmissionTransformer::default();
    /// let out = transformer.transform(&[
    ///     RawAnswer::text("what_was_done", "Swapped capacitor"),
    ///     RawAnswer::text("parts_materials_needed", "N/A"),
    /// ]);
    /// assert_eq!(out.work_description.as_deref(), Some("Swapped capacitor"));
    /// assert_eq!(out.parts_materials_needed, None);
    /// ```
    #[must_use]
    pub fn transform(&self, answers: &[RawAnswer]) -> TransformedSubmission {
        let questions = &self.questions;
        let manager_status = answer_text(answers, &questions.manager_status).and_then(|raw| {
            NoteStatus::try_from(raw.as_str())
                .inspect_err(|err| {
                    debug!(question_id = %questions.manager_status, error = %err, "ignoring manager status");
                })
                .ok()
        });

        TransformedSubmission {
            work_description: answer_text(answers, &questions.work_description),
            additional_notes: answer_text(answers, &questions.additional_notes),
            parts_materials_needed: answer_text(answers, &questions.parts_materials_needed),
            manager_note: answer_text(answers, &questions.manager_note),
            manager_status,
        }
    }
}

fn answer_text(answers: &[RawAnswer], question_id: &str) -> Option<String> {
    answers
        .iter()
        .filter(|answer| answer.question_id == question_id)
        .find_map(|answer| meaningful(render(answer)?))
}

fn render(answer: &RawAnswer) -> Option<String> {
    match &answer.value {
        AnswerValue::Value(text) | AnswerValue::Timestamp(text) | AnswerValue::Location(text) => {
            Some(text.clone())
        }
        AnswerValue::Selected(choices) => Some(choices.join(", ")),
        AnswerValue::Images(urls) => Some(urls.join("\n")),
        AnswerValue::Unrecognized => {
            debug!(question_id = %answer.question_id, "answer has no recognised payload shape");
            None
        }
    }
}

/// Trims `text`, discarding blanks and not-applicable placeholders.
#[must_use]
pub fn meaningful(text: String) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("n/a") {
        None
    } else if trimmed.len() == text.len() {
        Some(text)
    } else {
        Some(trimmed.to_owned())
    }
}
