//! Raw form answers as delivered by the field-form provider.
//!
//! The provider sends one JSON object per answered question. Which payload
//! key is populated depends on the question type, so each answer is decoded
//! into an [`AnswerValue`] variant with a fixed precedence:
//! `value`, `timestamp`, `locationInput`, `selectedAnswers`, `images`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One answered question from a submission payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "WireAnswer", into = "WireAnswer")]
pub struct RawAnswer {
    /// External question identifier.
    pub question_id: String,
    /// Decoded answer payload.
    pub value: AnswerValue,
}

impl RawAnswer {
    /// Creates an answer with a plain text value.
    #[must_use]
    pub fn text(question_id: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            question_id: question_id.into(),
            value: AnswerValue::Value(value.into()),
        }
    }

    /// Creates an answer from a list of selected choices.
    #[must_use]
    pub fn selected<I, S>(question_id: impl Into<String>, choices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            question_id: question_id.into(),
            value: AnswerValue::Selected(choices.into_iter().map(Into::into).collect()),
        }
    }
}

/// Shape-specific answer payload.
#[derive(Debug, Clone, PartialEq)]
pub enum AnswerValue {
    /// Free text or numeric value rendered as text.
    Value(String),
    /// Date or time answer.
    Timestamp(String),
    /// Location picker answer.
    Location(String),
    /// Texts of the selected choices, in provider order.
    Selected(Vec<String>),
    /// Uploaded image URLs, in provider order.
    Images(Vec<String>),
    /// No known payload key was present.
    Unrecognized,
}

impl AnswerValue {
    /// Short shape name used in log fields.
    #[must_use]
    pub const fn shape(&self) -> &'static str {
        match self {
            Self::Value(_) => "value",
            Self::Timestamp(_) => "timestamp",
            Self::Location(_) => "location",
            Self::Selected(_) => "selected",
            Self::Images(_) => "images",
            Self::Unrecognized => "unrecognized",
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireAnswer {
    question_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    value: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    timestamp: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    location_input: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    selected_answers: Option<Vec<WireChoice>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    images: Option<Vec<WireImage>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct WireChoice {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct WireImage {
    #[serde(default)]
    url: String,
}

/// Renders a scalar JSON value as text; `null` counts as absent.
fn scalar_text(value: Option<Value>) -> Option<String> {
    match value? {
        Value::Null => None,
        Value::String(text) => Some(text),
        other => Some(other.to_string()),
    }
}

impl From<WireAnswer> for RawAnswer {
    fn from(wire: WireAnswer) -> Self {
        let WireAnswer {
            question_id,
            value,
            timestamp,
            location_input,
            selected_answers,
            images,
        } = wire;

        let decoded = if let Some(text) = scalar_text(value) {
            AnswerValue::Value(text)
        } else if let Some(text) = scalar_text(timestamp) {
            AnswerValue::Timestamp(text)
        } else if let Some(text) = scalar_text(location_input) {
            AnswerValue::Location(text)
        } else if let Some(choices) = selected_answers {
            AnswerValue::Selected(choices.into_iter().map(|choice| choice.text).collect())
        } else if let Some(images) = images {
            AnswerValue::Images(images.into_iter().map(|image| image.url).collect())
        } else {
            AnswerValue::Unrecognized
        };

        Self {
            question_id,
            value: decoded,
        }
    }
}

impl From<RawAnswer> for WireAnswer {
    fn from(answer: RawAnswer) -> Self {
        let mut wire = Self {
            question_id: answer.question_id,
            ..Self::default()
        };
        match answer.value {
            AnswerValue::Value(text) => wire.value = Some(Value::String(text)),
            AnswerValue::Timestamp(text) => wire.timestamp = Some(Value::String(text)),
            AnswerValue::Location(text) => wire.location_input = Some(Value::String(text)),
            AnswerValue::Selected(choices) => {
                wire.selected_answers = Some(
                    choices
                        .into_iter()
                        .map(|text| WireChoice { text })
                        .collect(),
                );
            }
            AnswerValue::Images(urls) => {
                wire.images = Some(urls.into_iter().map(|url| WireImage { url }).collect());
            }
            AnswerValue::Unrecognized => {}
        }
        wire
    }
}
