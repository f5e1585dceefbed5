//! Identifier and validated scalar types for the job domain.

use super::JobDomainError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a job record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(Uuid);

impl JobId {
    /// Creates a new random job identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a job identifier from an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the wrapped UUID.
    #[must_use]
    pub const fn into_inner(self) -> Uuid {
        self.0
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a note inside a job ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NoteId(Uuid);

impl NoteId {
    /// Creates a new random note identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a note identifier from an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the wrapped UUID.
    #[must_use]
    pub const fn into_inner(self) -> Uuid {
        self.0
    }
}

impl Default for NoteId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for NoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Optimistic concurrency version of a persisted job.
///
/// Every successful write increments the version by one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobVersion(u64);

impl JobVersion {
    /// Version assigned to a job that has never been written.
    pub const INITIAL: Self = Self(0);

    /// Wraps a raw version value.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Returns the underlying value.
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }

    /// Returns the version that follows this one.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

impl fmt::Display for JobVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// Human-readable job number, sequential within a calendar day.
///
/// Rendered as `YYYYMMDD-NNN`, for example `20261018-004`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct JobNumber {
    day: NaiveDate,
    sequence: u32,
}

impl JobNumber {
    /// Creates the job number for the given day and one-based sequence.
    ///
    /// # Errors
    ///
    /// Returns [`JobDomainError::InvalidJobNumber`] when the sequence is zero.
    pub fn for_day(day: NaiveDate, sequence: u32) -> Result<Self, JobDomainError> {
        if sequence == 0 {
            return Err(JobDomainError::InvalidJobNumber(format!(
                "{}-000",
                day.format("%Y%m%d")
            )));
        }
        Ok(Self { day, sequence })
    }

    /// Returns the calendar day this number was allocated on.
    #[must_use]
    pub const fn day(&self) -> NaiveDate {
        self.day
    }

    /// Returns the one-based sequence within the day.
    #[must_use]
    pub const fn sequence(&self) -> u32 {
        self.sequence
    }
}

impl fmt::Display for JobNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{:03}", self.day.format("%Y%m%d"), self.sequence)
    }
}

impl TryFrom<&str> for JobNumber {
    type Error = JobDomainError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let invalid = || JobDomainError::InvalidJobNumber(value.to_owned());
        let (day_part, sequence_part) = value.trim().split_once('-').ok_or_else(invalid)?;
        let day = NaiveDate::parse_from_str(day_part, "%Y%m%d").map_err(|_| invalid())?;
        let sequence = sequence_part.parse::<u32>().map_err(|_| invalid())?;
        Self::for_day(day, sequence).map_err(|_| invalid())
    }
}

impl TryFrom<String> for JobNumber {
    type Error = JobDomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::try_from(value.as_str())
    }
}

impl From<JobNumber> for String {
    fn from(value: JobNumber) -> Self {
        value.to_string()
    }
}
