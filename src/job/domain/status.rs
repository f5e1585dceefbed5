//! Coarse job status and the unified proposal/job status order.
//!
//! Declaration order is rank: for every enum here `a < b` means `b` is further
//! along, so "most advanced wins" is a plain `max`.

use super::{ParseJobValueError, Stage};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Coarse lifecycle status of a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    /// Created but not on the calendar.
    NotScheduled,
    /// On the calendar.
    Scheduled,
    /// Technicians are on site.
    WorkingOnIt,
    /// Work is blocked waiting for parts.
    PartsNeeded,
    /// Work is finished.
    Done,
    /// The customer cancelled the job.
    Cancelled,
    /// Hidden from active views.
    Archived,
}

impl JobStatus {
    /// Every status in rank order.
    pub const ALL: [Self; 7] = [
        Self::NotScheduled,
        Self::Scheduled,
        Self::WorkingOnIt,
        Self::PartsNeeded,
        Self::Done,
        Self::Cancelled,
        Self::Archived,
    ];

    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotScheduled => "not_scheduled",
            Self::Scheduled => "scheduled",
            Self::WorkingOnIt => "working_on_it",
            Self::PartsNeeded => "parts_needed",
            Self::Done => "done",
            Self::Cancelled => "cancelled",
            Self::Archived => "archived",
        }
    }

    /// Returns `true` for jobs that take part in matching and backfills.
    #[must_use]
    pub const fn is_active(self) -> bool {
        !matches!(self, Self::Archived)
    }

    /// Minimum status implied by a pipeline stage.
    #[must_use]
    pub const fn implied_by(stage: Stage) -> Option<Self> {
        match stage {
            Stage::Beginning => None,
            Stage::RoughIn | Stage::TrimOut | Stage::Closing => Some(Self::WorkingOnIt),
            Stage::Completed => Some(Self::Done),
        }
    }

    /// Returns the most advanced status in `statuses`.
    pub fn most_advanced(statuses: impl IntoIterator<Item = Self>) -> Option<Self> {
        statuses.into_iter().max()
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for JobStatus {
    type Error = ParseJobValueError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == normalized)
            .ok_or_else(|| ParseJobValueError::Status(value.to_owned()))
    }
}

/// Lifecycle status of the proposal a job may originate from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProposalStatus {
    /// Being written.
    Draft,
    /// Sent to the customer.
    Sent,
    /// Opened by the customer.
    Viewed,
    /// Declined by the customer.
    Rejected,
    /// Accepted by the customer.
    Approved,
}

impl TryFrom<&str> for ProposalStatus {
    type Error = ParseJobValueError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "draft" => Ok(Self::Draft),
            "sent" => Ok(Self::Sent),
            "viewed" => Ok(Self::Viewed),
            "rejected" | "declined" => Ok(Self::Rejected),
            "approved" | "accepted" => Ok(Self::Approved),
            _ => Err(ParseJobValueError::ProposalStatus(value.to_owned())),
        }
    }
}

/// Single total order over proposal and job statuses.
///
/// Any job status outranks any proposal status, since a job only exists once
/// its proposal has been approved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "kind", content = "status", rename_all = "snake_case")]
pub enum UnifiedStatus {
    /// Status of a proposal without a job yet.
    Proposal(ProposalStatus),
    /// Status of a job.
    Job(JobStatus),
}

impl UnifiedStatus {
    /// Returns the most advanced status in `statuses`.
    pub fn most_advanced(statuses: impl IntoIterator<Item = Self>) -> Option<Self> {
        statuses.into_iter().max()
    }
}

impl From<ProposalStatus> for UnifiedStatus {
    fn from(value: ProposalStatus) -> Self {
        Self::Proposal(value)
    }
}

impl From<JobStatus> for UnifiedStatus {
    fn from(value: JobStatus) -> Self {
        Self::Job(value)
    }
}
