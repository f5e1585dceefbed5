//! Pipeline stage definitions, per-stage step maps and the stage history log.
//!
//! Stages form a linear pipeline that ends in the terminal
//! [`Stage::Completed`]. Each non-terminal stage declares an ordered list of
//! required steps; a job may only auto-advance once every required step of
//! its current stage is marked complete.

use super::ParseJobValueError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// One phase of the job-completion pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Permits, ordering and site preparation.
    Beginning,
    /// Ductwork, line sets and rough-in inspection.
    RoughIn,
    /// Equipment set, registers and start-up.
    TrimOut,
    /// Final inspection, walkthrough and paperwork.
    Closing,
    /// Terminal stage; no further steps.
    Completed,
}

impl Stage {
    /// Every stage in pipeline order.
    pub const ALL: [Self; 5] = [
        Self::Beginning,
        Self::RoughIn,
        Self::TrimOut,
        Self::Closing,
        Self::Completed,
    ];

    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Beginning => "beginning",
            Self::RoughIn => "rough_in",
            Self::TrimOut => "trim_out",
            Self::Closing => "closing",
            Self::Completed => "completed",
        }
    }

    /// Returns the static definition of this stage.
    #[must_use]
    pub const fn definition(self) -> &'static StageDefinition {
        StageTable::definition(self)
    }

    /// Returns the successor stage, or `None` for the terminal stage.
    #[must_use]
    pub const fn next(self) -> Option<Self> {
        self.definition().next
    }

    /// Returns `true` when the stage has no successor.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        self.next().is_none()
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for Stage {
    type Error = ParseJobValueError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        Self::ALL
            .into_iter()
            .find(|stage| stage.as_str() == normalized)
            .ok_or_else(|| ParseJobValueError::Stage(value.to_owned()))
    }
}

/// A required checklist item within a stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepDefinition {
    /// Stable step key stored in the job's step map.
    pub key: &'static str,
    /// Display label.
    pub label: &'static str,
}

/// Static configuration for one pipeline stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageDefinition {
    /// Stage this definition describes.
    pub stage: Stage,
    /// Display name.
    pub name: &'static str,
    /// Short description shown to technicians.
    pub description: &'static str,
    /// Ordered required steps gating auto-advancement.
    pub required_steps: &'static [StepDefinition],
    /// Successor stage, `None` when terminal.
    pub next: Option<Stage>,
}

impl StageDefinition {
    /// Returns `true` when `key` is one of this stage's required steps.
    #[must_use]
    pub fn requires(&self, key: &str) -> bool {
        self.required_steps.iter().any(|step| step.key == key)
    }

    /// Iterates over the required step keys in declaration order.
    pub fn step_keys(&self) -> impl Iterator<Item = &'static str> {
        self.required_steps.iter().map(|step| step.key)
    }
}

const fn step(key: &'static str, label: &'static str) -> StepDefinition {
    StepDefinition { key, label }
}

const BEGINNING_STEPS: [StepDefinition; 3] = [
    step("permit_pulled", "Permit pulled"),
    step("equipment_ordered", "Equipment ordered"),
    step("site_prepped", "Site prepped"),
];

const ROUGH_IN_STEPS: [StepDefinition; 3] = [
    step("ductwork_installed", "Ductwork installed"),
    step("line_set_run", "Line set run"),
    step("rough_in_inspection_passed", "Rough-in inspection passed"),
];

const TRIM_OUT_STEPS: [StepDefinition; 3] = [
    step("equipment_set", "Equipment set"),
    step("registers_installed", "Registers and grilles installed"),
    step("startup_completed", "System start-up completed"),
];

const CLOSING_STEPS: [StepDefinition; 3] = [
    step("final_inspection_passed", "Final inspection passed"),
    step("customer_walkthrough", "Customer walkthrough"),
    step("paperwork_submitted", "Warranty paperwork submitted"),
];

const BEGINNING: StageDefinition = StageDefinition {
    stage: Stage::Beginning,
    name: "Beginning",
    description: "Permits, equipment ordering and site preparation",
    required_steps: &BEGINNING_STEPS,
    next: Some(Stage::RoughIn),
};

const ROUGH_IN: StageDefinition = StageDefinition {
    stage: Stage::RoughIn,
    name: "Rough-In",
    description: "Ductwork and refrigerant lines before walls close",
    required_steps: &ROUGH_IN_STEPS,
    next: Some(Stage::TrimOut),
};

const TRIM_OUT: StageDefinition = StageDefinition {
    stage: Stage::TrimOut,
    name: "Trim-Out",
    description: "Equipment set, registers and system start-up",
    required_steps: &TRIM_OUT_STEPS,
    next: Some(Stage::Closing),
};

const CLOSING: StageDefinition = StageDefinition {
    stage: Stage::Closing,
    name: "Closing",
    description: "Final inspection, customer walkthrough and paperwork",
    required_steps: &CLOSING_STEPS,
    next: Some(Stage::Completed),
};

const COMPLETED: StageDefinition = StageDefinition {
    stage: Stage::Completed,
    name: "Completed",
    description: "All work finished",
    required_steps: &[],
    next: None,
};

const DEFINITIONS: [StageDefinition; 5] = [BEGINNING, ROUGH_IN, TRIM_OUT, CLOSING, COMPLETED];

/// Lookup over the static stage definitions.
#[derive(Debug, Clone, Copy, Default)]
pub struct StageTable;

impl StageTable {
    /// Returns the definition for `stage`.
    #[must_use]
    pub const fn definition(stage: Stage) -> &'static StageDefinition {
        match stage {
            Stage::Beginning => &BEGINNING,
            Stage::RoughIn => &ROUGH_IN,
            Stage::TrimOut => &TRIM_OUT,
            Stage::Closing => &CLOSING,
            Stage::Completed => &COMPLETED,
        }
    }

    /// Returns every definition in pipeline order.
    #[must_use]
    pub const fn all() -> &'static [StageDefinition] {
        &DEFINITIONS
    }

    /// Returns the first stage of the pipeline.
    #[must_use]
    pub const fn initial() -> Stage {
        Stage::Beginning
    }
}

/// Read-only progress projection over a stage's required steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageProgress {
    /// Number of required steps marked complete.
    pub completed: u32,
    /// Number of required steps in the stage.
    pub total: u32,
    /// Whole-number completion percentage, `100` for stages without steps.
    pub percentage: u8,
}

impl StageProgress {
    fn from_counts(completed: u32, total: u32) -> Self {
        let percentage = completed
            .saturating_mul(100)
            .checked_div(total)
            .map_or(100, |value| u8::try_from(value).unwrap_or(100));
        Self {
            completed,
            total,
            percentage,
        }
    }

    /// Returns `true` when every required step is complete.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.completed >= self.total
    }
}

/// Step completion flags, scoped per stage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StageSteps(BTreeMap<Stage, BTreeMap<String, bool>>);

impl StageSteps {
    /// Creates a step map with `stage` initialised to all-incomplete.
    #[must_use]
    pub fn starting_at(stage: Stage) -> Self {
        let mut steps = Self::default();
        steps.reset(stage);
        steps
    }

    /// Resets every required step of `stage` to incomplete.
    pub fn reset(&mut self, stage: Stage) {
        let fresh = stage
            .definition()
            .step_keys()
            .map(|key| (key.to_owned(), false))
            .collect();
        self.0.insert(stage, fresh);
    }

    /// Ensures `stage` has an entry for every required step, keeping existing
    /// flags.
    pub fn ensure(&mut self, stage: Stage) {
        let entry = self.0.entry(stage).or_default();
        for key in stage.definition().step_keys() {
            entry.entry(key.to_owned()).or_insert(false);
        }
    }

    /// Sets the completion flag for a step of `stage`.
    pub fn set(&mut self, stage: Stage, key: &str, done: bool) {
        self.0
            .entry(stage)
            .or_default()
            .insert(key.to_owned(), done);
    }

    /// Returns the completion flag for a step; missing steps count as
    /// incomplete.
    #[must_use]
    pub fn is_done(&self, stage: Stage, key: &str) -> bool {
        self.0
            .get(&stage)
            .and_then(|steps| steps.get(key))
            .copied()
            .unwrap_or(false)
    }

    /// Returns the raw step map for `stage`, if any was recorded.
    #[must_use]
    pub fn for_stage(&self, stage: Stage) -> Option<&BTreeMap<String, bool>> {
        self.0.get(&stage)
    }

    /// Computes progress over the required steps of `stage`.
    #[must_use]
    pub fn progress(&self, stage: Stage) -> StageProgress {
        let definition = stage.definition();
        let mut completed = 0_u32;
        let mut total = 0_u32;
        for key in definition.step_keys() {
            total = total.saturating_add(1);
            if self.is_done(stage, key) {
                completed = completed.saturating_add(1);
            }
        }
        StageProgress::from_counts(completed, total)
    }
}

/// One entry in a job's stage audit trail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageHistoryEntry {
    /// Stage that was entered.
    pub stage: Stage,
    /// When the stage was entered.
    pub entered_at: DateTime<Utc>,
    /// When the stage's steps were all completed and the job advanced.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    /// Whether the stage was entered through a manual override.
    #[serde(default)]
    pub manual: bool,
}

/// Ordered, append-only stage audit trail.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StageHistory(Vec<StageHistoryEntry>);

impl StageHistory {
    /// Creates a history opened at `stage`.
    #[must_use]
    pub fn opened_at(stage: Stage, at: DateTime<Utc>) -> Self {
        let mut history = Self::default();
        history.enter(stage, at, false);
        history
    }

    /// Appends an entry for a newly entered stage.
    pub fn enter(&mut self, stage: Stage, at: DateTime<Utc>, manual: bool) {
        self.0.push(StageHistoryEntry {
            stage,
            entered_at: at,
            completed_at: None,
            manual,
        });
    }

    /// Stamps `completed_at` on the latest entry unless already stamped.
    pub fn complete_latest(&mut self, at: DateTime<Utc>) {
        if let Some(latest) = self.0.last_mut() {
            latest.completed_at.get_or_insert(at);
        }
    }

    /// Returns the latest entry.
    #[must_use]
    pub fn latest(&self) -> Option<&StageHistoryEntry> {
        self.0.last()
    }

    /// Returns every entry in order.
    #[must_use]
    pub fn entries(&self) -> &[StageHistoryEntry] {
        &self.0
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` when no stage has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
