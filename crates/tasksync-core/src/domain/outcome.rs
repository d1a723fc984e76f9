//! Outcome model: a common result format for every sync step.
//!
//! Each side-effecting step of a phase (stamping a date, recreating a task,
//! publishing a spotlight entry, ...) yields one `StepRecord`. A phase collects
//! them into a `PhaseReport` so partial failures are visible at the end
//! instead of aborting the remainder of the phase.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A unified classification of a step result.
///
/// Serialized as SCREAMING_SNAKE_CASE: SUCCEEDED / SKIPPED / FAILED.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OutcomeKind {
    Succeeded,
    Skipped,
    Failed,
}

/// Result of one step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepOutcome {
    pub kind: OutcomeKind,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl StepOutcome {
    pub fn succeeded() -> Self {
        Self {
            kind: OutcomeKind::Succeeded,
            reason: None,
        }
    }

    pub fn skipped(reason: impl Into<String>) -> Self {
        Self {
            kind: OutcomeKind::Skipped,
            reason: Some(reason.into()),
        }
    }

    pub fn failed(reason: impl Into<String>) -> Self {
        Self {
            kind: OutcomeKind::Failed,
            reason: Some(reason.into()),
        }
    }

    pub fn is_failed(&self) -> bool {
        self.kind == OutcomeKind::Failed
    }
}

/// Which step produced an outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    ClaimRecord,
    StampCreationDate,
    RecreateTask,
    InsertProject,
    UpdateProject,
    ArchiveSpotlight,
    PublishSpotlight,
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StepKind::ClaimRecord => "claim_record",
            StepKind::StampCreationDate => "stamp_creation_date",
            StepKind::RecreateTask => "recreate_task",
            StepKind::InsertProject => "insert_project",
            StepKind::UpdateProject => "update_project",
            StepKind::ArchiveSpotlight => "archive_spotlight",
            StepKind::PublishSpotlight => "publish_spotlight",
        };
        f.write_str(name)
    }
}

/// One step outcome, tagged with its step and subject (record id or project name).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepRecord {
    pub step: StepKind,
    pub subject: String,
    pub outcome: StepOutcome,
}

impl StepRecord {
    pub fn new(step: StepKind, subject: impl Into<String>, outcome: StepOutcome) -> Self {
        Self {
            step,
            subject: subject.into(),
            outcome,
        }
    }
}

/// Counts by outcome kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeCounts {
    pub succeeded: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// All step outcomes of one phase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseReport {
    pub phase: String,
    pub steps: Vec<StepRecord>,
}

impl PhaseReport {
    pub fn new(phase: impl Into<String>) -> Self {
        Self {
            phase: phase.into(),
            steps: Vec::new(),
        }
    }

    pub fn push(&mut self, record: StepRecord) {
        self.steps.push(record);
    }

    pub fn extend(&mut self, records: impl IntoIterator<Item = StepRecord>) {
        self.steps.extend(records);
    }

    pub fn counts(&self) -> OutcomeCounts {
        let mut counts = OutcomeCounts::default();
        for record in &self.steps {
            match record.outcome.kind {
                OutcomeKind::Succeeded => counts.succeeded += 1,
                OutcomeKind::Skipped => counts.skipped += 1,
                OutcomeKind::Failed => counts.failed += 1,
            }
        }
        counts
    }

    /// Counts restricted to one step kind.
    pub fn counts_for(&self, step: StepKind) -> OutcomeCounts {
        let mut counts = OutcomeCounts::default();
        for record in self.steps.iter().filter(|r| r.step == step) {
            match record.outcome.kind {
                OutcomeKind::Succeeded => counts.succeeded += 1,
                OutcomeKind::Skipped => counts.skipped += 1,
                OutcomeKind::Failed => counts.failed += 1,
            }
        }
        counts
    }

    pub fn failures(&self) -> impl Iterator<Item = &StepRecord> {
        self.steps.iter().filter(|r| r.outcome.is_failed())
    }

    pub fn has_failures(&self) -> bool {
        self.failures().next().is_some()
    }
}

/// Reports of a whole run (sweep + rollup).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    pub sweep: PhaseReport,
    pub rollup: PhaseReport,
}

impl RunReport {
    pub fn has_failures(&self) -> bool {
        self.sweep.has_failures() || self.rollup.has_failures()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_kind_serializes_as_required_names() {
        let s = serde_json::to_string(&OutcomeKind::Succeeded).unwrap();
        assert_eq!(s, "\"SUCCEEDED\"");

        let s = serde_json::to_string(&OutcomeKind::Skipped).unwrap();
        assert_eq!(s, "\"SKIPPED\"");

        let s = serde_json::to_string(&OutcomeKind::Failed).unwrap();
        assert_eq!(s, "\"FAILED\"");
    }

    #[test]
    fn report_counts_by_kind_and_step() {
        let mut report = PhaseReport::new("sweep");
        report.push(StepRecord::new(StepKind::StampCreationDate, "a", StepOutcome::succeeded()));
        report.push(StepRecord::new(StepKind::StampCreationDate, "b", StepOutcome::skipped("dated")));
        report.push(StepRecord::new(StepKind::RecreateTask, "a", StepOutcome::failed("boom")));

        assert_eq!(
            report.counts(),
            OutcomeCounts {
                succeeded: 1,
                skipped: 1,
                failed: 1
            }
        );
        assert_eq!(report.counts_for(StepKind::RecreateTask).failed, 1);
        assert!(report.has_failures());
        assert_eq!(report.failures().count(), 1);
    }

    #[test]
    fn succeeded_has_no_reason_on_the_wire() {
        let v = serde_json::to_value(StepOutcome::succeeded()).unwrap();
        assert_eq!(v, serde_json::json!({ "kind": "SUCCEEDED" }));
    }
}
