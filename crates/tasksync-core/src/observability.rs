//! Observability: log output setup and run summaries.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::domain::{OutcomeCounts, RunReport, StepRecord};

/// Install the global `tracing` subscriber writing compact lines to stderr.
///
/// `RUST_LOG` wins over `level` when set. Calling twice is harmless.
pub fn init_subscriber(level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .compact();

    let _ = subscriber.try_init();
}

/// Condensed view of a run report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub sweep: OutcomeCounts,
    pub rollup: OutcomeCounts,
    pub failures: Vec<StepRecord>,
}

impl RunSummary {
    pub fn from_report(report: &RunReport) -> Self {
        Self {
            sweep: report.sweep.counts(),
            rollup: report.rollup.counts(),
            failures: report
                .sweep
                .failures()
                .chain(report.rollup.failures())
                .cloned()
                .collect(),
        }
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    /// One info line per phase, one warning per failed step.
    pub fn log(&self) {
        for (phase, counts) in [("sweep", &self.sweep), ("rollup", &self.rollup)] {
            info!(
                phase,
                succeeded = counts.succeeded,
                skipped = counts.skipped,
                failed = counts.failed,
                "phase summary"
            );
        }
        for failure in &self.failures {
            warn!(
                step = %failure.step,
                subject = %failure.subject,
                reason = failure.outcome.reason.as_deref().unwrap_or(""),
                "step failed"
            );
        }
    }
}
