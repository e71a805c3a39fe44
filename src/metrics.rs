//! Run statistics tracking for the feature pipeline.

use std::time::{Duration, Instant};
use tracing::info;
use uuid::Uuid;

/// Cardinality and timing of one completed stage.
#[derive(Debug, Clone)]
pub struct StageReport {
    /// Stage name
    pub stage: &'static str,
    /// Rows read from upstream
    pub rows_in: usize,
    /// Rows materialized
    pub rows_out: usize,
    /// Wall-clock time spent in the stage
    pub duration: Duration,
}

/// Metrics collector for one pipeline run
#[derive(Debug)]
pub struct RunMetrics {
    /// Unique id of this run
    run_id: Uuid,
    /// Start time for total duration
    started: Instant,
    /// Completed stages in execution order
    stages: Vec<StageReport>,
}

impl RunMetrics {
    /// Create a collector for a fresh run
    pub fn new() -> Self {
        Self {
            run_id: Uuid::new_v4(),
            started: Instant::now(),
            stages: Vec::new(),
        }
    }

    /// Id of this run
    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// Record a completed stage
    pub fn record_stage(
        &mut self,
        stage: &'static str,
        rows_in: usize,
        rows_out: usize,
        duration: Duration,
    ) {
        self.stages.push(StageReport {
            stage,
            rows_in,
            rows_out,
            duration,
        });
    }

    /// Completed stages in execution order
    pub fn stages(&self) -> &[StageReport] {
        &self.stages
    }

    /// Total rows materialized across all stages
    pub fn total_rows_out(&self) -> usize {
        self.stages.iter().map(|s| s.rows_out).sum()
    }

    /// Wall-clock time since the run started
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Print summary statistics
    pub fn print_summary(&self) {
        let total_duration: Duration = self.stages.iter().map(|s| s.duration).sum();

        info!("╔══════════════════════════════════════════════════════════════╗");
        info!("║            PHISHING FEATURE PIPELINE - RUN SUMMARY           ║");
        info!("╠══════════════════════════════════════════════════════════════╣");
        info!("║ Run ID: {:<52} ║", self.run_id);
        info!(
            "║ Stages Completed: {:>2}  │  Rows Materialized: {:>12}     ║",
            self.stages.len(),
            self.total_rows_out()
        );
        info!("╠══════════════════════════════════════════════════════════════╣");
        for report in &self.stages {
            info!(
                "║ {:<24} in={:>8} out={:>8} {:>9.1?} ║",
                report.stage, report.rows_in, report.rows_out, report.duration
            );
        }
        info!("╠══════════════════════════════════════════════════════════════╣");
        info!("║ Total Stage Time: {:>10.1?}                                 ║", total_duration);
        info!("╚══════════════════════════════════════════════════════════════╝");
    }
}

impl Default for RunMetrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_recording() {
        let mut metrics = RunMetrics::new();

        metrics.record_stage("normalize_accounts", 10, 10, Duration::from_micros(100));
        metrics.record_stage("account_profiles", 10, 4, Duration::from_micros(200));

        assert_eq!(metrics.stages().len(), 2);
        assert_eq!(metrics.total_rows_out(), 14);
        assert_eq!(metrics.stages()[1].stage, "account_profiles");
    }

    #[test]
    fn test_run_ids_are_unique() {
        let a = RunMetrics::new();
        let b = RunMetrics::new();

        assert_ne!(a.run_id(), b.run_id());
    }

    #[test]
    fn test_empty_run_has_no_rows() {
        let metrics = RunMetrics::default();

        assert!(metrics.stages().is_empty());
        assert_eq!(metrics.total_rows_out(), 0);
    }
}
