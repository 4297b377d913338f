//! Simulation report generation.

use super::config::SimConfig;
use super::distribution::{RunDistribution, SuccessCounts};
use crate::drops::CategoryReport;
use crate::error::Result;
use serde::Serialize;
use std::fmt::Write as _;

/// Confidence levels summarised in every report.
pub const CONFIDENCE_LEVELS: [f64; 3] = [0.5, 0.9, 0.99];

/// Everything a caller needs to print, plot or export one simulation.
#[derive(Debug, Clone, Serialize)]
pub struct SimReport {
    pub generated_at: String,
    pub seed: u64,
    pub max_runs: u32,
    pub repetitions: u64,
    pub parallel: bool,
    pub censored: u64,
    pub mean_completion_run: Option<f64>,
    /// `(confidence, runs needed)` for each of [`CONFIDENCE_LEVELS`].
    pub runs_for_confidence: Vec<(f64, Option<u32>)>,
    pub categories: Vec<CategoryReport>,
    pub distribution: RunDistribution,
}

impl SimReport {
    pub fn new(
        config: &SimConfig,
        seed: u64,
        categories: Vec<CategoryReport>,
        counts: &SuccessCounts,
        distribution: RunDistribution,
    ) -> Self {
        let runs_for_confidence = CONFIDENCE_LEVELS
            .iter()
            .map(|&p| (p, distribution.runs_for_confidence(p)))
            .collect();

        Self {
            generated_at: chrono::Utc::now().to_rfc3339(),
            seed,
            max_runs: config.max_runs,
            repetitions: counts.repetitions(),
            parallel: config.parallel,
            censored: counts.censored(),
            mean_completion_run: distribution.mean_completion_run(),
            runs_for_confidence,
            categories,
            distribution,
        }
    }

    /// Generate a text report.
    pub fn to_text(&self) -> String {
        let mut report = String::new();

        report.push_str("═══════════════════════════════════════════════════════════════\n");
        report.push_str("                     DROP SIMULATION REPORT\n");
        report.push_str("═══════════════════════════════════════════════════════════════\n\n");

        let _ = writeln!(
            report,
            "Repetitions: {}  Max runs: {}  Seed: {}{}",
            self.repetitions,
            self.max_runs,
            self.seed,
            if self.parallel { "  (parallel)" } else { "" }
        );
        let _ = writeln!(
            report,
            "Censored:    {} ({:.2}%)\n",
            self.censored,
            self.distribution.censored_probability() * 100.0
        );

        report.push_str("── DROP TABLE ───────────────────────────────────────────────────\n");
        report.push_str("  Item        Chance   Wanted   Sampled\n");
        for category in &self.categories {
            let sampled = match category.drop_rate {
                Some(rate) => format!("{:.4}", rate),
                None => "-".to_string(),
            };
            let _ = writeln!(
                report,
                "  {:<10} {:>6.1}%   {:<6}   {}",
                category.label,
                category.probability * 100.0,
                if category.wanted { "yes" } else { "no" },
                sampled
            );
        }
        report.push('\n');

        report.push_str("── RUNS NEEDED ──────────────────────────────────────────────────\n");
        match self.mean_completion_run {
            Some(mean) => {
                let _ = writeln!(report, "  Mean (completed):  {:.2}", mean);
            }
            None => report.push_str("  Mean (completed):  never completed\n"),
        }
        for (confidence, runs) in &self.runs_for_confidence {
            let runs = match runs {
                Some(r) => r.to_string(),
                None => format!("> {}", self.max_runs),
            };
            let _ = writeln!(report, "  {:>3.0}% chance by:   {}", confidence * 100.0, runs);
        }
        report.push('\n');

        report.push_str("── PROBABILITY BY RUN ───────────────────────────────────────────\n");
        report.push_str("  Run    Exactly    Or less\n");
        for (run, exact, cumulative) in self.distribution.rows() {
            let bar = "█".repeat((cumulative * 20.0).round() as usize);
            let _ = writeln!(
                report,
                "  {:<4}   {:.4}     {:.4}  {}",
                run, exact, cumulative, bar
            );
        }

        report.push_str("\n═══════════════════════════════════════════════════════════════\n");

        report
    }

    /// Generate a JSON report for further analysis.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// `run,exact_probability,cumulative_probability` rows for plotting tools.
    pub fn to_csv(&self) -> String {
        let mut csv = String::from("run,exact_probability,cumulative_probability\n");
        for (run, exact, cumulative) in self.distribution.rows() {
            let _ = writeln!(csv, "{},{},{}", run, exact, cumulative);
        }
        csv
    }
}
