//! Suites of cases and their reports

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::error::{EngineError, EngineResult};
use crate::harness::{RoundTripCase, RoundTripHarness, RoundTripResult};
use crate::log_tail::LogSource;
use crate::process::ProcessRunner;

/// Cases run sequentially against one scratch group
#[derive(Debug, Clone, Default)]
pub struct RoundTripSuite {
    pub cases: Vec<RoundTripCase>,
}

impl RoundTripSuite {
    pub fn new(cases: Vec<RoundTripCase>) -> Self {
        Self { cases }
    }

    /// Keep only cases whose id contains `filter`
    pub fn filtered(mut self, filter: &str) -> Self {
        self.cases.retain(|case| case.id.contains(filter));
        self
    }

    /// Run every case
    ///
    /// The scratch group is created once before the first case and deleted
    /// once after the last. Only a failure to create the group is an error.
    pub fn run<R: ProcessRunner, L: LogSource>(
        &self,
        harness: &mut RoundTripHarness<R, L>,
    ) -> EngineResult<SuiteReport> {
        let group = harness.settings().scratch_group.clone();
        let started_at = Utc::now();
        info!("Running {} cases in {}", self.cases.len(), group);

        harness.prepare()?;
        let results: Vec<RoundTripResult> =
            self.cases.iter().map(|case| harness.run_case(case)).collect();
        harness.finish();

        Ok(SuiteReport {
            group,
            started_at,
            results,
        })
    }
}

/// Results of a suite run
#[derive(Debug, Clone, Serialize)]
pub struct SuiteReport {
    pub group: String,
    pub started_at: DateTime<Utc>,
    pub results: Vec<RoundTripResult>,
}

impl SuiteReport {
    pub fn passed(&self) -> usize {
        self.results.iter().filter(|r| r.passed()).count()
    }

    pub fn failed(&self) -> usize {
        self.results.len() - self.passed()
    }

    pub fn all_passed(&self) -> bool {
        self.results.iter().all(RoundTripResult::passed)
    }

    /// Write `report.json` into `dir`, returning its path
    pub fn write_json(&self, dir: &Path) -> EngineResult<PathBuf> {
        let path = dir.join("report.json");
        let io_error = |source| EngineError::Io {
            path: path.clone(),
            source,
        };
        fs::create_dir_all(dir).map_err(io_error)?;
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| io_error(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))?;
        fs::write(&path, json).map_err(io_error)?;
        Ok(path)
    }

    /// Print one line per case and a total to stdout
    pub fn print_summary(&self) {
        println!("\n=== Round Trip Summary ===");
        println!("Scratch group: {}", self.group);
        println!("Started: {}", self.started_at.to_rfc3339());
        println!();

        for result in &self.results {
            let mark = if result.passed() { "✓" } else { "✗" };
            println!("{} {} ({} ms): {}", mark, result.case_id, result.elapsed_ms, result.outcome);
            for line in &result.engine_errors {
                println!("    engine: {line}");
            }
            if let Some(artifact) = &result.artifact {
                println!("    kept: {}", artifact.display());
            }
        }

        println!();
        println!("Results: {}/{} passed", self.passed(), self.results.len());
        if self.all_passed() {
            println!("✅ All cases passed!");
        } else {
            println!("❌ {} cases failed", self.failed());
        }
    }
}
