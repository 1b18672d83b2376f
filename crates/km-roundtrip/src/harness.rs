//! Round-trip harness
//!
//! Each case runs one pass of a small state machine:
//!
//! ```text
//! checkpoint log → write import file → import → poll scratch group
//!     → delete macro → collect log errors → normalize and compare
//! ```
//!
//! Mismatches, timeouts and engine-logged errors are results, not errors,
//! so a suite keeps going after a failing case. A process failure in any
//! phase is also captured as a result, tagged with the phase it hit.

use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::{debug, info, trace, warn};

use km_actions::{DurableMacro, VirtualAction};
use km_config::HarnessSettings;

use crate::client::EngineClient;
use crate::compare::{line_diff, LineDiff};
use crate::error::{EngineError, EngineResult};
use crate::log_tail::LogSource;
use crate::normalize::normalize_for_compare;
use crate::process::ProcessRunner;

/// Step of a case in progress
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Checkpoint,
    WriteImport,
    Import,
    Poll,
    Cleanup,
    ReadLog,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Checkpoint => "log checkpoint",
            Phase::WriteImport => "writing import file",
            Phase::Import => "import",
            Phase::Poll => "polling",
            Phase::Cleanup => "cleanup",
            Phase::ReadLog => "reading engine log",
        };
        f.write_str(name)
    }
}

/// A named list of actions to push through the engine
#[derive(Debug, Clone)]
pub struct RoundTripCase {
    pub id: String,
    pub actions: Vec<VirtualAction>,
}

impl RoundTripCase {
    pub fn new(id: impl Into<String>, actions: Vec<VirtualAction>) -> Self {
        Self {
            id: id.into(),
            actions,
        }
    }

    /// Case holding a single action
    pub fn single(id: impl Into<String>, action: VirtualAction) -> Self {
        Self::new(id, vec![action])
    }
}

/// How a case ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RoundTripOutcome {
    /// Texts matched and the engine logged no errors
    Pass,
    /// Texts differ
    Mismatch { diff: LineDiff },
    /// The macro never showed up in the scratch group
    NotFound { attempts: u32 },
    /// Texts matched but the engine logged errors meanwhile
    EngineErrors { count: usize },
    /// An external process or file operation failed
    EngineFailure { phase: Phase, message: String },
}

impl RoundTripOutcome {
    pub fn is_pass(&self) -> bool {
        matches!(self, RoundTripOutcome::Pass)
    }
}

impl fmt::Display for RoundTripOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoundTripOutcome::Pass => f.write_str("pass"),
            RoundTripOutcome::Mismatch { diff } => write!(f, "mismatch at {diff}"),
            RoundTripOutcome::NotFound { attempts } => {
                write!(f, "not imported after {attempts} attempts")
            }
            RoundTripOutcome::EngineErrors { count } => write!(f, "{count} engine log errors"),
            RoundTripOutcome::EngineFailure { phase, message } => {
                write!(f, "failed during {phase}: {message}")
            }
        }
    }
}

/// Result of one case
#[derive(Debug, Clone, Serialize)]
pub struct RoundTripResult {
    pub case_id: String,
    pub outcome: RoundTripOutcome,
    /// Engine log lines matching the error pattern during the case
    pub engine_errors: Vec<String>,
    /// Preserved import file, if any
    pub artifact: Option<PathBuf>,
    pub elapsed_ms: u64,
}

impl RoundTripResult {
    pub fn passed(&self) -> bool {
        self.outcome.is_pass()
    }
}

/// What came back from the engine
struct Exchange {
    retrieved: Option<String>,
    engine_errors: Vec<String>,
}

/// Drives cases through a live (or faked) engine
pub struct RoundTripHarness<R, L> {
    client: EngineClient<R>,
    log: L,
    settings: HarnessSettings,
    /// Stems handed out so far; each case gets its own
    stems: HashSet<String>,
}

impl<R: ProcessRunner, L: LogSource> RoundTripHarness<R, L> {
    pub fn new(client: EngineClient<R>, log: L, settings: HarnessSettings) -> Self {
        Self {
            client,
            log,
            settings,
            stems: HashSet::new(),
        }
    }

    pub fn client(&self) -> &EngineClient<R> {
        &self.client
    }

    pub fn settings(&self) -> &HarnessSettings {
        &self.settings
    }

    /// Create the scratch group
    pub fn prepare(&self) -> EngineResult<()> {
        self.client.ensure_group(&self.settings.scratch_group)
    }

    /// Delete the scratch group; failures are logged only
    pub fn finish(&self) {
        if let Err(e) = self.client.delete_group(&self.settings.scratch_group) {
            warn!("Could not delete scratch group {}: {}", self.settings.scratch_group, e);
        }
    }

    /// Run one case; the scratch group must already exist
    pub fn run_case(&mut self, case: &RoundTripCase) -> RoundTripResult {
        let started = Instant::now();
        let stem = self.claim_stem(&case.id);
        let name = format!("rt-{stem}");
        let import_path = self.settings.import_dir.join(format!("{stem}.kmmacros"));

        let generated =
            DurableMacro::new(&self.settings.scratch_group, &name).render_actions(&case.actions);

        let mut phase = Phase::Checkpoint;
        let (outcome, engine_errors, retrieved) =
            match self.exchange(&name, &generated, &import_path, &mut phase) {
                Ok(exchange) => {
                    let outcome = judge(&generated, &exchange, self.settings.poll_attempts);
                    (outcome, exchange.engine_errors, exchange.retrieved)
                }
                Err(e) => (
                    RoundTripOutcome::EngineFailure {
                        phase,
                        message: e.to_string(),
                    },
                    Vec::new(),
                    None,
                ),
            };

        let artifact = if !outcome.is_pass() || self.settings.keep_passing_artifacts {
            self.preserve(&stem, &generated, retrieved.as_deref())
        } else {
            None
        };
        remove_import_file(&import_path);

        let result = RoundTripResult {
            case_id: case.id.clone(),
            outcome,
            engine_errors,
            artifact,
            elapsed_ms: u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
        };
        info!("{}: {}", result.case_id, result.outcome);
        result
    }

    fn exchange(
        &mut self,
        name: &str,
        generated: &str,
        import_path: &Path,
        phase: &mut Phase,
    ) -> EngineResult<Exchange> {
        let group = self.settings.scratch_group.clone();

        *phase = Phase::Checkpoint;
        self.log.checkpoint()?;

        *phase = Phase::WriteImport;
        debug!("Writing {}", import_path.display());
        fs::write(import_path, generated).map_err(|source| EngineError::Io {
            path: import_path.to_path_buf(),
            source,
        })?;

        *phase = Phase::Import;
        self.client.import_file(import_path)?;

        *phase = Phase::Poll;
        let retrieved = match self.poll(&group, name) {
            Ok(retrieved) => retrieved,
            Err(e) => {
                self.discard(&group, name);
                return Err(e);
            }
        };

        *phase = Phase::Cleanup;
        self.discard(&group, name);

        *phase = Phase::ReadLog;
        let engine_errors = self.log.new_error_lines()?;

        Ok(Exchange {
            retrieved,
            engine_errors,
        })
    }

    /// Delete the imported macro; failures are logged only
    fn discard(&self, group: &str, name: &str) {
        if let Err(e) = self.client.delete_macro(group, name) {
            warn!("Could not delete {} from {}: {}", name, group, e);
        }
    }

    /// File stem for a case, suffixed when an earlier case already took it
    fn claim_stem(&mut self, id: &str) -> String {
        let base = sanitize_case_id(id);
        let mut stem = base.clone();
        let mut n = 2;
        while !self.stems.insert(stem.clone()) {
            stem = format!("{base}-{n}");
            n += 1;
        }
        if stem != base {
            debug!("Case {:?} shares stem {}, using {}", id, base, stem);
        }
        stem
    }

    /// Look for the imported macro until it appears or attempts run out
    fn poll(&self, group: &str, name: &str) -> EngineResult<Option<String>> {
        let attempts = self.settings.poll_attempts.max(1);
        let delay = Duration::from_millis(self.settings.poll_delay_ms);
        for attempt in 1..=attempts {
            if let Some(xml) = self.client.macro_xml(group, name)? {
                debug!("{} imported after {} attempts", name, attempt);
                return Ok(Some(xml));
            }
            trace!("{} not in {} yet ({}/{})", name, group, attempt, attempts);
            if attempt < attempts {
                thread::sleep(delay);
            }
        }
        Ok(None)
    }

    /// Keep the import file, and the retrieved text when there is one
    fn preserve(&self, stem: &str, generated: &str, retrieved: Option<&str>) -> Option<PathBuf> {
        let dir = &self.settings.artifacts_dir;
        let path = dir.join(format!("{stem}.kmmacros"));
        let written = fs::create_dir_all(dir)
            .and_then(|()| fs::write(&path, generated))
            .and_then(|()| match retrieved {
                Some(xml) => fs::write(dir.join(format!("{stem}.retrieved.xml")), xml),
                None => Ok(()),
            });
        match written {
            Ok(()) => {
                debug!("Preserved {}", path.display());
                Some(path)
            }
            Err(e) => {
                warn!("Could not preserve artifact {}: {}", path.display(), e);
                None
            }
        }
    }
}

fn judge(generated: &str, exchange: &Exchange, attempts: u32) -> RoundTripOutcome {
    let Some(retrieved) = exchange.retrieved.as_deref() else {
        return RoundTripOutcome::NotFound {
            attempts: attempts.max(1),
        };
    };
    if let Some(diff) = line_diff(
        &normalize_for_compare(generated),
        &normalize_for_compare(retrieved),
    ) {
        return RoundTripOutcome::Mismatch { diff };
    }
    if !exchange.engine_errors.is_empty() {
        return RoundTripOutcome::EngineErrors {
            count: exchange.engine_errors.len(),
        };
    }
    RoundTripOutcome::Pass
}

fn remove_import_file(path: &Path) {
    match fs::remove_file(path) {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!("Could not remove {}: {}", path.display(), e),
    }
}

/// Turn a case id into a file stem and macro name suffix
///
/// Keeps ASCII letters, digits and `_`; every other run of characters
/// becomes a single `-`.
pub fn sanitize_case_id(id: &str) -> String {
    let mut out = String::with_capacity(id.len());
    for c in id.chars() {
        if c.is_ascii_alphanumeric() || c == '_' {
            out.push(c.to_ascii_lowercase());
        } else if !out.is_empty() && !out.ends_with('-') {
            out.push('-');
        }
    }
    let trimmed = out.trim_end_matches('-');
    if trimmed.is_empty() {
        "case".to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_case_id() {
        assert_eq!(sanitize_case_id("insert_text/by pasting"), "insert_text-by-pasting");
        assert_eq!(sanitize_case_id("  Quit: Frontmost!! "), "quit-frontmost");
        assert_eq!(sanitize_case_id("///"), "case");
    }

    #[test]
    fn test_judge_prefers_mismatch_over_log_errors() {
        let exchange = Exchange {
            retrieved: Some("<array>\n<dict/>\n</array>\n".into()),
            engine_errors: vec!["error".into()],
        };
        let outcome = judge("<array/>\n", &exchange, 3);
        assert!(matches!(outcome, RoundTripOutcome::Mismatch { .. }));
    }

    #[test]
    fn test_judge_log_errors_fail_matching_case() {
        let exchange = Exchange {
            retrieved: Some("<array/>\n".into()),
            engine_errors: vec!["Action failed".into()],
        };
        assert_eq!(
            judge("<array/>\n", &exchange, 3),
            RoundTripOutcome::EngineErrors { count: 1 }
        );
    }

    #[test]
    fn test_outcome_serializes_with_tag() {
        let outcome = RoundTripOutcome::EngineFailure {
            phase: Phase::Import,
            message: "boom".into(),
        };
        let value = serde_json::to_value(&outcome).unwrap();
        assert_eq!(value["outcome"], "engine_failure");
        assert_eq!(value["phase"], "import");
        assert_eq!(outcome.to_string(), "failed during import: boom");
    }
}
