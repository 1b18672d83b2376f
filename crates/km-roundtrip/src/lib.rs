//! Round-trip conformance harness for Keyboard Maestro
//!
//! Generated macro XML is imported into a live engine, exported again and
//! compared with what was generated. The engine's own export is the only
//! reference for its format, so this is how the serializers are checked.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐   .kmmacros    ┌──────────────────┐
//! │  km-actions  │ ─────────────► │ Keyboard Maestro │
//! │  (generate)  │     open -g    │  editor / engine │
//! └──────┬───────┘                └────────┬─────────┘
//!        │                                 │ osascript: xml of macro
//!        │        ┌─────────────┐          │
//!        └──────► │  normalize  │ ◄────────┘
//!                 │  + compare  │ ◄──── Engine.log tail
//!                 └──────┬──────┘
//!                        ▼
//!                  SuiteReport
//! ```
//!
//! The engine is reached only through [`ProcessRunner`] and [`LogSource`],
//! so everything above the process boundary runs against fakes in tests.

pub mod client;
pub mod compare;
pub mod error;
pub mod harness;
pub mod log_tail;
pub mod normalize;
pub mod process;
pub mod suite;
pub mod suites;

pub use client::{applescript_string, EngineClient, ErrorPolicy, RunOptions};
pub use compare::{line_diff, LineDiff};
pub use error::{EngineError, EngineResult};
pub use harness::{
    sanitize_case_id, Phase, RoundTripCase, RoundTripHarness, RoundTripOutcome, RoundTripResult,
};
pub use log_tail::{FileLogTail, LogSource, NoLog};
pub use normalize::normalize_for_compare;
pub use process::{ProcessOutput, ProcessRunner, SystemRunner};
pub use suite::{RoundTripSuite, SuiteReport};
pub use suites::builtin_cases;
