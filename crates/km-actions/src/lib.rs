//! Keyboard Maestro actions and macro envelopes
//!
//! Factories build a [`VirtualAction`] from a validated options record. The
//! action renders to the dict the engine itself would export: discriminant
//! and identifier first, the rest alphabetical, and flag keys present only
//! when they differ from the engine's implicit default.
//!
//! ```text
//! options ──► factory ──► VirtualAction ──► to_xml() ──► macro_xml envelope
//!               │
//!               └── ActionError on an invalid combination
//! ```
//!
//! # Key Types
//!
//! - [`VirtualAction`] - Immutable, render-only action
//! - [`TimeoutOptions`] / [`FailureOptions`] / [`ScriptResult`] - Shared option records
//! - [`DurableMacro`] - Named macro envelope for import

pub mod action;
pub mod error;
pub mod factories;
pub mod macro_xml;
pub mod options;

pub use action::{next_action_uid, VirtualAction};
pub use error::{ActionError, ActionResult};
pub use factories::*;
pub use macro_xml::{
    ephemeral_macro, ephemeral_macro_from, indent_fragment, reference_timestamp, DurableMacro,
};
pub use options::{DisplayKind, FailureOptions, ScriptResult, TimeoutOptions};
