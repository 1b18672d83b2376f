//! Macro envelopes
//!
//! Action fragments are wrapped in the engine's plist envelope by plain
//! string assembly. Nothing here validates the fragments; they are assumed
//! to be complete action dicts rendered at depth zero.
//!
//! Two envelopes exist:
//!
//! - **Ephemeral**: a bare array of actions, executed once and never stored.
//!   An optional trailing `Return` action hands a variable back to the caller.
//! - **Durable**: a macro group holding one named macro with identity,
//!   timestamps and an empty trigger list, suitable for import.

use std::fmt::Write as _;

use chrono::{DateTime, TimeZone, Utc};
use uuid::Uuid;

use km_core::{indent, PlistValue, PLIST_FOOTER, PLIST_HEADER};

use crate::action::VirtualAction;
use crate::factories::return_result;

/// Re-indent a depth-zero fragment to `depth`
///
/// Continuation lines of a multi-line `<string>` are text, not markup, and
/// are left untouched.
pub fn indent_fragment(fragment: &str, depth: usize) -> String {
    let pad = indent(depth);
    let mut out = String::with_capacity(fragment.len() + fragment.lines().count() * depth);
    let mut in_text = false;
    for line in fragment.lines() {
        if !in_text {
            out.push_str(&pad);
        }
        out.push_str(line);
        out.push('\n');

        if in_text {
            in_text = !line.contains("</string>");
        } else if let Some(open) = line.find("<string>") {
            in_text = !line[open..].contains("</string>");
        }
    }
    out
}

fn write_actions(out: &mut String, fragments: &[String], depth: usize) {
    let pad = indent(depth);
    if fragments.is_empty() {
        let _ = writeln!(out, "{pad}<array/>");
        return;
    }
    let _ = writeln!(out, "{pad}<array>");
    for fragment in fragments {
        out.push_str(&indent_fragment(fragment, depth + 1));
    }
    let _ = writeln!(out, "{pad}</array>");
}

fn write_entry(out: &mut String, depth: usize, key: &str, value: impl Into<PlistValue>) {
    let _ = writeln!(out, "{}<key>{key}</key>", indent(depth));
    value.into().write_xml(out, depth);
}

/// Wrap fragments for one-shot execution
///
/// With `return_variable`, a `Return` action yielding `%Variable%NAME%` is
/// appended after the fragments.
pub fn ephemeral_macro(fragments: &[String], return_variable: Option<&str>) -> String {
    let mut all: Vec<String> = fragments.to_vec();
    if let Some(name) = return_variable {
        all.push(return_result(&format!("%Variable%{name}%")).to_xml());
    }
    let mut out = String::from(PLIST_HEADER);
    write_actions(&mut out, &all, 0);
    out.push_str(PLIST_FOOTER);
    out
}

/// [`ephemeral_macro`] over built actions
pub fn ephemeral_macro_from(actions: &[VirtualAction], return_variable: Option<&str>) -> String {
    let fragments: Vec<String> = actions.iter().map(VirtualAction::to_xml).collect();
    ephemeral_macro(&fragments, return_variable)
}

/// Seconds between the Unix epoch and 2001-01-01T00:00:00Z
const REFERENCE_EPOCH_OFFSET: i64 = 978_307_200;

/// Plist timestamp: seconds since 2001-01-01 UTC
pub fn reference_timestamp(at: DateTime<Utc>) -> f64 {
    (at.timestamp() - REFERENCE_EPOCH_OFFSET) as f64 + f64::from(at.timestamp_subsec_micros()) / 1e6
}

/// A named macro inside a named group, ready for import
#[derive(Debug, Clone, PartialEq)]
pub struct DurableMacro {
    pub group: String,
    pub group_uid: String,
    pub name: String,
    pub uid: String,
    /// Creation and modification time, seconds since 2001-01-01
    pub timestamp: f64,
}

impl DurableMacro {
    /// New macro with fresh identifiers stamped with the current time
    pub fn new(group: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            group: group.into(),
            group_uid: new_uid(),
            name: name.into(),
            uid: new_uid(),
            timestamp: reference_timestamp(Utc::now()),
        }
    }

    /// Same macro with a fixed timestamp
    pub fn at(mut self, at: DateTime<Utc>) -> Self {
        self.timestamp = reference_timestamp(at);
        self
    }

    /// Render the group envelope around the fragments
    pub fn render(&self, fragments: &[String]) -> String {
        let mut out = String::from(PLIST_HEADER);
        out.push_str("<array>\n");
        out.push_str("\t<dict>\n");
        write_entry(&mut out, 2, "Activate", "Normal");
        let _ = writeln!(out, "\t\t<key>Macros</key>");
        out.push_str("\t\t<array>\n");
        out.push_str("\t\t\t<dict>\n");
        let _ = writeln!(out, "\t\t\t\t<key>Actions</key>");
        write_actions(&mut out, fragments, 4);
        write_entry(&mut out, 4, "CreationDate", PlistValue::Real(self.timestamp));
        write_entry(&mut out, 4, "ModificationDate", PlistValue::Real(self.timestamp));
        write_entry(&mut out, 4, "Name", self.name.as_str());
        write_entry(&mut out, 4, "Triggers", PlistValue::Array(Vec::new()));
        write_entry(&mut out, 4, "UID", self.uid.as_str());
        out.push_str("\t\t\t</dict>\n");
        out.push_str("\t\t</array>\n");
        write_entry(&mut out, 2, "Name", self.group.as_str());
        write_entry(&mut out, 2, "UID", self.group_uid.as_str());
        out.push_str("\t</dict>\n");
        out.push_str("</array>\n");
        out.push_str(PLIST_FOOTER);
        out
    }

    /// [`DurableMacro::render`] over built actions
    pub fn render_actions(&self, actions: &[VirtualAction]) -> String {
        let fragments: Vec<String> = actions.iter().map(VirtualAction::to_xml).collect();
        self.render(&fragments)
    }
}

fn new_uid() -> String {
    Uuid::new_v4().to_string().to_uppercase()
}

/// 2001-01-01T00:00:00Z
pub fn reference_epoch() -> DateTime<Utc> {
    Utc.timestamp_opt(REFERENCE_EPOCH_OFFSET, 0)
        .single()
        .unwrap_or_default()
}
