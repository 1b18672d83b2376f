//! The virtual action type
//!
//! A [`VirtualAction`] is built once by a factory and then only rendered.
//! It holds the action's discriminant and body; the volatile `ActionUID`
//! is assigned at construction and ignored by equality.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::OnceLock;

use regex::Regex;

use km_core::key_order::{ACTION_DISCRIMINANT, ACTION_IDENTIFIER};
use km_core::{KeyContext, PlistDict, PlistValue};

use crate::error::{ActionError, ActionResult};

/// Modulus keeping identifiers in the range the engine itself produces
const UID_MODULUS: i64 = 100_000_000;

static LAST_UID: AtomicI64 = AtomicI64::new(0);

/// Next action identifier, derived from the clock and strictly increasing
pub fn next_action_uid() -> i64 {
    let candidate = chrono::Utc::now().timestamp_millis().rem_euclid(UID_MODULUS);
    let mut last = LAST_UID.load(Ordering::Relaxed);
    loop {
        let next = if candidate > last { candidate } else { last + 1 };
        match LAST_UID.compare_exchange_weak(last, next, Ordering::Relaxed, Ordering::Relaxed) {
            Ok(_) => return next,
            Err(current) => last = current,
        }
    }
}

/// One rendered-on-demand automation step
#[derive(Debug, Clone)]
pub struct VirtualAction {
    kind: &'static str,
    uid: i64,
    body: PlistDict,
}

impl VirtualAction {
    /// Wrap a body under the given `MacroActionType`
    pub fn new(kind: &'static str, body: PlistDict) -> Self {
        Self {
            kind,
            uid: next_action_uid(),
            body,
        }
    }

    /// The `MacroActionType` of this action
    pub fn kind(&self) -> &'static str {
        self.kind
    }

    /// The volatile identifier
    pub fn uid(&self) -> i64 {
        self.uid
    }

    /// Look up a body value
    pub fn get(&self, key: &str) -> Option<&PlistValue> {
        self.body.get(key)
    }

    /// The complete action dict
    pub fn to_dict(&self) -> PlistDict {
        let mut dict = PlistDict::new(KeyContext::Action);
        for (key, value) in self.body.ordered_entries() {
            dict.insert(key, value.clone());
        }
        dict.insert(ACTION_DISCRIMINANT, self.kind);
        dict.insert(ACTION_IDENTIFIER, self.uid);
        dict
    }

    /// Render the action dict at the given depth
    pub fn render(&self, depth: usize) -> String {
        self.to_dict().to_xml(depth)
    }

    /// Render the action as a standalone fragment
    pub fn to_xml(&self) -> String {
        self.render(0)
    }
}

/// Equality ignores the volatile identifier, including those of nested actions
impl PartialEq for VirtualAction {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && without_uids(&self.body) == without_uids(&other.body)
    }
}

fn without_uids(dict: &PlistDict) -> PlistDict {
    let mut out = PlistDict::new(dict.context());
    for (key, value) in dict.ordered_entries() {
        if key != ACTION_IDENTIFIER {
            out.insert(key, value_without_uids(value));
        }
    }
    out
}

fn value_without_uids(value: &PlistValue) -> PlistValue {
    match value {
        PlistValue::Dict(dict) => PlistValue::Dict(without_uids(dict)),
        PlistValue::Array(items) => PlistValue::Array(items.iter().map(value_without_uids).collect()),
        other => other.clone(),
    }
}

/// Body builder shared by the factories
#[derive(Debug)]
pub(crate) struct ActionBody {
    dict: PlistDict,
}

impl ActionBody {
    pub(crate) fn new() -> Self {
        Self {
            dict: PlistDict::new(KeyContext::Action),
        }
    }

    pub(crate) fn set(mut self, key: &str, value: impl Into<PlistValue>) -> Self {
        self.dict.insert(key, value);
        self
    }

    pub(crate) fn set_opt<V: Into<PlistValue>>(mut self, key: &str, value: Option<V>) -> Self {
        self.dict.insert_opt(key, value);
        self
    }

    /// Set a boolean only when it differs from the engine's implicit default
    pub(crate) fn flag(self, key: &str, value: bool, default: bool) -> Self {
        if value == default {
            self
        } else {
            self.set(key, value)
        }
    }

    pub(crate) fn actions(self, key: &str, actions: &[VirtualAction]) -> Self {
        let items: Vec<PlistValue> = actions.iter().map(|a| a.to_dict().into()).collect();
        self.set(key, items)
    }

    pub(crate) fn apply(mut self, f: impl FnOnce(&mut PlistDict)) -> Self {
        f(&mut self.dict);
        self
    }

    pub(crate) fn build(self, kind: &'static str) -> VirtualAction {
        VirtualAction::new(kind, self.dict)
    }
}

/// Fail when a required text option is blank
pub(crate) fn require(action: &'static str, field: &'static str, value: &str) -> ActionResult<()> {
    if value.trim().is_empty() {
        Err(ActionError::MissingField { action, field })
    } else {
        Ok(())
    }
}

fn variable_name_pattern() -> Result<&'static Regex, &'static regex::Error> {
    static PATTERN: OnceLock<Result<Regex, regex::Error>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"^(?:(?:Local|Instance)\s*)?[A-Za-z][A-Za-z0-9_ ]*$"))
        .as_ref()
}

/// Fail unless `name` is a usable engine variable name
pub(crate) fn require_variable(action: &'static str, name: &str) -> ActionResult<()> {
    require(action, "variable", name)?;
    let pattern = variable_name_pattern().map_err(|e| ActionError::invalid(action, e.to_string()))?;
    if pattern.is_match(name.trim()) {
        Ok(())
    } else {
        Err(ActionError::invalid(
            action,
            format!("'{name}' is not a valid variable name"),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uids_strictly_increase() {
        let first = next_action_uid();
        let second = next_action_uid();
        assert!(second > first);
        assert!(first < UID_MODULUS + 1_000_000);
    }

    #[test]
    fn test_equality_ignores_uid() {
        let a = ActionBody::new().set("Time", "1").build("Pause");
        let b = ActionBody::new().set("Time", "1").build("Pause");
        assert_ne!(a.uid(), b.uid());
        assert_eq!(a, b);
        assert_ne!(a, ActionBody::new().set("Time", "2").build("Pause"));
    }

    #[test]
    fn test_equality_ignores_nested_uids() {
        let container = || {
            let inner = ActionBody::new().set("Time", "1").build("Pause");
            ActionBody::new().actions("Actions", &[inner]).build("Group")
        };
        let a = container();
        let b = container();
        assert_ne!(a.to_xml(), b.to_xml());
        assert_eq!(a, b);

        let other_inner = ActionBody::new().set("Time", "2").build("Pause");
        let c = ActionBody::new().actions("Actions", &[other_inner]).build("Group");
        assert_ne!(a, c);
    }

    #[test]
    fn test_render_leads_with_type_and_uid() {
        let action = ActionBody::new().set("Time", "1").build("Pause");
        let xml = action.to_xml();
        let expected = format!(
            "<dict>\n\
             \t<key>MacroActionType</key>\n\
             \t<string>Pause</string>\n\
             \t<key>ActionUID</key>\n\
             \t<integer>{}</integer>\n\
             \t<key>Time</key>\n\
             \t<string>1</string>\n\
             </dict>\n",
            action.uid()
        );
        assert_eq!(xml, expected);
    }

    #[test]
    fn test_flag_omits_default() {
        let action = ActionBody::new()
            .flag("StopOnFailure", true, true)
            .flag("NotifyOnFailure", false, true)
            .build("Comment");
        assert!(action.get("StopOnFailure").is_none());
        assert_eq!(action.get("NotifyOnFailure"), Some(&PlistValue::Bool(false)));
    }

    #[test]
    fn test_variable_names() {
        assert!(require_variable("SetVariableToText", "Result Text").is_ok());
        assert!(require_variable("SetVariableToText", "Local_Count").is_ok());
        assert!(require_variable("SetVariableToText", "1st").is_err());
        assert!(require_variable("SetVariableToText", "bad%name").is_err());
        assert!(matches!(
            require_variable("SetVariableToText", " "),
            Err(ActionError::MissingField { .. })
        ));
    }
}
