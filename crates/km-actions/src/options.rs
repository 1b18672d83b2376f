//! Option records shared by several actions
//!
//! The engine omits flag keys that hold their implicit default. Each record
//! here knows its own defaults and writes only the keys that diverge.

use serde::{Deserialize, Serialize};

use km_core::PlistDict;

use crate::action::{require_variable, ActionBody};
use crate::error::{ActionError, ActionResult};

/// Timeout behaviour of a potentially blocking action
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutOptions {
    /// Abort the macro when the action times out
    pub aborts: bool,
    /// Notify on timeout; `None` follows `aborts`
    pub notify: Option<bool>,
    /// Timeout period in seconds (a calculation)
    pub period: Option<String>,
}

impl Default for TimeoutOptions {
    fn default() -> Self {
        Self {
            aborts: true,
            notify: None,
            period: None,
        }
    }
}

impl TimeoutOptions {
    /// Abort on timeout (the engine default)
    pub fn aborting() -> Self {
        Self::default()
    }

    /// Continue the macro on timeout
    pub fn continuing() -> Self {
        Self {
            aborts: false,
            ..Self::default()
        }
    }

    /// `TimeOutAbortsMacro` is always written; `NotifyOnTimeOut` only when it
    /// contradicts what `aborts` implies
    pub fn write(&self, dict: &mut PlistDict) {
        dict.insert("TimeOutAbortsMacro", self.aborts);
        if let Some(notify) = self.notify {
            if notify != self.aborts {
                dict.insert("NotifyOnTimeOut", notify);
            }
        }
        if let Some(period) = self.period.as_deref().filter(|p| !p.trim().is_empty()) {
            dict.insert("TimeOutPeriod", period);
        }
    }
}

/// Failure behaviour of an action that can fail
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FailureOptions {
    /// Abort the macro when the action fails
    pub stop_on_failure: bool,
    /// Notify when the action fails
    pub notify_on_failure: bool,
}

impl Default for FailureOptions {
    fn default() -> Self {
        Self {
            stop_on_failure: true,
            notify_on_failure: true,
        }
    }
}

impl FailureOptions {
    /// Each key is written only when explicitly disabled
    pub fn write(&self, dict: &mut PlistDict) {
        if !self.stop_on_failure {
            dict.insert("StopOnFailure", false);
        }
        if !self.notify_on_failure {
            dict.insert("NotifyOnFailure", false);
        }
    }
}

km_core::engine_keyword! {
    /// What an action does with the text it produces
    #[derive(Default)]
    pub enum DisplayKind {
        #[default]
        Ignore => "None",
        Window => "Window",
        Briefly => "Briefly",
        Large => "Large",
        Typing => "Typing",
        Pasting => "Pasting",
        Variable => "Variable",
        Clipboard => "Clipboard",
    }
}

/// Where an action's textual result goes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScriptResult {
    pub display: DisplayKind,
    /// Destination when `display` is [`DisplayKind::Variable`]
    pub variable: Option<String>,
    /// Trim whitespace from the result
    pub trim: bool,
    /// Include standard error in the result
    pub include_stderr: bool,
}

impl Default for ScriptResult {
    fn default() -> Self {
        Self {
            display: DisplayKind::Ignore,
            variable: None,
            trim: true,
            include_stderr: false,
        }
    }
}

impl ScriptResult {
    /// Save the result to a variable
    pub fn to_variable(name: impl Into<String>) -> Self {
        Self {
            display: DisplayKind::Variable,
            variable: Some(name.into()),
            ..Self::default()
        }
    }

    /// Check the destination fits the display kind
    pub fn validate(&self, action: &'static str) -> ActionResult<()> {
        match (self.display, self.variable.as_deref()) {
            (DisplayKind::Variable, Some(name)) => require_variable(action, name),
            (DisplayKind::Variable, None) => Err(ActionError::MissingField {
                action,
                field: "variable",
            }),
            (_, Some(_)) => Err(ActionError::invalid(
                action,
                format!("a variable is only used when saving to a variable, not {}", self.display),
            )),
            (_, None) => Ok(()),
        }
    }

    pub(crate) fn write(&self, body: ActionBody) -> ActionBody {
        body.set("DisplayKind", self.display.as_str())
            .flag("IncludeStdErr", self.include_stderr, false)
            .set("TrimResults", self.trim)
            .set("TrimResultsNew", self.trim)
            .set_opt("Variable", self.variable.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use km_core::PlistValue;

    fn written(timeout: TimeoutOptions) -> PlistDict {
        let mut dict = PlistDict::plain();
        timeout.write(&mut dict);
        dict
    }

    #[test]
    fn test_timeout_abort_always_written() {
        let dict = written(TimeoutOptions::default());
        assert_eq!(dict.get("TimeOutAbortsMacro"), Some(&PlistValue::Bool(true)));
        assert!(!dict.contains_key("NotifyOnTimeOut"));

        let dict = written(TimeoutOptions::continuing());
        assert_eq!(dict.get("TimeOutAbortsMacro"), Some(&PlistValue::Bool(false)));
    }

    #[test]
    fn test_notify_written_only_when_contradicting() {
        let agreeing = written(TimeoutOptions {
            aborts: true,
            notify: Some(true),
            period: None,
        });
        assert!(!agreeing.contains_key("NotifyOnTimeOut"));

        let contradicting = written(TimeoutOptions {
            aborts: true,
            notify: Some(false),
            period: None,
        });
        assert_eq!(contradicting.get("NotifyOnTimeOut"), Some(&PlistValue::Bool(false)));

        let quiet_continue = written(TimeoutOptions {
            aborts: false,
            notify: Some(true),
            period: Some("30".into()),
        });
        assert_eq!(quiet_continue.get("NotifyOnTimeOut"), Some(&PlistValue::Bool(true)));
        assert_eq!(quiet_continue.get("TimeOutPeriod").and_then(|v| v.as_str()), Some("30"));
    }

    #[test]
    fn test_failure_flags_written_only_when_disabled() {
        let mut dict = PlistDict::plain();
        FailureOptions::default().write(&mut dict);
        assert!(dict.is_empty());

        let mut dict = PlistDict::plain();
        FailureOptions {
            stop_on_failure: false,
            notify_on_failure: true,
        }
        .write(&mut dict);
        assert_eq!(dict.get("StopOnFailure"), Some(&PlistValue::Bool(false)));
        assert!(!dict.contains_key("NotifyOnFailure"));
    }

    #[test]
    fn test_script_result_validation() {
        assert!(ScriptResult::to_variable("Output").validate("ExecuteShellScript").is_ok());
        let missing = ScriptResult {
            display: DisplayKind::Variable,
            ..Default::default()
        };
        assert!(missing.validate("ExecuteShellScript").is_err());
        let stray = ScriptResult {
            variable: Some("Output".into()),
            ..Default::default()
        };
        assert!(stray.validate("ExecuteShellScript").is_err());
    }
}
