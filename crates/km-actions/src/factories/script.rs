//! Script execution actions

use serde::{Deserialize, Serialize};

use km_condition::{ScriptBody, ScriptLanguage, INCLUDE_ALL_VARIABLES};
use km_core::PlistValue;

use crate::action::{require, ActionBody, VirtualAction};
use crate::error::ActionResult;
use crate::options::{FailureOptions, ScriptResult, TimeoutOptions};

/// Options for [`execute_script`]
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScriptOptions {
    pub language: ScriptLanguage,
    pub body: ScriptBody,
    pub result: ScriptResult,
    /// Pass every variable to the script
    pub include_all: bool,
    /// Variables passed to the script
    pub variables: Vec<String>,
    pub timeout: TimeoutOptions,
    pub failure: FailureOptions,
}

impl ScriptOptions {
    /// Inline shell script
    pub fn shell(text: impl Into<String>) -> Self {
        Self {
            body: ScriptBody::Text(text.into()),
            ..Self::default()
        }
    }

    /// Inline AppleScript
    pub fn applescript(text: impl Into<String>) -> Self {
        Self {
            language: ScriptLanguage::AppleScript,
            ..Self::shell(text)
        }
    }

    /// Inline JavaScript for Automation
    pub fn javascript(text: impl Into<String>) -> Self {
        Self {
            language: ScriptLanguage::JavaScript,
            ..Self::shell(text)
        }
    }

    fn included_variables(&self) -> Vec<String> {
        if self.include_all || self.variables.iter().any(|v| v == INCLUDE_ALL_VARIABLES) {
            return vec![INCLUDE_ALL_VARIABLES.to_string()];
        }
        self.variables
            .iter()
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
            .map(str::to_string)
            .collect()
    }
}

fn action_type(language: ScriptLanguage) -> &'static str {
    match language {
        ScriptLanguage::Shell => "ExecuteShellScript",
        ScriptLanguage::AppleScript => "ExecuteAppleScript",
        ScriptLanguage::JavaScript => "ExecuteJavaScriptForAutomation",
    }
}

/// Run a script, inline or from a file, and route its result
pub fn execute_script(options: &ScriptOptions) -> ActionResult<VirtualAction> {
    let action = action_type(options.language);
    options.result.validate(action)?;

    let (path, text, use_text) = match &options.body {
        ScriptBody::Text(text) => {
            require(action, "text", text)?;
            ("", text.as_str(), true)
        }
        ScriptBody::File(path) => {
            require(action, "path", path)?;
            (path.trim(), "", false)
        }
    };

    let body = ActionBody::new()
        .set("HonourFailureSettings", true)
        .set("IncludedVariables", PlistValue::string_array(options.included_variables()))
        .set("Path", path)
        .set("Text", text)
        .set("UseText", use_text);
    Ok(options
        .result
        .write(body)
        .apply(|d| {
            options.timeout.write(d);
            options.failure.write(d);
        })
        .build(action))
}
