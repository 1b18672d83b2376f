//! Script condition

use serde::{Deserialize, Serialize};
use tracing::debug;

use km_core::{PlistDict, PlistValue};

use crate::condition::{ConditionKind, ConditionRules};

/// Variable-inclusion entry meaning "pass every variable to the script"
pub const INCLUDE_ALL_VARIABLES: &str = "9999";

km_core::engine_keyword! {
    /// Interpreter a script runs under
    #[derive(Default)]
    pub enum ScriptLanguage {
        #[default]
        Shell => "Shell",
        AppleScript => "AppleScript",
        JavaScript => "JavaScript",
    }
}

km_core::engine_keyword! {
    /// What the condition tests about the script run
    #[derive(Default)]
    pub enum ScriptOutcome {
        #[default]
        Succeeds => "ReturnsSuccess",
        Fails => "ReturnsFailure",
        ResultIs => "ResultIs",
        ResultContains => "ResultContains",
        ResultMatches => "ResultMatches",
    }
}

impl ScriptOutcome {
    /// Whether the outcome compares the script's output
    pub fn compares_result(&self) -> bool {
        !matches!(self, ScriptOutcome::Succeeds | ScriptOutcome::Fails)
    }
}

/// Script body: inline text or a file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScriptBody {
    Text(String),
    File(String),
}

impl Default for ScriptBody {
    fn default() -> Self {
        ScriptBody::Text(String::new())
    }
}

/// Runs a script and tests its outcome
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScriptCondition {
    pub language: ScriptLanguage,
    pub body: ScriptBody,
    pub outcome: ScriptOutcome,
    /// Value compared with the output for result outcomes
    pub result: String,
    /// Pass every variable to the script
    pub include_all: bool,
    /// Variables passed to the script
    pub variables: Vec<String>,
}

impl ScriptCondition {
    /// Engine spelling of the language and body kind
    pub fn source_type(&self) -> String {
        let kind = match self.body {
            ScriptBody::Text(_) => "Text",
            ScriptBody::File(_) => "Path",
        };
        format!("{}Script{}", self.language.as_str().trim_end_matches("Script"), kind)
    }
}

impl ConditionRules for ScriptCondition {
    const KIND: ConditionKind = ConditionKind::Script;

    fn normalize(mut self) -> Self {
        let sentinel_listed = self.variables.iter().any(|v| v == INCLUDE_ALL_VARIABLES);
        if self.include_all || sentinel_listed {
            if self.variables.len() > 1 || !sentinel_listed {
                debug!(
                    "Replacing {} listed variables with the include-all sentinel",
                    self.variables.len()
                );
            }
            self.include_all = true;
            self.variables = vec![INCLUDE_ALL_VARIABLES.to_string()];
        } else {
            self.variables.retain(|v| !v.trim().is_empty());
        }
        if !self.outcome.compares_result() {
            self.result.clear();
        }
        self
    }

    fn write_fields(&self, dict: &mut PlistDict) {
        dict.insert(
            "IncludedVariables",
            PlistValue::string_array(self.variables.iter().cloned()),
        );
        dict.insert("ScriptConditionSourceType", self.source_type());
        dict.insert("ScriptConditionType", self.outcome.as_str());
        if self.outcome.compares_result() {
            dict.insert("ScriptResult", self.result.as_str());
        }
        match &self.body {
            ScriptBody::Text(text) => dict.insert("ScriptText", text.as_str()),
            ScriptBody::File(path) => dict.insert("Path", path.as_str()),
        }
    }
}
