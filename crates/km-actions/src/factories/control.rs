//! Control-flow and macro-structure actions

use serde::{Deserialize, Serialize};

use km_condition::ConditionList;
use km_core::{PlistDict, PlistValue, StyledText};

use crate::action::{require, require_variable, ActionBody, VirtualAction};
use crate::error::{ActionError, ActionResult};
use crate::options::TimeoutOptions;

/// Options for [`pause`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PauseOptions {
    /// Seconds to wait (a calculation)
    pub seconds: String,
    pub timeout: TimeoutOptions,
}

impl Default for PauseOptions {
    fn default() -> Self {
        Self {
            seconds: "1".to_string(),
            timeout: TimeoutOptions::default(),
        }
    }
}

/// Wait for a fixed time
pub fn pause(options: &PauseOptions) -> ActionResult<VirtualAction> {
    require("Pause", "seconds", &options.seconds)?;
    Ok(ActionBody::new()
        .set("Time", options.seconds.trim())
        .apply(|d| options.timeout.write(d))
        .build("Pause"))
}

/// Options for [`comment`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommentOptions {
    pub title: String,
    /// Plain text body, used when no RTF is given
    pub text: String,
    /// Styled body as an RTF document
    pub rtf: Option<String>,
}

impl Default for CommentOptions {
    fn default() -> Self {
        Self {
            title: "Comment".to_string(),
            text: String::new(),
            rtf: None,
        }
    }
}

/// A titled, styled note that does nothing when run
pub fn comment(options: &CommentOptions) -> ActionResult<VirtualAction> {
    require("Comment", "title", &options.title)?;
    let styled = match &options.rtf {
        Some(rtf) => StyledText::from_rtf(rtf.as_str()),
        None => StyledText::from_plain(&options.text),
    };
    Ok(ActionBody::new()
        .set("StyledText", PlistValue::Data(styled.to_base64()))
        .set("Text", styled.plain())
        .set("Title", options.title.as_str())
        .build("Comment"))
}

/// Stop the macro and return `text` as its result
pub fn return_result(text: &str) -> VirtualAction {
    ActionBody::new().set("Text", text).build("Return")
}

km_core::engine_keyword! {
    /// What a cancel action stops
    #[derive(Default)]
    pub enum CancelScope {
        #[default]
        ThisMacro => "CancelThisMacro",
        JustThisMacro => "CancelJustThisMacro",
        AllMacros => "CancelAllMacros",
        AllOtherMacros => "CancelAllOtherMacros",
        BreakFromLoop => "BreakFromLoop",
        RetryThisLoop => "RetryThisLoop",
    }
}

/// Cancel macros or leave a loop
pub fn cancel(scope: CancelScope) -> VirtualAction {
    ActionBody::new().set("CancelType", scope.as_str()).build("Cancel")
}

/// Options for [`execute_macro`]
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecuteMacroOptions {
    pub macro_uid: String,
    /// Trigger value passed to the macro
    pub parameter: Option<String>,
    /// Continue without waiting for the macro to finish
    pub asynchronous: bool,
    pub timeout: TimeoutOptions,
}

/// Run another macro by UID
pub fn execute_macro(options: &ExecuteMacroOptions) -> ActionResult<VirtualAction> {
    require("ExecuteMacro", "macro_uid", &options.macro_uid)?;
    Ok(ActionBody::new()
        .flag("Asynchronously", options.asynchronous, false)
        .set("MacroUID", options.macro_uid.trim())
        .set("Parameter", options.parameter.as_deref().unwrap_or_default())
        .set("UseParameter", options.parameter.is_some())
        .apply(|d| options.timeout.write(d))
        .build("ExecuteMacro"))
}

/// Options for [`group`]
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GroupOptions {
    /// Title shown instead of "Group"
    pub name: Option<String>,
    pub actions: Vec<VirtualAction>,
    pub timeout: TimeoutOptions,
}

/// Run actions as a single collapsible block
pub fn group(options: &GroupOptions) -> VirtualAction {
    ActionBody::new()
        .set_opt(
            "ActionName",
            options.name.as_deref().filter(|n| !n.trim().is_empty()),
        )
        .actions("Actions", &options.actions)
        .apply(|d| options.timeout.write(d))
        .build("Group")
}

/// Options for [`if_then_else`]
#[derive(Debug, Clone, PartialEq, Default)]
pub struct IfThenElseOptions {
    pub conditions: ConditionList,
    pub then_actions: Vec<VirtualAction>,
    pub else_actions: Vec<VirtualAction>,
    pub timeout: TimeoutOptions,
}

/// Branch on a condition list
pub fn if_then_else(options: &IfThenElseOptions) -> VirtualAction {
    ActionBody::new()
        .set("Conditions", options.conditions.to_dict())
        .actions("ElseActions", &options.else_actions)
        .actions("ThenActions", &options.then_actions)
        .apply(|d| options.timeout.write(d))
        .build("IfThenElse")
}

/// Options for [`until`] and [`while_loop`]
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LoopOptions {
    pub conditions: ConditionList,
    pub actions: Vec<VirtualAction>,
    pub timeout: TimeoutOptions,
}

fn conditional_loop(kind: &'static str, options: &LoopOptions) -> ActionResult<VirtualAction> {
    if options.conditions.conditions.is_empty() {
        return Err(ActionError::MissingField {
            action: kind,
            field: "conditions",
        });
    }
    Ok(ActionBody::new()
        .actions("Actions", &options.actions)
        .set("Conditions", options.conditions.to_dict())
        .apply(|d| options.timeout.write(d))
        .build(kind))
}

/// Repeat actions until the conditions hold
pub fn until(options: &LoopOptions) -> ActionResult<VirtualAction> {
    conditional_loop("Until", options)
}

/// Repeat actions while the conditions hold
pub fn while_loop(options: &LoopOptions) -> ActionResult<VirtualAction> {
    conditional_loop("While", options)
}

/// What a for-each loop iterates over
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ForCollection {
    /// Each line of a token-expanded text
    Lines { text: String },
    /// A counted range; each bound is a calculation
    Range {
        start: String,
        end: String,
        step: String,
    },
}

impl ForCollection {
    fn to_dict(&self) -> PlistDict {
        match self {
            ForCollection::Lines { text } => PlistDict::plain()
                .with("Text", text.as_str())
                .with("Type", "Lines"),
            ForCollection::Range { start, end, step } => PlistDict::plain()
                .with("End", end.as_str())
                .with("Start", start.as_str())
                .with("Step", step.as_str())
                .with("Type", "Range"),
        }
    }
}

/// Options for [`for_each`]
#[derive(Debug, Clone, PartialEq)]
pub struct ForEachOptions {
    pub variable: String,
    pub collection: ForCollection,
    pub actions: Vec<VirtualAction>,
    pub timeout: TimeoutOptions,
}

/// Run actions once per item of a collection
pub fn for_each(options: &ForEachOptions) -> ActionResult<VirtualAction> {
    require_variable("For", &options.variable)?;
    if let ForCollection::Range { start, end, step } = &options.collection {
        require("For", "start", start)?;
        require("For", "end", end)?;
        if step.trim() == "0" {
            return Err(ActionError::invalid("For", "a range step of 0 never terminates"));
        }
    }
    let collections = vec![PlistValue::Dict(options.collection.to_dict())];
    Ok(ActionBody::new()
        .actions("Actions", &options.actions)
        .set("Collections", collections)
        .set("Variable", options.variable.trim())
        .apply(|d| options.timeout.write(d))
        .build("For"))
}

/// The value a switch tests
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SwitchSource {
    Variable { name: String },
    Text { text: String },
    Calculation { expression: String },
    Clipboard,
}

km_core::engine_keyword! {
    /// How a switch case matches the tested value
    #[derive(Default)]
    pub enum CaseTest {
        #[default]
        Is => "Is",
        IsNot => "IsNot",
        Contains => "Contains",
        DoesNotContain => "DoesNotContain",
        Matches => "Matches",
        DoesNotMatch => "DoesNotMatch",
        Otherwise => "Otherwise",
    }
}

/// One branch of a switch
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SwitchCase {
    pub test: CaseTest,
    pub value: String,
    pub actions: Vec<VirtualAction>,
}

impl SwitchCase {
    fn to_dict(&self) -> PlistDict {
        let actions: Vec<PlistValue> = self.actions.iter().map(|a| a.to_dict().into()).collect();
        let value = match self.test {
            CaseTest::Otherwise => "",
            _ => self.value.as_str(),
        };
        PlistDict::plain()
            .with("Actions", actions)
            .with("ConditionType", self.test.as_str())
            .with("TestValue", value)
    }
}

/// Options for [`switch`]
#[derive(Debug, Clone, PartialEq)]
pub struct SwitchOptions {
    pub source: SwitchSource,
    pub cases: Vec<SwitchCase>,
    pub timeout: TimeoutOptions,
}

/// Run the first case whose test matches
pub fn switch(options: &SwitchOptions) -> ActionResult<VirtualAction> {
    if options.cases.is_empty() {
        return Err(ActionError::MissingField {
            action: "Switch",
            field: "cases",
        });
    }
    if let Some(position) = options.cases.iter().position(|c| c.test == CaseTest::Otherwise) {
        if position + 1 != options.cases.len() {
            return Err(ActionError::invalid("Switch", "an otherwise case must come last"));
        }
    }

    let body = ActionBody::new();
    let body = match &options.source {
        SwitchSource::Variable { name } => {
            require_variable("Switch", name)?;
            body.set("Source", "Variable").set("Variable", name.trim())
        }
        SwitchSource::Text { text } => body.set("Source", "Text").set("Text", text.as_str()),
        SwitchSource::Calculation { expression } => {
            require("Switch", "expression", expression)?;
            body.set("Source", "Calculation")
                .set("Calculation", expression.as_str())
        }
        SwitchSource::Clipboard => body.set("Source", "Clipboard"),
    };

    let cases: Vec<PlistValue> = options.cases.iter().map(|c| c.to_dict().into()).collect();
    Ok(body
        .set("CaseEntries", cases)
        .apply(|d| options.timeout.write(d))
        .build("Switch"))
}

/// Options for [`pause_until`]
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PauseUntilOptions {
    pub conditions: ConditionList,
    pub timeout: TimeoutOptions,
}

/// Wait until the conditions hold
pub fn pause_until(options: &PauseUntilOptions) -> ActionResult<VirtualAction> {
    if options.conditions.conditions.is_empty() {
        return Err(ActionError::MissingField {
            action: "PauseUntil",
            field: "conditions",
        });
    }
    Ok(ActionBody::new()
        .set("Conditions", options.conditions.to_dict())
        .apply(|d| options.timeout.write(d))
        .build("PauseUntil"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use km_condition::{CalculationCondition, Condition};

    fn calc(expr: &str) -> ConditionList {
        ConditionList::single(Condition::Calculation(CalculationCondition::new(expr)))
    }

    #[test]
    fn test_pause_keys() {
        let action = pause(&PauseOptions::default()).unwrap();
        assert_eq!(action.kind(), "Pause");
        assert_eq!(action.get("Time").and_then(|v| v.as_str()), Some("1"));
        assert_eq!(action.get("TimeOutAbortsMacro"), Some(&PlistValue::Bool(true)));
    }

    #[test]
    fn test_pause_requires_time() {
        let options = PauseOptions {
            seconds: " ".into(),
            ..Default::default()
        };
        assert!(matches!(pause(&options), Err(ActionError::MissingField { .. })));
    }

    #[test]
    fn test_comment_mirror_matches_styled_text() {
        let action = comment(&CommentOptions {
            title: "Note".into(),
            text: "Remember {this}".into(),
            rtf: None,
        })
        .unwrap();
        assert_eq!(action.get("Text").and_then(|v| v.as_str()), Some("Remember {this}"));
        let Some(PlistValue::Data(payload)) = action.get("StyledText") else {
            panic!("StyledText is not data");
        };
        let decoded = StyledText::from_base64(payload).unwrap();
        assert_eq!(decoded.plain(), "Remember {this}");
    }

    #[test]
    fn test_execute_macro_flags() {
        let sync = execute_macro(&ExecuteMacroOptions {
            macro_uid: "ABC".into(),
            ..Default::default()
        })
        .unwrap();
        assert!(sync.get("Asynchronously").is_none());
        assert_eq!(sync.get("UseParameter"), Some(&PlistValue::Bool(false)));

        let background = execute_macro(&ExecuteMacroOptions {
            macro_uid: "ABC".into(),
            parameter: Some("go".into()),
            asynchronous: true,
            ..Default::default()
        })
        .unwrap();
        assert_eq!(background.get("Asynchronously"), Some(&PlistValue::Bool(true)));
        assert_eq!(background.get("Parameter").and_then(|v| v.as_str()), Some("go"));
    }

    #[test]
    fn test_if_then_else_nests_actions() {
        let action = if_then_else(&IfThenElseOptions {
            conditions: calc("1"),
            then_actions: vec![return_result("yes")],
            else_actions: vec![],
            ..Default::default()
        });
        let xml = action.to_xml();
        assert!(xml.contains("\t<key>ElseActions</key>\n\t<array/>\n"));
        assert!(xml.contains("\t<key>ThenActions</key>\n\t<array>\n\t\t<dict>\n\t\t\t<key>MacroActionType</key>\n\t\t\t<string>Return</string>\n"));
        assert!(xml.contains("<key>ConditionListMatch</key>"));
    }

    #[test]
    fn test_loops_require_conditions() {
        assert!(while_loop(&LoopOptions::default()).is_err());
        let action = until(&LoopOptions {
            conditions: calc("Count > 3"),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(action.kind(), "Until");
    }

    #[test]
    fn test_for_each_range() {
        let action = for_each(&ForEachOptions {
            variable: "Index".into(),
            collection: ForCollection::Range {
                start: "1".into(),
                end: "10".into(),
                step: "1".into(),
            },
            actions: vec![],
            timeout: TimeoutOptions::default(),
        })
        .unwrap();
        assert!(action.to_xml().contains("<string>Range</string>"));

        let endless = for_each(&ForEachOptions {
            variable: "Index".into(),
            collection: ForCollection::Range {
                start: "1".into(),
                end: "10".into(),
                step: "0".into(),
            },
            actions: vec![],
            timeout: TimeoutOptions::default(),
        });
        assert!(endless.is_err());
    }

    #[test]
    fn test_switch_otherwise_must_be_last() {
        let options = SwitchOptions {
            source: SwitchSource::Clipboard,
            cases: vec![
                SwitchCase {
                    test: CaseTest::Otherwise,
                    ..Default::default()
                },
                SwitchCase {
                    test: CaseTest::Is,
                    value: "a".into(),
                    actions: vec![],
                },
            ],
            timeout: TimeoutOptions::default(),
        };
        assert!(switch(&options).is_err());
    }

    #[test]
    fn test_switch_on_variable() {
        let action = switch(&SwitchOptions {
            source: SwitchSource::Variable {
                name: "Mode".into(),
            },
            cases: vec![SwitchCase {
                test: CaseTest::Contains,
                value: "work".into(),
                actions: vec![cancel(CancelScope::ThisMacro)],
            }],
            timeout: TimeoutOptions::default(),
        })
        .unwrap();
        assert_eq!(action.get("Source").and_then(|v| v.as_str()), Some("Variable"));
        assert!(action.to_xml().contains("<string>CancelThisMacro</string>"));
    }

    #[test]
    fn test_pause_until_requires_conditions() {
        assert!(pause_until(&PauseUntilOptions::default()).is_err());
    }
}
