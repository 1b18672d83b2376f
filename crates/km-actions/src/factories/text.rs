//! Text, variable and clipboard actions

use serde::{Deserialize, Serialize};

use km_core::{PlistValue, StyledText, TokenTable};

use crate::action::{require, require_variable, ActionBody, VirtualAction};
use crate::error::{ActionError, ActionResult};
use crate::options::TimeoutOptions;

km_core::engine_keyword! {
    /// How inserted text reaches the user
    #[derive(Default)]
    pub enum InsertMode {
        #[default]
        ByTyping => "ByTyping",
        ByPasting => "ByPasting",
        ByPastingStyles => "ByPastingStyles",
        DisplayWindow => "DisplayWindow",
        DisplayBriefly => "DisplayBriefly",
        DisplayLarge => "DisplayLarge",
    }
}

/// Options for [`insert_text`]
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InsertTextOptions {
    pub text: String,
    pub mode: InsertMode,
    /// Styled body as RTF; only valid with [`InsertMode::ByPastingStyles`]
    pub rtf: Option<String>,
    /// Expand `{{Name}}` placeholders before rendering
    pub expand_placeholders: bool,
    pub timeout: TimeoutOptions,
}

/// Type, paste or display text
pub fn insert_text(options: &InsertTextOptions) -> ActionResult<VirtualAction> {
    const ACTION: &str = "InsertText";

    let text = if options.expand_placeholders {
        TokenTable::global().substitute(&options.text)
    } else {
        options.text.clone()
    };

    let styled = match (options.mode, &options.rtf) {
        (InsertMode::ByPastingStyles, Some(rtf)) => Some(StyledText::from_rtf(rtf.as_str())),
        (InsertMode::ByPastingStyles, None) => Some(StyledText::from_plain(&text)),
        (_, Some(_)) => {
            return Err(ActionError::invalid(
                ACTION,
                format!("styled text requires ByPastingStyles, not {}", options.mode),
            ))
        }
        (_, None) => None,
    };

    let body = ActionBody::new().set("Action", options.mode.as_str());
    let body = match styled {
        Some(styled) => body
            .set("StyledText", PlistValue::Data(styled.to_base64()))
            .set("Text", styled.plain()),
        None => body.set("Text", text),
    };
    Ok(body
        .apply(|d| options.timeout.write(d))
        .build(ACTION))
}

/// Options for [`set_variable_to_text`]
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SetVariableOptions {
    pub variable: String,
    pub text: String,
    /// Expand `{{Name}}` placeholders before rendering
    pub expand_placeholders: bool,
}

/// Store text in a variable
pub fn set_variable_to_text(options: &SetVariableOptions) -> ActionResult<VirtualAction> {
    require_variable("SetVariableToText", &options.variable)?;
    let text = if options.expand_placeholders {
        TokenTable::global().substitute(&options.text)
    } else {
        options.text.clone()
    };
    Ok(ActionBody::new()
        .set("Text", text)
        .set("Variable", options.variable.trim())
        .build("SetVariableToText"))
}

/// Remove a variable
pub fn delete_variable(variable: &str) -> ActionResult<VirtualAction> {
    require_variable("DeleteVariable", variable)?;
    Ok(ActionBody::new()
        .set("Variable", variable.trim())
        .build("DeleteVariable"))
}

/// Options for [`set_variable_to_calculation`]
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CalculationOptions {
    pub variable: String,
    pub expression: String,
    /// Number format such as `0.00`
    pub format: Option<String>,
}

/// Store the result of a calculation in a variable
pub fn set_variable_to_calculation(options: &CalculationOptions) -> ActionResult<VirtualAction> {
    const ACTION: &str = "SetVariableToCalculation";
    require_variable(ACTION, &options.variable)?;
    require(ACTION, "expression", &options.expression)?;

    let format = options.format.as_deref().filter(|f| !f.trim().is_empty());
    Ok(ActionBody::new()
        .set_opt("Format", format)
        .set("Text", options.expression.as_str())
        .flag("UseFormat", format.is_some(), false)
        .set("Variable", options.variable.trim())
        .build(ACTION))
}

/// Options for [`set_clipboard_to_text`]
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClipboardTextOptions {
    pub text: String,
    /// Styled body as RTF
    pub rtf: Option<String>,
}

/// Put text, optionally styled, on the clipboard
pub fn set_clipboard_to_text(options: &ClipboardTextOptions) -> VirtualAction {
    let body = ActionBody::new().set("JustDisplay", false);
    let body = match &options.rtf {
        Some(rtf) => {
            let styled = StyledText::from_rtf(rtf.as_str());
            body.set("StyledText", PlistValue::Data(styled.to_base64()))
                .set("Text", styled.plain())
        }
        None => body.set("Text", options.text.as_str()),
    };
    body.build("SetClipboardToText")
}

/// Text a search-and-replace operates on
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SearchTarget {
    Variable { name: String },
    Clipboard,
}

km_core::engine_keyword! {
    /// How the search string is interpreted
    #[derive(Default)]
    pub enum SearchMode {
        #[default]
        IgnoreCase => "IgnoreCase",
        CaseSensitive => "CaseSensitive",
        RegularExpression => "RegEx",
    }
}

/// Options for [`search_replace`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchReplaceOptions {
    pub target: SearchTarget,
    pub search: String,
    #[serde(default)]
    pub replace: String,
    #[serde(default)]
    pub mode: SearchMode,
    /// Replace only the first occurrence
    #[serde(default)]
    pub first_only: bool,
}

/// Replace text in a variable or the clipboard
pub fn search_replace(options: &SearchReplaceOptions) -> ActionResult<VirtualAction> {
    const ACTION: &str = "SearchReplace";
    if options.search.is_empty() {
        return Err(ActionError::MissingField {
            action: ACTION,
            field: "search",
        });
    }
    let body = match &options.target {
        SearchTarget::Variable { name } => {
            require_variable(ACTION, name)?;
            ActionBody::new()
                .set("Source", "Variable")
                .set("Variable", name.trim())
        }
        SearchTarget::Clipboard => ActionBody::new().set("Source", "Clipboard"),
    };
    Ok(body
        .set("Replace", options.replace.as_str())
        .set("Search", options.search.as_str())
        .set("Where", options.mode.as_str())
        .set("Which", if options.first_only { "First" } else { "All" })
        .build(ACTION))
}

/// Options for [`notification`]
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationOptions {
    pub title: String,
    pub subtitle: String,
    pub text: String,
    /// System sound name; empty for silence
    pub sound: String,
}

/// Post a user notification
pub fn notification(options: &NotificationOptions) -> ActionResult<VirtualAction> {
    if options.title.trim().is_empty() && options.text.trim().is_empty() {
        return Err(ActionError::invalid(
            "Notification",
            "a notification needs a title or text",
        ));
    }
    Ok(ActionBody::new()
        .set("SoundName", options.sound.as_str())
        .set("SubTitle", options.subtitle.as_str())
        .set("Text", options.text.as_str())
        .set("Title", options.title.as_str())
        .build("Notification"))
}

km_core::engine_keyword! {
    /// Edit menu command
    #[derive(Default)]
    pub enum EditCommand {
        #[default]
        Copy => "Copy",
        Cut => "Cut",
        Paste => "Paste",
        SelectAll => "SelectAll",
        Undo => "Undo",
        Redo => "Redo",
    }
}

/// Run an edit command in the front application
pub fn cut_copy_paste(command: EditCommand, timeout: &TimeoutOptions) -> VirtualAction {
    ActionBody::new()
        .set("Action", command.as_str())
        .set("IsDisclosed", false)
        .apply(|d| timeout.write(d))
        .build("CutCopyPaste")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_by_typing() {
        let action = insert_text(&InsertTextOptions {
            text: "hello".into(),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(action.get("Action").and_then(|v| v.as_str()), Some("ByTyping"));
        assert!(action.get("StyledText").is_none());
    }

    #[test]
    fn test_insert_styled_keeps_mirror_in_sync() {
        let action = insert_text(&InsertTextOptions {
            text: "line one\nline two".into(),
            mode: InsertMode::ByPastingStyles,
            ..Default::default()
        })
        .unwrap();
        let Some(PlistValue::Data(payload)) = action.get("StyledText") else {
            panic!("missing styled text");
        };
        let styled = StyledText::from_base64(payload).unwrap();
        assert_eq!(action.get("Text").and_then(|v| v.as_str()), Some(styled.plain()));
        assert_eq!(styled.plain(), "line one\nline two");
    }

    #[test]
    fn test_rtf_rejected_for_plain_modes() {
        let result = insert_text(&InsertTextOptions {
            text: "x".into(),
            mode: InsertMode::DisplayWindow,
            rtf: Some("{\\rtf1 x}".into()),
            ..Default::default()
        });
        assert!(matches!(result, Err(ActionError::InvalidOptions { .. })));
    }

    #[test]
    fn test_placeholders_expand_on_request() {
        let action = set_variable_to_text(&SetVariableOptions {
            variable: "Title".into(),
            text: "{{FrontWindowName}}".into(),
            expand_placeholders: true,
        })
        .unwrap();
        assert_eq!(
            action.get("Text").and_then(|v| v.as_str()),
            Some("%FrontWindowName%")
        );
    }

    #[test]
    fn test_calculation_format_flag() {
        let plain = set_variable_to_calculation(&CalculationOptions {
            variable: "Total".into(),
            expression: "1 + 2".into(),
            format: None,
        })
        .unwrap();
        assert!(plain.get("UseFormat").is_none());
        assert!(plain.get("Format").is_none());

        let formatted = set_variable_to_calculation(&CalculationOptions {
            variable: "Total".into(),
            expression: "1 + 2".into(),
            format: Some("0.00".into()),
        })
        .unwrap();
        assert_eq!(formatted.get("UseFormat"), Some(&PlistValue::Bool(true)));
    }

    #[test]
    fn test_search_replace_requires_search() {
        let options = SearchReplaceOptions {
            target: SearchTarget::Clipboard,
            search: String::new(),
            replace: "x".into(),
            mode: SearchMode::default(),
            first_only: false,
        };
        assert!(search_replace(&options).is_err());
    }

    #[test]
    fn test_delete_variable_validates_name() {
        assert!(delete_variable("Scratch").is_ok());
        assert!(delete_variable("").is_err());
    }
}
