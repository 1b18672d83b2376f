//! User prompts

use serde::{Deserialize, Serialize};

use km_core::{PlistDict, PlistValue};

use crate::action::{require_variable, ActionBody, VirtualAction};
use crate::error::{ActionError, ActionResult};

/// One button of a user prompt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptButton {
    pub label: String,
    /// Pressing the button cancels the macro
    #[serde(default)]
    pub cancels: bool,
}

impl PromptButton {
    pub fn new(label: impl Into<String>, cancels: bool) -> Self {
        Self {
            label: label.into(),
            cancels,
        }
    }

    fn to_dict(&self) -> PlistDict {
        PlistDict::plain()
            .with("Button", self.label.as_str())
            .with("Cancel", self.cancels)
    }
}

/// A variable the user is asked to fill in
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptField {
    pub variable: String,
    #[serde(default)]
    pub default: String,
}

/// Options for [`prompt_for_input`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptOptions {
    pub title: String,
    pub prompt: String,
    pub fields: Vec<PromptField>,
    pub buttons: Vec<PromptButton>,
}

impl Default for PromptOptions {
    fn default() -> Self {
        Self {
            title: "Input".to_string(),
            prompt: String::new(),
            fields: Vec::new(),
            buttons: vec![PromptButton::new("OK", false), PromptButton::new("Cancel", true)],
        }
    }
}

/// Ask the user for one or more values
pub fn prompt_for_input(options: &PromptOptions) -> ActionResult<VirtualAction> {
    const ACTION: &str = "PromptForUserInput";
    if options.buttons.is_empty() {
        return Err(ActionError::MissingField {
            action: ACTION,
            field: "buttons",
        });
    }
    for field in &options.fields {
        require_variable(ACTION, &field.variable)?;
    }

    let buttons: Vec<PlistValue> = options.buttons.iter().map(|b| b.to_dict().into()).collect();
    let fields: Vec<PlistValue> = options
        .fields
        .iter()
        .map(|f| {
            PlistDict::plain()
                .with("Default", f.default.as_str())
                .with("Variable", f.variable.trim())
                .into()
        })
        .collect();

    Ok(ActionBody::new()
        .set("Buttons", buttons)
        .set("Prompt", options.prompt.as_str())
        .set("Title", options.title.as_str())
        .set("Variables", fields)
        .build(ACTION))
}

/// Options for [`prompt_with_list`]
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ListPromptOptions {
    pub title: String,
    pub items: Vec<String>,
}

/// Let the user pick one item from a list
pub fn prompt_with_list(options: &ListPromptOptions) -> ActionResult<VirtualAction> {
    if options.items.iter().all(|i| i.trim().is_empty()) {
        return Err(ActionError::MissingField {
            action: "PromptWithList",
            field: "items",
        });
    }
    Ok(ActionBody::new()
        .set("Source", "Text")
        .set("Text", options.items.join("\n"))
        .set("Title", options.title.as_str())
        .build("PromptWithList"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_default_buttons() {
        let action = prompt_for_input(&PromptOptions {
            fields: vec![PromptField {
                variable: "Name".into(),
                default: "Ada".into(),
            }],
            ..Default::default()
        })
        .unwrap();
        let xml = action.to_xml();
        assert!(xml.contains("<string>OK</string>"));
        assert!(xml.contains("\t\t\t<key>Cancel</key>\n\t\t\t<true/>\n"));
        assert!(xml.contains("\t\t\t<key>Default</key>\n\t\t\t<string>Ada</string>\n"));
    }

    #[test]
    fn test_prompt_rejects_bad_variable() {
        let options = PromptOptions {
            fields: vec![PromptField {
                variable: "9lives".into(),
                default: String::new(),
            }],
            ..Default::default()
        };
        assert!(prompt_for_input(&options).is_err());
    }

    #[test]
    fn test_list_prompt_joins_items() {
        let action = prompt_with_list(&ListPromptOptions {
            title: "Pick".into(),
            items: vec!["One".into(), "Two".into()],
        })
        .unwrap();
        assert_eq!(action.get("Text").and_then(|v| v.as_str()), Some("One\nTwo"));
        assert!(prompt_with_list(&ListPromptOptions::default()).is_err());
    }
}
