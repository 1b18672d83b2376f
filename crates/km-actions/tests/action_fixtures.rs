//! Serialized action fixtures
//!
//! Options are built from JSON where that is how a caller would describe
//! them, then the rendered dicts are checked key by key.

use km_actions::{
    ephemeral_macro, ephemeral_macro_from, execute_script, group, if_then_else, insert_text,
    pause, quit_application, FailureOptions, GroupOptions, IfThenElseOptions,
    InsertTextOptions, PauseOptions, QuitOptions, ScriptOptions, TimeoutOptions, VirtualAction,
};
use km_condition::ConditionList;
use serde_json::json;

fn keys(xml: &str) -> Vec<String> {
    xml.lines()
        .filter(|l| l.starts_with("\t<key>"))
        .map(|l| l.trim().trim_start_matches("<key>").trim_end_matches("</key>").to_string())
        .collect()
}

fn without_uid(action: &VirtualAction) -> String {
    action
        .to_xml()
        .replace(&format!("\t<integer>{}</integer>\n", action.uid()), "")
        .replace("\t<key>ActionUID</key>\n", "")
}

// ============================================================================
// Quitting the frontmost application
// ============================================================================

#[test]
fn test_quit_frontmost_aborting_on_timeout() {
    let options: QuitOptions = serde_json::from_value(json!({
        "application": {"type": "frontmost"},
        "timeout": {"aborts": true}
    }))
    .unwrap();
    let action = quit_application(&options).unwrap();

    assert_eq!(
        without_uid(&action),
        "<dict>\n\
         \t<key>MacroActionType</key>\n\
         \t<string>QuitSpecificApp</string>\n\
         \t<key>Action</key>\n\
         \t<string>Quit</string>\n\
         \t<key>Application</key>\n\
         \t<dict/>\n\
         \t<key>TimeOutAbortsMacro</key>\n\
         \t<true/>\n\
         </dict>\n"
    );
}

#[test]
fn test_quit_specific_application_selector() {
    let options: QuitOptions = serde_json::from_value(json!({
        "application": {"type": "specific", "name": "TextEdit", "bundle_id": "com.apple.TextEdit"},
        "mode": "ForceQuit"
    }))
    .unwrap();
    let xml = quit_application(&options).unwrap().to_xml();
    assert!(xml.contains(
        "\t<dict>\n\t\t<key>BundleIdentifier</key>\n\t\t<string>com.apple.TextEdit</string>\n\t\t<key>Name</key>\n\t\t<string>TextEdit</string>\n\t</dict>\n"
    ));
    assert!(xml.contains("<string>ForceQuit</string>"));
}

// ============================================================================
// Ephemeral macros
// ============================================================================

#[test]
fn test_empty_macro_with_return_has_exactly_one_action() {
    let xml = ephemeral_macro(&[], Some("Answer"));
    assert_eq!(xml.matches("<key>MacroActionType</key>").count(), 1);
    assert_eq!(xml.matches("<string>Return</string>").count(), 1);
    assert!(xml.contains("<string>%Variable%Answer%</string>"));
}

#[test]
fn test_return_is_appended_after_actions() {
    let action = insert_text(&InsertTextOptions {
        text: "hi".into(),
        ..Default::default()
    })
    .unwrap();
    let xml = ephemeral_macro_from(&[action], Some("Answer"));
    assert_eq!(xml.matches("<key>MacroActionType</key>").count(), 2);
    let insert_at = xml.find("<string>InsertText</string>").unwrap();
    let return_at = xml.find("<string>Return</string>").unwrap();
    assert!(insert_at < return_at);
}

// ============================================================================
// Default omission
// ============================================================================

#[test]
fn test_failure_flags_follow_defaults() {
    let defaults = execute_script(&ScriptOptions::shell("true")).unwrap();
    assert!(defaults.get("StopOnFailure").is_none());
    assert!(defaults.get("NotifyOnFailure").is_none());

    let options: ScriptOptions = serde_json::from_value(json!({
        "body": {"text": "false"},
        "failure": {"stop_on_failure": false, "notify_on_failure": false}
    }))
    .unwrap();
    assert_eq!(
        options.failure,
        FailureOptions {
            stop_on_failure: false,
            notify_on_failure: false
        }
    );
    let xml = execute_script(&options).unwrap().to_xml();
    assert!(xml.contains("\t<key>NotifyOnFailure</key>\n\t<false/>\n"));
    assert!(xml.contains("\t<key>StopOnFailure</key>\n\t<false/>\n"));
}

#[test]
fn test_script_action_key_order() {
    let action = execute_script(&ScriptOptions {
        timeout: TimeoutOptions::continuing(),
        ..ScriptOptions::shell("echo ok")
    })
    .unwrap();
    assert_eq!(
        keys(&action.to_xml()),
        vec![
            "MacroActionType",
            "ActionUID",
            "DisplayKind",
            "HonourFailureSettings",
            "IncludedVariables",
            "Path",
            "Text",
            "TimeOutAbortsMacro",
            "TrimResults",
            "TrimResultsNew",
            "UseText",
        ]
    );
}

// ============================================================================
// Nested actions
// ============================================================================

#[test]
fn test_if_then_else_nests_conditions_and_actions() {
    let conditions: ConditionList = serde_json::from_value(json!({
        "match_type": "All",
        "conditions": [{"type": "front_window", "operator": "Exists"}]
    }))
    .unwrap();
    let then_action = insert_text(&InsertTextOptions {
        text: "yes".into(),
        ..Default::default()
    })
    .unwrap();
    let action = if_then_else(&IfThenElseOptions {
        conditions,
        then_actions: vec![then_action],
        ..Default::default()
    });
    let xml = action.to_xml();
    assert!(xml.contains("\t<key>ElseActions</key>\n\t<array/>\n"));
    assert!(xml.contains("\t\t<key>ConditionListMatch</key>\n\t\t<string>All</string>\n"));
    assert!(xml.contains("\t\t<dict>\n\t\t\t<key>MacroActionType</key>\n\t\t\t<string>InsertText</string>\n"));
}

#[test]
fn test_identical_containers_are_equal() {
    let build_group = || {
        group(&GroupOptions {
            actions: vec![pause(&PauseOptions::default()).unwrap()],
            ..Default::default()
        })
    };
    let a = build_group();
    let b = build_group();
    assert_eq!(a, b);

    let branch = || {
        if_then_else(&IfThenElseOptions {
            then_actions: vec![build_group()],
            else_actions: vec![pause(&PauseOptions::default()).unwrap()],
            ..Default::default()
        })
    };
    assert_eq!(branch(), branch());
}
