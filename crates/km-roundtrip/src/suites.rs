//! Built-in cases, one or more per action factory
//!
//! Imported macros are never executed, so paths and applications only need
//! to be well formed.

use km_actions::*;
use km_condition::{CalculationCondition, Condition, ConditionList};
use km_core::{ApplicationTarget, ScreenArea};

use crate::harness::RoundTripCase;

fn calculation(expression: &str) -> ConditionList {
    ConditionList::single(Condition::Calculation(CalculationCondition::new(expression)))
}

/// Every built-in case
pub fn builtin_cases() -> ActionResult<Vec<RoundTripCase>> {
    let mut cases = Vec::new();
    cases.extend(text_cases()?);
    cases.extend(application_cases()?);
    cases.extend(input_cases()?);
    cases.extend(file_cases()?);
    cases.extend(script_cases()?);
    cases.extend(control_cases()?);
    cases.extend(prompt_cases()?);
    Ok(cases)
}

fn text_cases() -> ActionResult<Vec<RoundTripCase>> {
    Ok(vec![
        RoundTripCase::single(
            "insert_text/typing",
            insert_text(&InsertTextOptions {
                text: "Hello & <goodbye>".into(),
                ..Default::default()
            })?,
        ),
        RoundTripCase::single(
            "insert_text/styled",
            insert_text(&InsertTextOptions {
                text: String::new(),
                mode: InsertMode::ByPastingStyles,
                rtf: Some(r"{\rtf1\ansi {\b Bold} text}".into()),
                ..Default::default()
            })?,
        ),
        RoundTripCase::single(
            "set_variable/text",
            set_variable_to_text(&SetVariableOptions {
                variable: "RoundTrip".into(),
                text: "value".into(),
                ..Default::default()
            })?,
        ),
        RoundTripCase::single("delete_variable", delete_variable("RoundTrip")?),
        RoundTripCase::single(
            "set_variable/calculation",
            set_variable_to_calculation(&CalculationOptions {
                variable: "Total".into(),
                expression: "1 + 2".into(),
                format: Some("0.00".into()),
            })?,
        ),
        RoundTripCase::single(
            "clipboard/text",
            set_clipboard_to_text(&ClipboardTextOptions {
                text: "copied".into(),
                ..Default::default()
            }),
        ),
        RoundTripCase::single(
            "search_replace/regex",
            search_replace(&SearchReplaceOptions {
                target: SearchTarget::Variable {
                    name: "RoundTrip".into(),
                },
                search: r"\s+".into(),
                replace: " ".into(),
                mode: SearchMode::RegularExpression,
                first_only: false,
            })?,
        ),
        RoundTripCase::single(
            "notification",
            notification(&NotificationOptions {
                title: "Round trip".into(),
                text: "done".into(),
                ..Default::default()
            })?,
        ),
        RoundTripCase::single(
            "cut_copy_paste/paste",
            cut_copy_paste(EditCommand::Paste, &TimeoutOptions::default()),
        ),
    ])
}

fn application_cases() -> ActionResult<Vec<RoundTripCase>> {
    Ok(vec![
        RoundTripCase::single(
            "activate_application",
            activate_application(&ActivateOptions {
                application: ApplicationTarget::bundle("com.apple.TextEdit", "TextEdit"),
                ..Default::default()
            })?,
        ),
        RoundTripCase::single(
            "quit_application/frontmost",
            quit_application(&QuitOptions {
                timeout: TimeoutOptions {
                    aborts: true,
                    ..Default::default()
                },
                ..Default::default()
            })?,
        ),
        RoundTripCase::single(
            "select_menu_item",
            select_menu_item(&MenuOptions {
                path: vec!["File".into(), "New".into()],
                ..Default::default()
            })?,
        ),
        RoundTripCase::single(
            "manipulate_window/move_and_resize",
            manipulate_window(&WindowOptions {
                manipulation: WindowManipulation::MoveAndResize {
                    horizontal: "0".into(),
                    vertical: "0".into(),
                    width: "800".into(),
                    height: "600".into(),
                },
                application: ApplicationTarget::Frontmost,
                window_index: None,
            })?,
        ),
    ])
}

fn input_cases() -> ActionResult<Vec<RoundTripCase>> {
    Ok(vec![
        RoundTripCase::single(
            "simulate_keystroke",
            simulate_keystroke_str("cmd+shift+s", ApplicationTarget::Frontmost)?,
        ),
        RoundTripCase::single(
            "move_and_click/double",
            move_and_click(&MouseOptions {
                click_count: 2,
                horizontal: "100".into(),
                vertical: "200".into(),
                ..Default::default()
            })?,
        ),
        RoundTripCase::single(
            "scroll_wheel",
            scroll_wheel(&ScrollOptions {
                direction: ScrollDirection::Down,
                amount: 3,
            })?,
        ),
    ])
}

fn file_cases() -> ActionResult<Vec<RoundTripCase>> {
    Ok(vec![
        RoundTripCase::single(
            "open_file",
            open_file(&OpenFileOptions {
                path: "/tmp/km-roundtrip/notes.txt".into(),
                ..Default::default()
            })?,
        ),
        RoundTripCase::single(
            "open_url",
            open_url(&OpenUrlOptions {
                url: "https://example.com/".into(),
                ..Default::default()
            })?,
        ),
        RoundTripCase::single("play_sound", play_sound(&SoundOptions::default())?),
        RoundTripCase::single(
            "screen_capture/area",
            screen_capture(&CaptureOptions {
                area: ScreenArea::rect(0, 0, 640, 480),
                destination: CaptureDestination::Variable {
                    name: "Shot".into(),
                },
                shadow: false,
            })?,
        ),
        RoundTripCase::single(
            "file_action/copy",
            file_action(&FileOptions {
                operation: FileOperation::Copy,
                source: "/tmp/km-roundtrip/a.txt".into(),
                destination: "/tmp/km-roundtrip/b.txt".into(),
                ..Default::default()
            })?,
        ),
        RoundTripCase::single("read_file", read_file("/tmp/km-roundtrip/a.txt", "Contents")?),
        RoundTripCase::single(
            "write_file/append",
            write_file(&WriteFileOptions {
                path: "/tmp/km-roundtrip/a.txt".into(),
                text: "%Variable%Contents%".into(),
                append: true,
                ..Default::default()
            })?,
        ),
    ])
}

fn script_cases() -> ActionResult<Vec<RoundTripCase>> {
    Ok(vec![
        RoundTripCase::single(
            "execute_script/shell",
            execute_script(&ScriptOptions::shell("echo ok"))?,
        ),
        RoundTripCase::single(
            "execute_script/applescript",
            execute_script(&ScriptOptions {
                failure: FailureOptions {
                    stop_on_failure: false,
                    notify_on_failure: true,
                },
                ..ScriptOptions::applescript("return 1")
            })?,
        ),
        RoundTripCase::single(
            "execute_script/javascript",
            execute_script(&ScriptOptions::javascript("1 + 1"))?,
        ),
    ])
}

fn control_cases() -> ActionResult<Vec<RoundTripCase>> {
    Ok(vec![
        RoundTripCase::single("pause", pause(&PauseOptions::default())?),
        RoundTripCase::single(
            "comment",
            comment(&CommentOptions {
                text: "Round trip\nsecond line".into(),
                ..Default::default()
            })?,
        ),
        RoundTripCase::single("return", return_result("%Variable%RoundTrip%")),
        RoundTripCase::single("cancel", cancel(CancelScope::BreakFromLoop)),
        RoundTripCase::single(
            "execute_macro",
            execute_macro(&ExecuteMacroOptions {
                macro_uid: "00000000-0000-0000-0000-000000000000".into(),
                parameter: Some("value".into()),
                ..Default::default()
            })?,
        ),
        RoundTripCase::single(
            "group",
            group(&GroupOptions {
                name: Some("Grouped".into()),
                actions: vec![pause(&PauseOptions::default())?],
                ..Default::default()
            }),
        ),
        RoundTripCase::single(
            "if_then_else",
            if_then_else(&IfThenElseOptions {
                conditions: calculation("1"),
                then_actions: vec![return_result("yes")],
                else_actions: vec![return_result("no")],
                ..Default::default()
            }),
        ),
        RoundTripCase::single(
            "while",
            while_loop(&LoopOptions {
                conditions: calculation("0"),
                actions: vec![pause(&PauseOptions::default())?],
                ..Default::default()
            })?,
        ),
        RoundTripCase::single(
            "for_each/range",
            for_each(&ForEachOptions {
                variable: "Index".into(),
                collection: ForCollection::Range {
                    start: "1".into(),
                    end: "3".into(),
                    step: "1".into(),
                },
                actions: Vec::new(),
                timeout: TimeoutOptions::default(),
            })?,
        ),
        RoundTripCase::single(
            "switch/variable",
            switch(&SwitchOptions {
                source: SwitchSource::Variable {
                    name: "RoundTrip".into(),
                },
                cases: vec![
                    SwitchCase {
                        test: CaseTest::Is,
                        value: "a".into(),
                        actions: vec![return_result("a")],
                    },
                    SwitchCase {
                        test: CaseTest::Otherwise,
                        ..Default::default()
                    },
                ],
                timeout: TimeoutOptions::default(),
            })?,
        ),
        RoundTripCase::single(
            "pause_until",
            pause_until(&PauseUntilOptions {
                conditions: calculation("1"),
                ..Default::default()
            })?,
        ),
    ])
}

fn prompt_cases() -> ActionResult<Vec<RoundTripCase>> {
    Ok(vec![
        RoundTripCase::single(
            "prompt_for_input",
            prompt_for_input(&PromptOptions {
                prompt: "Name?".into(),
                fields: vec![PromptField {
                    variable: "Name".into(),
                    default: "Ada".into(),
                }],
                ..Default::default()
            })?,
        ),
        RoundTripCase::single(
            "prompt_with_list",
            prompt_with_list(&ListPromptOptions {
                title: "Pick".into(),
                items: vec!["one".into(), "two".into()],
            })?,
        ),
    ])
}
