//! Application, menu and window actions

use serde::{Deserialize, Serialize};

use km_core::{ApplicationTarget, PlistValue};

use crate::action::{ActionBody, VirtualAction};
use crate::error::{ActionError, ActionResult};
use crate::options::TimeoutOptions;

km_core::engine_keyword! {
    /// What activation does when the application is already frontmost
    #[derive(Default)]
    pub enum AlreadyActivated {
        #[default]
        Normal => "Normal",
        Hide => "Hide",
        SwitchToLastApplication => "SwitchToLast",
    }
}

/// Options for [`activate_application`]
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ActivateOptions {
    pub application: ApplicationTarget,
    /// Bring every window forward, not only the main one
    pub all_windows: bool,
    /// Reopen initial windows
    pub reopen_windows: bool,
    pub already_activated: AlreadyActivated,
    pub timeout: TimeoutOptions,
}

/// Launch or bring forward a specific application
pub fn activate_application(options: &ActivateOptions) -> ActionResult<VirtualAction> {
    const ACTION: &str = "ActivateApplication";
    match &options.application {
        ApplicationTarget::Specific(app) if app.is_resolvable() => {}
        ApplicationTarget::Specific(_) => {
            return Err(ActionError::invalid(
                ACTION,
                "the application needs a name, bundle identifier or path",
            ))
        }
        ApplicationTarget::Frontmost => {
            return Err(ActionError::invalid(
                ACTION,
                "the frontmost application is already active",
            ))
        }
    }

    Ok(ActionBody::new()
        .set("AllWindows", options.all_windows)
        .set("AlreadyActivatedActionType", options.already_activated.as_str())
        .set("Application", options.application.to_dict())
        .set("ReopenWindows", options.reopen_windows)
        .apply(|d| options.timeout.write(d))
        .build(ACTION))
}

km_core::engine_keyword! {
    /// How an application is quit
    #[derive(Default)]
    pub enum QuitMode {
        #[default]
        Quit => "Quit",
        ForceQuit => "ForceQuit",
        QuitAndRelaunch => "QuitAndRelaunch",
    }
}

/// Options for [`quit_application`]
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct QuitOptions {
    /// Frontmost renders as an empty selector dict
    pub application: ApplicationTarget,
    pub mode: QuitMode,
    pub timeout: TimeoutOptions,
}

/// Quit, force quit or relaunch an application
pub fn quit_application(options: &QuitOptions) -> ActionResult<VirtualAction> {
    const ACTION: &str = "QuitSpecificApp";
    if let ApplicationTarget::Specific(app) = &options.application {
        if !app.is_resolvable() {
            return Err(ActionError::invalid(
                ACTION,
                "the application needs a name, bundle identifier or path",
            ));
        }
    }
    Ok(ActionBody::new()
        .set("Action", options.mode.as_str())
        .set("Application", options.application.to_dict())
        .apply(|d| options.timeout.write(d))
        .build(ACTION))
}

/// Options for [`select_menu_item`]
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MenuOptions {
    /// Menu title followed by item titles, outermost first
    pub path: Vec<String>,
    pub application: ApplicationTarget,
    pub timeout: TimeoutOptions,
}

/// Choose a menu item by its title path
pub fn select_menu_item(options: &MenuOptions) -> ActionResult<VirtualAction> {
    const ACTION: &str = "SelectMenuItem";
    let titles: Vec<&str> = options
        .path
        .iter()
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .collect();
    if titles.len() < 2 {
        return Err(ActionError::invalid(
            ACTION,
            "a menu path needs a menu title and at least one item",
        ));
    }
    Ok(ActionBody::new()
        .set("Menus", PlistValue::string_array(titles))
        .set("TargetApplication", options.application.to_dict())
        .set("TargetingType", options.application.targeting_type())
        .apply(|d| options.timeout.write(d))
        .build(ACTION))
}

/// What to do with the targeted window
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum WindowManipulation {
    Move { horizontal: String, vertical: String },
    Resize { width: String, height: String },
    MoveAndResize {
        horizontal: String,
        vertical: String,
        width: String,
        height: String,
    },
    Centre,
    Close,
    Minimize,
    Unminimize,
    ToggleZoom,
    BringToFront,
}

impl WindowManipulation {
    fn engine_name(&self) -> &'static str {
        match self {
            WindowManipulation::Move { .. } => "Move",
            WindowManipulation::Resize { .. } => "Resize",
            WindowManipulation::MoveAndResize { .. } => "MoveAndResize",
            WindowManipulation::Centre => "Center",
            WindowManipulation::Close => "Close",
            WindowManipulation::Minimize => "Minimize",
            WindowManipulation::Unminimize => "Unminimize",
            WindowManipulation::ToggleZoom => "Zoom",
            WindowManipulation::BringToFront => "Reopen",
        }
    }

    /// Coordinate expressions keyed by engine name
    fn expressions(&self) -> Vec<(&'static str, &'static str, &str)> {
        match self {
            WindowManipulation::Move {
                horizontal,
                vertical,
            } => vec![
                ("HorizontalExpression", "horizontal", horizontal.as_str()),
                ("VerticalExpression", "vertical", vertical.as_str()),
            ],
            WindowManipulation::Resize { width, height } => vec![
                ("HeightExpression", "height", height.as_str()),
                ("WidthExpression", "width", width.as_str()),
            ],
            WindowManipulation::MoveAndResize {
                horizontal,
                vertical,
                width,
                height,
            } => vec![
                ("HeightExpression", "height", height.as_str()),
                ("HorizontalExpression", "horizontal", horizontal.as_str()),
                ("VerticalExpression", "vertical", vertical.as_str()),
                ("WidthExpression", "width", width.as_str()),
            ],
            _ => Vec::new(),
        }
    }
}

/// Options for [`manipulate_window`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowOptions {
    #[serde(flatten)]
    pub manipulation: WindowManipulation,
    #[serde(default)]
    pub application: ApplicationTarget,
    /// Index of the target window, 1 being frontmost
    #[serde(default)]
    pub window_index: Option<String>,
}

/// Move, resize or otherwise change the front window
pub fn manipulate_window(options: &WindowOptions) -> ActionResult<VirtualAction> {
    const ACTION: &str = "ManipulateWindow";
    let mut body = ActionBody::new().set("Action", options.manipulation.engine_name());
    for (key, field, expression) in options.manipulation.expressions() {
        if expression.trim().is_empty() {
            return Err(ActionError::MissingField {
                action: ACTION,
                field,
            });
        }
        body = body.set(key, expression.trim());
    }

    let index = options
        .window_index
        .as_deref()
        .map(str::trim)
        .filter(|i| !i.is_empty());
    Ok(body
        .set("TargetApplication", options.application.to_dict())
        .set("TargetingType", options.application.targeting_type())
        .set("WindowIndexExpression", index.unwrap_or("1"))
        .set("Targeting", if index.is_some() { "WindowIndex" } else { "FrontWindow" })
        .build(ACTION))
}
