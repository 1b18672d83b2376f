//! Keyboard and mouse simulation

use serde::{Deserialize, Serialize};

use km_condition::{ConditionRules, ImageFoundCondition};
use km_core::{ApplicationTarget, KeyStroke, Modifiers};

use crate::action::{require, ActionBody, VirtualAction};
use crate::error::{ActionError, ActionResult};

/// Options for [`simulate_keystroke`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeystrokeOptions {
    pub keystroke: KeyStroke,
    /// Application the keystroke is sent to
    #[serde(default)]
    pub application: ApplicationTarget,
}

/// Press a key with modifiers
pub fn simulate_keystroke(options: &KeystrokeOptions) -> VirtualAction {
    ActionBody::new()
        .set("KeyCode", i64::from(options.keystroke.key_code))
        .set("Modifiers", options.keystroke.modifiers.mask())
        .set("TargetApplication", options.application.to_dict())
        .set("TargetingType", options.application.targeting_type())
        .build("SimulateKeystroke")
}

/// Parse a description such as `"cmd+shift+s"` into a keystroke action
pub fn simulate_keystroke_str(
    description: &str,
    application: ApplicationTarget,
) -> ActionResult<VirtualAction> {
    let keystroke: KeyStroke = description.parse()?;
    Ok(simulate_keystroke(&KeystrokeOptions {
        keystroke,
        application,
    }))
}

km_core::engine_keyword! {
    /// Mouse event sent at the target position
    #[derive(Default)]
    pub enum ClickKind {
        #[default]
        Click => "Click",
        Move => "Move",
        Press => "Press",
        Release => "Release",
        Drag => "Drag",
    }
}

km_core::engine_keyword! {
    /// Mouse button used for the event
    #[derive(Default)]
    pub enum MouseButton {
        #[default]
        Left => "Left",
        Right => "Right",
        Middle => "Middle",
    }
}

km_core::engine_keyword! {
    /// Window or screen corner coordinates are measured from
    #[derive(Default)]
    pub enum Corner {
        #[default]
        TopLeft => "TopLeft",
        TopRight => "TopRight",
        BottomLeft => "BottomLeft",
        BottomRight => "BottomRight",
    }
}

/// Reference point of a mouse position
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MousePosition {
    /// Screen coordinates
    #[default]
    Absolute,
    /// Offset from the current mouse location
    Mouse,
    /// Offset from a corner of the front window
    Window,
    /// Offset from the centre of an image found on screen
    FoundImage(ImageFoundCondition),
}

impl MousePosition {
    fn engine_name(&self) -> &'static str {
        match self {
            MousePosition::Absolute => "Absolute",
            MousePosition::Mouse => "Mouse",
            MousePosition::Window => "Window",
            MousePosition::FoundImage(_) => "Image",
        }
    }
}

/// Options for [`move_and_click`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MouseOptions {
    pub kind: ClickKind,
    pub button: MouseButton,
    pub click_count: i64,
    pub horizontal: String,
    pub vertical: String,
    pub relative_to: MousePosition,
    pub corner: Corner,
    pub modifiers: Modifiers,
    /// Put the pointer back where it was afterwards
    pub restore_location: bool,
}

impl Default for MouseOptions {
    fn default() -> Self {
        Self {
            kind: ClickKind::Click,
            button: MouseButton::Left,
            click_count: 1,
            horizontal: "0".to_string(),
            vertical: "0".to_string(),
            relative_to: MousePosition::Absolute,
            corner: Corner::TopLeft,
            modifiers: Modifiers::none(),
            restore_location: false,
        }
    }
}

/// Move the mouse and optionally click
pub fn move_and_click(options: &MouseOptions) -> ActionResult<VirtualAction> {
    const ACTION: &str = "MouseMoveAndClick";
    require(ACTION, "horizontal", &options.horizontal)?;
    require(ACTION, "vertical", &options.vertical)?;
    if !(1..=3).contains(&options.click_count) {
        return Err(ActionError::invalid(
            ACTION,
            format!("click count {} is outside 1..=3", options.click_count),
        ));
    }

    let body = ActionBody::new()
        .set("Action", options.kind.as_str())
        .set("Button", options.button.as_str())
        .set("ClickCount", options.click_count)
        .set("Horizontal", options.horizontal.trim())
        .set("Modifiers", options.modifiers.mask())
        .set("Relative", options.relative_to.engine_name())
        .set("RelativeCorner", options.corner.as_str())
        .flag("RestoreMouseLocation", options.restore_location, false)
        .set("Vertical", options.vertical.trim());

    let body = match &options.relative_to {
        MousePosition::FoundImage(image) => {
            let image = image.clone().normalize();
            body.apply(|d| {
                image.write_fields(d);
                d.remove("ScreenImageConditionType");
            })
        }
        _ => body,
    };
    Ok(body.build(ACTION))
}

km_core::engine_keyword! {
    /// Scroll direction
    #[derive(Default)]
    pub enum ScrollDirection {
        Up => "Up",
        #[default]
        Down => "Down",
        Left => "Left",
        Right => "Right",
    }
}

/// Options for [`scroll_wheel`]
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrollOptions {
    pub direction: ScrollDirection,
    /// Number of wheel steps, at least 1
    pub amount: i64,
}

/// Scroll the wheel in one direction
pub fn scroll_wheel(options: &ScrollOptions) -> ActionResult<VirtualAction> {
    if options.amount < 1 {
        return Err(ActionError::invalid(
            "ScrollWheelEvent",
            format!("scroll amount must be positive, got {}", options.amount),
        ));
    }
    Ok(ActionBody::new()
        .set("ScrollAmount", options.amount)
        .set("ScrollDirection", options.direction.as_str())
        .build("ScrollWheelEvent"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use km_core::{PlistError, PlistValue, ScreenArea};

    #[test]
    fn test_keystroke_from_description() {
        let action = simulate_keystroke_str("cmd+shift+s", ApplicationTarget::Frontmost).unwrap();
        assert_eq!(action.get("KeyCode"), Some(&PlistValue::Integer(1)));
        assert_eq!(action.get("Modifiers"), Some(&PlistValue::Integer(768)));
        assert_eq!(action.get("TargetingType").and_then(|v| v.as_str()), Some("Front"));
    }

    #[test]
    fn test_bad_keystroke_is_plist_error() {
        let err = simulate_keystroke_str("hyper+s", ApplicationTarget::Frontmost).unwrap_err();
        assert!(matches!(
            err,
            ActionError::Plist(PlistError::InvalidKeyStroke { .. })
        ));
    }

    #[test]
    fn test_click_defaults() {
        let action = move_and_click(&MouseOptions::default()).unwrap();
        assert_eq!(action.get("Relative").and_then(|v| v.as_str()), Some("Absolute"));
        assert!(action.get("RestoreMouseLocation").is_none());
        assert!(action.get("ImageSource").is_none());
    }

    #[test]
    fn test_click_on_found_image_carries_search_keys() {
        let action = move_and_click(&MouseOptions {
            relative_to: MousePosition::FoundImage(ImageFoundCondition {
                area: Some(ScreenArea::MainScreen),
                image_data: Some("iVBORw0KGgo=".into()),
                ..Default::default()
            }),
            restore_location: true,
            ..Default::default()
        })
        .unwrap();
        assert_eq!(action.get("Relative").and_then(|v| v.as_str()), Some("Image"));
        assert_eq!(action.get("Fuzz"), Some(&PlistValue::Integer(15)));
        assert!(action.get("ScreenArea").is_some());
        assert!(action.get("ScreenImageConditionType").is_none());
        assert_eq!(action.get("RestoreMouseLocation"), Some(&PlistValue::Bool(true)));
    }

    #[test]
    fn test_click_count_bounds() {
        let options = MouseOptions {
            click_count: 0,
            ..Default::default()
        };
        assert!(move_and_click(&options).is_err());
    }

    #[test]
    fn test_scroll_amount_positive() {
        assert!(scroll_wheel(&ScrollOptions::default()).is_err());
        let action = scroll_wheel(&ScrollOptions {
            direction: ScrollDirection::Up,
            amount: 3,
        })
        .unwrap();
        assert_eq!(action.get("ScrollDirection").and_then(|v| v.as_str()), Some("Up"));
    }
}
