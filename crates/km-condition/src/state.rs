//! Conditions over engine, system and device state
//!
//! These kinds need little or no coercion: most only drop an operand the
//! selected operator does not use.

use serde::{Deserialize, Serialize};
use tracing::debug;

use km_core::{ApplicationTarget, KeyStroke, Modifiers, PlistDict, PlistValue};

use crate::condition::{ConditionKind, ConditionRules};
use crate::operators::{Presence, PressState, TextOperator};

/// Write `value` under `key` only when the operator compares against it
fn write_operand(dict: &mut PlistDict, key: &str, operator: TextOperator, value: &str) {
    if operator.takes_operand() {
        dict.insert(key, value);
    }
}

/// Clear an operand the operator ignores
fn prune_operand(operator: TextOperator, value: String) -> String {
    if operator.takes_operand() {
        value
    } else {
        String::new()
    }
}

km_core::engine_keyword! {
    /// Application run state
    #[derive(Default)]
    pub enum ApplicationState {
        #[default]
        Running => "Running",
        NotRunning => "NotRunning",
        Active => "Active",
        NotActive => "NotActive",
        RunningButNotActive => "RunningButNotActive",
    }
}

/// Tests whether an application is running or active
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplicationCondition {
    pub state: ApplicationState,
    pub application: ApplicationTarget,
}

impl ConditionRules for ApplicationCondition {
    const KIND: ConditionKind = ConditionKind::Application;

    fn write_fields(&self, dict: &mut PlistDict) {
        dict.insert("Application", self.application.to_dict());
        dict.insert("ApplicationConditionType", self.state.as_str());
    }
}

km_core::engine_keyword! {
    /// State of a dialog button
    #[derive(Default)]
    pub enum ButtonState {
        #[default]
        Exists => "Exists",
        DoesNotExist => "DoesNotExist",
        Enabled => "IsEnabled",
        Disabled => "IsDisabled",
        Checked => "IsChecked",
        Unchecked => "IsUnchecked",
    }
}

/// Tests a button in the front window
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ButtonCondition {
    pub state: ButtonState,
    pub name: String,
}

impl ConditionRules for ButtonCondition {
    const KIND: ConditionKind = ConditionKind::Button;

    fn write_fields(&self, dict: &mut PlistDict) {
        dict.insert("ButtonConditionType", self.state.as_str());
        dict.insert("ButtonName", self.name.as_str());
    }
}

km_core::engine_keyword! {
    /// Clipboard test
    #[derive(Default)]
    pub enum ClipboardOperator {
        #[default]
        HasText => "HasText",
        HasImage => "HasImage",
        Is => "Is",
        IsNot => "IsNot",
        Contains => "Contains",
        DoesNotContain => "DoesNotContain",
        Matches => "Matches",
        DoesNotMatch => "DoesNotMatch",
    }
}

impl ClipboardOperator {
    /// Whether the test compares clipboard text against a value
    pub fn compares_text(&self) -> bool {
        !matches!(self, ClipboardOperator::HasText | ClipboardOperator::HasImage)
    }
}

/// Tests the system clipboard
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClipboardCondition {
    pub operator: ClipboardOperator,
    pub text: String,
}

impl ConditionRules for ClipboardCondition {
    const KIND: ConditionKind = ConditionKind::Clipboard;

    fn normalize(mut self) -> Self {
        if !self.operator.compares_text() {
            self.text.clear();
        }
        self
    }

    fn write_fields(&self, dict: &mut PlistDict) {
        dict.insert("ClipboardConditionType", self.operator.as_str());
        if self.operator.compares_text() {
            dict.insert("ClipboardText", self.text.as_str());
        }
    }
}

/// True when a calculation evaluates to non-zero
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CalculationCondition {
    pub calculation: String,
}

impl CalculationCondition {
    pub fn new(calculation: impl Into<String>) -> Self {
        Self {
            calculation: calculation.into(),
        }
    }
}

impl ConditionRules for CalculationCondition {
    const KIND: ConditionKind = ConditionKind::Calculation;

    fn write_fields(&self, dict: &mut PlistDict) {
        dict.insert("Text", self.calculation.as_str());
    }
}

/// Compares a process environment variable
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvironmentVariableCondition {
    pub name: String,
    pub operator: TextOperator,
    pub value: String,
}

impl ConditionRules for EnvironmentVariableCondition {
    const KIND: ConditionKind = ConditionKind::EnvironmentVariable;

    fn normalize(mut self) -> Self {
        self.value = prune_operand(self.operator, self.value);
        self
    }

    fn write_fields(&self, dict: &mut PlistDict) {
        dict.insert("EnvironmentVariableConditionType", self.operator.as_str());
        dict.insert("EnvironmentVariableName", self.name.as_str());
        write_operand(dict, "EnvironmentVariableValue", self.operator, &self.value);
    }
}

/// Tests whether a key is held
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyCondition {
    pub key_code: u16,
    pub state: PressState,
}

impl KeyCondition {
    /// Condition on the key of a parsed keystroke; modifiers are ignored
    pub fn from_stroke(stroke: KeyStroke, state: PressState) -> Self {
        Self {
            key_code: stroke.key_code,
            state,
        }
    }
}

impl ConditionRules for KeyCondition {
    const KIND: ConditionKind = ConditionKind::Key;

    fn write_fields(&self, dict: &mut PlistDict) {
        dict.insert("KeyCode", i64::from(self.key_code));
        dict.insert("KeyConditionType", self.state.as_str());
    }
}

/// Compares the current network location name
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LocationCondition {
    pub operator: TextOperator,
    pub name: String,
}

impl ConditionRules for LocationCondition {
    const KIND: ConditionKind = ConditionKind::Location;

    fn normalize(mut self) -> Self {
        self.name = prune_operand(self.operator, self.name);
        self
    }

    fn write_fields(&self, dict: &mut PlistDict) {
        dict.insert("LocationConditionType", self.operator.as_str());
        write_operand(dict, "LocationName", self.operator, &self.name);
    }
}

km_core::engine_keyword! {
    /// State of another macro
    #[derive(Default)]
    pub enum MacroState {
        #[default]
        Exists => "Exists",
        DoesNotExist => "DoesNotExist",
        Enabled => "IsEnabled",
        Disabled => "IsDisabled",
        Active => "IsActive",
        Inactive => "IsNotActive",
    }
}

/// Tests another macro by UID
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MacroCondition {
    pub state: MacroState,
    pub macro_uid: String,
}

impl ConditionRules for MacroCondition {
    const KIND: ConditionKind = ConditionKind::Macro;

    fn write_fields(&self, dict: &mut PlistDict) {
        dict.insert("MacroConditionType", self.state.as_str());
        dict.insert("MacroUID", self.macro_uid.as_str());
    }
}

km_core::engine_keyword! {
    /// State of a menu item
    #[derive(Default)]
    pub enum MenuState {
        #[default]
        Exists => "Exists",
        DoesNotExist => "DoesNotExist",
        Enabled => "IsEnabled",
        Disabled => "IsDisabled",
        Marked => "IsMarked",
        Unmarked => "IsNotMarked",
    }
}

/// Tests a menu item of an application
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MenuCondition {
    pub state: MenuState,
    pub application: ApplicationTarget,
    /// Menu titles from the menu bar down to the item
    pub menu_path: Vec<String>,
}

impl ConditionRules for MenuCondition {
    const KIND: ConditionKind = ConditionKind::Menu;

    fn normalize(mut self) -> Self {
        let before = self.menu_path.len();
        self.menu_path.retain(|title| !title.trim().is_empty());
        if self.menu_path.len() != before {
            debug!("Dropped {} blank menu titles", before - self.menu_path.len());
        }
        self
    }

    fn write_fields(&self, dict: &mut PlistDict) {
        dict.insert("Application", self.application.to_dict());
        dict.insert("MenuConditionType", self.state.as_str());
        dict.insert("Menus", PlistValue::string_array(self.menu_path.iter().cloned()));
    }
}

km_core::engine_keyword! {
    /// Whether the modifiers must be held or released
    #[derive(Default)]
    pub enum ModifierState {
        #[default]
        Pressed => "Pressed",
        NotPressed => "NotPressed",
    }
}

/// Tests the held modifier keys
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ModifiersCondition {
    pub state: ModifierState,
    pub modifiers: Modifiers,
}

impl ConditionRules for ModifiersCondition {
    const KIND: ConditionKind = ConditionKind::Modifiers;

    fn write_fields(&self, dict: &mut PlistDict) {
        dict.insert("Modifiers", self.modifiers.mask());
        dict.insert("ModifiersConditionType", self.state.as_str());
    }
}

/// Tests whether a volume is mounted
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MountedVolumeCondition {
    pub presence: Presence,
    pub volume: String,
}

impl ConditionRules for MountedVolumeCondition {
    const KIND: ConditionKind = ConditionKind::MountedVolume;

    fn write_fields(&self, dict: &mut PlistDict) {
        dict.insert("MountedVolumeConditionType", self.presence.as_str());
        dict.insert("VolumeName", self.volume.as_str());
    }
}

/// Tests whether a mouse button is held (0 is the primary button)
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MouseButtonCondition {
    pub button: i64,
    pub state: PressState,
}

impl ConditionRules for MouseButtonCondition {
    const KIND: ConditionKind = ConditionKind::MouseButton;

    fn normalize(mut self) -> Self {
        if self.button < 0 {
            debug!("Mouse button {} out of range, using primary", self.button);
            self.button = 0;
        }
        self
    }

    fn write_fields(&self, dict: &mut PlistDict) {
        dict.insert("MouseButton", self.button);
        dict.insert("MouseButtonConditionType", self.state.as_str());
    }
}

/// Compares a token-expanded text against a value
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TextCondition {
    pub text: String,
    pub operator: TextOperator,
    pub value: String,
}

impl ConditionRules for TextCondition {
    const KIND: ConditionKind = ConditionKind::Text;

    fn normalize(mut self) -> Self {
        self.value = prune_operand(self.operator, self.value);
        self
    }

    fn write_fields(&self, dict: &mut PlistDict) {
        dict.insert("Text", self.text.as_str());
        dict.insert("TextConditionType", self.operator.as_str());
        write_operand(dict, "TextValue", self.operator, &self.value);
    }
}

km_core::engine_keyword! {
    /// How a typed string is matched
    #[derive(Default)]
    pub enum TypedStringMatch {
        #[default]
        Is => "Is",
        Matches => "Matches",
    }
}

/// Tests the most recently typed characters
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TypedStringCondition {
    pub string: String,
    pub matching: TypedStringMatch,
    pub case_sensitive: bool,
}

impl ConditionRules for TypedStringCondition {
    const KIND: ConditionKind = ConditionKind::TypedString;

    fn write_fields(&self, dict: &mut PlistDict) {
        if self.case_sensitive {
            dict.insert("CaseSensitive", true);
        }
        dict.insert("TypedString", self.string.as_str());
        dict.insert("TypedStringConditionType", self.matching.as_str());
    }
}

/// Tests whether a USB device is attached
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UsbDeviceCondition {
    pub presence: Presence,
    pub device: String,
}

impl ConditionRules for UsbDeviceCondition {
    const KIND: ConditionKind = ConditionKind::UsbDevice;

    fn write_fields(&self, dict: &mut PlistDict) {
        dict.insert("USBConditionType", self.presence.as_str());
        dict.insert("USBDeviceName", self.device.as_str());
    }
}

/// Compares an engine variable
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VariableCondition {
    pub variable: String,
    pub operator: TextOperator,
    pub value: String,
}

impl VariableCondition {
    pub fn new(
        variable: impl Into<String>,
        operator: TextOperator,
        value: impl Into<String>,
    ) -> Self {
        Self {
            variable: variable.into(),
            operator,
            value: value.into(),
        }
    }
}

impl ConditionRules for VariableCondition {
    const KIND: ConditionKind = ConditionKind::Variable;

    fn normalize(mut self) -> Self {
        self.value = prune_operand(self.operator, self.value);
        self
    }

    fn write_fields(&self, dict: &mut PlistDict) {
        dict.insert("Variable", self.variable.as_str());
        dict.insert("VariableConditionType", self.operator.as_str());
        write_operand(dict, "VariableValue", self.operator, &self.value);
    }
}

/// Compares the name of the joined wireless network
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WirelessNetworkCondition {
    pub operator: TextOperator,
    pub network: String,
}

impl ConditionRules for WirelessNetworkCondition {
    const KIND: ConditionKind = ConditionKind::WirelessNetwork;

    fn normalize(mut self) -> Self {
        self.network = prune_operand(self.operator, self.network);
        self
    }

    fn write_fields(&self, dict: &mut PlistDict) {
        dict.insert("WirelessNetworkConditionType", self.operator.as_str());
        write_operand(dict, "WirelessNetworkName", self.operator, &self.network);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::Condition;

    #[test]
    fn test_variable_operand_dropped_for_emptiness_tests() {
        let condition = Condition::Variable(VariableCondition::new(
            "Result",
            TextOperator::IsEmpty,
            "ignored",
        ));
        let dict = condition.to_dict();
        assert!(!dict.contains_key("VariableValue"));
        assert_eq!(
            dict.get("VariableConditionType").and_then(|v| v.as_str()),
            Some("IsEmpty")
        );
    }

    #[test]
    fn test_clipboard_text_only_for_comparisons() {
        let has_text = Condition::Clipboard(ClipboardCondition {
            operator: ClipboardOperator::HasText,
            text: "stale".into(),
        });
        assert!(!has_text.to_dict().contains_key("ClipboardText"));

        let contains = Condition::Clipboard(ClipboardCondition {
            operator: ClipboardOperator::Contains,
            text: "needle".into(),
        });
        assert_eq!(
            contains.to_dict().get("ClipboardText").and_then(|v| v.as_str()),
            Some("needle")
        );
    }

    #[test]
    fn test_case_sensitive_flag_omitted_by_default() {
        let plain = Condition::TypedString(TypedStringCondition {
            string: "btw".into(),
            ..Default::default()
        });
        assert!(!plain.to_dict().contains_key("CaseSensitive"));

        let strict = Condition::TypedString(TypedStringCondition {
            string: "btw".into(),
            case_sensitive: true,
            ..Default::default()
        });
        assert_eq!(
            strict.to_dict().get("CaseSensitive").and_then(|v| v.as_bool()),
            Some(true)
        );
    }

    #[test]
    fn test_modifiers_render_mask() {
        let condition = Condition::Modifiers(ModifiersCondition {
            state: ModifierState::Pressed,
            modifiers: Modifiers {
                option: true,
                ..Default::default()
            },
        });
        assert_eq!(condition.to_dict().get("Modifiers"), Some(&PlistValue::Integer(2048)));
    }

    #[test]
    fn test_menu_path_drops_blank_titles() {
        let condition = MenuCondition {
            menu_path: vec!["File".into(), " ".into(), "Save".into()],
            ..Default::default()
        }
        .normalize();
        assert_eq!(condition.menu_path, vec!["File", "Save"]);
    }

    #[test]
    fn test_mouse_button_clamped() {
        let condition = MouseButtonCondition {
            button: -3,
            state: PressState::Down,
        }
        .normalize();
        assert_eq!(condition.button, 0);
    }
}
