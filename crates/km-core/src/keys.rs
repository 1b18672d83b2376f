//! Keystrokes and modifier masks
//!
//! The engine stores keystrokes as a virtual key code plus a modifier
//! bitmask using the classic Carbon bit positions.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{PlistError, PlistResult};

const COMMAND_MASK: i64 = 256;
const SHIFT_MASK: i64 = 512;
const OPTION_MASK: i64 = 2048;
const CONTROL_MASK: i64 = 4096;

/// Virtual key codes by name
const KEY_CODES: &[(&str, u16)] = &[
    ("a", 0),
    ("s", 1),
    ("d", 2),
    ("f", 3),
    ("h", 4),
    ("g", 5),
    ("z", 6),
    ("x", 7),
    ("c", 8),
    ("v", 9),
    ("b", 11),
    ("q", 12),
    ("w", 13),
    ("e", 14),
    ("r", 15),
    ("y", 16),
    ("t", 17),
    ("1", 18),
    ("2", 19),
    ("3", 20),
    ("4", 21),
    ("6", 22),
    ("5", 23),
    ("=", 24),
    ("9", 25),
    ("7", 26),
    ("-", 27),
    ("8", 28),
    ("0", 29),
    ("]", 30),
    ("o", 31),
    ("u", 32),
    ("[", 33),
    ("i", 34),
    ("p", 35),
    ("return", 36),
    ("l", 37),
    ("j", 38),
    ("'", 39),
    ("k", 40),
    (";", 41),
    ("\\", 42),
    (",", 43),
    ("/", 44),
    ("n", 45),
    ("m", 46),
    (".", 47),
    ("tab", 48),
    ("space", 49),
    ("`", 50),
    ("delete", 51),
    ("escape", 53),
    ("f5", 96),
    ("f6", 97),
    ("f7", 98),
    ("f3", 99),
    ("f8", 100),
    ("f9", 101),
    ("f11", 103),
    ("f10", 109),
    ("f12", 111),
    ("home", 115),
    ("pageup", 116),
    ("forwarddelete", 117),
    ("f4", 118),
    ("end", 119),
    ("f2", 120),
    ("pagedown", 121),
    ("f1", 122),
    ("left", 123),
    ("right", 124),
    ("down", 125),
    ("up", 126),
];

/// Alternative spellings accepted by [`KeyStroke::from_str`]
const KEY_ALIASES: &[(&str, &str)] = &[
    ("enter", "return"),
    ("esc", "escape"),
    ("backspace", "delete"),
    ("del", "forwarddelete"),
    ("pgup", "pageup"),
    ("pgdn", "pagedown"),
    ("leftarrow", "left"),
    ("rightarrow", "right"),
    ("uparrow", "up"),
    ("downarrow", "down"),
];

/// Look up the virtual key code for a key name
pub fn key_code(name: &str) -> Option<u16> {
    let lower = name.to_ascii_lowercase();
    let canonical = KEY_ALIASES
        .iter()
        .find(|(alias, _)| *alias == lower)
        .map_or(lower.as_str(), |(_, target)| *target);
    KEY_CODES
        .iter()
        .find(|(key, _)| *key == canonical)
        .map(|(_, code)| *code)
}

/// Modifier keys held during a keystroke or click
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Modifiers {
    pub command: bool,
    pub shift: bool,
    pub option: bool,
    pub control: bool,
}

impl Modifiers {
    /// No modifiers
    pub fn none() -> Self {
        Self::default()
    }

    /// Engine bitmask
    pub fn mask(&self) -> i64 {
        let mut mask = 0;
        if self.command {
            mask |= COMMAND_MASK;
        }
        if self.shift {
            mask |= SHIFT_MASK;
        }
        if self.option {
            mask |= OPTION_MASK;
        }
        if self.control {
            mask |= CONTROL_MASK;
        }
        mask
    }

    /// Decode an engine bitmask, ignoring unknown bits
    pub fn from_mask(mask: i64) -> Self {
        Self {
            command: mask & COMMAND_MASK != 0,
            shift: mask & SHIFT_MASK != 0,
            option: mask & OPTION_MASK != 0,
            control: mask & CONTROL_MASK != 0,
        }
    }

    /// Whether no modifier is held
    pub fn is_empty(&self) -> bool {
        self.mask() == 0
    }

    fn set(&mut self, name: &str) -> bool {
        match name {
            "cmd" | "command" | "⌘" => self.command = true,
            "shift" | "⇧" => self.shift = true,
            "opt" | "option" | "alt" | "⌥" => self.option = true,
            "ctrl" | "control" | "⌃" => self.control = true,
            _ => return false,
        }
        true
    }
}

/// A key code with its modifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyStroke {
    pub key_code: u16,
    #[serde(default)]
    pub modifiers: Modifiers,
}

impl KeyStroke {
    /// Keystroke from a raw key code
    pub fn new(key_code: u16, modifiers: Modifiers) -> Self {
        Self {
            key_code,
            modifiers,
        }
    }
}

/// Parses descriptions such as `"cmd+shift+s"` or `"Return"`
impl FromStr for KeyStroke {
    type Err = PlistError;

    fn from_str(input: &str) -> PlistResult<Self> {
        let invalid = |reason: &str| PlistError::InvalidKeyStroke {
            input: input.to_string(),
            reason: reason.to_string(),
        };

        let parts: Vec<String> = input
            .split('+')
            .map(|p| p.trim().to_ascii_lowercase())
            .collect();
        let Some((key, modifier_names)) = parts.split_last() else {
            return Err(invalid("empty keystroke"));
        };
        if key.is_empty() {
            return Err(invalid("missing key"));
        }

        let mut modifiers = Modifiers::none();
        for name in modifier_names {
            if !modifiers.set(name) {
                return Err(invalid(&format!("unknown modifier '{name}'")));
            }
        }

        let key_code = key_code(key).ok_or_else(|| invalid(&format!("unknown key '{key}'")))?;
        Ok(Self {
            key_code,
            modifiers,
        })
    }
}

impl fmt::Display for KeyStroke {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names = [
            (self.modifiers.command, "cmd"),
            (self.modifiers.shift, "shift"),
            (self.modifiers.option, "opt"),
            (self.modifiers.control, "ctrl"),
        ];
        for (held, name) in names {
            if held {
                write!(f, "{name}+")?;
            }
        }
        match KEY_CODES.iter().find(|(_, code)| *code == self.key_code) {
            Some((name, _)) => f.write_str(name),
            None => write!(f, "#{}", self.key_code),
        }
    }
}
