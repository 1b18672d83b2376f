//! Condition definitions and dispatch
//!
//! A [`Condition`] is a closed sum of every condition kind the engine
//! understands. Each kind is a plain data struct implementing
//! [`ConditionRules`], which pairs the kind's normalizer with its renderer;
//! the dispatch below matches exhaustively, so adding a variant without both
//! halves fails to compile.

use serde::{Deserialize, Serialize};

use km_core::key_order::CONDITION_DISCRIMINANT;
use km_core::{KeyContext, PlistDict};

use crate::files::{FileAttributeCondition, PathCondition};
use crate::image::{ImageFoundCondition, OcrCondition};
use crate::pixel::PixelCondition;
use crate::script::ScriptCondition;
use crate::state::{
    ApplicationCondition, ButtonCondition, CalculationCondition, ClipboardCondition,
    EnvironmentVariableCondition, KeyCondition, LocationCondition, MacroCondition, MenuCondition,
    ModifiersCondition, MountedVolumeCondition, MouseButtonCondition, TextCondition,
    TypedStringCondition, UsbDeviceCondition, VariableCondition, WirelessNetworkCondition,
};
use crate::window::{AnyWindowCondition, FrontWindowCondition};

km_core::engine_keyword! {
    /// Condition discriminant, spelled as the `ConditionType` value
    pub enum ConditionKind {
        Application => "Application",
        Button => "Button",
        Clipboard => "Clipboard",
        Calculation => "Calculation",
        EnvironmentVariable => "EnvironmentVariable",
        FileAttribute => "FileAttribute",
        ImageFound => "ScreenImage",
        Key => "Key",
        Location => "Location",
        Macro => "Macro",
        Menu => "Menu",
        Modifiers => "Modifiers",
        MountedVolume => "MountedVolume",
        MouseButton => "MouseButton",
        Ocr => "OCR",
        Path => "Path",
        Pixel => "Pixel",
        Script => "Script",
        Text => "Text",
        TypedString => "TypedString",
        UsbDevice => "USBDevice",
        Variable => "Variable",
        AnyWindow => "AnyWindow",
        FrontWindow => "FrontWindow",
        WirelessNetwork => "WirelessNetwork",
    }
}

/// Normalization and rendering rules for one condition kind
pub trait ConditionRules: Sized {
    /// Discriminant written as `ConditionType`
    const KIND: ConditionKind;

    /// Coerce to the shape the engine echoes back
    ///
    /// Never fails and is idempotent.
    fn normalize(self) -> Self {
        self
    }

    /// Write every key except the discriminant
    ///
    /// Called on an already-normalized value.
    fn write_fields(&self, dict: &mut PlistDict);
}

/// A typed condition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Condition {
    Application(ApplicationCondition),
    Button(ButtonCondition),
    Clipboard(ClipboardCondition),
    Calculation(CalculationCondition),
    EnvironmentVariable(EnvironmentVariableCondition),
    FileAttribute(FileAttributeCondition),
    ImageFound(ImageFoundCondition),
    Key(KeyCondition),
    Location(LocationCondition),
    Macro(MacroCondition),
    Menu(MenuCondition),
    Modifiers(ModifiersCondition),
    MountedVolume(MountedVolumeCondition),
    MouseButton(MouseButtonCondition),
    Ocr(OcrCondition),
    Path(PathCondition),
    Pixel(PixelCondition),
    Script(ScriptCondition),
    Text(TextCondition),
    TypedString(TypedStringCondition),
    UsbDevice(UsbDeviceCondition),
    Variable(VariableCondition),
    AnyWindow(AnyWindowCondition),
    FrontWindow(FrontWindowCondition),
    WirelessNetwork(WirelessNetworkCondition),
}

fn render<C: ConditionRules>(condition: &C) -> PlistDict {
    let mut dict = PlistDict::new(KeyContext::Condition);
    condition.write_fields(&mut dict);
    dict.insert(CONDITION_DISCRIMINANT, C::KIND.as_str());
    dict
}

impl Condition {
    /// The discriminant of this condition
    pub fn kind(&self) -> ConditionKind {
        match self {
            Condition::Application(_) => ApplicationCondition::KIND,
            Condition::Button(_) => ButtonCondition::KIND,
            Condition::Clipboard(_) => ClipboardCondition::KIND,
            Condition::Calculation(_) => CalculationCondition::KIND,
            Condition::EnvironmentVariable(_) => EnvironmentVariableCondition::KIND,
            Condition::FileAttribute(_) => FileAttributeCondition::KIND,
            Condition::ImageFound(_) => ImageFoundCondition::KIND,
            Condition::Key(_) => KeyCondition::KIND,
            Condition::Location(_) => LocationCondition::KIND,
            Condition::Macro(_) => MacroCondition::KIND,
            Condition::Menu(_) => MenuCondition::KIND,
            Condition::Modifiers(_) => ModifiersCondition::KIND,
            Condition::MountedVolume(_) => MountedVolumeCondition::KIND,
            Condition::MouseButton(_) => MouseButtonCondition::KIND,
            Condition::Ocr(_) => OcrCondition::KIND,
            Condition::Path(_) => PathCondition::KIND,
            Condition::Pixel(_) => PixelCondition::KIND,
            Condition::Script(_) => ScriptCondition::KIND,
            Condition::Text(_) => TextCondition::KIND,
            Condition::TypedString(_) => TypedStringCondition::KIND,
            Condition::UsbDevice(_) => UsbDeviceCondition::KIND,
            Condition::Variable(_) => VariableCondition::KIND,
            Condition::AnyWindow(_) => AnyWindowCondition::KIND,
            Condition::FrontWindow(_) => FrontWindowCondition::KIND,
            Condition::WirelessNetwork(_) => WirelessNetworkCondition::KIND,
        }
    }

    /// Apply the per-kind normalizer
    pub fn normalize(self) -> Self {
        match self {
            Condition::Application(c) => Condition::Application(c.normalize()),
            Condition::Button(c) => Condition::Button(c.normalize()),
            Condition::Clipboard(c) => Condition::Clipboard(c.normalize()),
            Condition::Calculation(c) => Condition::Calculation(c.normalize()),
            Condition::EnvironmentVariable(c) => Condition::EnvironmentVariable(c.normalize()),
            Condition::FileAttribute(c) => Condition::FileAttribute(c.normalize()),
            Condition::ImageFound(c) => Condition::ImageFound(c.normalize()),
            Condition::Key(c) => Condition::Key(c.normalize()),
            Condition::Location(c) => Condition::Location(c.normalize()),
            Condition::Macro(c) => Condition::Macro(c.normalize()),
            Condition::Menu(c) => Condition::Menu(c.normalize()),
            Condition::Modifiers(c) => Condition::Modifiers(c.normalize()),
            Condition::MountedVolume(c) => Condition::MountedVolume(c.normalize()),
            Condition::MouseButton(c) => Condition::MouseButton(c.normalize()),
            Condition::Ocr(c) => Condition::Ocr(c.normalize()),
            Condition::Path(c) => Condition::Path(c.normalize()),
            Condition::Pixel(c) => Condition::Pixel(c.normalize()),
            Condition::Script(c) => Condition::Script(c.normalize()),
            Condition::Text(c) => Condition::Text(c.normalize()),
            Condition::TypedString(c) => Condition::TypedString(c.normalize()),
            Condition::UsbDevice(c) => Condition::UsbDevice(c.normalize()),
            Condition::Variable(c) => Condition::Variable(c.normalize()),
            Condition::AnyWindow(c) => Condition::AnyWindow(c.normalize()),
            Condition::FrontWindow(c) => Condition::FrontWindow(c.normalize()),
            Condition::WirelessNetwork(c) => Condition::WirelessNetwork(c.normalize()),
        }
    }

    /// Normalize, then render as a condition dict
    pub fn to_dict(&self) -> PlistDict {
        match self.clone().normalize() {
            Condition::Application(c) => render(&c),
            Condition::Button(c) => render(&c),
            Condition::Clipboard(c) => render(&c),
            Condition::Calculation(c) => render(&c),
            Condition::EnvironmentVariable(c) => render(&c),
            Condition::FileAttribute(c) => render(&c),
            Condition::ImageFound(c) => render(&c),
            Condition::Key(c) => render(&c),
            Condition::Location(c) => render(&c),
            Condition::Macro(c) => render(&c),
            Condition::Menu(c) => render(&c),
            Condition::Modifiers(c) => render(&c),
            Condition::MountedVolume(c) => render(&c),
            Condition::MouseButton(c) => render(&c),
            Condition::Ocr(c) => render(&c),
            Condition::Path(c) => render(&c),
            Condition::Pixel(c) => render(&c),
            Condition::Script(c) => render(&c),
            Condition::Text(c) => render(&c),
            Condition::TypedString(c) => render(&c),
            Condition::UsbDevice(c) => render(&c),
            Condition::Variable(c) => render(&c),
            Condition::AnyWindow(c) => render(&c),
            Condition::FrontWindow(c) => render(&c),
            Condition::WirelessNetwork(c) => render(&c),
        }
    }

    /// Render as XML at the given depth
    pub fn to_xml(&self, depth: usize) -> String {
        self.to_dict().to_xml(depth)
    }

    /// A default-valued condition of the given kind
    pub fn default_of(kind: ConditionKind) -> Self {
        match kind {
            ConditionKind::Application => Condition::Application(Default::default()),
            ConditionKind::Button => Condition::Button(Default::default()),
            ConditionKind::Clipboard => Condition::Clipboard(Default::default()),
            ConditionKind::Calculation => Condition::Calculation(Default::default()),
            ConditionKind::EnvironmentVariable => {
                Condition::EnvironmentVariable(Default::default())
            }
            ConditionKind::FileAttribute => Condition::FileAttribute(Default::default()),
            ConditionKind::ImageFound => Condition::ImageFound(Default::default()),
            ConditionKind::Key => Condition::Key(Default::default()),
            ConditionKind::Location => Condition::Location(Default::default()),
            ConditionKind::Macro => Condition::Macro(Default::default()),
            ConditionKind::Menu => Condition::Menu(Default::default()),
            ConditionKind::Modifiers => Condition::Modifiers(Default::default()),
            ConditionKind::MountedVolume => Condition::MountedVolume(Default::default()),
            ConditionKind::MouseButton => Condition::MouseButton(Default::default()),
            ConditionKind::Ocr => Condition::Ocr(Default::default()),
            ConditionKind::Path => Condition::Path(Default::default()),
            ConditionKind::Pixel => Condition::Pixel(Default::default()),
            ConditionKind::Script => Condition::Script(Default::default()),
            ConditionKind::Text => Condition::Text(Default::default()),
            ConditionKind::TypedString => Condition::TypedString(Default::default()),
            ConditionKind::UsbDevice => Condition::UsbDevice(Default::default()),
            ConditionKind::Variable => Condition::Variable(Default::default()),
            ConditionKind::AnyWindow => Condition::AnyWindow(Default::default()),
            ConditionKind::FrontWindow => Condition::FrontWindow(Default::default()),
            ConditionKind::WirelessNetwork => Condition::WirelessNetwork(Default::default()),
        }
    }
}
