//! Conditions for Keyboard Maestro control-flow actions
//!
//! Each condition kind is normalized before it is rendered, so the dict it
//! produces already matches what the engine echoes back after an import:
//!
//! - image-found conditions always carry a search region, fuzz and
//!   match-display values
//! - OCR conditions keep only the keys relevant to their image source
//! - window conditions agree on `IsFrontApplication` and the `Application`
//!   selector, and include a title only for operators that use one
//! - pixel conditions realign the observed operator to the expected one
//! - script conditions always carry a variable-inclusion list
//!
//! Normalization never fails; it yields the nearest shape the engine accepts.

pub mod condition;
pub mod files;
pub mod image;
pub mod list;
pub mod operators;
pub mod pixel;
pub mod script;
pub mod state;
pub mod window;

pub use condition::{Condition, ConditionKind, ConditionRules};
pub use files::{FileAttribute, FileAttributeCondition, PathCondition, PathTest};
pub use image::{ImageFoundCondition, ImagePresence, ImageSource, OcrCondition, OcrSource};
pub use list::{ConditionList, MatchType};
pub use operators::{NumericOperator, Presence, PressState, TextOperator};
pub use pixel::{PixelCondition, PixelOperator};
pub use script::{ScriptBody, ScriptCondition, ScriptLanguage, ScriptOutcome, INCLUDE_ALL_VARIABLES};
pub use state::{
    ApplicationCondition, ApplicationState, ButtonCondition, ButtonState, CalculationCondition,
    ClipboardCondition, ClipboardOperator, EnvironmentVariableCondition, KeyCondition,
    LocationCondition, MacroCondition, MacroState, MenuCondition, MenuState, ModifierState,
    ModifiersCondition, MountedVolumeCondition, MouseButtonCondition, TextCondition,
    TypedStringCondition, TypedStringMatch, UsbDeviceCondition, VariableCondition,
    WirelessNetworkCondition,
};
pub use window::{
    AnyWindowCondition, FrontWindowCondition, TitleRequirement, WindowOperator, PLACEHOLDER_TITLE,
};
