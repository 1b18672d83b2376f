//! Pixel colour condition
//!
//! The engine stores two operators: the one shown in the editor
//! (`PixelConditionTypeForMatch`, the expected operator) and a companion
//! (`PixelConditionType`, the observed operator) that it always derives from
//! the first. Each operator in [`PIXEL_CYCLE`] is paired with its successor;
//! the final operator is paired with itself, exactly as the engine exports it.

use serde::{Deserialize, Serialize};
use tracing::debug;

use km_core::PlistDict;

use crate::condition::{ConditionKind, ConditionRules};

km_core::engine_keyword! {
    /// Colour comparison between the sampled pixel and the reference colour
    #[derive(Default)]
    pub enum PixelOperator {
        #[default]
        Is => "Is",
        IsNot => "IsNot",
        IsBrighter => "IsBrighter",
        IsDarker => "IsDarker",
        IsMoreRed => "IsMoreRed",
        IsLessRed => "IsLessRed",
        IsMoreGreen => "IsMoreGreen",
        IsLessGreen => "IsLessGreen",
        IsMoreBlue => "IsMoreBlue",
        IsLessBlue => "IsLessBlue",
    }
}

/// Operators in the order the engine cycles through them
pub const PIXEL_CYCLE: &[PixelOperator] = PixelOperator::ALL;

/// The observed operator the engine pairs with an expected operator
pub fn observed_for(expected: PixelOperator) -> PixelOperator {
    let position = PIXEL_CYCLE
        .iter()
        .position(|op| *op == expected)
        .unwrap_or_default();
    PIXEL_CYCLE
        .get(position + 1)
        .copied()
        .unwrap_or(expected)
}

/// The first expected operator whose pair is `observed`
pub fn expected_for(observed: PixelOperator) -> Option<PixelOperator> {
    PIXEL_CYCLE
        .iter()
        .copied()
        .find(|candidate| observed_for(*candidate) == observed)
}

/// Compares the colour of one pixel
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PixelCondition {
    /// Operator shown in the editor
    pub expected: Option<PixelOperator>,
    /// Companion operator, realigned from `expected` on normalization
    pub observed: Option<PixelOperator>,
    /// Horizontal coordinate (a calculation)
    pub horizontal: String,
    /// Vertical coordinate (a calculation)
    pub vertical: String,
    /// Reference colour as `r,g,b`
    pub colour: String,
}

impl PixelCondition {
    /// Build from engine spellings, discarding any that are not valid operators
    pub fn from_engine_names(expected: Option<&str>, observed: Option<&str>) -> Self {
        let parse = |name: Option<&str>| {
            let name = name?;
            let parsed = PixelOperator::from_engine(name);
            if parsed.is_none() {
                debug!("Ignoring unknown pixel operator {:?}", name);
            }
            parsed
        };
        Self {
            expected: parse(expected),
            observed: parse(observed),
            ..Default::default()
        }
    }

    /// Condition with only the expected operator set
    pub fn expecting(expected: PixelOperator) -> Self {
        Self {
            expected: Some(expected),
            ..Default::default()
        }
    }
}

impl ConditionRules for PixelCondition {
    const KIND: ConditionKind = ConditionKind::Pixel;

    fn normalize(mut self) -> Self {
        let expected = match (self.expected, self.observed) {
            (Some(expected), _) => expected,
            (None, Some(observed)) => expected_for(observed).unwrap_or_else(|| {
                debug!("No expected operator pairs with {}, using Is", observed);
                PixelOperator::Is
            }),
            (None, None) => PixelOperator::Is,
        };
        let observed = observed_for(expected);
        if self.observed.is_some_and(|supplied| supplied != observed) {
            debug!(
                "Realigned pixel operator {:?} to {} for {}",
                self.observed, observed, expected
            );
        }

        self.expected = Some(expected);
        self.observed = Some(observed);
        if self.horizontal.trim().is_empty() {
            self.horizontal = "0".to_string();
        }
        if self.vertical.trim().is_empty() {
            self.vertical = "0".to_string();
        }
        self
    }

    fn write_fields(&self, dict: &mut PlistDict) {
        let expected = self.expected.unwrap_or_default();
        let observed = self.observed.unwrap_or_else(|| observed_for(expected));
        dict.insert("Colour", self.colour.as_str());
        dict.insert("HorizontalExpression", self.horizontal.as_str());
        dict.insert("PixelConditionType", observed.as_str());
        dict.insert("PixelConditionTypeForMatch", expected.as_str());
        dict.insert("VerticalExpression", self.vertical.as_str());
    }
}
