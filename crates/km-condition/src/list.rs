//! Condition lists used by control-flow actions

use serde::{Deserialize, Serialize};

use km_core::{PlistDict, PlistValue};

use crate::condition::Condition;

km_core::engine_keyword! {
    /// How the results of a condition list combine
    #[derive(Default)]
    pub enum MatchType {
        #[default]
        All => "All",
        Any => "Any",
        None => "None",
        NotAll => "NotAll",
    }
}

/// A list of conditions combined by a [`MatchType`]
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConditionList {
    pub match_type: MatchType,
    pub conditions: Vec<Condition>,
}

impl ConditionList {
    /// All conditions must hold
    pub fn all(conditions: Vec<Condition>) -> Self {
        Self {
            match_type: MatchType::All,
            conditions,
        }
    }

    /// At least one condition must hold
    pub fn any(conditions: Vec<Condition>) -> Self {
        Self {
            match_type: MatchType::Any,
            conditions,
        }
    }

    /// A list holding a single condition
    pub fn single(condition: Condition) -> Self {
        Self::all(vec![condition])
    }

    /// Normalize every condition
    pub fn normalize(self) -> Self {
        Self {
            match_type: self.match_type,
            conditions: self.conditions.into_iter().map(Condition::normalize).collect(),
        }
    }

    /// Render as the `Conditions` dict of a control-flow action
    pub fn to_dict(&self) -> PlistDict {
        let conditions: Vec<PlistValue> = self
            .conditions
            .iter()
            .map(|c| PlistValue::Dict(c.to_dict()))
            .collect();
        PlistDict::plain()
            .with("ConditionList", conditions)
            .with("ConditionListMatch", self.match_type.as_str())
    }

    /// Render as XML at the given depth
    pub fn to_xml(&self, depth: usize) -> String {
        self.to_dict().to_xml(depth)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::CalculationCondition;

    #[test]
    fn test_empty_list_renders_self_closing_array() {
        let xml = ConditionList::default().to_xml(0);
        assert_eq!(
            xml,
            "<dict>\n\
             \t<key>ConditionList</key>\n\
             \t<array/>\n\
             \t<key>ConditionListMatch</key>\n\
             \t<string>All</string>\n\
             </dict>\n"
        );
    }

    #[test]
    fn test_nested_conditions_are_indented() {
        let list = ConditionList::any(vec![Condition::Calculation(CalculationCondition::new(
            "1 + 1 = 2",
        ))]);
        let xml = list.to_xml(1);
        assert!(xml.contains("\t\t\t<dict>\n\t\t\t\t<key>ConditionType</key>\n"));
        assert!(xml.contains("<string>Any</string>"));
    }
}
