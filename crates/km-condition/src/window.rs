//! Front-window and any-window conditions
//!
//! Both target either the frontmost application or a specific one. The
//! engine encodes that choice twice, as `IsFrontApplication` and as the
//! presence of an `Application` selector, and only accepts the two when they
//! agree: the selector is absent for the frontmost application and
//! populated otherwise.

use serde::{Deserialize, Serialize};
use tracing::debug;

use km_core::{ApplicationTarget, PlistDict};

use crate::condition::{ConditionKind, ConditionRules};
use crate::operators::TextOperator;

/// Title written when an operator needs one and none was given
pub const PLACEHOLDER_TITLE: &str = "Untitled";

km_core::engine_keyword! {
    /// Test applied to the front window
    #[derive(Default)]
    pub enum WindowOperator {
        #[default]
        Exists => "Exists",
        DoesNotExist => "DoesNotExist",
        Is => "Is",
        IsNot => "IsNot",
        Contains => "Contains",
        DoesNotContain => "DoesNotContain",
        Matches => "Matches",
        DoesNotMatch => "DoesNotMatch",
        IsFullScreen => "IsFullScreen",
        IsNotFullScreen => "IsNotFullScreen",
    }
}

/// How an operator uses the window title
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TitleRequirement {
    /// Title is written and must be non-empty
    Required,
    /// Title is written and may be empty
    Optional,
    /// Title is not written
    Omitted,
}

impl WindowOperator {
    /// The title class of this operator
    pub fn title_requirement(&self) -> TitleRequirement {
        match self {
            WindowOperator::Is
            | WindowOperator::IsNot
            | WindowOperator::Contains
            | WindowOperator::DoesNotContain
            | WindowOperator::Matches
            | WindowOperator::DoesNotMatch => TitleRequirement::Required,
            WindowOperator::IsFullScreen | WindowOperator::IsNotFullScreen => {
                TitleRequirement::Optional
            }
            WindowOperator::Exists | WindowOperator::DoesNotExist => TitleRequirement::Omitted,
        }
    }
}

/// Coerce a specific selector the engine cannot resolve to the frontmost app
fn normalize_target(target: ApplicationTarget) -> ApplicationTarget {
    match target {
        ApplicationTarget::Specific(app) if !app.is_resolvable() => {
            debug!("Empty application selector, targeting frontmost application");
            ApplicationTarget::Frontmost
        }
        other => other,
    }
}

fn write_target(dict: &mut PlistDict, target: &ApplicationTarget) {
    dict.insert("IsFrontApplication", target.is_frontmost());
    if !target.is_frontmost() {
        dict.insert("Application", target.to_dict());
    }
}

/// Tests the front window of an application
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FrontWindowCondition {
    pub operator: WindowOperator,
    pub title: Option<String>,
    pub application: ApplicationTarget,
}

impl FrontWindowCondition {
    pub fn new(operator: WindowOperator, title: Option<&str>) -> Self {
        Self {
            operator,
            title: title.map(str::to_string),
            application: ApplicationTarget::Frontmost,
        }
    }
}

impl ConditionRules for FrontWindowCondition {
    const KIND: ConditionKind = ConditionKind::FrontWindow;

    fn normalize(mut self) -> Self {
        self.application = normalize_target(self.application);
        self.title = match self.operator.title_requirement() {
            TitleRequirement::Required => match self.title {
                Some(title) if !title.trim().is_empty() => Some(title),
                _ => {
                    debug!("{} needs a title, using placeholder", self.operator);
                    Some(PLACEHOLDER_TITLE.to_string())
                }
            },
            TitleRequirement::Optional => Some(self.title.unwrap_or_default()),
            TitleRequirement::Omitted => None,
        };
        self
    }

    fn write_fields(&self, dict: &mut PlistDict) {
        write_target(dict, &self.application);
        dict.insert("FrontWindowConditionType", self.operator.as_str());
        dict.insert_opt("FrontWindowTitle", self.title.as_deref());
    }
}

/// Tests whether any window of an application matches
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AnyWindowCondition {
    pub operator: TextOperator,
    pub title: String,
    pub application: ApplicationTarget,
}

impl ConditionRules for AnyWindowCondition {
    const KIND: ConditionKind = ConditionKind::AnyWindow;

    fn normalize(mut self) -> Self {
        self.application = normalize_target(self.application);
        self
    }

    fn write_fields(&self, dict: &mut PlistDict) {
        write_target(dict, &self.application);
        dict.insert("AnyWindowConditionType", self.operator.as_str());
        dict.insert("AnyWindowTitle", self.title.as_str());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::Condition;
    use km_core::SpecificApplication;

    #[test]
    fn test_title_classes_are_disjoint_and_total() {
        let mut required = 0;
        let mut optional = 0;
        let mut omitted = 0;
        for op in WindowOperator::ALL {
            match op.title_requirement() {
                TitleRequirement::Required => required += 1,
                TitleRequirement::Optional => optional += 1,
                TitleRequirement::Omitted => omitted += 1,
            }
        }
        assert_eq!((required, optional, omitted), (6, 2, 2));
    }

    #[test]
    fn test_optional_title_renders_empty_string() {
        let condition = Condition::FrontWindow(FrontWindowCondition::new(
            WindowOperator::IsFullScreen,
            None,
        ));
        assert!(condition.to_xml(0).contains("<key>FrontWindowTitle</key>\n\t<string/>"));
    }

    #[test]
    fn test_frontmost_omits_application() {
        let dict = Condition::FrontWindow(FrontWindowCondition::default()).to_dict();
        assert_eq!(dict.get("IsFrontApplication").and_then(|v| v.as_bool()), Some(true));
        assert!(!dict.contains_key("Application"));
    }

    #[test]
    fn test_specific_application_is_populated() {
        let dict = Condition::AnyWindow(AnyWindowCondition {
            application: ApplicationTarget::named("Mail"),
            ..Default::default()
        })
        .to_dict();
        assert_eq!(dict.get("IsFrontApplication").and_then(|v| v.as_bool()), Some(false));
        let app = dict.get("Application").and_then(|v| v.as_dict()).unwrap();
        assert!(!app.is_empty());
        assert_eq!(dict.get("AnyWindowTitle").and_then(|v| v.as_str()), Some(""));
    }

    #[test]
    fn test_unresolvable_selector_becomes_frontmost() {
        let condition = AnyWindowCondition {
            application: ApplicationTarget::Specific(SpecificApplication {
                name: Some("  ".into()),
                ..Default::default()
            }),
            ..Default::default()
        }
        .normalize();
        assert!(condition.application.is_frontmost());
    }
}
