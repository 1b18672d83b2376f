//! File system conditions

use serde::{Deserialize, Serialize};

use km_core::PlistDict;

use crate::condition::{ConditionKind, ConditionRules};
use crate::operators::NumericOperator;

km_core::engine_keyword! {
    /// Attribute of a file that can be compared
    #[derive(Default)]
    pub enum FileAttribute {
        #[default]
        Size => "Size",
        CreationDate => "CreationDate",
        ModificationDate => "ModificationDate",
        ItemCount => "ItemCount",
    }
}

/// Compares a numeric attribute of a file
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileAttributeCondition {
    pub path: String,
    pub attribute: FileAttribute,
    pub operator: NumericOperator,
    /// Calculation compared against the attribute
    pub value: String,
}

impl ConditionRules for FileAttributeCondition {
    const KIND: ConditionKind = ConditionKind::FileAttribute;

    fn normalize(mut self) -> Self {
        if self.value.trim().is_empty() {
            self.value = "0".to_string();
        }
        self
    }

    fn write_fields(&self, dict: &mut PlistDict) {
        dict.insert("FileAttribute", self.attribute.as_str());
        dict.insert("FileAttributeConditionType", self.operator.as_str());
        dict.insert("FileAttributeValue", self.value.as_str());
        dict.insert("Path", self.path.as_str());
    }
}

km_core::engine_keyword! {
    /// What to test about a path
    #[derive(Default)]
    pub enum PathTest {
        #[default]
        Exists => "Exists",
        DoesNotExist => "DoesNotExist",
        IsFile => "IsFile",
        IsFolder => "IsFolder",
        IsApplication => "IsApplication",
    }
}

/// Tests the existence or type of a path
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PathCondition {
    pub path: String,
    pub test: PathTest,
}

impl ConditionRules for PathCondition {
    const KIND: ConditionKind = ConditionKind::Path;

    fn write_fields(&self, dict: &mut PlistDict) {
        dict.insert("Path", self.path.as_str());
        dict.insert("PathConditionType", self.test.as_str());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_attribute_value_defaults_to_zero() {
        let condition = FileAttributeCondition {
            path: "~/Desktop/report.pdf".into(),
            ..Default::default()
        }
        .normalize();
        assert_eq!(condition.value, "0");
        assert_eq!(condition.clone().normalize(), condition);
    }

    #[test]
    fn test_path_condition_keys() {
        let mut dict = PlistDict::plain();
        PathCondition {
            path: "/tmp".into(),
            test: PathTest::IsFolder,
        }
        .write_fields(&mut dict);
        assert_eq!(dict.get("PathConditionType").and_then(|v| v.as_str()), Some("IsFolder"));
    }
}
