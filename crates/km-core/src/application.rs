//! Application selector sub-serializer
//!
//! Actions and conditions that target an application carry a nested dict
//! describing it. A frontmost target renders as an empty dict; a specific
//! target renders only the fields that were supplied, in the engine's
//! application key order.

use serde::{Deserialize, Serialize};

use crate::key_order::KeyContext;
use crate::xml::PlistDict;

crate::engine_keyword! {
    /// How the engine resolves a specific application
    pub enum ApplicationMatch {
        BundleId => "BundleID",
        Name => "Name",
    }
}

/// Fields identifying a specific application
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SpecificApplication {
    /// Display name (e.g. "Safari")
    pub name: Option<String>,

    /// Bundle identifier (e.g. "com.apple.Safari")
    pub bundle_id: Option<String>,

    /// Path to the application bundle
    pub path: Option<String>,

    /// How the engine should match the application
    pub match_mode: Option<ApplicationMatch>,

    /// File the application is relaunched with
    pub relaunch_file: Option<String>,
}

impl SpecificApplication {
    /// Whether any identifying field is present
    pub fn is_populated(&self) -> bool {
        [&self.name, &self.bundle_id, &self.path, &self.relaunch_file]
            .iter()
            .any(|field| field.as_deref().is_some_and(|v| !v.is_empty()))
            || self.match_mode.is_some()
    }

    /// Whether the engine can resolve this application (by name, bundle or path)
    pub fn is_resolvable(&self) -> bool {
        [&self.name, &self.bundle_id, &self.path]
            .iter()
            .any(|field| field.as_deref().is_some_and(|v| !v.trim().is_empty()))
    }
}

/// Which application an action or condition targets
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ApplicationTarget {
    /// Whatever application is frontmost when the action runs
    #[default]
    Frontmost,

    /// A specific application
    Specific(SpecificApplication),
}

impl ApplicationTarget {
    /// The frontmost application
    pub fn frontmost() -> Self {
        ApplicationTarget::Frontmost
    }

    /// A specific application by display name
    pub fn named(name: impl Into<String>) -> Self {
        ApplicationTarget::Specific(SpecificApplication {
            name: Some(name.into()),
            ..Default::default()
        })
    }

    /// A specific application by bundle identifier and display name
    pub fn bundle(bundle_id: impl Into<String>, name: impl Into<String>) -> Self {
        ApplicationTarget::Specific(SpecificApplication {
            name: Some(name.into()),
            bundle_id: Some(bundle_id.into()),
            ..Default::default()
        })
    }

    /// Whether this targets the frontmost application
    pub fn is_frontmost(&self) -> bool {
        matches!(self, ApplicationTarget::Frontmost)
    }

    /// Engine spelling of the targeting mode
    pub fn targeting_type(&self) -> &'static str {
        match self {
            ApplicationTarget::Frontmost => "Front",
            ApplicationTarget::Specific(_) => "Specific",
        }
    }

    /// Render the selector dict
    pub fn to_dict(&self) -> PlistDict {
        let mut dict = PlistDict::new(KeyContext::Application);
        let ApplicationTarget::Specific(app) = self else {
            return dict;
        };

        let non_empty = |value: &Option<String>| value.clone().filter(|v| !v.is_empty());
        dict.insert_opt("BundleIdentifier", non_empty(&app.bundle_id));
        dict.insert_opt("Match", app.match_mode.map(|m| m.as_str()));
        dict.insert_opt("Name", non_empty(&app.name));
        dict.insert_opt("NewFile", non_empty(&app.relaunch_file));
        dict.insert_opt("Path", non_empty(&app.path));
        dict
    }

    /// Render as XML at the given depth
    pub fn to_xml(&self, depth: usize) -> String {
        self.to_dict().to_xml(depth)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frontmost_renders_empty_dict() {
        assert_eq!(ApplicationTarget::frontmost().to_xml(0), "<dict/>\n");
    }

    #[test]
    fn test_specific_uses_application_key_order() {
        let target = ApplicationTarget::Specific(SpecificApplication {
            name: Some("Safari".into()),
            bundle_id: Some("com.apple.Safari".into()),
            path: Some("/Applications/Safari.app".into()),
            match_mode: Some(ApplicationMatch::BundleId),
            relaunch_file: None,
        });

        let expected = "<dict>\n\
            \t<key>BundleIdentifier</key>\n\
            \t<string>com.apple.Safari</string>\n\
            \t<key>Match</key>\n\
            \t<string>BundleID</string>\n\
            \t<key>Name</key>\n\
            \t<string>Safari</string>\n\
            \t<key>Path</key>\n\
            \t<string>/Applications/Safari.app</string>\n\
            </dict>\n";
        assert_eq!(target.to_xml(0), expected);
    }

    #[test]
    fn test_empty_fields_are_not_rendered() {
        let target = ApplicationTarget::Specific(SpecificApplication {
            name: Some(String::new()),
            ..Default::default()
        });
        assert!(target.to_dict().is_empty());
        if let ApplicationTarget::Specific(app) = &target {
            assert!(!app.is_populated());
            assert!(!app.is_resolvable());
        }
    }

    #[test]
    fn test_targeting_type() {
        assert_eq!(ApplicationTarget::frontmost().targeting_type(), "Front");
        assert_eq!(ApplicationTarget::named("Mail").targeting_type(), "Specific");
    }

    #[test]
    fn test_deserialize_specific() {
        let target: ApplicationTarget = serde_json::from_str(
            r#"{"type": "specific", "bundle_id": "com.apple.mail", "match_mode": "BundleId"}"#,
        )
        .unwrap();
        assert_eq!(
            target.to_dict().get("Match").and_then(|v| v.as_str()),
            Some("BundleID")
        );
    }
}
