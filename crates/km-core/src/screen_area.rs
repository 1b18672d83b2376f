//! Screen area sub-serializer
//!
//! Region-targeting actions and conditions (found image, OCR, screen
//! capture) share one nested dict shape describing a screen, a window or an
//! explicit rectangle.

use serde::{Deserialize, Serialize};

use crate::error::{PlistError, PlistResult};
use crate::key_order::KeyContext;
use crate::xml::PlistDict;

/// Region of the display an action or condition refers to
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScreenArea {
    /// Every connected screen
    #[default]
    AllScreens,

    /// The main screen
    MainScreen,

    /// A screen identified by its name
    ScreenNamed { name: String },

    /// A screen identified by index (a calculation, 1-based)
    ScreenIndex { index: String },

    /// The front window of the front application
    FrontWindow,

    /// A window of the front application identified by title
    WindowNamed { name: String },

    /// A window of the front application identified by index (a calculation)
    WindowIndex { index: String },

    /// An explicit rectangle; each edge is a calculation
    Area {
        left: String,
        top: String,
        width: String,
        height: String,
    },
}

impl ScreenArea {
    /// Rectangle from integer coordinates
    pub fn rect(left: i64, top: i64, width: i64, height: i64) -> Self {
        ScreenArea::Area {
            left: left.to_string(),
            top: top.to_string(),
            width: width.to_string(),
            height: height.to_string(),
        }
    }

    /// Whether this area covers every screen
    pub fn is_entire_screen(&self) -> bool {
        matches!(self, ScreenArea::AllScreens)
    }

    /// Engine spelling of the area type
    pub fn type_name(&self) -> &'static str {
        match self {
            ScreenArea::AllScreens => "ScreenAll",
            ScreenArea::MainScreen => "ScreenMain",
            ScreenArea::ScreenNamed { .. } => "ScreenWithName",
            ScreenArea::ScreenIndex { .. } => "ScreenIndex",
            ScreenArea::FrontWindow => "WindowFront",
            ScreenArea::WindowNamed { .. } => "WindowWithName",
            ScreenArea::WindowIndex { .. } => "WindowIndex",
            ScreenArea::Area { .. } => "Area",
        }
    }

    /// Reject areas with a blank name, index or edge
    pub fn validate(&self) -> PlistResult<()> {
        let blank = |field: &str, value: &str| {
            if value.trim().is_empty() {
                Err(PlistError::InvalidScreenArea(format!(
                    "{} requires a non-empty {field}",
                    self.type_name()
                )))
            } else {
                Ok(())
            }
        };

        match self {
            ScreenArea::AllScreens | ScreenArea::MainScreen | ScreenArea::FrontWindow => Ok(()),
            ScreenArea::ScreenNamed { name } | ScreenArea::WindowNamed { name } => {
                blank("name", name)
            }
            ScreenArea::ScreenIndex { index } | ScreenArea::WindowIndex { index } => {
                blank("index", index)
            }
            ScreenArea::Area {
                left,
                top,
                width,
                height,
            } => {
                blank("left", left)?;
                blank("top", top)?;
                blank("width", width)?;
                blank("height", height)
            }
        }
    }

    /// Render as the nested `ScreenArea` dict
    pub fn to_dict(&self) -> PlistDict {
        let mut dict = PlistDict::new(KeyContext::Default);
        dict.insert("ScreenAreaType", self.type_name());

        match self {
            ScreenArea::AllScreens | ScreenArea::MainScreen | ScreenArea::FrontWindow => {}
            ScreenArea::ScreenNamed { name } => dict.insert("ScreenAreaScreenName", name.as_str()),
            ScreenArea::ScreenIndex { index } => {
                dict.insert("ScreenAreaScreenIndexExpression", index.as_str())
            }
            ScreenArea::WindowNamed { name } => dict.insert("ScreenAreaWindowName", name.as_str()),
            ScreenArea::WindowIndex { index } => {
                dict.insert("ScreenAreaWindowIndexExpression", index.as_str())
            }
            ScreenArea::Area {
                left,
                top,
                width,
                height,
            } => {
                dict.insert("ScreenAreaAreaLeft", left.as_str());
                dict.insert("ScreenAreaAreaTop", top.as_str());
                dict.insert("ScreenAreaAreaWidth", width.as_str());
                dict.insert("ScreenAreaAreaHeight", height.as_str());
            }
        }
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
    fn test_default_is_entire_screen() {
        let area = ScreenArea::default();
        assert!(area.is_entire_screen());
        assert_eq!(
            area.to_xml(0),
            "<dict>\n\t<key>ScreenAreaType</key>\n\t<string>ScreenAll</string>\n</dict>\n"
        );
    }

    #[test]
    fn test_rectangle_keys_are_alphabetical() {
        let xml = ScreenArea::rect(10, 20, 300, 400).to_xml(0);
        let keys: Vec<&str> = xml
            .lines()
            .filter_map(|l| l.trim().strip_prefix("<key>"))
            .map(|l| l.trim_end_matches("</key>"))
            .collect();
        assert_eq!(
            keys,
            vec![
                "ScreenAreaAreaHeight",
                "ScreenAreaAreaLeft",
                "ScreenAreaAreaTop",
                "ScreenAreaAreaWidth",
                "ScreenAreaType",
            ]
        );
    }

    #[test]
    fn test_validate_blank_fields() {
        assert!(ScreenArea::WindowNamed { name: " ".into() }.validate().is_err());
        assert!(ScreenArea::ScreenIndex { index: "2".into() }.validate().is_ok());
        assert!(ScreenArea::Area {
            left: "0".into(),
            top: "0".into(),
            width: "".into(),
            height: "10".into(),
        }
        .validate()
        .is_err());
    }

    #[test]
    fn test_deserialize_tagged() {
        let area: ScreenArea =
            serde_json::from_str(r#"{"type": "window_named", "name": "Inbox"}"#).unwrap();
        assert_eq!(area, ScreenArea::WindowNamed { name: "Inbox".into() });
        assert_eq!(area.to_dict().get("ScreenAreaWindowName").and_then(|v| v.as_str()), Some("Inbox"));
    }
}
