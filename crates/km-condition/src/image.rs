//! Image-found and OCR conditions
//!
//! Both search a region of the screen (or another image source) and carry a
//! nested `ScreenArea` dict. The engine rewrites the region and template
//! keys on export, so normalization reproduces that rewrite up front.

use serde::{Deserialize, Serialize};
use tracing::debug;

use km_core::{PlistDict, PlistValue, ScreenArea};

use crate::condition::{ConditionKind, ConditionRules};
use crate::operators::TextOperator;

/// Fuzziness the engine assumes when none is given
pub const DEFAULT_FUZZ: i64 = 15;

/// OCR language the engine assumes when none is given
pub const DEFAULT_OCR_LANGUAGE: &str = "en";

km_core::engine_keyword! {
    /// Whether the image must be found or absent
    #[derive(Default)]
    pub enum ImagePresence {
        #[default]
        Found => "Contains",
        NotFound => "DoesNotContain",
    }
}

km_core::engine_keyword! {
    /// Where the template image comes from
    #[derive(Default)]
    pub enum ImageSource {
        /// Image pasted into the condition
        #[default]
        Image => "Image",
        /// Image file on disk
        File => "File",
        /// Current clipboard
        Clipboard => "Clipboard",
        /// Live capture of a screen region
        Screen => "Screen",
    }
}

/// Searches a screen region for a template image
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageFoundCondition {
    pub presence: ImagePresence,
    /// Region searched; defaults to every screen
    pub area: Option<ScreenArea>,
    pub source: ImageSource,
    /// Base64 template when the source is [`ImageSource::Image`]
    pub image_data: Option<String>,
    /// Template path when the source is [`ImageSource::File`]
    pub image_path: Option<String>,
    /// Capture region when the source is [`ImageSource::Screen`]
    pub image_area: Option<ScreenArea>,
    /// Match tolerance, 0 to 100
    pub fuzz: Option<i64>,
    /// Highlight matches while searching
    pub display_matches: Option<bool>,
}

impl ConditionRules for ImageFoundCondition {
    const KIND: ConditionKind = ConditionKind::ImageFound;

    fn normalize(mut self) -> Self {
        let area = self.area.take().unwrap_or_default();

        self.image_area = match self.source {
            ImageSource::Screen => Some(area.clone()),
            _ => None,
        };
        if self.source != ImageSource::Image && self.image_data.take().is_some() {
            debug!("Dropped inline image data for {} source", self.source);
        }
        if self.source != ImageSource::File && self.image_path.take().is_some() {
            debug!("Dropped image path for {} source", self.source);
        }

        self.area = Some(area);
        self.fuzz = Some(self.fuzz.unwrap_or(DEFAULT_FUZZ).clamp(0, 100));
        self.display_matches = Some(self.display_matches.unwrap_or(false));
        self
    }

    fn write_fields(&self, dict: &mut PlistDict) {
        dict.insert("DisplayMatches", self.display_matches.unwrap_or(false));
        dict.insert("Fuzz", self.fuzz.unwrap_or(DEFAULT_FUZZ));
        dict.insert_opt("ImageData", self.image_data.clone().map(PlistValue::Data));
        dict.insert_opt("ImagePath", self.image_path.as_deref());
        dict.insert_opt("ImageScreenArea", self.image_area.as_ref().map(ScreenArea::to_dict));
        dict.insert("ImageSource", self.source.as_str());
        dict.insert(
            "ScreenArea",
            self.area.as_ref().map(ScreenArea::to_dict).unwrap_or_default(),
        );
        dict.insert("ScreenImageConditionType", self.presence.as_str());
    }
}

km_core::engine_keyword! {
    /// Image the OCR condition reads text from
    #[derive(Default)]
    pub enum OcrSource {
        #[default]
        Screen => "Screen",
        Clipboard => "Clipboard",
        File => "File",
    }
}

/// Recognises text in an image and compares it
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrCondition {
    pub operator: TextOperator,
    pub text: String,
    pub source: OcrSource,
    /// Region read when the source is the screen
    pub area: Option<ScreenArea>,
    /// Past clipboard index (a calculation) when the source is the clipboard
    pub clipboard: Option<String>,
    /// Image file when the source is a file
    pub path: Option<String>,
    /// Recognition language code
    pub language: Option<String>,
}

impl ConditionRules for OcrCondition {
    const KIND: ConditionKind = ConditionKind::Ocr;

    fn normalize(mut self) -> Self {
        match self.source {
            OcrSource::Screen => {
                self.area = Some(self.area.take().unwrap_or_default());
                self.clipboard = None;
                self.path = None;
            }
            OcrSource::Clipboard => {
                self.area = None;
                self.path = None;
            }
            OcrSource::File => {
                self.area = None;
                self.clipboard = None;
            }
        }
        if !self.operator.takes_operand() {
            self.text.clear();
        }
        if self.language.as_deref().map_or(true, |l| l.trim().is_empty()) {
            self.language = Some(DEFAULT_OCR_LANGUAGE.to_string());
        }
        self
    }

    fn write_fields(&self, dict: &mut PlistDict) {
        dict.insert("OCRConditionType", self.operator.as_str());
        if self.source != OcrSource::Screen {
            dict.insert("OCRImageSource", self.source.as_str());
        }
        dict.insert(
            "OCRLanguage",
            self.language.as_deref().unwrap_or(DEFAULT_OCR_LANGUAGE),
        );
        if self.operator.takes_operand() {
            dict.insert("OCRText", self.text.as_str());
        }
        dict.insert_opt("Clipboard", self.clipboard.as_deref());
        dict.insert_opt("Path", self.path.as_deref());
        dict.insert_opt("ScreenArea", self.area.as_ref().map(ScreenArea::to_dict));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::Condition;

    #[test]
    fn test_image_found_defaults() {
        let dict = Condition::ImageFound(ImageFoundCondition::default()).to_dict();
        assert_eq!(dict.get("Fuzz"), Some(&PlistValue::Integer(DEFAULT_FUZZ)));
        assert_eq!(dict.get("DisplayMatches"), Some(&PlistValue::Bool(false)));
        let area = dict.get("ScreenArea").and_then(|v| v.as_dict()).unwrap();
        assert_eq!(
            area.get("ScreenAreaType").and_then(|v| v.as_str()),
            Some("ScreenAll")
        );
        assert!(!dict.contains_key("ImageScreenArea"));
    }

    #[test]
    fn test_image_found_screen_source_mirrors_area() {
        let condition = ImageFoundCondition {
            source: ImageSource::Screen,
            area: Some(ScreenArea::FrontWindow),
            image_data: Some("AAAA".into()),
            image_path: Some("/tmp/x.png".into()),
            ..Default::default()
        }
        .normalize();

        assert_eq!(condition.image_area, Some(ScreenArea::FrontWindow));
        assert_eq!(condition.image_data, None);
        assert_eq!(condition.image_path, None);
        assert_eq!(condition.clone().normalize(), condition);
    }

    #[test]
    fn test_image_found_flags_follow_discriminant() {
        let xml = Condition::ImageFound(ImageFoundCondition::default()).to_xml(0);
        let keys: Vec<&str> = xml
            .lines()
            .filter_map(|l| l.trim().strip_prefix("<key>"))
            .map(|l| l.trim_end_matches("</key>"))
            .collect();
        let discriminant = keys.iter().position(|k| *k == "ConditionType").unwrap();
        assert_eq!(keys[discriminant + 1], "DisplayMatches");
    }

    #[test]
    fn test_ocr_screen_source_omits_source_key() {
        let dict = Condition::Ocr(OcrCondition {
            operator: TextOperator::Contains,
            text: "Invoice".into(),
            clipboard: Some("1".into()),
            ..Default::default()
        })
        .to_dict();
        assert!(!dict.contains_key("OCRImageSource"));
        assert!(!dict.contains_key("Clipboard"));
        assert!(dict.contains_key("ScreenArea"));
    }

    #[test]
    fn test_ocr_file_source_prunes_region() {
        let dict = Condition::Ocr(OcrCondition {
            source: OcrSource::File,
            path: Some("~/scan.png".into()),
            area: Some(ScreenArea::MainScreen),
            ..Default::default()
        })
        .to_dict();
        assert_eq!(dict.get("OCRImageSource").and_then(|v| v.as_str()), Some("File"));
        assert_eq!(dict.get("Path").and_then(|v| v.as_str()), Some("~/scan.png"));
        assert!(!dict.contains_key("ScreenArea"));
    }
}
