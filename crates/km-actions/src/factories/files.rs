//! File, URL, sound and screen-capture actions

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use km_core::{ApplicationTarget, ScreenArea};

use crate::action::{require, require_variable, ActionBody, VirtualAction};
use crate::error::{ActionError, ActionResult};
use crate::options::{FailureOptions, TimeoutOptions};

/// Options for [`open_file`]
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenFileOptions {
    pub path: String,
    /// Application used to open the file; frontmost means the default handler
    pub application: ApplicationTarget,
}

/// Open a file or folder
pub fn open_file(options: &OpenFileOptions) -> ActionResult<VirtualAction> {
    require("Open", "path", &options.path)?;
    Ok(ActionBody::new()
        .set("Application", options.application.to_dict())
        .set("Path", options.path.trim())
        .build("Open"))
}

fn url_scheme() -> Result<&'static Regex, &'static regex::Error> {
    static PATTERN: OnceLock<Result<Regex, regex::Error>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"^[A-Za-z][A-Za-z0-9+.\-]*:\S+$"))
        .as_ref()
}

/// Options for [`open_url`]
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenUrlOptions {
    pub url: String,
    /// Open in the background
    pub background: bool,
    pub application: ApplicationTarget,
}

/// Open a URL with its default or a given application
pub fn open_url(options: &OpenUrlOptions) -> ActionResult<VirtualAction> {
    const ACTION: &str = "OpenURL";
    require(ACTION, "url", &options.url)?;
    let url = options.url.trim();
    // Tokens are expanded by the engine at run time and cannot be checked here
    if !url.contains('%') {
        let pattern = url_scheme().map_err(|e| ActionError::invalid(ACTION, e.to_string()))?;
        if !pattern.is_match(url) {
            return Err(ActionError::invalid(
                ACTION,
                format!("'{url}' has no URL scheme"),
            ));
        }
    }
    Ok(ActionBody::new()
        .set("Application", options.application.to_dict())
        .flag("OpenInBackground", options.background, false)
        .set("URL", url)
        .build(ACTION))
}

/// Options for [`play_sound`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SoundOptions {
    pub path: String,
    /// Volume percentage, 0 to 100
    pub volume: i64,
    /// Output device; empty for the system default
    pub device: String,
    /// Continue the macro while the sound plays
    pub asynchronous: bool,
}

impl Default for SoundOptions {
    fn default() -> Self {
        Self {
            path: "/System/Library/Sounds/Glass.aiff".to_string(),
            volume: 100,
            device: String::new(),
            asynchronous: true,
        }
    }
}

/// Play a sound file
pub fn play_sound(options: &SoundOptions) -> ActionResult<VirtualAction> {
    const ACTION: &str = "PlaySound";
    require(ACTION, "path", &options.path)?;
    if !(0..=100).contains(&options.volume) {
        return Err(ActionError::invalid(
            ACTION,
            format!("volume {} is outside 0..=100", options.volume),
        ));
    }
    let device = if options.device.trim().is_empty() {
        "SOUNDEFFECTS"
    } else {
        options.device.trim()
    };
    Ok(ActionBody::new()
        .set("Asynchronously", options.asynchronous)
        .set("DeviceID", device)
        .set("Path", options.path.trim())
        .set("Volume", options.volume)
        .build(ACTION))
}

/// Where a screen capture is saved
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CaptureDestination {
    #[default]
    Clipboard,
    File { path: String },
    Variable { name: String },
}

/// Options for [`screen_capture`]
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureOptions {
    pub area: ScreenArea,
    pub destination: CaptureDestination,
    /// Add the window shadow when capturing a window
    pub shadow: bool,
}

/// Capture part of the screen
pub fn screen_capture(options: &CaptureOptions) -> ActionResult<VirtualAction> {
    const ACTION: &str = "ScreenCapture";
    options.area.validate()?;

    let body = ActionBody::new()
        .set("ScreenArea", options.area.to_dict())
        .flag("IncludeShadow", options.shadow, false);
    let body = match &options.destination {
        CaptureDestination::Clipboard => body.set("Destination", "Clipboard"),
        CaptureDestination::File { path } => {
            require(ACTION, "path", path)?;
            body.set("Destination", "File").set("Path", path.trim())
        }
        CaptureDestination::Variable { name } => {
            require_variable(ACTION, name)?;
            body.set("Destination", "Variable")
                .set("Variable", name.trim())
        }
    };
    Ok(body.build(ACTION))
}

km_core::engine_keyword! {
    /// File operation
    #[derive(Default)]
    pub enum FileOperation {
        #[default]
        Copy => "Copy",
        Move => "Move",
        Rename => "Rename",
        Duplicate => "Duplicate",
        Trash => "Trash",
        Delete => "Delete",
        CreateFolder => "CreateFolder",
        Reveal => "Reveal",
    }
}

impl FileOperation {
    /// Whether the operation writes somewhere other than its source
    pub fn needs_destination(&self) -> bool {
        matches!(
            self,
            FileOperation::Copy | FileOperation::Move | FileOperation::Rename
        )
    }
}

/// Options for [`file_action`]
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileOptions {
    pub operation: FileOperation,
    pub source: String,
    pub destination: String,
    pub failure: FailureOptions,
}

/// Copy, move, rename, trash or otherwise act on a file
pub fn file_action(options: &FileOptions) -> ActionResult<VirtualAction> {
    const ACTION: &str = "File";
    require(ACTION, "source", &options.source)?;
    if options.operation.needs_destination() {
        require(ACTION, "destination", &options.destination)?;
    } else if !options.destination.trim().is_empty() {
        return Err(ActionError::invalid(
            ACTION,
            format!("{} takes no destination", options.operation),
        ));
    }
    Ok(ActionBody::new()
        .set("Action", options.operation.as_str())
        .set("Destination", options.destination.trim())
        .set("Source", options.source.trim())
        .apply(|d| options.failure.write(d))
        .build(ACTION))
}

/// Read a text file into a variable
pub fn read_file(path: &str, variable: &str) -> ActionResult<VirtualAction> {
    const ACTION: &str = "ReadFile";
    require(ACTION, "path", path)?;
    require_variable(ACTION, variable)?;
    Ok(ActionBody::new()
        .set("Destination", "Variable")
        .set("Path", path.trim())
        .set("Variable", variable.trim())
        .build(ACTION))
}

/// Options for [`write_file`]
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WriteFileOptions {
    pub path: String,
    pub text: String,
    /// Append instead of replacing the file's contents
    pub append: bool,
    pub timeout: TimeoutOptions,
}

/// Write or append text to a file
pub fn write_file(options: &WriteFileOptions) -> ActionResult<VirtualAction> {
    const ACTION: &str = "WriteFile";
    require(ACTION, "path", &options.path)?;
    Ok(ActionBody::new()
        .set("Action", if options.append { "Append" } else { "Write" })
        .set("Path", options.path.trim())
        .set("Source", "Text")
        .set("Text", options.text.as_str())
        .apply(|d| options.timeout.write(d))
        .build(ACTION))
}

#[cfg(test)]
mod tests {
    use super::*;
    use km_core::{PlistError, PlistValue};

    #[test]
    fn test_open_url_needs_scheme() {
        let ok = open_url(&OpenUrlOptions {
            url: "https://example.com/path".into(),
            ..Default::default()
        });
        assert!(ok.is_ok());

        let bare = open_url(&OpenUrlOptions {
            url: "example.com".into(),
            ..Default::default()
        });
        assert!(bare.is_err());

        let token = open_url(&OpenUrlOptions {
            url: "%Variable%Link%".into(),
            ..Default::default()
        });
        assert!(token.is_ok());
    }

    #[test]
    fn test_sound_volume_range() {
        assert!(play_sound(&SoundOptions::default()).is_ok());
        let loud = SoundOptions {
            volume: 150,
            ..Default::default()
        };
        assert!(play_sound(&loud).is_err());
    }

    #[test]
    fn test_capture_rejects_blank_area() {
        let options = CaptureOptions {
            area: ScreenArea::WindowNamed { name: " ".into() },
            ..Default::default()
        };
        assert!(matches!(
            screen_capture(&options),
            Err(ActionError::Plist(PlistError::InvalidScreenArea(_)))
        ));
    }

    #[test]
    fn test_capture_to_variable() {
        let action = screen_capture(&CaptureOptions {
            area: ScreenArea::FrontWindow,
            destination: CaptureDestination::Variable {
                name: "Shot".into(),
            },
            shadow: false,
        })
        .unwrap();
        assert_eq!(action.get("Destination").and_then(|v| v.as_str()), Some("Variable"));
        assert!(action.get("IncludeShadow").is_none());
    }

    #[test]
    fn test_file_destination_rules() {
        let copy = FileOptions {
            operation: FileOperation::Copy,
            source: "~/a.txt".into(),
            ..Default::default()
        };
        assert!(file_action(&copy).is_err());

        let trash = FileOptions {
            operation: FileOperation::Trash,
            source: "~/a.txt".into(),
            destination: "~/b.txt".into(),
            ..Default::default()
        };
        assert!(file_action(&trash).is_err());
    }

    #[test]
    fn test_write_file_append() {
        let action = write_file(&WriteFileOptions {
            path: "/tmp/log.txt".into(),
            text: "line".into(),
            append: true,
            ..Default::default()
        })
        .unwrap();
        assert_eq!(action.get("Action"), Some(&PlistValue::string("Append")));
    }
}
