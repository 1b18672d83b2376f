//! Core primitives for Keyboard Maestro export XML
//!
//! This crate provides the building blocks every serializer in the workspace
//! shares: the plist value tree and its renderer, the canonical key ordering
//! the engine uses when it exports a dict, and the styled text codec used by
//! actions that carry rich text.
//!
//! # Output shape
//!
//! ```text
//! <dict>
//!     <key>MacroActionType</key>   ← discriminant first (action context)
//!     <string>Pause</string>
//!     <key>ActionUID</key>         ← volatile identifier second
//!     <integer>15698133</integer>
//!     <key>Time</key>              ← everything else alphabetical
//!     <string>1</string>
//! </dict>
//! ```
//!
//! # Key Types
//!
//! - [`PlistValue`] / [`PlistDict`] - Value tree rendered in the engine's dialect
//! - [`KeyContext`] - Which ordering rule a dict follows
//! - [`ScreenArea`] - Screen, window or rectangle reference
//! - [`ApplicationTarget`] - Frontmost or specific application selector
//! - [`StyledText`] - RTF payload paired with its plain-text mirror
//! - [`TokenTable`] - Friendly placeholder names for engine text tokens

mod error;

pub mod application;
pub mod key_order;
pub mod keys;
pub mod keyword;
pub mod screen_area;
pub mod styled_text;
pub mod tokens;
pub mod xml;

pub use application::{ApplicationMatch, ApplicationTarget, SpecificApplication};
pub use error::{PlistError, PlistResult};
pub use key_order::{canonical_order, KeyContext};
pub use keys::{KeyStroke, Modifiers};
pub use screen_area::ScreenArea;
pub use styled_text::{DecodedStyledText, StyledText};
pub use tokens::TokenTable;
pub use xml::{escape, indent, unescape, PlistDict, PlistValue, PLIST_FOOTER, PLIST_HEADER};
