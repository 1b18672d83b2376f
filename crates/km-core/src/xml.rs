//! Plist value tree and XML rendering
//!
//! Renders values in the same layout the engine writes when it exports:
//! one tab per nesting level, self-closing tags for empty strings, arrays and
//! dicts, and `<data>` payloads wrapped at [`DATA_LINE_WIDTH`] columns.

use std::fmt::Write as _;

use crate::key_order::{canonical_order, KeyContext};

/// Document header shared by every envelope
pub const PLIST_HEADER: &str = concat!(
    "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n",
    "<!DOCTYPE plist PUBLIC \"-//Apple//DTD PLIST 1.0//EN\" ",
    "\"http://www.apple.com/DTDs/PropertyList-1.0.dtd\">\n",
    "<plist version=\"1.0\">\n",
);

/// Document footer shared by every envelope
pub const PLIST_FOOTER: &str = "</plist>\n";

/// Width of base64 lines inside `<data>` elements
pub const DATA_LINE_WIDTH: usize = 68;

/// Escape text for use inside an XML element
///
/// Only `&`, `<` and `>` are replaced; the engine leaves quotes alone and
/// escaping them would break byte equality on re-export.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

/// Reverse [`escape`], also accepting quote entities and numeric references
pub fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find('&') {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];
        let Some(end) = tail.find(';') else {
            out.push_str(tail);
            return out;
        };
        let entity = &tail[1..end];
        let decoded = match entity {
            "amp" => Some('&'),
            "lt" => Some('<'),
            "gt" => Some('>'),
            "quot" => Some('"'),
            "apos" => Some('\''),
            _ => decode_numeric_entity(entity),
        };
        match decoded {
            Some(c) => out.push(c),
            None => out.push_str(&tail[..=end]),
        }
        rest = &tail[end + 1..];
    }
    out.push_str(rest);
    out
}

fn decode_numeric_entity(entity: &str) -> Option<char> {
    let digits = entity.strip_prefix('#')?;
    let code = match digits.strip_prefix('x').or_else(|| digits.strip_prefix('X')) {
        Some(hex) => u32::from_str_radix(hex, 16).ok()?,
        None => digits.parse().ok()?,
    };
    char::from_u32(code)
}

/// Indentation prefix for the given depth
pub fn indent(depth: usize) -> String {
    "\t".repeat(depth)
}

/// Wrap a base64 payload into fixed-width lines
pub fn wrap_base64(payload: &str, width: usize) -> Vec<String> {
    let compact: String = payload.chars().filter(|c| !c.is_whitespace()).collect();
    compact
        .as_bytes()
        .chunks(width.max(1))
        .map(|chunk| String::from_utf8_lossy(chunk).into_owned())
        .collect()
}

/// A value in the property-list tree
#[derive(Debug, Clone, PartialEq)]
pub enum PlistValue {
    String(String),
    Integer(i64),
    Real(f64),
    Bool(bool),
    /// Base64 text; whitespace is ignored and re-wrapped on render
    Data(String),
    Array(Vec<PlistValue>),
    Dict(PlistDict),
}

impl PlistValue {
    /// Build a string value
    pub fn string(value: impl Into<String>) -> Self {
        PlistValue::String(value.into())
    }

    /// Build an array of strings
    pub fn string_array<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        PlistValue::Array(items.into_iter().map(|s| PlistValue::String(s.into())).collect())
    }

    /// Borrow the string content, if this is a string
    pub fn as_str(&self) -> Option<&str> {
        match self {
            PlistValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Borrow the nested dict, if this is a dict
    pub fn as_dict(&self) -> Option<&PlistDict> {
        match self {
            PlistValue::Dict(d) => Some(d),
            _ => None,
        }
    }

    /// The boolean value, if this is a boolean
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PlistValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Render this value as an element at the given depth, newline-terminated
    pub fn to_xml(&self, depth: usize) -> String {
        let mut out = String::new();
        self.write_xml(&mut out, depth);
        out
    }

    /// Append this value as an element at the given depth
    pub fn write_xml(&self, out: &mut String, depth: usize) {
        let pad = indent(depth);
        match self {
            PlistValue::String(s) if s.is_empty() => {
                let _ = writeln!(out, "{pad}<string/>");
            }
            PlistValue::String(s) => {
                let _ = writeln!(out, "{pad}<string>{}</string>", escape(s));
            }
            PlistValue::Integer(n) => {
                let _ = writeln!(out, "{pad}<integer>{n}</integer>");
            }
            PlistValue::Real(r) => {
                let _ = writeln!(out, "{pad}<real>{r}</real>");
            }
            PlistValue::Bool(true) => {
                let _ = writeln!(out, "{pad}<true/>");
            }
            PlistValue::Bool(false) => {
                let _ = writeln!(out, "{pad}<false/>");
            }
            PlistValue::Data(payload) => {
                let _ = writeln!(out, "{pad}<data>");
                for line in wrap_base64(payload, DATA_LINE_WIDTH) {
                    let _ = writeln!(out, "{pad}{line}");
                }
                let _ = writeln!(out, "{pad}</data>");
            }
            PlistValue::Array(items) if items.is_empty() => {
                let _ = writeln!(out, "{pad}<array/>");
            }
            PlistValue::Array(items) => {
                let _ = writeln!(out, "{pad}<array>");
                for item in items {
                    item.write_xml(out, depth + 1);
                }
                let _ = writeln!(out, "{pad}</array>");
            }
            PlistValue::Dict(dict) => dict.write_xml(out, depth),
        }
    }
}

impl From<&str> for PlistValue {
    fn from(value: &str) -> Self {
        PlistValue::String(value.to_string())
    }
}

impl From<String> for PlistValue {
    fn from(value: String) -> Self {
        PlistValue::String(value)
    }
}

impl From<i64> for PlistValue {
    fn from(value: i64) -> Self {
        PlistValue::Integer(value)
    }
}

impl From<bool> for PlistValue {
    fn from(value: bool) -> Self {
        PlistValue::Bool(value)
    }
}

impl From<PlistDict> for PlistValue {
    fn from(value: PlistDict) -> Self {
        PlistValue::Dict(value)
    }
}

impl From<Vec<PlistValue>> for PlistValue {
    fn from(value: Vec<PlistValue>) -> Self {
        PlistValue::Array(value)
    }
}

/// A plist dict that knows which key-ordering rule it follows
///
/// Entries are stored in insertion order; rendering always goes through
/// [`canonical_order`], so the order in which a serializer inserts keys
/// never affects the output.
#[derive(Debug, Clone, Default)]
pub struct PlistDict {
    context: KeyContext,
    entries: Vec<(String, PlistValue)>,
}

impl PlistDict {
    /// Create an empty dict with the given ordering context
    pub fn new(context: KeyContext) -> Self {
        Self {
            context,
            entries: Vec::new(),
        }
    }

    /// Create an empty dict ordered alphabetically
    pub fn plain() -> Self {
        Self::new(KeyContext::Default)
    }

    /// The ordering context of this dict
    pub fn context(&self) -> KeyContext {
        self.context
    }

    /// Insert or replace a value
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<PlistValue>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Builder-style [`insert`](Self::insert)
    pub fn with(mut self, key: impl Into<String>, value: impl Into<PlistValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Insert a value only when present
    pub fn insert_opt<V: Into<PlistValue>>(&mut self, key: &str, value: Option<V>) {
        if let Some(value) = value {
            self.insert(key, value);
        }
    }

    /// Look up a value
    pub fn get(&self, key: &str) -> Option<&PlistValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Remove a value, returning it
    pub fn remove(&mut self, key: &str) -> Option<PlistValue> {
        let index = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(index).1)
    }

    /// Whether the key is present
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    /// Keys in insertion order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the dict has no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in the order the engine would export them
    pub fn ordered_entries(&self) -> Vec<(&str, &PlistValue)> {
        canonical_order(self.keys(), self.context)
            .into_iter()
            .filter_map(|key| self.get(key).map(|value| (key, value)))
            .collect()
    }

    /// Render as a `<dict>` element at the given depth, newline-terminated
    pub fn to_xml(&self, depth: usize) -> String {
        let mut out = String::new();
        self.write_xml(&mut out, depth);
        out
    }

    /// Append as a `<dict>` element at the given depth
    pub fn write_xml(&self, out: &mut String, depth: usize) {
        let pad = indent(depth);
        if self.entries.is_empty() {
            let _ = writeln!(out, "{pad}<dict/>");
            return;
        }
        let inner = indent(depth + 1);
        let _ = writeln!(out, "{pad}<dict>");
        for (key, value) in self.ordered_entries() {
            let _ = writeln!(out, "{inner}<key>{}</key>", escape(key));
            value.write_xml(out, depth + 1);
        }
        let _ = writeln!(out, "{pad}</dict>");
    }
}

/// Dicts compare as maps: same context, same keys, equal values
impl PartialEq for PlistDict {
    fn eq(&self, other: &Self) -> bool {
        self.context == other.context
            && self.entries.len() == other.entries.len()
            && self
                .entries
                .iter()
                .all(|(k, v)| other.get(k).is_some_and(|ov| ov == v))
    }
}
