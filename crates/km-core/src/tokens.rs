//! Friendly names for engine text tokens
//!
//! Text fields may contain `{{Name}}` placeholders that expand to the
//! engine's `%Token%` syntax. Unknown placeholders are left untouched so
//! literal braces in user text survive.

use std::collections::HashMap;
use std::sync::OnceLock;

use tracing::debug;

const TOKENS: &[(&str, &str)] = &[
    ("ClipboardHistory", "%PastClipboard%1%"),
    ("CurrentClipboard", "%SystemClipboard%"),
    ("CurrentDate", "%ICUDateTime%yyyy-MM-dd%"),
    ("CurrentTime", "%ICUDateTime%HH:mm:ss%"),
    ("ExecutingMacro", "%ExecutingMacro%"),
    ("FinderSelection", "%FinderInsertionLocation%"),
    ("FrontApplicationName", "%Application%1%"),
    ("FrontBrowserTitle", "%FrontBrowserTitle%"),
    ("FrontBrowserUrl", "%FrontBrowserURL%"),
    ("FrontWindowFrame", "%WindowFrame%1%"),
    ("FrontWindowName", "%FrontWindowName%"),
    ("LongDate", "%LongDate%"),
    ("MacUserName", "%UserName%"),
    ("MousePosition", "%CurrentMouse%"),
    ("NetworkLocation", "%NetworkLocation%"),
    ("PromptResponse", "%PromptWithListResult%"),
    ("RandomUuid", "%RandomUUID%"),
    ("Return", "%Return%"),
    ("ScreenFrame", "%Screen%1%"),
    ("ShortDate", "%ShortDate%"),
    ("Tab", "%Tab%"),
    ("TriggerValue", "%TriggerValue%"),
    ("UserHome", "%UserHomeDirectory%"),
    ("WirelessNetwork", "%WiFiNetwork%"),
];

/// Placeholder table, built on first use
#[derive(Debug, Default)]
pub struct TokenTable {
    entries: OnceLock<HashMap<&'static str, &'static str>>,
}

impl TokenTable {
    /// Create a table; the map is built lazily
    pub fn new() -> Self {
        Self::default()
    }

    /// Process-wide shared table
    pub fn global() -> &'static TokenTable {
        static GLOBAL: OnceLock<TokenTable> = OnceLock::new();
        GLOBAL.get_or_init(TokenTable::new)
    }

    fn entries(&self) -> &HashMap<&'static str, &'static str> {
        self.entries.get_or_init(|| {
            debug!("Building token table with {} entries", TOKENS.len());
            TOKENS.iter().copied().collect()
        })
    }

    /// Engine token for a friendly name
    pub fn lookup(&self, name: &str) -> Option<&'static str> {
        self.entries().get(name).copied()
    }

    /// Number of known placeholders
    pub fn len(&self) -> usize {
        self.entries().len()
    }

    /// Whether the table is empty
    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }

    /// Known placeholder names, sorted
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self.entries().keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// Replace every known `{{Name}}` with its engine token
    pub fn substitute(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        let mut rest = text;
        while let Some(start) = rest.find("{{") {
            out.push_str(&rest[..start]);
            let after = &rest[start + 2..];
            let Some(end) = after.find("}}") else {
                out.push_str(&rest[start..]);
                return out;
            };
            let name = after[..end].trim();
            match self.lookup(name) {
                Some(token) => out.push_str(token),
                None => out.push_str(&rest[start..start + 2 + end + 2]),
            }
            rest = &after[end + 2..];
        }
        out.push_str(rest);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup() {
        let table = TokenTable::new();
        assert_eq!(table.lookup("CurrentClipboard"), Some("%SystemClipboard%"));
        assert_eq!(table.lookup("NoSuchToken"), None);
        assert_eq!(table.len(), TOKENS.len());
    }

    #[test]
    fn test_substitute_known_and_unknown() {
        let table = TokenTable::global();
        assert_eq!(
            table.substitute("Window: {{FrontWindowName}} / {{Mystery}}"),
            "Window: %FrontWindowName% / {{Mystery}}"
        );
    }

    #[test]
    fn test_substitute_unterminated_and_spaced() {
        let table = TokenTable::new();
        assert_eq!(table.substitute("open {{ Tab"), "open {{ Tab");
        assert_eq!(table.substitute("{{ Tab }}x"), "%Tab%x");
        assert_eq!(table.substitute("plain text"), "plain text");
    }

    #[test]
    fn test_names_sorted() {
        let names = TokenTable::new().names();
        let mut sorted = names.clone();
        sorted.sort_unstable();
        assert_eq!(names, sorted);
    }
}
