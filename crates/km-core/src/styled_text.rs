//! Styled text codec
//!
//! Several actions carry a rich-text payload as base64-encoded RTF next to a
//! plain-text mirror of the same content. This module converts between the
//! two representations.
//!
//! The RTF handling is deliberately lossy. [`rtf_to_plain`] is a heuristic
//! stripper that understands the subset of RTF the engine and the system
//! text views produce; it is not a general RTF parser.

use base64::Engine as _;

use crate::error::{PlistError, PlistResult};
use crate::xml::{wrap_base64, DATA_LINE_WIDTH};

/// Destinations whose whole group is discarded when stripping RTF
const SKIPPED_DESTINATIONS: &[&str] = &[
    "fonttbl",
    "colortbl",
    "expandedcolortbl",
    "stylesheet",
    "info",
    "listtable",
    "listoverridetable",
    "pict",
];

/// Preamble used when building RTF from plain text
const RTF_PREAMBLE: &str = concat!(
    "{\\rtf1\\ansi\\ansicpg1252\\cocoartf2761\n",
    "\\cocoatextscaling0\\cocoaplatform0{\\fonttbl\\f0\\fswiss\\fcharset0 Helvetica;}\n",
    "{\\colortbl;\\red255\\green255\\blue255;}\n",
    "{\\*\\expandedcolortbl;;}\n",
    "\\pard\\tx560\\tx1120\\tx1680\\tx2240\\tx2800\\tx3360\\tx3920\\tx4480\\tx5040\\tx5600\\tx6160\\tx6720\\pardirnatural\\partightenfactor0\n",
    "\n",
    "\\f0\\fs24 \\cf0 ",
);

/// RTF payload decoded from base64, with its plain-text mirror
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedStyledText {
    pub rtf: String,
    pub plain: String,
}

/// Encode an RTF document as base64, wrapped at the engine's data width
pub fn encode(rtf: &str) -> String {
    let encoded = base64::engine::general_purpose::STANDARD.encode(rtf.as_bytes());
    wrap_base64(&encoded, DATA_LINE_WIDTH).join("\n")
}

/// Decode a base64 payload into RTF plus its plain-text mirror
///
/// Whitespace inside the payload (line wrapping, indentation) is ignored.
pub fn decode(payload: &str) -> PlistResult<DecodedStyledText> {
    let compact: String = payload.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(compact.as_bytes())
        .map_err(|e| PlistError::InvalidBase64(e.to_string()))?;
    let rtf = String::from_utf8(bytes).map_err(|e| PlistError::InvalidUtf8(e.to_string()))?;
    let plain = rtf_to_plain(&rtf);
    Ok(DecodedStyledText { rtf, plain })
}

/// Build a minimal Helvetica RTF document holding `text`
pub fn plain_to_rtf(text: &str) -> String {
    let mut out = String::from(RTF_PREAMBLE);
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '{' => out.push_str("\\{"),
            '}' => out.push_str("\\}"),
            '\n' => out.push_str("\\\n"),
            '\t' => out.push_str("\\tab "),
            c if c.is_ascii() => out.push(c),
            c => {
                let mut units = [0u16; 2];
                for unit in c.encode_utf16(&mut units) {
                    out.push_str(&format!("\\uc0\\u{} ", *unit as i16));
                }
            }
        }
    }
    out.push('}');
    out
}

/// Strip an RTF document down to its plain text
///
/// Steps, in order: hex and unicode escape decoding, removal of control
/// tables (font, colour, style and info groups), control word removal,
/// brace stripping and whitespace collapse.
pub fn rtf_to_plain(rtf: &str) -> String {
    let chars: Vec<char> = rtf.chars().collect();
    let mut out = String::with_capacity(rtf.len());
    let mut i = 0;
    let mut skip_after_unicode: usize = 1;

    while i < chars.len() {
        match chars[i] {
            '{' => {
                if let Some(end) = skipped_group_end(&chars, i) {
                    i = end + 1;
                } else {
                    i += 1;
                }
            }
            '}' => i += 1,
            '\r' | '\n' => i += 1,
            '\\' => {
                i = consume_control(&chars, i, &mut out, &mut skip_after_unicode);
            }
            c => {
                out.push(c);
                i += 1;
            }
        }
    }

    collapse_whitespace(&out)
}

/// If the group opening at `open` is a control table, return its closing index
fn skipped_group_end(chars: &[char], open: usize) -> Option<usize> {
    let mut j = open + 1;
    if chars.get(j) == Some(&'\\') && chars.get(j + 1) == Some(&'*') {
        return matching_brace(chars, open);
    }
    if chars.get(j) != Some(&'\\') {
        return None;
    }
    j += 1;
    let start = j;
    while j < chars.len() && chars[j].is_ascii_alphabetic() {
        j += 1;
    }
    let word: String = chars[start..j].iter().collect();
    if SKIPPED_DESTINATIONS.contains(&word.as_str()) {
        matching_brace(chars, open)
    } else {
        None
    }
}

fn matching_brace(chars: &[char], open: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut j = open;
    while j < chars.len() {
        match chars[j] {
            '\\' => j += 1,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(j);
                }
            }
            _ => {}
        }
        j += 1;
    }
    None
}

/// Consume one backslash sequence starting at `start`, returning the next index
fn consume_control(
    chars: &[char],
    start: usize,
    out: &mut String,
    skip_after_unicode: &mut usize,
) -> usize {
    let Some(&next) = chars.get(start + 1) else {
        return start + 1;
    };

    match next {
        '\\' | '{' | '}' => {
            out.push(next);
            start + 2
        }
        '\n' | '\r' => {
            out.push('\n');
            start + 2
        }
        '~' => {
            out.push('\u{a0}');
            start + 2
        }
        '\'' => {
            let hex: String = chars.iter().skip(start + 2).take(2).collect();
            if let Ok(byte) = u8::from_str_radix(&hex, 16) {
                out.push(cp1252_char(byte));
            }
            start + 4
        }
        c if c.is_ascii_alphabetic() => {
            let mut j = start + 1;
            while j < chars.len() && chars[j].is_ascii_alphabetic() {
                j += 1;
            }
            let word: String = chars[start + 1..j].iter().collect();

            let param_start = j;
            if j < chars.len() && chars[j] == '-' {
                j += 1;
            }
            while j < chars.len() && chars[j].is_ascii_digit() {
                j += 1;
            }
            let param: Option<i32> = chars[param_start..j]
                .iter()
                .collect::<String>()
                .parse()
                .ok();

            // A single space delimits the control word and is not content
            if j < chars.len() && chars[j] == ' ' {
                j += 1;
            }

            match word.as_str() {
                "par" | "line" => out.push('\n'),
                "tab" => out.push('\t'),
                "uc" => *skip_after_unicode = param.unwrap_or(1).max(0) as usize,
                "u" => {
                    if let Some(code) = param {
                        push_utf16_unit(out, code);
                        j += (*skip_after_unicode).min(chars.len().saturating_sub(j));
                    }
                }
                _ => {}
            }
            j
        }
        _ => start + 2,
    }
}

/// Push a (possibly negative, possibly surrogate) RTF `\u` parameter
fn push_utf16_unit(out: &mut String, code: i32) {
    let unit = if code < 0 { (code + 65536) as u32 } else { code as u32 };
    if let Some(c) = char::from_u32(unit) {
        out.push(c);
        return;
    }
    // Low surrogate completing a pair written as two \u words
    if (0xDC00..=0xDFFF).contains(&unit) {
        if let Some(high) = out.pop() {
            let high = high as u32;
            if (0xE000..=0xE3FF).contains(&high) {
                let combined = 0x10000 + ((high - 0xE000) << 10) + (unit - 0xDC00);
                if let Some(c) = char::from_u32(combined) {
                    out.push(c);
                    return;
                }
            }
            if let Some(c) = char::from_u32(high) {
                out.push(c);
            }
        }
        return;
    }
    // High surrogate: park it in the private-use area until its pair arrives
    if (0xD800..=0xDBFF).contains(&unit) {
        if let Some(c) = char::from_u32(0xE000 + (unit - 0xD800)) {
            out.push(c);
        }
    }
}

/// Map a Windows-1252 byte to its character
fn cp1252_char(byte: u8) -> char {
    const HIGH: [char; 32] = [
        '€', '\u{81}', '‚', 'ƒ', '„', '…', '†', '‡', 'ˆ', '‰', 'Š', '‹', 'Œ', '\u{8d}', 'Ž',
        '\u{8f}', '\u{90}', '‘', '’', '“', '”', '•', '–', '—', '˜', '™', 'š', '›', 'œ', '\u{9d}',
        'ž', 'Ÿ',
    ];
    match byte {
        0x80..=0x9F => HIGH[(byte - 0x80) as usize],
        _ => byte as char,
    }
}

fn collapse_whitespace(text: &str) -> String {
    let lines: Vec<String> = text
        .split('\n')
        .map(|line| {
            let mut collapsed = String::with_capacity(line.len());
            let mut previous_space = false;
            for c in line.chars() {
                if c == ' ' {
                    if !previous_space {
                        collapsed.push(c);
                    }
                    previous_space = true;
                } else {
                    collapsed.push(c);
                    previous_space = false;
                }
            }
            collapsed.trim_end().to_string()
        })
        .collect();
    lines.join("\n").trim().to_string()
}

/// Rich text paired with its plain-text mirror
///
/// Both halves are derived together so they cannot drift apart; any
/// transform goes through [`StyledText::map_plain`], which rebuilds both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyledText {
    rtf: String,
    plain: String,
}

impl StyledText {
    /// Wrap an existing RTF document
    pub fn from_rtf(rtf: impl Into<String>) -> Self {
        let rtf = rtf.into();
        let plain = rtf_to_plain(&rtf);
        Self { rtf, plain }
    }

    /// Build styled text from plain text
    pub fn from_plain(text: &str) -> Self {
        Self {
            rtf: plain_to_rtf(text),
            plain: collapse_whitespace(text),
        }
    }

    /// Decode a base64 payload
    pub fn from_base64(payload: &str) -> PlistResult<Self> {
        let decoded = decode(payload)?;
        Ok(Self {
            rtf: decoded.rtf,
            plain: decoded.plain,
        })
    }

    /// The RTF document
    pub fn rtf(&self) -> &str {
        &self.rtf
    }

    /// The plain-text mirror
    pub fn plain(&self) -> &str {
        &self.plain
    }

    /// The base64 payload, wrapped
    pub fn to_base64(&self) -> String {
        encode(&self.rtf)
    }

    /// Transform the text content, regenerating both the RTF and the mirror
    ///
    /// Styling is not preserved across a transform.
    pub fn map_plain<F>(&self, f: F) -> Self
    where
        F: FnOnce(&str) -> String,
    {
        Self::from_plain(&f(&self.plain))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_RTF: &str = "{\\rtf1\\ansi\\ansicpg1252\\cocoartf2761\n\\cocoatextscaling0\\cocoaplatform0{\\fonttbl\\f0\\fswiss\\fcharset0 Helvetica;}\n{\\colortbl;\\red255\\green255\\blue255;}\n{\\*\\expandedcolortbl;;}\n\\pard\\pardirnatural\\partightenfactor0\n\n\\f0\\fs24 \\cf0 Hello \\'e9t\\'e9\\\nsecond line}";

    #[test]
    fn test_encode_decode_round_trip() {
        let encoded = encode(SAMPLE_RTF);
        let decoded = decode(&encoded).unwrap();
        assert_eq!(decoded.rtf, SAMPLE_RTF);
    }

    #[test]
    fn test_encoded_lines_are_wrapped() {
        let encoded = encode(SAMPLE_RTF);
        assert!(encoded.lines().count() > 1);
        assert!(encoded.lines().all(|l| l.len() <= DATA_LINE_WIDTH));
    }

    #[test]
    fn test_rtf_to_plain_strips_tables_and_decodes_escapes() {
        assert_eq!(rtf_to_plain(SAMPLE_RTF), "Hello été\nsecond line");
    }

    #[test]
    fn test_rtf_to_plain_handles_unicode_words() {
        let rtf = "{\\rtf1\\uc0\\u8364 5 \\u-10179\\u-8704 done}";
        assert_eq!(rtf_to_plain(rtf), "€5 😀done");
    }

    #[test]
    fn test_rtf_to_plain_literal_braces() {
        assert_eq!(rtf_to_plain("{\\rtf1 a \\{b\\} \\\\c}"), "a {b} \\c");
    }

    #[test]
    fn test_plain_to_rtf_round_trips_through_stripper() {
        let text = "Line one\n\tTabbed {braces} and \\ slash\nCafé ✓";
        let rtf = plain_to_rtf(text);
        assert_eq!(rtf_to_plain(&rtf), text);
    }

    #[test]
    fn test_decode_rejects_invalid_base64() {
        assert!(matches!(decode("not base64!!"), Err(PlistError::InvalidBase64(_))));
    }

    #[test]
    fn test_styled_text_mirror_stays_in_sync() {
        let styled = StyledText::from_plain("hello world");
        let upper = styled.map_plain(|s| s.to_uppercase());
        assert_eq!(upper.plain(), "HELLO WORLD");
        assert_eq!(rtf_to_plain(upper.rtf()), "HELLO WORLD");

        let reparsed = StyledText::from_base64(&upper.to_base64()).unwrap();
        assert_eq!(reparsed, upper);
    }
}
