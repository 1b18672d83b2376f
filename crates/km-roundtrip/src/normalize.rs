//! Text normalization applied to both sides of a round trip
//!
//! The engine re-exports an imported macro inside its own envelope, assigns
//! fresh action identifiers and re-wraps `<data>` payloads. Normalizing both
//! texts the same way leaves only differences in the actions themselves.
//!
//! All passes work on lines. The dialect puts one tag per line, so no XML
//! parser is needed.

const ACTION_UID_KEY: &str = "<key>ActionUID</key>";
const ACTIONS_KEY: &str = "<key>Actions</key>";

/// Normalize generated or retrieved XML for comparison
///
/// Applies, in order: identifier stripping, action array extraction,
/// whitespace trimming and `<data>` joining.
pub fn normalize_for_compare(xml: &str) -> String {
    let stripped = strip_action_uids(xml);
    let actions = extract_actions(&stripped);
    let trimmed = trim_lines(&actions);
    join_data_blocks(&trimmed)
}

/// Remove every `ActionUID` key together with its value line
pub fn strip_action_uids(xml: &str) -> String {
    let mut out = String::with_capacity(xml.len());
    let mut lines = xml.lines();
    while let Some(line) = lines.next() {
        if line.trim() == ACTION_UID_KEY {
            lines.next();
            continue;
        }
        out.push_str(line);
        out.push('\n');
    }
    out
}

/// The array following `<key>Actions</key>`, else the first array
///
/// Returns the whole input when no array is present.
pub fn extract_actions(xml: &str) -> String {
    let lines: Vec<&str> = xml.lines().collect();
    let start = lines
        .iter()
        .position(|l| l.trim() == ACTIONS_KEY)
        .map(|at| at + 1)
        .or_else(|| lines.iter().position(|l| is_array_open(l) || is_array_empty(l)));

    let Some(start) = start.filter(|&at| at < lines.len()) else {
        return xml.to_string();
    };
    if is_array_empty(lines[start]) {
        return format!("{}\n", lines[start]);
    }

    let mut depth = 0usize;
    let mut out = String::new();
    for line in &lines[start..] {
        out.push_str(line);
        out.push('\n');
        if is_array_open(line) {
            depth += 1;
        } else if line.trim() == "</array>" {
            depth = depth.saturating_sub(1);
            if depth == 0 {
                break;
            }
        }
    }
    out
}

fn is_array_open(line: &str) -> bool {
    line.trim() == "<array>"
}

fn is_array_empty(line: &str) -> bool {
    line.trim() == "<array/>"
}

/// Trim whitespace between tags and drop blank lines
///
/// Lines inside a multi-line `<string>` value are text, so they are kept
/// verbatim, blank ones included. Only the opening line loses its
/// indentation and only the closing line loses what follows `</string>`.
pub fn trim_lines(xml: &str) -> String {
    let mut out = String::with_capacity(xml.len());
    let mut in_value = false;
    for line in xml.lines() {
        if in_value {
            if line.contains("</string>") {
                out.push_str(line.trim_end());
                in_value = false;
            } else {
                out.push_str(line);
            }
            out.push('\n');
            continue;
        }
        let trimmed = line.trim_start();
        if trimmed.is_empty() {
            continue;
        }
        if trimmed.starts_with("<string>") && !trimmed.contains("</string>") {
            out.push_str(trimmed);
            in_value = true;
        } else {
            out.push_str(trimmed.trim_end());
        }
        out.push('\n');
    }
    out
}

/// Collapse each `<data>` block onto one line with no inner whitespace
pub fn join_data_blocks(xml: &str) -> String {
    let mut out = String::with_capacity(xml.len());
    let mut payload: Option<String> = None;
    for line in xml.lines() {
        let trimmed = line.trim();
        match payload.as_mut() {
            Some(data) => {
                if let Some(rest) = trimmed.strip_suffix("</data>") {
                    data.push_str(rest);
                    out.push_str("<data>");
                    out.push_str(data);
                    out.push_str("</data>\n");
                    payload = None;
                } else {
                    data.push_str(trimmed);
                }
            }
            None => match trimmed.strip_prefix("<data>") {
                Some(rest) if !rest.ends_with("</data>") => {
                    payload = Some(rest.to_string());
                }
                _ => {
                    out.push_str(line);
                    out.push('\n');
                }
            },
        }
    }
    if let Some(data) = payload {
        out.push_str("<data>");
        out.push_str(&data);
        out.push('\n');
    }
    out
}
