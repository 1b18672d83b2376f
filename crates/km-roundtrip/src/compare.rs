//! Line comparison of normalized texts

use std::fmt;

use serde::Serialize;

/// First line where two normalized texts disagree
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineDiff {
    /// One-based line number
    pub line: usize,
    /// `None` when the generated text ended first
    pub generated: Option<String>,
    /// `None` when the retrieved text ended first
    pub retrieved: Option<String>,
}

impl fmt::Display for LineDiff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let show = |side: &Option<String>| side.as_deref().unwrap_or("(end of text)").to_string();
        write!(
            f,
            "line {}: generated `{}`, retrieved `{}`",
            self.line,
            show(&self.generated),
            show(&self.retrieved)
        )
    }
}

/// Compare line by line, `None` when equal
pub fn line_diff(generated: &str, retrieved: &str) -> Option<LineDiff> {
    let mut left = generated.lines();
    let mut right = retrieved.lines();
    let mut line = 0;
    loop {
        line += 1;
        match (left.next(), right.next()) {
            (None, None) => return None,
            (a, b) if a == b => continue,
            (a, b) => {
                return Some(LineDiff {
                    line,
                    generated: a.map(str::to_string),
                    retrieved: b.map(str::to_string),
                })
            }
        }
    }
}
