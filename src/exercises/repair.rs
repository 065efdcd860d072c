//! Heuristic repair of generator JSON
//!
//! Handles the ways model output usually breaks: markdown fences, prose
//! before the payload, trailing commas, and truncation mid-item. All
//! scanning is string-aware so brackets and commas inside values are left
//! alone.

use tracing::debug;

/// A repair step that changed the text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepairStep {
    TrailingCommas,
    TruncatedToLastItem,
    ClosedString,
    BalancedClosers,
}

impl std::fmt::Display for RepairStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RepairStep::TrailingCommas => write!(f, "trailing_commas"),
            RepairStep::TruncatedToLastItem => write!(f, "truncated_to_last_item"),
            RepairStep::ClosedString => write!(f, "closed_string"),
            RepairStep::BalancedClosers => write!(f, "balanced_closers"),
        }
    }
}

/// Repaired text plus what was done to it
#[derive(Debug, Clone)]
pub struct Repaired {
    pub text: String,
    pub steps: Vec<RepairStep>,
}

/// Remove surrounding markdown code fences.
///
/// Handles a fenced block anywhere in the text and a fence that was opened
/// but never closed (truncated output).
pub fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(open) = trimmed.find("```") else {
        return trimmed;
    };

    // The language tag ends at whitespace or where the payload opens, so a
    // single-line fence keeps its body
    let after_fence = &trimmed[open + 3..];
    let tag_end = after_fence
        .find(|c: char| c.is_whitespace() || c == '{' || c == '[')
        .unwrap_or(after_fence.len());
    let body = &after_fence[tag_end..];

    match body.find("```") {
        Some(close) => body[..close].trim(),
        None => body.trim(),
    }
}

/// Drop leading prose before the first `{` or `[`
pub fn slice_to_payload(text: &str) -> &str {
    match text.find(['{', '[']) {
        Some(start) => &text[start..],
        None => text,
    }
}

/// Remove commas that directly precede a closing bracket
pub fn remove_trailing_commas(input: &str) -> String {
    let chars: Vec<char> = input.chars().collect();
    let mut result = String::with_capacity(input.len());
    let mut in_string = false;
    let mut escaped = false;

    for (i, &c) in chars.iter().enumerate() {
        if in_string {
            result.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }

        if c == '"' {
            in_string = true;
        } else if c == ',' {
            let next = chars[i + 1..].iter().find(|ch| !ch.is_whitespace());
            if matches!(next, Some('}') | Some(']')) {
                continue;
            }
        }
        result.push(c);
    }

    result
}

/// Structural scan of possibly-truncated JSON
#[derive(Debug, Default)]
struct Scan {
    /// Open brackets still unclosed at end of input
    stack: Vec<char>,
    in_string: bool,
    /// Byte offset just past the last object closed directly inside the
    /// item array, with the open brackets at that point
    last_item_end: Option<(usize, Vec<char>)>,
}

fn scan(text: &str) -> Scan {
    let mut scan = Scan::default();
    let mut escaped = false;
    // Depth of the stack once the item array is open
    let mut item_array_depth: Option<usize> = None;

    for (idx, c) in text.char_indices() {
        if scan.in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                scan.in_string = false;
            }
            continue;
        }

        match c {
            '"' => scan.in_string = true,
            '{' => scan.stack.push('{'),
            '[' => {
                scan.stack.push('[');
                // The first array at the top level or directly under the root
                if item_array_depth.is_none() && scan.stack.len() <= 2 {
                    item_array_depth = Some(scan.stack.len());
                }
            }
            '}' | ']' => {
                let expected = if c == '}' { '{' } else { '[' };
                if scan.stack.last() == Some(&expected) {
                    scan.stack.pop();
                }
                if c == '}' && Some(scan.stack.len()) == item_array_depth {
                    scan.last_item_end = Some((idx + c.len_utf8(), scan.stack.clone()));
                }
            }
            _ => {}
        }
    }

    scan
}

fn closer(open: char) -> char {
    if open == '{' { '}' } else { ']' }
}

fn append_closers(text: &mut String, stack: &[char]) {
    for open in stack.iter().rev() {
        text.push(closer(*open));
    }
}

/// Whether the text already ends the way a complete payload would
fn ends_complete(text: &str) -> bool {
    let s = scan(text);
    s.stack.is_empty() && !s.in_string
}

/// Cut the item array after its last fully-closed item and re-close the
/// enclosing structure. `None` if no item ever closed.
pub fn truncate_to_last_item(text: &str) -> Option<String> {
    let (end, open) = scan(text).last_item_end?;
    let mut cut = text[..end].to_string();
    append_closers(&mut cut, &open);
    Some(cut)
}

/// Append the minimum closers (and a closing quote) needed to balance
pub fn balance_closers(text: &str) -> String {
    let s = scan(text);
    let mut out = text.trim_end().to_string();
    if s.in_string {
        out.push('"');
    }
    // A dangling separator before the closers would still be invalid
    while out.ends_with(',') || out.ends_with(':') {
        out.pop();
    }
    append_closers(&mut out, &s.stack);
    out
}

/// Run the repair heuristics in order
pub fn repair(text: &str) -> Repaired {
    let mut steps = Vec::new();

    let mut current = remove_trailing_commas(text);
    if current != text {
        steps.push(RepairStep::TrailingCommas);
    }

    if !ends_complete(&current) {
        if let Some(truncated) = truncate_to_last_item(&current) {
            current = truncated;
            steps.push(RepairStep::TruncatedToLastItem);
        }
    }

    let s = scan(&current);
    if s.in_string {
        steps.push(RepairStep::ClosedString);
    }
    if !s.stack.is_empty() || s.in_string {
        current = balance_closers(&current);
        steps.push(RepairStep::BalancedClosers);
    }

    if !steps.is_empty() {
        debug!("JSON repair applied: {:?}", steps);
    }
    Repaired { text: current, steps }
}
