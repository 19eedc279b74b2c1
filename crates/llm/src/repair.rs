//! Best-effort recovery of a JSON value from model output.
//!
//! Model completions are expected to contain a single JSON value (an
//! array for commit analyses, an object for the full changelog), but in
//! practice arrive wrapped in prose or markdown fencing, or truncated
//! mid-structure by a length limit. [`extract_json`] runs a fixed sequence
//! of attempts and stops at the first success:
//!
//! 1. strip code fences, trim, parse directly;
//! 2. find the first `[`/`{` and the matching close via a string- and
//!    escape-aware bracket scan, parse that span;
//! 3. truncation salvage: cut back to the last complete direct child of
//!    the root container, close the root, parse.
//!
//! The scanner is bracket-balancing over tokens, not substring search, so
//! brackets inside string literals never confuse it.

use serde_json::Value;

/// Recover a JSON value from model output text.
///
/// Returns `None` when no attempt yields valid JSON; the caller decides
/// how to surface that (the pipeline fails the generation).
pub fn extract_json(text: &str) -> Option<Value> {
    let stripped = strip_code_fences(text);

    // Attempt 1: the stripped text is already valid JSON.
    if let Ok(value) = serde_json::from_str::<Value>(stripped) {
        return Some(value);
    }

    // Attempt 2/3: locate the first bracket and scan from there.
    let start = stripped.find(['[', '{'])?;
    match scan_balanced(stripped.as_bytes(), start) {
        Scan::Complete { end } => serde_json::from_str(&stripped[start..=end]).ok(),
        Scan::Truncated { cut_candidates } => {
            salvage_truncated(stripped, start, &cut_candidates)
        }
    }
}

/// Remove surrounding markdown code fences (```json ... ``` or ``` ... ```)
/// and trim whitespace. Text without fences is only trimmed.
pub fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string ("json", "JSON", ...) up to the first newline.
    let body = match rest.find('\n') {
        Some(idx) => &rest[idx + 1..],
        None => rest,
    };
    // A closing fence is optional: truncated output may lose it.
    let body = body.trim_end();
    let body = body.strip_suffix("```").unwrap_or(body);
    body.trim()
}

/// Result of scanning for the close bracket matching `bytes[start]`.
enum Scan {
    /// The root container closes at byte index `end` (inclusive).
    Complete { end: usize },
    /// Input ended with brackets still open. `cut_candidates` holds byte
    /// offsets (exclusive ends) at which every direct child of the root
    /// seen so far is complete, in encounter order.
    Truncated { cut_candidates: Vec<usize> },
}

/// Bracket-balancing scan from `start` (which must index `[` or `{`).
///
/// String literals and escape sequences are honored, so brackets inside
/// strings do not affect depth. While scanning, offsets where the root
/// container has a complete trailing child are recorded for salvage:
/// after a `,` at depth 1, after a nested container closes back to depth
/// 1, and after a string closes at depth 1 in value position.
fn scan_balanced(bytes: &[u8], start: usize) -> Scan {
    let root = bytes[start];
    let root_is_object = root == b'{';

    let mut stack: Vec<u8> = vec![root];
    let mut in_string = false;
    let mut escaped = false;
    // Object roots only: whether a depth-1 string is a value (after `:`)
    // rather than a key.
    let mut after_colon = false;
    let mut cut_candidates: Vec<usize> = Vec::new();

    let mut i = start + 1;
    while i < bytes.len() {
        let b = bytes[i];

        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
                if stack.len() == 1 && (!root_is_object || after_colon) {
                    cut_candidates.push(i + 1);
                }
            }
            i += 1;
            continue;
        }

        match b {
            b'"' => in_string = true,
            b'[' | b'{' => stack.push(b),
            b']' | b'}' => {
                stack.pop();
                if stack.is_empty() {
                    return Scan::Complete { end: i };
                }
                if stack.len() == 1 {
                    cut_candidates.push(i + 1);
                }
            }
            b',' if stack.len() == 1 => {
                cut_candidates.push(i);
                after_colon = false;
            }
            b':' if stack.len() == 1 => after_colon = true,
            _ => {}
        }
        i += 1;
    }

    Scan::Truncated { cut_candidates }
}

/// Try cut candidates from rightmost to leftmost: take the prefix, drop a
/// trailing comma, close the root container, and parse. The rightmost
/// parseable prefix keeps the most data.
fn salvage_truncated(text: &str, start: usize, cut_candidates: &[usize]) -> Option<Value> {
    let closer = if text.as_bytes()[start] == b'{' { '}' } else { ']' };

    for &cut in cut_candidates.iter().rev() {
        let prefix = text[start..cut].trim_end().trim_end_matches(',');
        let mut candidate = String::with_capacity(prefix.len() + 1);
        candidate.push_str(prefix);
        candidate.push(closer);
        if let Ok(value) = serde_json::from_str::<Value>(&candidate) {
            return Some(value);
        }
    }

    // Nothing complete inside the root; an empty container is not a
    // meaningful recovery, so report failure.
    None
}
