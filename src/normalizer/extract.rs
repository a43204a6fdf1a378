// ABOUTME: JSON extraction from free-text model replies that may wrap the object in prose
// ABOUTME: Tries a direct parse, then the first balanced brace span, then the greedy outer span
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use serde_json::Value;

/// Extract a JSON value from text that might contain extra prose
///
/// Order of attempts:
/// 1. the whole trimmed text
/// 2. the first `{` up to its balanced closing `}`
/// 3. the first `{` up to the last `}`
///
/// Returns `None` when none of them parse.
#[must_use]
pub fn extract_json(text: &str) -> Option<Value> {
    let trimmed = text.trim();
    if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
        return Some(value);
    }

    let start = trimmed.find('{')?;
    let candidate = &trimmed[start..];

    if let Some(end) = balanced_object_end(candidate) {
        if let Ok(value) = serde_json::from_str::<Value>(&candidate[..=end]) {
            return Some(value);
        }
    }

    let end = candidate.rfind('}')?;
    serde_json::from_str::<Value>(&candidate[..=end]).ok()
}

/// Byte offset of the `}` closing the object that opens at offset 0
///
/// Braces inside string literals don't count.
fn balanced_object_end(text: &str) -> Option<usize> {
    let mut depth = 0_usize;
    let mut in_string = false;
    let mut escaped = false;

    for (idx, ch) in text.char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }

        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(idx);
                }
            }
            _ => {}
        }
    }

    None
}
