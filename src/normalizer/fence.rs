// ABOUTME: Code fence stripping for model replies wrapped in markdown code blocks
// ABOUTME: Removes a leading fence line (optionally language-tagged) and a trailing fence marker
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

const FENCE: &str = "```";

/// Strip a surrounding markdown code fence
///
/// Only applies when the trimmed text starts with a fence. The opening line
/// may carry a language tag (` ```json `). Text without a leading fence is
/// returned trimmed and otherwise untouched, so the function is idempotent.
#[must_use]
pub fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(after_open) = trimmed.strip_prefix(FENCE) else {
        return trimmed;
    };

    let body = skip_language_tag(after_open);
    let body = body.trim_end();
    body.strip_suffix(FENCE).unwrap_or(body).trim()
}

/// Drop the language tag that may follow an opening fence
fn skip_language_tag(after_open: &str) -> &str {
    let tag_end = after_open
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '+'))
        .unwrap_or(after_open.len());
    &after_open[tag_end..]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_tagged_fence() {
        let reply = "```json\n{\"calories\": 500, \"protein\": 30}\n```";
        assert_eq!(
            strip_code_fences(reply),
            "{\"calories\": 500, \"protein\": 30}"
        );
    }

    #[test]
    fn test_strips_untagged_fence_on_one_line() {
        assert_eq!(strip_code_fences("```{\"a\": 1}```"), "{\"a\": 1}");
    }

    #[test]
    fn test_tag_on_same_line_as_body() {
        assert_eq!(strip_code_fences("```json {\"a\": 1} ```"), "{\"a\": 1}");
    }

    #[test]
    fn test_missing_closing_fence() {
        assert_eq!(strip_code_fences("```json\n{\"a\": 1}"), "{\"a\": 1}");
    }

    #[test]
    fn test_unfenced_text_is_untouched() {
        let reply = "Here you go: {\"a\": 1} ```";
        assert_eq!(strip_code_fences(reply), reply);
    }

    #[test]
    fn test_idempotent() {
        let reply = "  ```JSON\n{\"calories\": 1}\n```  ";
        let once = strip_code_fences(reply);
        assert_eq!(strip_code_fences(once), once);
    }
}
