// ABOUTME: Recovers a JSON value from free-form model output
// ABOUTME: Tries the raw text, then the outermost object/array span, then a fenced code block
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Mealmate contributors

use serde_json::Value;

/// Extract the JSON value a model answered with
///
/// Attempts, in order:
/// 1. the whole trimmed text
/// 2. the span from the first `{` or `[` to the matching last `}` or `]`
/// 3. the body of a fenced code block (```` ```json ```` or bare ```` ``` ````)
///
/// Returns `None` when none of them parses.
#[must_use]
pub fn extract_json(text: &str) -> Option<Value> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }

    serde_json::from_str(trimmed)
        .ok()
        .or_else(|| outermost_span(trimmed).and_then(|span| serde_json::from_str(span).ok()))
        .or_else(|| fenced_block(trimmed).and_then(|body| serde_json::from_str(body.trim()).ok()))
}

fn outermost_span(text: &str) -> Option<&str> {
    let start = text.find(['{', '['])?;
    let close = if text[start..].starts_with('{') { '}' } else { ']' };
    let end = text.rfind(close)?;
    (end > start).then(|| &text[start..=end])
}

fn fenced_block(text: &str) -> Option<&str> {
    let open = text.find("```")?;
    let after_fence = &text[open + 3..];
    // Skip the info string (`json`, `JSON`, ...) up to the end of the line
    let body_start = after_fence.find('\n').map_or(0, |i| i + 1);
    let body = &after_fence[body_start..];
    let close = body.find("```")?;
    Some(&body[..close])
}
