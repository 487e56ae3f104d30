//! Normalization of raw `/chat` payloads.
//!
//! The backend is not trusted to return flat JSON. Its `text` may itself be
//! a JSON document, or prose with a `{"skill": .., "args": ..}` object
//! embedded somewhere inside. Every malformed variant degrades to plain
//! text; nothing here fails.

use std::ops::Range;

use serde_json::{Map, Value};
use tracing::debug;

/// Upper bound on how much reply text is scanned for an embedded action.
pub const MAX_SCAN_BYTES: usize = 16 * 1024;

/// A normalized backend reply. `skill` is `None` when no action was requested.
#[derive(Debug, Clone, PartialEq)]
pub struct AssistantReply {
    pub text: String,
    pub skill: Option<String>,
    pub args: Value,
}

impl AssistantReply {
    /// Plain text reply with no action.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            skill: None,
            args: Value::Object(Map::new()),
        }
    }
}

pub fn normalize(raw: Value) -> AssistantReply {
    let mut data = match raw {
        Value::Object(map) => map,
        // A bare JSON string may be the whole encoded payload
        Value::String(s) => match serde_json::from_str::<Value>(&s) {
            Ok(Value::Object(map)) => map,
            _ => return AssistantReply::text(s),
        },
        Value::Null => Map::new(),
        other => return AssistantReply::text(other.to_string()),
    };

    if let Some(inner) = unwrap_double_encoded(&data) {
        debug!("Unwrapped double-encoded reply");
        data = inner;
    }

    let mut text = match data.get("text") {
        Some(Value::String(s)) => s.clone(),
        None | Some(Value::Null) => String::new(),
        Some(other) => other.to_string(),
    };
    let mut skill = data.get("skill").cloned();
    let mut args = data.get("args").cloned();

    if let Some((span, embedded)) = find_embedded_action(&text) {
        if let Some(name) = non_empty_str(embedded.get("skill")) {
            debug!("Hoisted embedded action: {name}");
            let remainder = match non_empty_str(embedded.get("text")) {
                Some(own) => own.to_string(),
                None => {
                    let mut rest = text.clone();
                    rest.replace_range(span, "");
                    rest
                }
            };
            text = remainder.trim().to_string();
            skill = Some(Value::String(name.to_string()));
            args = embedded.get("args").cloned();
        }
    }

    let skill = non_empty_str(skill.as_ref()).map(str::to_string);
    if let Some(name) = skill.as_deref().filter(|_| text.trim().is_empty()) {
        text = format!("executing: {name}");
    }
    let args = match args {
        Some(Value::Object(map)) => Value::Object(map),
        _ => Value::Object(Map::new()),
    };

    AssistantReply { text, skill, args }
}

/// `{"text": "{\"text\": .., \"skill\": ..}"}` → the inner object.
fn unwrap_double_encoded(data: &Map<String, Value>) -> Option<Map<String, Value>> {
    let text = data.get("text")?.as_str()?;
    if !text.trim_start().starts_with('{') {
        return None;
    }
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(inner)) if inner.contains_key("text") || inner.contains_key("skill") => {
            Some(inner)
        }
        _ => None,
    }
}

fn non_empty_str(value: Option<&Value>) -> Option<&str> {
    value.and_then(Value::as_str).filter(|s| !s.is_empty())
}

/// Locates the earliest balanced `{...}` span carrying `"skill":` followed by
/// `"args":` that parses as an object. A malformed outer span falls back to
/// the spans nested inside it. Only the first [`MAX_SCAN_BYTES`] are scanned.
pub fn find_embedded_action(text: &str) -> Option<(Range<usize>, Map<String, Value>)> {
    let mut limit = text.len().min(MAX_SCAN_BYTES);
    while !text.is_char_boundary(limit) {
        limit -= 1;
    }
    let window = &text[..limit];

    let mut candidates: Vec<_> = balanced_spans(window)
        .into_iter()
        .filter(|span| has_action_keys(&window[span.clone()]))
        .collect();
    candidates.sort_by_key(|span| span.start);

    candidates
        .into_iter()
        .find_map(|span| match serde_json::from_str::<Value>(&window[span.clone()]) {
            Ok(Value::Object(map)) => Some((span, map)),
            Ok(_) => None,
            Err(e) => {
                debug!("Skipping unparseable action span at {}: {e}", span.start);
                None
            }
        })
}

/// All balanced brace spans in one pass. String literals are only tracked
/// inside braces so quotes in surrounding prose don't confuse the scan.
fn balanced_spans(text: &str) -> Vec<Range<usize>> {
    let mut spans = Vec::new();
    let mut open: Vec<usize> = Vec::new();
    let mut in_string = false;
    let mut escaped = false;

    for (i, b) in text.bytes().enumerate() {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }
        match b {
            b'{' => open.push(i),
            b'}' => {
                if let Some(start) = open.pop() {
                    spans.push(start..i + 1);
                }
            }
            b'"' if !open.is_empty() => in_string = true,
            _ => {}
        }
    }
    spans
}

fn has_action_keys(span: &str) -> bool {
    match key_end(span, "\"skill\"") {
        Some(after) => key_end(&span[after..], "\"args\"").is_some(),
        None => false,
    }
}

/// Byte offset just past the first `key` that is followed by a `:`.
fn key_end(haystack: &str, key: &str) -> Option<usize> {
    let mut from = 0;
    while let Some(pos) = haystack[from..].find(key) {
        let after = from + pos + key.len();
        let rest = haystack[after..].trim_start();
        if rest.starts_with(':') {
            return Some(haystack.len() - rest.len() + 1);
        }
        from = after;
    }
    None
}
