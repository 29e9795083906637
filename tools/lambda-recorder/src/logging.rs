//! JSONL event shape and bounded value rendering.

use serde::Serialize;
use serde_json::Value;

pub const DEFAULT_MAX_PAYLOAD_BYTES: usize = 4096;

#[derive(Debug, Clone, Serialize)]
pub struct LogEvent<'a> {
    pub level: &'a str,
    pub event_type: &'a str,
    pub payload: Value,
}

/// Replaces a payload whose JSON form exceeds `max_bytes` with its truncated text.
pub(crate) fn truncate_json(value: Value, max_bytes: usize) -> Value {
    let rendered = serde_json::to_string(&value).unwrap_or_default();
    if rendered.len() <= max_bytes {
        return value;
    }
    Value::String(truncate_text(rendered, max_bytes))
}

/// Renders a value as compact JSON for failure messages, cut to `max_bytes`.
pub fn render_value(value: &Value, max_bytes: usize) -> String {
    truncate_text(value.to_string(), max_bytes)
}

/// Cuts `rendered` to at most `max_bytes`, marking the cut with `...`.
pub fn truncate_text(mut rendered: String, max_bytes: usize) -> String {
    if rendered.len() <= max_bytes {
        return rendered;
    }
    let mut cut = max_bytes.saturating_sub(3);
    while cut > 0 && !rendered.is_char_boundary(cut) {
        cut -= 1;
    }
    rendered.truncate(cut);
    rendered.push_str("...");
    rendered
}

#[cfg(test)]
mod tests {
    use super::{render_value, truncate_json};
    use serde_json::json;

    #[test]
    fn truncate_json_keeps_small_payloads_structured() {
        let small = json!({"ok": true});
        assert_eq!(truncate_json(small.clone(), 64), small);

        let large = truncate_json(json!({"text": "abcdefghijklmnopqrstuvwxyz"}), 20);
        let text = large.as_str().unwrap_or_default();
        assert!(text.starts_with("{\"text\""), "{text}");
        assert!(text.ends_with("...") && text.len() <= 20);
    }

    #[test]
    fn render_value_keeps_short_values_verbatim() {
        assert_eq!(render_value(&json!("y"), 64), "\"y\"");
        assert_eq!(render_value(&json!([1, 2]), 64), "[1,2]");
    }

    #[test]
    fn render_value_truncates_on_char_boundary() {
        let rendered = render_value(&json!("ééééééééé"), 8);
        assert!(rendered.ends_with("..."));
        assert!(rendered.len() <= 8);
    }
}
