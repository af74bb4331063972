use serde_json::Value;
use unicode_width::UnicodeWidthStr;

/// Text shown in a table cell for a decoded value.
/// Null renders empty; nested arrays/objects render as compact JSON.
pub fn display_cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Same as [`display_cell`] for an optional lookup, so a missing key renders empty.
pub fn display_opt(value: Option<&Value>) -> String {
    value.map(display_cell).unwrap_or_default()
}

/// Terminal column width: CJK counts double, combining marks count zero.
pub fn text_width(s: &str) -> usize {
    UnicodeWidthStr::width(s)
}
