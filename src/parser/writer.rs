//! Deterministic writer for the generic tree.

use std::fmt::Write as _;

use super::types::{scalar_from_token, Block, Map, Value};

/// Serialize a tree to text.
///
/// Mappings open on the key's line and close on their own line, indented
/// with one tab per level. Arrays stay on one line. Each occurrence of a
/// repeated key is written as its own block followed by a blank line.
pub fn serialize(root: &Map) -> String {
    let mut out = String::new();
    for (key, value) in root.iter() {
        write_entry(&mut out, key, value, 0);
    }
    out
}

fn indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push('\t');
    }
}

fn write_entry(out: &mut String, key: &str, value: &Value, depth: usize) {
    match value {
        Value::Repeated(items) => {
            for item in items {
                write_entry(out, key, item, depth);
                out.push('\n');
            }
        }
        Value::Block(Block::Map(map)) => {
            indent(out, depth);
            let _ = writeln!(out, "{} = {{", key);
            for (k, v) in map.iter() {
                write_entry(out, k, v, depth + 1);
            }
            indent(out, depth);
            out.push_str("}\n");
        }
        other => {
            indent(out, depth);
            let _ = writeln!(out, "{} = {}", key, inline(other));
        }
    }
}

/// Render a value on a single line.
pub fn inline(value: &Value) -> String {
    match value {
        Value::Bool(true) => "yes".to_string(),
        Value::Bool(false) => "no".to_string(),
        Value::Int(i) => i.to_string(),
        Value::Float(f) => format_float(*f),
        Value::Str(s) => quote_if_needed(s),
        Value::Raw(s) => s.clone(),
        Value::Block(Block::Array(items)) | Value::Repeated(items) => {
            if items.is_empty() {
                "{ }".to_string()
            } else {
                let parts: Vec<String> = items.iter().map(inline).collect();
                format!("{{ {} }}", parts.join(" "))
            }
        }
        Value::Block(Block::Map(map)) => {
            if map.is_empty() {
                return "{ }".to_string();
            }
            let parts: Vec<String> = map
                .iter()
                .map(|(k, v)| format!("{} = {}", k, inline(v)))
                .collect();
            format!("{{ {} }}", parts.join(" "))
        }
    }
}

/// Fixed six-decimal rendering.
pub fn format_float(f: f64) -> String {
    format!("{:.6}", f)
}

/// Quote a string when writing it bare would not read back as the same
/// string. Inside quotes, `"` and `\` are backslash-escaped.
pub fn quote_if_needed(s: &str) -> String {
    let needs_quotes = s.is_empty()
        || s.chars().any(|c| {
            c.is_whitespace() || matches!(c, '.' | '/' | '\\' | '=' | '{' | '}' | '#' | '"')
        })
        || scalar_from_token(s) != Value::Str(s.to_string());
    if !needs_quotes {
        return s.to_string();
    }
    let mut quoted = String::with_capacity(s.len() + 2);
    quoted.push('"');
    for c in s.chars() {
        if matches!(c, '"' | '\\') {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('"');
    quoted
}
