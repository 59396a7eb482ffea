//! Tolerant extraction of structured payloads from generated text.
//!
//! Two payload forms are recognized: one JSON object (fenced or bare), and a
//! heading-delimited markdown layout. Extraction yields a `ParseError` when no
//! payload is present; per-field defaults are then applied through declared
//! rules so a located payload always produces a complete record.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("no structured payload found in response")]
    NoPayload,
    #[error("malformed payload: {0}")]
    Malformed(String),
}

static JSON_FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)```json\s*\n?(.*?)```").expect("valid regex"));
// Greedy: first `{` to last `}`
static BARE_OBJECT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)\{.*\}").expect("valid regex"));
static HEADING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^#{2,4}\s*(.+?)\s*#*\s*$").expect("valid regex"));

/// Locate one JSON object in `text`.
///
/// A ```json fence is preferred; otherwise the span from the first `{` to the
/// last `}` is parsed.
pub fn extract_json_payload(text: &str) -> Result<Map<String, Value>, ParseError> {
    if let Some(body) = JSON_FENCE.captures(text).and_then(|c| c.get(1)) {
        if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(body.as_str().trim()) {
            return Ok(map);
        }
    }

    let span = BARE_OBJECT.find(text).ok_or(ParseError::NoPayload)?;
    match serde_json::from_str::<Value>(span.as_str()) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(ParseError::Malformed("payload is not an object".into())),
        Err(e) => Err(ParseError::Malformed(e.to_string())),
    }
}

/// Shape a field value must have to be taken from the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Integer,
    Number,
    List,
    Object,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldDefault {
    Text(&'static str),
    Integer(i64),
    Number(f64),
    EmptyList,
    /// The full response text
    Raw,
}

/// One `(field, pattern, default)` rule. `keys` are tried in order.
#[derive(Debug, Clone, Copy)]
pub struct FieldRule {
    pub field: &'static str,
    pub keys: &'static [&'static str],
    pub kind: FieldKind,
    pub default: FieldDefault,
}

impl FieldRule {
    fn pick(&self, payload: &Map<String, Value>) -> Option<Value> {
        self.keys
            .iter()
            .filter_map(|k| payload.get(*k))
            .find(|v| accepts(self.kind, v))
            .cloned()
    }

    fn fallback(&self, raw: &str) -> Value {
        match self.default {
            FieldDefault::Text(s) => Value::String(s.to_string()),
            FieldDefault::Integer(n) => Value::from(n),
            FieldDefault::Number(n) => Value::from(n),
            FieldDefault::EmptyList => Value::Array(Vec::new()),
            FieldDefault::Raw => Value::String(raw.to_string()),
        }
    }
}

/// Empty strings, zero and null count as absent.
fn accepts(kind: FieldKind, v: &Value) -> bool {
    match kind {
        FieldKind::Text => v.as_str().is_some_and(|s| !s.trim().is_empty()),
        FieldKind::Integer => v
            .as_f64()
            .or_else(|| v.as_str().and_then(|s| s.trim().parse().ok()))
            .is_some_and(|n| n != 0.0),
        FieldKind::Number => v.as_f64().is_some_and(|n| n != 0.0),
        FieldKind::List => v.is_array(),
        FieldKind::Object => v.is_object(),
    }
}

/// Apply `rules` to a located payload. Never fails; absent fields take their default.
pub fn apply_rules(payload: &Map<String, Value>, rules: &[FieldRule], raw: &str) -> Map<String, Value> {
    rules
        .iter()
        .map(|rule| {
            let value = rule.pick(payload).unwrap_or_else(|| rule.fallback(raw));
            (rule.field.to_string(), normalize(rule.kind, value))
        })
        .collect()
}

fn normalize(kind: FieldKind, v: Value) -> Value {
    match (kind, &v) {
        (FieldKind::Integer, Value::String(s)) => s
            .trim()
            .parse::<f64>()
            .map(|n| Value::from(n.round() as i64))
            .unwrap_or(v),
        (FieldKind::Integer, Value::Number(n)) if !n.is_i64() && !n.is_u64() => {
            Value::from(n.as_f64().unwrap_or(0.0).round() as i64)
        }
        _ => v,
    }
}

/// A markdown section captured into `field` by its heading text.
#[derive(Debug, Clone, Copy)]
pub struct SectionRule {
    pub field: &'static str,
    pub heading: &'static str,
}

/// Capture heading-delimited sections. Each section runs until the next
/// heading or the end of text. Fails with `NoPayload` if no declared heading is
/// present.
pub fn extract_sections(text: &str, rules: &[SectionRule]) -> Result<Map<String, Value>, ParseError> {
    let headings: Vec<(String, usize, usize)> = HEADING
        .captures_iter(text)
        .filter_map(|c| {
            let whole = c.get(0)?;
            let title = c.get(1)?.as_str().trim().to_lowercase();
            Some((title, whole.start(), whole.end()))
        })
        .collect();

    let mut out = Map::new();
    for rule in rules {
        let wanted = rule.heading.to_lowercase();
        let Some(idx) = headings.iter().position(|(t, _, _)| *t == wanted) else {
            continue;
        };
        let body_start = headings[idx].2;
        let body_end = headings.get(idx + 1).map(|h| h.1).unwrap_or(text.len());
        let body = text[body_start..body_end].trim();
        out.insert(rule.field.to_string(), Value::String(body.to_string()));
    }

    if out.is_empty() {
        return Err(ParseError::NoPayload);
    }
    Ok(out)
}

/// Body of the first fenced block tagged `lang`.
pub fn extract_fenced<'a>(text: &'a str, lang: &str) -> Option<&'a str> {
    let open = format!("```{lang}");
    let start = text.find(&open)? + open.len();
    let rest = &text[start..];
    let end = rest.find("```")?;
    Some(rest[..end].trim())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const RULES: &[FieldRule] = &[
        FieldRule {
            field: "complexity",
            keys: &["complexity"],
            kind: FieldKind::Text,
            default: FieldDefault::Text("medium"),
        },
        FieldRule {
            field: "estimatedBlocks",
            keys: &["estimatedBlocks", "estimated_blocks"],
            kind: FieldKind::Integer,
            default: FieldDefault::Integer(2),
        },
        FieldRule {
            field: "aiAnalysis",
            keys: &["aiAnalysis"],
            kind: FieldKind::Text,
            default: FieldDefault::Raw,
        },
    ];

    #[test]
    fn fenced_json_is_preferred() {
        let text = "Sure {not this}\n```json\n{\"complexity\": \"simple\"}\n```\nbye";
        let payload = extract_json_payload(text).unwrap();
        assert_eq!(payload["complexity"], "simple");
    }

    #[test]
    fn bare_object_is_found_greedily() {
        let text = "Result: {\"a\": {\"b\": 1}} done";
        let payload = extract_json_payload(text).unwrap();
        assert_eq!(payload["a"]["b"], 1);
    }

    #[test]
    fn missing_or_broken_payload() {
        assert_eq!(extract_json_payload("no braces here"), Err(ParseError::NoPayload));
        assert!(matches!(
            extract_json_payload("{ broken: }"),
            Err(ParseError::Malformed(_))
        ));
    }

    #[test]
    fn rules_fill_defaults_and_coerce() {
        let payload = json!({"estimated_blocks": "3", "complexity": ""});
        let out = apply_rules(payload.as_object().unwrap(), RULES, "raw text");
        assert_eq!(out["complexity"], "medium");
        assert_eq!(out["estimatedBlocks"], 3);
        assert_eq!(out["aiAnalysis"], "raw text");
    }

    #[test]
    fn zero_counts_as_absent() {
        let payload = json!({"estimatedBlocks": 0});
        let out = apply_rules(payload.as_object().unwrap(), RULES, "");
        assert_eq!(out["estimatedBlocks"], 2);
    }

    #[test]
    fn sections_split_on_headings() {
        let text = "### Component Name\nUserTable\n\n### Component Description\nShows users.\nPaged.\n\n### Other\nx";
        let rules = [
            SectionRule { field: "name", heading: "Component Name" },
            SectionRule { field: "desc", heading: "Component Description" },
            SectionRule { field: "libs", heading: "Component Library Recommendations" },
        ];
        let out = extract_sections(text, &rules).unwrap();
        assert_eq!(out["name"], "UserTable");
        assert_eq!(out["desc"], "Shows users.\nPaged.");
        assert!(out.get("libs").is_none());

        assert_eq!(extract_sections("plain prose", &rules), Err(ParseError::NoPayload));
    }

    #[test]
    fn fenced_block_by_language() {
        let text = "x\n```typescript\ninterface P { a: string }\n```\n";
        assert_eq!(extract_fenced(text, "typescript"), Some("interface P { a: string }"));
        assert_eq!(extract_fenced(text, "rust"), None);
    }
}
