//! Incoming form submissions.
//!
//! A [`Submission`] is whatever key/value pairs the browser posted, kept in
//! the order they arrived. Values stay loosely typed; the only thing the
//! relay ever does with them is turn them into display strings.

use indexmap::IndexMap;
use serde_json::{Map, Value};
use thiserror::Error;

/// Errors from parsing a request body into a [`Submission`].
#[derive(Error, Debug)]
pub enum SubmissionError {
    #[error("malformed JSON body: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("JSON body must be an object, got {0}")]
    NotAnObject(&'static str),

    #[error("malformed URL-encoded body: {0}")]
    InvalidForm(#[from] serde_urlencoded::de::Error),
}

/// Ordered mapping of submitted keys to loosely-typed values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Submission {
    entries: IndexMap<String, Value>,
}

impl Submission {
    /// Parse an `application/json` body. An empty body is an empty submission.
    pub fn from_json(body: &[u8]) -> Result<Self, SubmissionError> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }
        match serde_json::from_slice::<Value>(body)? {
            Value::Object(map) => Ok(map.into_iter().collect()),
            other => Err(SubmissionError::NotAnObject(json_type_name(&other))),
        }
    }

    /// Parse an `application/x-www-form-urlencoded` body.
    ///
    /// Bracketed names expand the way browsers' form libraries expect:
    /// `tags[]=a&tags[]=b` becomes `tags: ["a", "b"]` and `user[name]=x`
    /// becomes `user: {"name": "x"}`. Repeated plain keys collapse into a
    /// list at the position of the first occurrence.
    pub fn from_form(body: &[u8]) -> Result<Self, SubmissionError> {
        let pairs: Vec<(String, String)> = serde_urlencoded::from_bytes(body)?;
        let mut entries: IndexMap<String, Value> = IndexMap::with_capacity(pairs.len());

        for (key, value) in pairs {
            let (root, path) = split_form_key(&key);
            let slot = entries.entry(root.to_string()).or_insert(Value::Null);
            assign_path(slot, &path, value);
        }

        Ok(Self { entries })
    }

    /// Entries in received order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Pretty-printed JSON with two-space indentation.
    pub fn to_pretty_json(&self) -> String {
        serde_json::to_string_pretty(&self.entries).unwrap_or_else(|_| "{}".to_string())
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for Submission {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

/// Render a value the way a browser's `String(value)` would show it.
///
/// `null` becomes the empty string, lists are joined with commas, and
/// integral floats lose their fractional part. Nested objects have no
/// useful browser rendering, so they are emitted as compact JSON.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => display_number(n),
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(display_value)
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => value.to_string(),
    }
}

/// Split `user[address][city]` into `user` and `["address", "city"]`.
///
/// Keys that do not start with a name followed by `[...]` are taken
/// literally. Nesting stops after [`MAX_FORM_DEPTH`] levels; whatever is
/// left becomes one final segment.
fn split_form_key(key: &str) -> (&str, Vec<&str>) {
    let Some(open) = key.find('[') else {
        return (key, Vec::new());
    };
    if open == 0 || !key[open..].contains(']') {
        return (key, Vec::new());
    }

    let root = &key[..open];
    let mut rest = &key[open..];
    let mut path = Vec::new();
    while path.len() < MAX_FORM_DEPTH {
        let Some(close) = rest.strip_prefix('[').and_then(|r| r.find(']')) else {
            break;
        };
        path.push(&rest[1..=close]);
        rest = &rest[close + 2..];
    }
    if !rest.is_empty() {
        path.push(rest);
    }
    (root, path)
}

const MAX_FORM_DEPTH: usize = 5;

/// Largest `[n]` index still treated as a list position.
const MAX_FORM_INDEX: usize = 20;

/// Store `value` at `path` below `slot`, growing lists and objects as needed.
fn assign_path(slot: &mut Value, path: &[&str], value: String) {
    let Some((segment, rest)) = path.split_first() else {
        match slot {
            Value::Null => *slot = Value::String(value),
            Value::Array(items) => items.push(Value::String(value)),
            _ => {
                let first = slot.take();
                *slot = Value::Array(vec![first, Value::String(value)]);
            }
        }
        return;
    };

    let index = segment.parse::<usize>().ok().filter(|i| *i <= MAX_FORM_INDEX);
    if segment.is_empty() || (index.is_some() && matches!(slot, Value::Null | Value::Array(_))) {
        let items = as_array(slot);
        let position = match index {
            Some(i) if i < items.len() => i,
            _ => {
                items.push(Value::Null);
                items.len() - 1
            }
        };
        if segment.is_empty() && rest.is_empty() {
            items[position] = Value::String(value);
        } else {
            assign_path(&mut items[position], rest, value);
        }
        return;
    }

    let child = as_object(slot)
        .entry(segment.to_string())
        .or_insert(Value::Null);
    assign_path(child, rest, value);
}

fn as_array(slot: &mut Value) -> &mut Vec<Value> {
    if !slot.is_array() {
        *slot = match slot.take() {
            Value::Null => Value::Array(Vec::new()),
            scalar => Value::Array(vec![scalar]),
        };
    }
    match slot {
        Value::Array(items) => items,
        _ => unreachable!("slot was just made an array"),
    }
}

/// Lists turn into objects keyed by position, scalars sit under `"0"`.
fn as_object(slot: &mut Value) -> &mut Map<String, Value> {
    if !slot.is_object() {
        *slot = match slot.take() {
            Value::Null => Value::Object(Map::new()),
            Value::Array(items) => Value::Object(
                items
                    .into_iter()
                    .enumerate()
                    .map(|(i, v)| (i.to_string(), v))
                    .collect(),
            ),
            scalar => Value::Object(Map::from_iter([("0".to_string(), scalar)])),
        };
    }
    match slot {
        Value::Object(map) => map,
        _ => unreachable!("slot was just made an object"),
    }
}

/// Integral floats print without a fraction. Magnitudes of `1e21` and up,
/// or below `1e-6`, use exponent form with an explicit sign (`1e+21`,
/// `1.5e-7`).
fn display_number(n: &serde_json::Number) -> String {
    let Some(f) = n.as_f64().filter(|_| !n.is_i64() && !n.is_u64()) else {
        return n.to_string();
    };
    if f == 0.0 {
        return "0".to_string();
    }
    if f.abs() >= 1e21 || f.abs() < 1e-6 {
        let formatted = format!("{f:e}");
        return match formatted.split_once('e') {
            Some((mantissa, exp)) if !exp.starts_with('-') => format!("{mantissa}e+{exp}"),
            _ => formatted,
        };
    }
    if f.fract() == 0.0 {
        format!("{f:.0}")
    } else {
        f.to_string()
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
