use std::sync::{Arc, LazyLock};

use regex::Regex;
use serde_json::Value;

use crate::fields::FieldLevel;

/// A user supplied rule. Returns `true` when the field passes.
pub type ValidationFunc = Arc<dyn Fn(&FieldLevel<'_>) -> bool + Send + Sync>;

/// Built-in rule: `None` means the parameter could not be understood.
pub(crate) type BuiltinFunc = fn(&FieldLevel<'_>) -> Option<bool>;

pub const OMITEMPTY: &str = "omitempty";

/// Names of the rules available without registration.
pub const BUILTIN_RULES: &[&str] = &[
    "required", OMITEMPTY, "email", "min", "max", "len", "eq", "ne", "gt", "gte", "lt", "lte",
    "oneof", "alpha", "alphanum", "numeric",
];

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$",
    )
    .expect("email pattern is valid")
});

static NUMERIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[-+]?[0-9]+(?:\.[0-9]+)?$").expect("numeric pattern is valid"));

pub(crate) fn builtin(tag: &str) -> Option<BuiltinFunc> {
    let func: BuiltinFunc = match tag {
        "required" => |fl| Some(has_value(fl.value)),
        "email" => |fl| Some(EMAIL.is_match(fl.as_str())),
        "min" => |fl| compare_size(fl, |size, limit| size >= limit),
        "max" => |fl| compare_size(fl, |size, limit| size <= limit),
        "len" => |fl| compare_size(fl, |size, limit| size == limit),
        "gt" => |fl| compare_size(fl, |size, limit| size > limit),
        "gte" => |fl| compare_size(fl, |size, limit| size >= limit),
        "lt" => |fl| compare_size(fl, |size, limit| size < limit),
        "lte" => |fl| compare_size(fl, |size, limit| size <= limit),
        "eq" => equals,
        "ne" => |fl| equals(fl).map(|eq| !eq),
        "oneof" => one_of,
        "alpha" => |fl| Some(all_chars(fl.value, |c| c.is_ascii_alphabetic())),
        "alphanum" => |fl| Some(all_chars(fl.value, |c| c.is_ascii_alphanumeric())),
        "numeric" => |fl| {
            Some(match fl.value {
                Value::Number(_) => true,
                Value::String(s) => NUMERIC.is_match(s),
                _ => false,
            })
        },
        _ => return None,
    };

    Some(func)
}

/// Whether the value differs from its zero value.
pub(crate) fn has_value(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Numbers compare by value; strings by character count; arrays and
/// objects by length.
fn size(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => Some(s.chars().count() as f64),
        Value::Array(items) => Some(items.len() as f64),
        Value::Object(map) => Some(map.len() as f64),
        Value::Null | Value::Bool(_) => None,
    }
}

fn compare_size(fl: &FieldLevel<'_>, cmp: fn(f64, f64) -> bool) -> Option<bool> {
    let limit: f64 = fl.param.trim().parse().ok()?;
    Some(size(fl.value).is_some_and(|size| cmp(size, limit)))
}

fn equals(fl: &FieldLevel<'_>) -> Option<bool> {
    match fl.value {
        Value::String(s) => Some(s == fl.param),
        Value::Bool(b) => fl.param.parse::<bool>().ok().map(|p| p == *b),
        _ => compare_size(fl, |size, limit| size == limit),
    }
}

fn one_of(fl: &FieldLevel<'_>) -> Option<bool> {
    let rendered = match fl.value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        _ => return Some(false),
    };

    Some(fl.param.split_whitespace().any(|option| option == rendered))
}

fn all_chars(value: &Value, pred: fn(char) -> bool) -> bool {
    match value {
        Value::String(s) => !s.is_empty() && s.chars().all(pred),
        _ => false,
    }
}

/// Splits `"required,min=3"` into `[("required", ""), ("min", "3")]`.
pub(crate) fn parse(rules: &str) -> impl Iterator<Item = (&str, &str)> {
    rules
        .split(',')
        .map(str::trim)
        .filter(|rule| !rule.is_empty())
        .map(|rule| match rule.split_once('=') {
            Some((tag, param)) => (tag.trim(), param.trim()),
            None => (rule, ""),
        })
}

/// Custom tag names must be usable inside a rule string.
pub(crate) fn is_valid_tag(tag: &str) -> bool {
    !tag.is_empty()
        && tag != OMITEMPTY
        && !tag.chars().any(|c| c == ',' || c == '=' || c.is_whitespace())
}
