use std::io::{self, Write};

use env_logger::fmt::Formatter;
use log::kv::{self, Source as _, VisitSource};
use log::Record;
use serde_json::{Map, Value};

/// Keys written by the formatters themselves.
const RESERVED_KEYS: &[&str] = &["time", "level", "source", "msg"];

/// Carries the message of a failed key-value visit.
const KV_ERROR_KEY: &str = "kv_error";

/// `time=... level=INFO msg="..." key=value`
pub(crate) fn text(buf: &mut Formatter, record: &Record<'_>, add_caller: bool) -> io::Result<()> {
    let time = buf.timestamp_millis().to_string();
    write!(buf, "time={} level={}", time, record.level())?;

    if add_caller {
        if let Some(source) = caller(record) {
            write!(buf, " source={}", quote(&source))?;
        }
    }

    write!(buf, " msg={}", quote(&record.args().to_string()))?;

    for (key, value) in key_values(record) {
        write!(buf, " {}={}", key, quote(&value.to_string()))?;
    }

    writeln!(buf)
}

/// One JSON object per line.
pub(crate) fn json(buf: &mut Formatter, record: &Record<'_>, add_caller: bool) -> io::Result<()> {
    let mut line = Map::new();
    line.insert("time".into(), Value::String(buf.timestamp_millis().to_string()));
    line.insert("level".into(), Value::String(record.level().to_string()));

    if add_caller {
        if let Some(source) = caller(record) {
            line.insert("source".into(), Value::String(source));
        }
    }

    line.insert("msg".into(), Value::String(record.args().to_string()));

    for (key, value) in key_values(record) {
        line.insert(key, value);
    }

    serde_json::to_writer(&mut *buf, &line)?;
    writeln!(buf)
}

fn caller(record: &Record<'_>) -> Option<String> {
    let file = record.file()?;
    Some(match record.line() {
        Some(line) => format!("{file}:{line}"),
        None => file.to_string(),
    })
}

/// Quotes a text value when it would otherwise break `key=value` parsing.
fn quote(value: &str) -> String {
    let needs_quotes = value.is_empty()
        || value
            .chars()
            .any(|c| c.is_whitespace() || c == '=' || c == '"' || c.is_control());

    if needs_quotes {
        format!("{value:?}")
    } else {
        value.to_string()
    }
}

/// The record's key-value pairs. Keys that clash with a built-in field get an
/// `attr.` prefix, and a failed visit is reported under `kv_error`.
fn key_values(record: &Record<'_>) -> Vec<(String, Value)> {
    let mut collector = Collector(Vec::new());
    if let Err(err) = record.key_values().visit(&mut collector) {
        collector.0.push((KV_ERROR_KEY.to_string(), Value::String(err.to_string())));
    }
    collector.0
}

struct Collector(Vec<(String, Value)>);

impl<'kvs> VisitSource<'kvs> for Collector {
    fn visit_pair(&mut self, key: kv::Key<'kvs>, value: kv::Value<'kvs>) -> Result<(), kv::Error> {
        let value = if let Some(b) = value.to_bool() {
            Value::Bool(b)
        } else if let Some(n) = value.to_i64() {
            Value::from(n)
        } else if let Some(n) = value.to_u64() {
            Value::from(n)
        } else if let Some(n) = value.to_f64() {
            Value::from(n)
        } else {
            Value::String(value.to_string())
        };

        let key = key.as_str();
        let key = if RESERVED_KEYS.contains(&key) || key == KV_ERROR_KEY {
            format!("attr.{key}")
        } else {
            key.to_string()
        };

        self.0.push((key, value));
        Ok(())
    }
}
